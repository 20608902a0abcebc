use std::io::IoSlice;
use std::io::IoSliceMut;
use std::os::fd::OwnedFd;
use std::marker::PhantomData;
use crate::addr::{Domain, ToSockAddr, FromSockAddr};
use crate::error::{SocketError, IoError, errno};
use crate::fd;
use crate::socket::{sock_name, peer_name};
use super::stream::Shutdown;

/// A bound datagram socket ready for send/recv.
///
/// Unlike Stream sockets, datagrams don't connect.
/// Each send specifies a destination, each recv tells you the source.
pub struct BoundDatagram<D: Domain> {
	fd: OwnedFd,
	_marker: PhantomData<D>,
}

impl<D: Domain> BoundDatagram<D> {
	pub(crate) fn from_fd(fd: OwnedFd) -> Self {
		Self {
			fd,
			_marker: PhantomData,
		}
	}

	#[inline]
	pub fn as_raw_fd(&self) -> libc::c_int {
		use std::os::fd::AsRawFd;
		self.fd.as_raw_fd()
	}

	pub fn set_nonblocking(&self, nonblocking: bool) -> std::io::Result<()> {
		fd::set_nonblocking_fd(self.as_raw_fd(), nonblocking)
	}

	/// Creates a second independently-owned socket for the same
	/// kernel endpoint.
	pub fn duplicate(&self) -> std::io::Result<Self> {
		Ok(Self {
			fd: fd::duplicate_fd(self.as_raw_fd())?,
			_marker: PhantomData,
		})
	}

	/// Repoints this socket's descriptor number at `other`'s kernel
	/// object. See `Fd::replace_with` for the exact contract.
	pub fn replace_with<F: std::os::fd::AsRawFd>(&self, other: &F) -> std::io::Result<()> {
		fd::replace_fd(other.as_raw_fd(), self.as_raw_fd())
	}
}

impl<D: Domain> BoundDatagram<D>
where
	D::Addr: FromSockAddr,
{
	/// Returns the address this socket is bound to.
	pub fn local_addr(&self) -> std::io::Result<D::Addr> {
		sock_name(self.as_raw_fd())
	}
}

impl<D: Domain> BoundDatagram<D>
where
	D::Addr: ToSockAddr,
{
	/// Sends data to a specific address.
	///
	/// Returns the number of bytes sent. A count shorter than the
	/// packet you meant to send means the datagram was truncated by
	/// the local buffer limits — datagrams are all-or-nothing on the
	/// wire, so size them below the path MTU.
	pub fn send_to(&self, buf: &[u8], addr: &D::Addr) -> std::io::Result<usize> {
		self.send_to_with_flags(buf, addr, 0)
	}

	pub fn send_to_with_flags(&self, buf: &[u8], addr: &D::Addr, flags: i32) -> std::io::Result<usize> {
		let result = addr.with_raw(|ptr, len| unsafe {
			libc::sendto(
				self.as_raw_fd(),
				buf.as_ptr() as *const libc::c_void,
				buf.len(),
				flags,
				ptr,
				len,
			)
		});

		match result {
			Some(n) if n >= 0 => Ok(n as usize),
			Some(_) => Err(IoError::Write { errno: errno() }.into()),
			None => Err(SocketError::InvalidAddress { reason: "address too long" }.into()),
		}
	}

	/// Sends scatter-gather buffers to a specific address via sendmsg().
	pub fn send_msg_to(&self, bufs: &[IoSlice<'_>], addr: &D::Addr, flags: i32) -> std::io::Result<usize> {
		let result = addr.with_raw(|ptr, len| {
			let mut msg: libc::msghdr = unsafe { std::mem::zeroed() };
			msg.msg_name = ptr as *mut libc::c_void;
			msg.msg_namelen = len;
			msg.msg_iov = bufs.as_ptr() as *mut libc::iovec;
			msg.msg_iovlen = bufs.len();

			unsafe { libc::sendmsg(self.as_raw_fd(), &msg, flags) }
		});

		match result {
			Some(n) if n >= 0 => Ok(n as usize),
			Some(_) => Err(IoError::Write { errno: errno() }.into()),
			None => Err(SocketError::InvalidAddress { reason: "address too long" }.into()),
		}
	}
}

impl<D: Domain> BoundDatagram<D> {
	/// Receives data, returning bytes read.
	///
	/// Does not return sender address (simpler API).
	pub fn recv(&self, buf: &mut [u8]) -> std::io::Result<usize> {
		self.recv_with_flags(buf, 0)
	}

	pub fn recv_with_flags(&self, buf: &mut [u8], flags: i32) -> std::io::Result<usize> {
		let n = unsafe {
			libc::recvfrom(
				self.as_raw_fd(),
				buf.as_mut_ptr() as *mut libc::c_void,
				buf.len(),
				flags,
				std::ptr::null_mut(),
				std::ptr::null_mut(),
			)
		};

		if n == -1 {
			Err(IoError::Read { errno: errno() }.into())
		} else {
			Ok(n as usize)
		}
	}

	/// Receives into scatter-gather buffers via recvmsg().
	pub fn recv_msg(&self, bufs: &mut [IoSliceMut<'_>], flags: i32) -> std::io::Result<usize> {
		let mut msg: libc::msghdr = unsafe { std::mem::zeroed() };
		msg.msg_iov = bufs.as_mut_ptr() as *mut libc::iovec;
		msg.msg_iovlen = bufs.len();

		let n = unsafe { libc::recvmsg(self.as_raw_fd(), &mut msg, flags) };

		if n == -1 {
			Err(IoError::Read { errno: errno() }.into())
		} else {
			Ok(n as usize)
		}
	}

	pub fn recv_from(&self, buf: &mut [u8]) -> std::io::Result<(usize, D::Addr)>
	where
		D::Addr: FromSockAddr,
	{
		self.recv_from_with_flags(buf, 0)
	}

	pub fn recv_from_with_flags(&self, buf: &mut [u8], flags: i32) -> std::io::Result<(usize, D::Addr)>
	where
		D::Addr: FromSockAddr,
	{
		let mut storage: libc::sockaddr_storage = unsafe { std::mem::zeroed() };
		let mut len = std::mem::size_of::<libc::sockaddr_storage>() as libc::socklen_t;

		let n = unsafe {
			libc::recvfrom(
				self.as_raw_fd(),
				buf.as_mut_ptr() as *mut libc::c_void,
				buf.len(),
				flags,
				&mut storage as *mut _ as *mut libc::sockaddr,
				&mut len,
			)
		};

		if n == -1 {
			return Err(IoError::Read { errno: errno() }.into());
		}

		let addr = unsafe {
			D::Addr::from_sockaddr(&storage as *const _ as *const libc::sockaddr, len)
				.ok_or_else(|| SocketError::InvalidAddress { reason: "invalid sender address" })?
		};

		Ok((n as usize, addr))
	}

	/// Connects this socket to a fixed peer.
	///
	/// At the kernel level it's still the same socket; connect() just
	/// fixes the default destination and filters incoming packets.
	pub fn connect(self, addr: D::Addr) -> std::io::Result<ConnectedDatagram<D>>
	where
		D::Addr: ToSockAddr + std::fmt::Debug,
	{
		let result = addr.with_raw(|ptr, len| unsafe {
			libc::connect(self.as_raw_fd(), ptr, len)
		});

		match result {
			Some(-1) => Err(SocketError::Connect { errno: errno(), addr: format!("{:?}", addr) }.into()),
			Some(_) => Ok(ConnectedDatagram::from_fd(self.fd)),
			None => Err(SocketError::InvalidAddress { reason: "address too long" }.into()),
		}
	}
}

impl<D: Domain> std::os::fd::AsRawFd for BoundDatagram<D> {
	fn as_raw_fd(&self) -> std::os::fd::RawFd {
		self.fd.as_raw_fd()
	}
}

impl<D: Domain> std::os::fd::AsFd for BoundDatagram<D> {
	fn as_fd(&self) -> std::os::fd::BorrowedFd<'_> {
		self.fd.as_fd()
	}
}

impl<D: Domain> std::os::fd::FromRawFd for BoundDatagram<D> {
	unsafe fn from_raw_fd(fd: std::os::fd::RawFd) -> Self {
		unsafe { Self::from_fd(OwnedFd::from_raw_fd(fd)) }
	}
}

impl<D: Domain> std::os::fd::IntoRawFd for BoundDatagram<D> {
	fn into_raw_fd(self) -> std::os::fd::RawFd {
		self.fd.into_raw_fd()
	}
}

/// A datagram socket connected to a specific peer.
///
/// Created by BoundDatagram::connect() or RawSocket::connect_datagram().
/// send()/recv() only communicate with that peer.
pub struct ConnectedDatagram<D: Domain> {
	fd: OwnedFd,
	_marker: PhantomData<D>,
}

impl<D: Domain> ConnectedDatagram<D> {
	pub(crate) fn from_fd(fd: OwnedFd) -> Self {
		Self {
			fd,
			_marker: PhantomData,
		}
	}

	#[inline]
	pub fn as_raw_fd(&self) -> libc::c_int {
		use std::os::fd::AsRawFd;
		self.fd.as_raw_fd()
	}

	pub fn send(&self, buf: &[u8]) -> std::io::Result<usize> {
		self.send_with_flags(buf, 0)
	}

	pub fn send_with_flags(&self, buf: &[u8], flags: i32) -> std::io::Result<usize> {
		let n = unsafe {
			libc::send(
				self.as_raw_fd(),
				buf.as_ptr() as *const libc::c_void,
				buf.len(),
				flags,
			)
		};

		if n == -1 {
			Err(IoError::Write { errno: errno() }.into())
		} else {
			Ok(n as usize)
		}
	}

	pub fn recv(&self, buf: &mut [u8]) -> std::io::Result<usize> {
		self.recv_with_flags(buf, 0)
	}

	pub fn recv_with_flags(&self, buf: &mut [u8], flags: i32) -> std::io::Result<usize> {
		let n = unsafe {
			libc::recv(
				self.as_raw_fd(),
				buf.as_mut_ptr() as *mut libc::c_void,
				buf.len(),
				flags,
			)
		};

		if n == -1 {
			Err(IoError::Read { errno: errno() }.into())
		} else {
			Ok(n as usize)
		}
	}

	/// Sends scatter-gather buffers to the connected peer via sendmsg().
	pub fn send_msg(&self, bufs: &[IoSlice<'_>], flags: i32) -> std::io::Result<usize> {
		let mut msg: libc::msghdr = unsafe { std::mem::zeroed() };
		msg.msg_iov = bufs.as_ptr() as *mut libc::iovec;
		msg.msg_iovlen = bufs.len();

		let n = unsafe { libc::sendmsg(self.as_raw_fd(), &msg, flags) };

		if n == -1 {
			Err(IoError::Write { errno: errno() }.into())
		} else {
			Ok(n as usize)
		}
	}

	/// Receives into scatter-gather buffers via recvmsg().
	pub fn recv_msg(&self, bufs: &mut [IoSliceMut<'_>], flags: i32) -> std::io::Result<usize> {
		let mut msg: libc::msghdr = unsafe { std::mem::zeroed() };
		msg.msg_iov = bufs.as_mut_ptr() as *mut libc::iovec;
		msg.msg_iovlen = bufs.len();

		let n = unsafe { libc::recvmsg(self.as_raw_fd(), &mut msg, flags) };

		if n == -1 {
			Err(IoError::Read { errno: errno() }.into())
		} else {
			Ok(n as usize)
		}
	}

	/// Shuts down one or both halves of the association.
	pub fn shutdown(&self, how: Shutdown) -> std::io::Result<()> {
		let result = unsafe { libc::shutdown(self.as_raw_fd(), how.raw()) };

		if result == -1 {
			Err(SocketError::Shutdown { errno: errno() }.into())
		} else {
			Ok(())
		}
	}

	pub fn set_nonblocking(&self, nonblocking: bool) -> std::io::Result<()> {
		fd::set_nonblocking_fd(self.as_raw_fd(), nonblocking)
	}

	/// Creates a second independently-owned socket for the same
	/// kernel endpoint.
	pub fn duplicate(&self) -> std::io::Result<Self> {
		Ok(Self {
			fd: fd::duplicate_fd(self.as_raw_fd())?,
			_marker: PhantomData,
		})
	}

	/// Repoints this socket's descriptor number at `other`'s kernel
	/// object. See `Fd::replace_with` for the exact contract.
	pub fn replace_with<F: std::os::fd::AsRawFd>(&self, other: &F) -> std::io::Result<()> {
		fd::replace_fd(other.as_raw_fd(), self.as_raw_fd())
	}
}

impl<D: Domain> ConnectedDatagram<D>
where
	D::Addr: FromSockAddr,
{
	pub fn peer_addr(&self) -> std::io::Result<D::Addr> {
		peer_name(self.as_raw_fd())
	}

	pub fn local_addr(&self) -> std::io::Result<D::Addr> {
		sock_name(self.as_raw_fd())
	}
}

impl<D: Domain> std::os::fd::AsRawFd for ConnectedDatagram<D> {
	fn as_raw_fd(&self) -> std::os::fd::RawFd {
		self.fd.as_raw_fd()
	}
}

impl<D: Domain> std::os::fd::AsFd for ConnectedDatagram<D> {
	fn as_fd(&self) -> std::os::fd::BorrowedFd<'_> {
		self.fd.as_fd()
	}
}

impl<D: Domain> std::os::fd::FromRawFd for ConnectedDatagram<D> {
	unsafe fn from_raw_fd(fd: std::os::fd::RawFd) -> Self {
		unsafe { Self::from_fd(OwnedFd::from_raw_fd(fd)) }
	}
}

impl<D: Domain> std::os::fd::IntoRawFd for ConnectedDatagram<D> {
	fn into_raw_fd(self) -> std::os::fd::RawFd {
		self.fd.into_raw_fd()
	}
}

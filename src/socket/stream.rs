use std::io::IoSlice;
use std::io::IoSliceMut;
use std::os::fd::IntoRawFd;
use std::os::fd::RawFd;
use std::os::fd::FromRawFd;
use crate::addr::FromSockAddr;
use std::os::fd::OwnedFd;
use std::marker::PhantomData;
use crate::addr::Domain;
use crate::error::{SocketError, IoError, errno};
use crate::fd;
use crate::socket::{sock_name, peer_name};

/// A connected stream socket.
///
/// Represents an established connection — ready for read/write.
/// Created by Listener::accept() (server) or RawSocket::connect() (client).
#[derive(Debug)]
pub struct ConnectedStream<D: Domain> {
	fd: OwnedFd,
	_marker: PhantomData<D>,
}

impl<D: Domain> ConnectedStream<D> {
	/// Creates from an OwnedFd.
	pub(crate) fn from_fd(fd: OwnedFd) -> Self {
		Self {
			fd,
			_marker: PhantomData,
		}
	}

	/// Returns the raw file descriptor.
	#[inline]
	pub fn as_raw_fd(&self) -> libc::c_int {
		use std::os::fd::AsRawFd;
		self.fd.as_raw_fd()
	}

	/// Reads bytes from the connection.
	///
	/// A short read is normal, not an error — the kernel hands over
	/// whatever is buffered. Returns 0 at end of stream.
	pub fn read(&self, buf: &mut [u8]) -> std::io::Result<usize> {
		fd::read_fd(self.as_raw_fd(), buf)
	}

	/// Writes bytes to the connection.
	///
	/// May transfer fewer bytes than requested; callers loop.
	pub fn write(&self, buf: &[u8]) -> std::io::Result<usize> {
		fd::write_fd(self.as_raw_fd(), buf)
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

	pub fn set_nonblocking(&self, nonblocking: bool) -> std::io::Result<()> {
		fd::set_nonblocking_fd(self.as_raw_fd(), nonblocking)
	}

	pub fn readv(&self, bufs: &mut [IoSliceMut<'_>]) -> std::io::Result<usize> {
		let n = unsafe {
			libc::readv(
				self.as_raw_fd(),
				bufs.as_ptr() as *const libc::iovec,
				bufs.len() as libc::c_int,
			)
		};

		if n == -1 {
			Err(IoError::Read { errno: errno() }.into())
		} else {
			Ok(n as usize)
		}
	}

	pub fn writev(&self, bufs: &[IoSlice<'_>]) -> std::io::Result<usize> {
		let n = unsafe {
			libc::writev(
				self.as_raw_fd(),
				bufs.as_ptr() as *const libc::iovec,
				bufs.len() as libc::c_int,
			)
		};

		if n == -1 {
			Err(IoError::Write { errno: errno() }.into())
		} else {
			Ok(n as usize)
		}
	}

	/// Sends scatter-gather buffers via sendmsg().
	///
	/// Like writev() but through the socket message interface, so the
	/// same call shape works for flags (MSG_MORE, MSG_DONTWAIT, ...).
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

	/// Returns whether the read pointer is at the out-of-band mark.
	pub fn at_mark(&self) -> std::io::Result<bool> {
		let mut val: libc::c_int = 0;

		// libc 1.0 dropped the SIOCATMARK export; the ioctl request is the
		// fixed asm-generic value (0x8905) the kernel defines for this probe.
		const SIOCATMARK: libc::Ioctl = 0x8905;
		let result = unsafe { libc::ioctl(self.as_raw_fd(), SIOCATMARK, &mut val) };

		if result == -1 {
			return Err(SocketError::GetOption { errno: errno(), option: "SIOCATMARK" }.into());
		}

		Ok(val != 0)
	}

	/// Creates a second independently-owned stream for the same
	/// kernel connection.
	///
	/// Both share the connection's byte stream and file status flags.
	/// Closing one does not close the other.
	pub fn duplicate(&self) -> std::io::Result<Self> {
		Ok(Self {
			fd: fd::duplicate_fd(self.as_raw_fd())?,
			_marker: PhantomData,
		})
	}

	/// Repoints this stream's descriptor number at `other`'s kernel
	/// object. See `Fd::replace_with` for the exact contract.
	pub fn replace_with<F: std::os::fd::AsRawFd>(&self, other: &F) -> std::io::Result<()> {
		fd::replace_fd(other.as_raw_fd(), self.as_raw_fd())
	}
}

impl<D: Domain> std::os::fd::AsRawFd for ConnectedStream<D> {
	fn as_raw_fd(&self) -> std::os::fd::RawFd {
		self.fd.as_raw_fd()
	}
}

impl<D: Domain> std::io::Read for ConnectedStream<D> {
	fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
		ConnectedStream::read(self, buf)
	}
}

impl<D: Domain> std::os::fd::AsFd for ConnectedStream<D> {
	fn as_fd(&self) -> std::os::fd::BorrowedFd<'_> {
		self.fd.as_fd()
	}
}

impl<D: Domain> std::io::Write for ConnectedStream<D> {
	fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
		ConnectedStream::write(self, buf)
	}

	fn flush(&mut self) -> std::io::Result<()> {
		Ok(())  // TCP doesn't buffer at this level
	}
}

impl<D: Domain> ConnectedStream<D>
where
	D::Addr: FromSockAddr,
{
	/// Returns the remote address of this connection.
	pub fn peer_addr(&self) -> std::io::Result<D::Addr> {
		peer_name(self.as_raw_fd())
	}

	/// Returns the local address of this connection.
	pub fn local_addr(&self) -> std::io::Result<D::Addr> {
		sock_name(self.as_raw_fd())
	}
}

impl<D: Domain> FromRawFd for ConnectedStream<D> {
	unsafe fn from_raw_fd(fd: RawFd) -> Self {
		unsafe { Self::from_fd(OwnedFd::from_raw_fd(fd)) }
	}
}

impl<D: Domain> IntoRawFd for ConnectedStream<D> {
	fn into_raw_fd(self) -> RawFd {
		self.fd.into_raw_fd()
	}
}

/// Which half of the connection to shut down.
pub enum Shutdown {
	Read,       // SHUT_RD
	Write,      // SHUT_WR
	ReadWrite,  // SHUT_RDWR
}

impl Shutdown {
	pub(crate) fn raw(&self) -> libc::c_int {
		match self {
			Shutdown::Read => libc::SHUT_RD,
			Shutdown::Write => libc::SHUT_WR,
			Shutdown::ReadWrite => libc::SHUT_RDWR,
		}
	}
}

impl<D: Domain> ConnectedStream<D> {
	/// Shuts down one or both halves of the connection.
	///
	/// Unlike drop, this affects every descriptor referring to the
	/// connection — a duplicate sees the shutdown too.
	pub fn shutdown(&self, how: Shutdown) -> std::io::Result<()> {
		let result = unsafe { libc::shutdown(self.as_raw_fd(), how.raw()) };

		if result == -1 {
			Err(SocketError::Shutdown { errno: errno() }.into())
		} else {
			Ok(())
		}
	}
}

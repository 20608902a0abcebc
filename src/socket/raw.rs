use crate::Datagram;
use crate::socket::datagram::{BoundDatagram, ConnectedDatagram};
use crate::socket::Stream;
use crate::socket::stream::ConnectedStream;
use crate::addr::ToSockAddr;
use std::os::fd::{OwnedFd, FromRawFd};
use std::marker::PhantomData;
use crate::addr::Domain;
use crate::error::{SocketError, errno};
use crate::fd;
use super::SockType;
use super::bound::BoundSocket;

/// A raw socket that has been created but not yet bound or connected.
///
/// This is the starting point for all socket operations.
/// Use `.bind()` to become a listener or datagram socket.
/// Use `.connect()` to become a connected stream.
pub struct RawSocket<D: Domain, T: SockType> {
	fd: OwnedFd,
	_marker: PhantomData<(D, T)>,
}

impl<D: Domain, T: SockType> RawSocket<D, T> {
	/// Creates a new raw socket.
	///
	/// Calls the `socket()` syscall with the appropriate domain and type.
	/// The socket is created with `SOCK_CLOEXEC` (close on exec).
	pub fn new() -> std::io::Result<Self> {
		Self::with_protocol(0)
	}

	/// Creates a new raw socket with an explicit protocol number.
	///
	/// 0 lets the kernel pick the default protocol for the
	/// (domain, type) pair, which is what you want almost always.
	pub fn with_protocol(protocol: libc::c_int) -> std::io::Result<Self> {
		let fd = unsafe {
			libc::socket(D::raw(), T::raw() | libc::SOCK_CLOEXEC, protocol)
		};
		if fd == -1 {
			return Err(SocketError::Create { errno: errno() }.into());
		}
		let fd = unsafe { OwnedFd::from_raw_fd(fd) };

		Ok(Self {
			fd,
			_marker: PhantomData,
		})
	}

	/// Returns the raw file descriptor.
	///
	/// Used internally for syscalls. Does not transfer ownership.
	#[inline]
	pub fn as_raw_fd(&self) -> libc::c_int {
		use std::os::fd::AsRawFd;
		self.fd.as_raw_fd()
	}

	/// Sets the socket to non-blocking mode.
	///
	/// Required for use with epoll.
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

	/// Binds the socket to an address.
	///
	/// Consumes self, returns BoundSocket.
	/// The address type is determined by the Domain:
	/// - Ipv4 → SocketAddrV4
	/// - Ipv6 → SocketAddrV6
	/// - Unix → UnixAddr
	pub fn bind(self, addr: D::Addr) -> std::io::Result<BoundSocket<D, T>>
	where
		D::Addr: ToSockAddr + std::fmt::Debug,
	{
		let result = addr.with_raw(|ptr, len| unsafe {
			libc::bind(self.as_raw_fd(), ptr, len)
		});

		match result {
			Some(-1) => Err(SocketError::Bind {
				errno: errno(),
				addr: format!("{:?}", addr),
			}.into()),
			Some(_) => Ok(BoundSocket::from_fd(self.into_fd())),
			None => Err(SocketError::InvalidAddress {
				reason: "address too long",
			}.into()),
		}
	}

	pub(crate) fn into_fd(self) -> OwnedFd {
		self.fd
	}
}

impl<D: Domain> RawSocket<D, Stream> {
	/// Connects to a remote address.
	///
	/// For clients — establishes connection to a server.
	/// Consumes self, returns a connected stream.
	///
	/// On a non-blocking socket the kernel's EINPROGRESS comes straight
	/// back as an error; waiting for writability is the caller's job.
	pub fn connect(self, addr: D::Addr) -> std::io::Result<ConnectedStream<D>>
	where
		D::Addr: ToSockAddr + std::fmt::Debug,
	{
		let result = addr.with_raw(|ptr, len| unsafe {
			libc::connect(self.as_raw_fd(), ptr, len)
		});

		match result {
			Some(-1) => Err(SocketError::Connect {
				errno: errno(),
				addr: format!("{:?}", addr),
			}.into()),
			Some(_) => Ok(ConnectedStream::from_fd(self.into_fd())),
			None => Err(SocketError::InvalidAddress {
				reason: "address too long",
			}.into()),
		}
	}
}

impl<D: Domain> RawSocket<D, Datagram> {
	/// Binds a datagram socket to an address.
	///
	/// Returns BoundDatagram ready for send_to/recv.
	pub fn bind_datagram(self, addr: D::Addr) -> std::io::Result<BoundDatagram<D>>
	where
		D::Addr: ToSockAddr + std::fmt::Debug,
	{
		let result = addr.with_raw(|ptr, len| unsafe {
			libc::bind(self.as_raw_fd(), ptr, len)
		});

		match result {
			Some(-1) => Err(SocketError::Bind {
				errno: errno(),
				addr: format!("{:?}", addr),
			}.into()),
			Some(_) => Ok(BoundDatagram::from_fd(self.into_fd())),
			None => Err(SocketError::InvalidAddress {
				reason: "address too long",
			}.into()),
		}
	}

	/// Connects a datagram socket to a fixed peer without binding first.
	///
	/// The kernel picks a local address. send()/recv() then only talk
	/// to that peer.
	pub fn connect_datagram(self, addr: D::Addr) -> std::io::Result<ConnectedDatagram<D>>
	where
		D::Addr: ToSockAddr + std::fmt::Debug,
	{
		let result = addr.with_raw(|ptr, len| unsafe {
			libc::connect(self.as_raw_fd(), ptr, len)
		});

		match result {
			Some(-1) => Err(SocketError::Connect {
				errno: errno(),
				addr: format!("{:?}", addr),
			}.into()),
			Some(_) => Ok(ConnectedDatagram::from_fd(self.into_fd())),
			None => Err(SocketError::InvalidAddress {
				reason: "address too long",
			}.into()),
		}
	}
}

impl<D: Domain, T: SockType> std::os::fd::AsRawFd for RawSocket<D, T> {
	fn as_raw_fd(&self) -> std::os::fd::RawFd {
		self.fd.as_raw_fd()
	}
}

impl<D: Domain, T: SockType> std::os::fd::AsFd for RawSocket<D, T> {
	fn as_fd(&self) -> std::os::fd::BorrowedFd<'_> {
		self.fd.as_fd()
	}
}

impl<D: Domain, T: SockType> std::os::fd::FromRawFd for RawSocket<D, T> {
	unsafe fn from_raw_fd(fd: std::os::fd::RawFd) -> Self {
		unsafe { Self { fd: OwnedFd::from_raw_fd(fd), _marker: PhantomData } }
	}
}

impl<D: Domain, T: SockType> std::os::fd::IntoRawFd for RawSocket<D, T> {
	fn into_raw_fd(self) -> std::os::fd::RawFd {
		self.fd.into_raw_fd()
	}
}

mod listener;
mod raw;
mod stream;
mod datagram;
mod options;
mod bound;

pub use self::listener::Listener;
pub use self::raw::RawSocket;
pub use self::stream::{ConnectedStream, Shutdown};
pub use self::bound::BoundSocket;
pub use self::datagram::{BoundDatagram, ConnectedDatagram};
pub use self::options::{getsockopt_raw, setsockopt_raw, getsockopt_int, setsockopt_int,
						set_reuse_addr, set_reuse_port, set_keepalive, set_linger,
						set_recv_buffer_size, set_send_buffer_size,
						send_fd, recv_fd};

use crate::addr::FromSockAddr;
use crate::error::{SocketError, errno};

/// Trait for socket type markers.
///
/// Each type implementing this trait represents a socket type
/// that can be passed to the `socket()` syscall.
///
/// - `Stream` — reliable, ordered byte stream (TCP-like)
/// - `Datagram` — unreliable, unordered packets (UDP-like)
pub trait SockType {
	/// Returns the libc constant for this socket type.
	fn raw() -> libc::c_int;
}

/// Stream socket marker.
///
/// Provides reliable, ordered, two-way byte streams.
/// Used for TCP (with Ipv4/Ipv6) or Unix stream sockets.
#[derive(Debug)]
pub struct Stream;

/// Datagram socket marker.
///
/// Provides unreliable, unordered packets.
/// Used for UDP (with Ipv4/Ipv6) or Unix datagram sockets.
pub struct Datagram;

impl SockType for Stream {
	#[inline]
	fn raw() -> libc::c_int {
		libc::SOCK_STREAM
	}
}

impl SockType for Datagram {
	#[inline]
	fn raw() -> libc::c_int {
		libc::SOCK_DGRAM
	}
}

// getsockname/getpeername share the same shape: hand the kernel a
// sockaddr_storage, let it fill in the real length, decode. Every socket
// state exposes these through the two helpers below.

pub(crate) fn sock_name<A: FromSockAddr>(fd: libc::c_int) -> std::io::Result<A> {
	let mut storage: libc::sockaddr_storage = unsafe { std::mem::zeroed() };
	let mut len = std::mem::size_of::<libc::sockaddr_storage>() as libc::socklen_t;

	let result = unsafe {
		libc::getsockname(
			fd,
			&mut storage as *mut _ as *mut libc::sockaddr,
			&mut len,
		)
	};

	if result == -1 {
		return Err(SocketError::GetOption { errno: errno(), option: "SO_SOCKNAME" }.into());
	}

	unsafe {
		A::from_sockaddr(&storage as *const _ as *const libc::sockaddr, len)
			.ok_or_else(|| SocketError::InvalidAddress { reason: "invalid address" }.into())
	}
}

pub(crate) fn peer_name<A: FromSockAddr>(fd: libc::c_int) -> std::io::Result<A> {
	let mut storage: libc::sockaddr_storage = unsafe { std::mem::zeroed() };
	let mut len = std::mem::size_of::<libc::sockaddr_storage>() as libc::socklen_t;

	let result = unsafe {
		libc::getpeername(
			fd,
			&mut storage as *mut _ as *mut libc::sockaddr,
			&mut len,
		)
	};

	if result == -1 {
		return Err(SocketError::GetOption { errno: errno(), option: "SO_PEERNAME" }.into());
	}

	unsafe {
		A::from_sockaddr(&storage as *const _ as *const libc::sockaddr, len)
			.ok_or_else(|| SocketError::InvalidAddress { reason: "invalid address" }.into())
	}
}

//! One-call constructors for Unix-domain stream sockets.
//!
//! The general path is RawSocket → bind/connect → listen/accept; for the
//! everyday case of "a stream socket on this filesystem path" these two
//! functions do the whole dance.

use crate::addr::{Unix, UnixAddr};
use crate::socket::{ConnectedStream, Listener, RawSocket, Stream};

/// Creates a stream socket connected to the given filesystem path.
///
/// Fails with whatever the underlying socket()/connect() step reports —
/// typically ConnectionRefused when nothing is listening there. A path
/// too long for sun_path is rejected, not truncated.
pub fn client<P: AsRef<[u8]>>(path: P) -> std::io::Result<ConnectedStream<Unix>> {
	let addr = UnixAddr::new(path);

	RawSocket::<Unix, Stream>::new()?.connect(addr)
}

/// Creates a stream socket bound to the given filesystem path and
/// listening with the given backlog.
///
/// The socket file is created by bind() and is NOT removed on drop;
/// unlink it yourself before rebinding, or bind() fails with
/// AddrInUse even after the listener is gone.
pub fn server<P: AsRef<[u8]>>(path: P, backlog: i32) -> std::io::Result<Listener<Unix>> {
	let addr = UnixAddr::new(path);

	RawSocket::<Unix, Stream>::new()?
		.bind(addr)?
		.listen(backlog)
}

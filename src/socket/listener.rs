use crate::addr::{Domain, FromSockAddr};
use crate::socket::{Stream, bound::BoundSocket, sock_name};
use crate::error::{SocketError, errno};
use crate::fd;
use super::stream::ConnectedStream;
use std::{marker::PhantomData, os::fd::OwnedFd};

/// A listening socket ready to accept connections.
///
/// Only exists for Stream sockets — you cannot listen on datagrams.
/// The type parameter D tracks which address family (Ipv4, Ipv6, Unix).
pub struct Listener<D: Domain> {
    fd: OwnedFd,
    _marker: PhantomData<D>,
}

impl<D: Domain> Listener<D> {
    /// Creates a Listener from an OwnedFd.
    ///
    /// Internal use only — called by BoundSocket::listen()
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

    /// Accepts an incoming connection.
    ///
    /// With a blocking listener this suspends the calling thread until a
    /// peer connects; the returned socket has completed its handshake and
    /// is ready for read/write.
    ///
    /// With a non-blocking listener there is no special handling: the
    /// kernel's EAGAIN comes back as a WouldBlock error and retrying
    /// (or waiting on epoll) is the caller's responsibility. The same
    /// goes for EINTR.
    pub fn accept(&self) -> std::io::Result<ConnectedStream<D>> {
        use std::os::fd::FromRawFd;
        let fd = unsafe {
            libc::accept4(
                self.as_raw_fd(),
                std::ptr::null_mut(),    // We don't need client address
                std::ptr::null_mut(),    // No address length
                libc::SOCK_CLOEXEC,      // Close on exec
            )
        };

        if fd == -1 {
            return Err(SocketError::Accept { errno: errno() }.into());
        }

        let fd = unsafe { OwnedFd::from_raw_fd(fd) };
        Ok(ConnectedStream::from_fd(fd))
    }

    /// Sets or clears the `O_NONBLOCK` flag on the listener socket.
    ///
    /// Blocking behavior is a property of the kernel object, not of this
    /// wrapper — a duplicate of this socket sees the same flag.
    pub fn set_nonblocking(&self, nonblocking: bool) -> std::io::Result<()> {
        fd::set_nonblocking_fd(self.as_raw_fd(), nonblocking)
    }

    /// Creates a second independently-owned listener for the same
    /// kernel endpoint.
    ///
    /// Both accept from the same queue; closing one leaves the other
    /// fully usable.
    pub fn duplicate(&self) -> std::io::Result<Self> {
        Ok(Self {
            fd: fd::duplicate_fd(self.as_raw_fd())?,
            _marker: PhantomData,
        })
    }

    /// Repoints this listener's descriptor number at `other`'s kernel
    /// object. See `Fd::replace_with` for the exact contract.
    pub fn replace_with<F: std::os::fd::AsRawFd>(&self, other: &F) -> std::io::Result<()> {
        fd::replace_fd(other.as_raw_fd(), self.as_raw_fd())
    }
}

impl<D: Domain> Listener<D>
where
    D::Addr: FromSockAddr,
{
    /// Accepts a connection, returning the client's address.
    ///
    /// Use this when you need to know who connected (logging, rate limiting, etc.).
    pub fn accept_with_addr(&self) -> std::io::Result<(ConnectedStream<D>, D::Addr)> {
        use std::os::fd::FromRawFd;
        let mut storage: libc::sockaddr_storage = unsafe { std::mem::zeroed() };
        let mut len = std::mem::size_of::<libc::sockaddr_storage>() as libc::socklen_t;

        let fd = unsafe {
            libc::accept4(
                self.as_raw_fd(),
                &mut storage as *mut _ as *mut libc::sockaddr,
                &mut len,
                libc::SOCK_CLOEXEC,
            )
        };

        if fd == -1 {
            return Err(SocketError::Accept { errno: errno() }.into());
        }

        let fd = unsafe { OwnedFd::from_raw_fd(fd) };
        let stream = ConnectedStream::from_fd(fd);

        let addr = unsafe {
            D::Addr::from_sockaddr(&storage as *const _ as *const libc::sockaddr, len)
                .ok_or_else(|| SocketError::InvalidAddress {
                    reason: "invalid client address",
                })?
        };

        Ok((stream, addr))
    }

    /// Returns the address this listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<D::Addr> {
        sock_name(self.as_raw_fd())
    }
}

impl<D: Domain> std::os::fd::AsRawFd for Listener<D> {
    fn as_raw_fd(&self) -> std::os::fd::RawFd {
        self.fd.as_raw_fd()
    }
}

impl<D: Domain> std::os::fd::AsFd for Listener<D> {
    fn as_fd(&self) -> std::os::fd::BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

impl<D: Domain> std::os::fd::FromRawFd for Listener<D> {
    unsafe fn from_raw_fd(fd: std::os::fd::RawFd) -> Self {
        unsafe { Self::from_fd(OwnedFd::from_raw_fd(fd)) }
    }
}

impl<D: Domain> std::os::fd::IntoRawFd for Listener<D> {
    fn into_raw_fd(self) -> std::os::fd::RawFd {
        self.fd.into_raw_fd()
    }
}

impl<D: Domain> BoundSocket<D, Stream> {
    /// Transitions to a listening socket.
    ///
    /// `backlog` — maximum pending connections queue size.
    /// Typical values: 128 for small services, 4096+ for high-traffic servers.
    ///
    /// Consumes self — you cannot use BoundSocket after this.
    /// Returns Listener<D> ready for accept().
    pub fn listen(self, backlog: i32) -> std::io::Result<Listener<D>> {
        let result = unsafe {
            libc::listen(self.as_raw_fd(), backlog)
        };

        if result == -1 {
            return Err(SocketError::Listen { errno: errno(), backlog }.into());
        }

        // Extract the fd from self without running Drop
        let fd = self.into_fd();

        Ok(Listener::from_fd(fd))
    }
}

pub mod socket;
pub mod unix_socket;
mod addr;
mod epoll;
mod error;
mod fd;
mod memfd;

pub use self::error::{EpollError, FdError, IoError, SocketError, errno};
pub use self::addr::{Domain, Ipv4, Ipv6, Unix, SocketAddrV4, SocketAddrV6, UnixAddr,
					 ToSockAddr, FromSockAddr};
pub use self::fd::Fd;
pub use self::socket::{Shutdown, SockType, Stream, Datagram,
					   RawSocket, BoundSocket, Listener, ConnectedStream,
					   BoundDatagram, ConnectedDatagram};
pub use self::socket::{getsockopt_raw, setsockopt_raw, getsockopt_int, setsockopt_int,
					   set_reuse_addr, set_reuse_port, set_keepalive, set_linger,
					   set_recv_buffer_size, set_send_buffer_size,
					   send_fd, recv_fd};
pub use self::memfd::{MemFd, MEMFD_ALLOW_SEALING, MEMFD_HUGETLB};
pub use self::epoll::{Epoll, Event, EventData,
					  EVENT_IN, EVENT_OUT, EVENT_PRI, EVENT_ERR, EVENT_HUP,
					  EVENT_RDHUP, EVENT_ET, EVENT_ONESHOT};

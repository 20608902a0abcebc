/// Socket creation/configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum SocketError {
    #[error("socket() failed: {}", errno_to_str(*.errno))]
    Create { errno: i32 },

    #[error("bind({addr}) failed: {}", errno_to_str(*.errno))]
    Bind { errno: i32, addr: String },

    #[error("listen(backlog={backlog}) failed: {}", errno_to_str(*.errno))]
    Listen { errno: i32, backlog: i32 },

    #[error("connect({addr}) failed: {}", errno_to_str(*.errno))]
    Connect { errno: i32, addr: String },

    #[error("accept() failed: {}", errno_to_str(*.errno))]
    Accept { errno: i32 },

    #[error("shutdown() failed: {}", errno_to_str(*.errno))]
    Shutdown { errno: i32 },

    #[error("setsockopt({option}) failed: {}", errno_to_str(*.errno))]
    SetOption { errno: i32, option: &'static str },

    #[error("getsockopt({option}) failed: {}", errno_to_str(*.errno))]
    GetOption { errno: i32, option: &'static str },

    #[error("getsockopt({option}) returned a value of size {len}, expected {}", std::mem::size_of::<libc::c_int>())]
    OptionSize { option: &'static str, len: u32 },

    #[error("invalid address: {reason}")]
    InvalidAddress { reason: &'static str },
}

/// I/O operation errors.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("read() failed: {}", errno_to_str(*.errno))]
    Read { errno: i32 },

    #[error("write() failed: {}", errno_to_str(*.errno))]
    Write { errno: i32 },

    #[error("connection closed by peer")]
    ConnectionClosed,

    #[error("operation would block")]
    WouldBlock,

    #[error("interrupted by signal")]
    Interrupted,
}

/// Descriptor lifecycle errors.
#[derive(Debug, thiserror::Error)]
pub enum FdError {
    #[error("dup() failed: {}", errno_to_str(*.errno))]
    Dup { errno: i32 },

    #[error("dup2() failed: {}", errno_to_str(*.errno))]
    Rebind { errno: i32 },

    #[error("fcntl({op}) failed: {}", errno_to_str(*.errno))]
    Fcntl { errno: i32, op: &'static str },

    #[error("descriptor value {fd} is not usable")]
    BadDescriptor { fd: i32 },

    #[error("memfd_create({name}) failed: {}", errno_to_str(*.errno))]
    MemfdCreate { errno: i32, name: String },

    #[error("ftruncate({size}) failed: {}", errno_to_str(*.errno))]
    Truncate { errno: i32, size: u64 },

    #[error("fstat() failed: {}", errno_to_str(*.errno))]
    Stat { errno: i32 },

    #[error("memfd name contains an interior NUL byte")]
    InvalidName,
}

/// Epoll registration/wait errors.
#[derive(Debug, thiserror::Error)]
pub enum EpollError {
    #[error("epoll_create1() failed: {}", errno_to_str(*.errno))]
    Create { errno: i32 },

    #[error("epoll_ctl({op}, fd={fd}) failed: {}", errno_to_str(*.errno))]
    Ctl { errno: i32, op: &'static str, fd: i32 },

    #[error("epoll_wait() failed: {}", errno_to_str(*.errno))]
    Wait { errno: i32 },
}

/// Returns current errno value.
#[inline]
pub fn errno() -> i32 {
    unsafe { *libc::__errno_location() }
}

/// Converts errno to human-readable string.
fn errno_to_str(errno: i32) -> String {
    match errno {
        libc::EACCES => "permission denied".into(),
        libc::EADDRINUSE => "address already in use".into(),
        libc::EADDRNOTAVAIL => "address not available".into(),
        libc::EAFNOSUPPORT => "address family not supported".into(),
        libc::EAGAIN => "resource temporarily unavailable".into(),
        libc::EBADF => "bad file descriptor".into(),
        libc::ECONNREFUSED => "connection refused".into(),
        libc::ECONNRESET => "connection reset by peer".into(),
        libc::EEXIST => "already exists".into(),
        libc::EINPROGRESS => "operation in progress".into(),
        libc::EINTR => "interrupted by signal".into(),
        libc::EINVAL => "invalid argument".into(),
        libc::EMFILE => "too many open files".into(),
        libc::ENETUNREACH => "network unreachable".into(),
        libc::ENOBUFS => "no buffer space available".into(),
        libc::ENOENT => "no such entry".into(),
        libc::ENOTCONN => "not connected".into(),
        libc::EPIPE => "broken pipe".into(),
        libc::ETIMEDOUT => "connection timed out".into(),
        _ => format!("errno {}", errno),
    }
}

/// Maps errno to std::io::ErrorKind.
fn errno_to_kind(errno: i32) -> std::io::ErrorKind {
    match errno {
        libc::EACCES | libc::EPERM => std::io::ErrorKind::PermissionDenied,
        libc::EADDRINUSE => std::io::ErrorKind::AddrInUse,
        libc::EADDRNOTAVAIL => std::io::ErrorKind::AddrNotAvailable,
        libc::EAGAIN | libc::EWOULDBLOCK => std::io::ErrorKind::WouldBlock,
        libc::ECONNREFUSED => std::io::ErrorKind::ConnectionRefused,
        libc::ECONNRESET => std::io::ErrorKind::ConnectionReset,
        libc::EEXIST => std::io::ErrorKind::AlreadyExists,
        libc::EINTR => std::io::ErrorKind::Interrupted,
        libc::EINVAL => std::io::ErrorKind::InvalidInput,
        libc::ENOENT => std::io::ErrorKind::NotFound,
        libc::ENOTCONN => std::io::ErrorKind::NotConnected,
        libc::EPIPE => std::io::ErrorKind::BrokenPipe,
        libc::ETIMEDOUT => std::io::ErrorKind::TimedOut,
        _ => std::io::ErrorKind::Other,
    }
}

impl From<SocketError> for std::io::Error {
    fn from(err: SocketError) -> Self {
        let errno = match &err {
            SocketError::Create { errno } => *errno,
            SocketError::Bind { errno, .. } => *errno,
            SocketError::Listen { errno, .. } => *errno,
            SocketError::Connect { errno, .. } => *errno,
            SocketError::Accept { errno } => *errno,
            SocketError::Shutdown { errno } => *errno,
            SocketError::SetOption { errno, .. } => *errno,
            SocketError::GetOption { errno, .. } => *errno,
            SocketError::OptionSize { .. } => libc::EINVAL,
            SocketError::InvalidAddress { .. } => libc::EINVAL,
        };
        std::io::Error::new(errno_to_kind(errno), err)
    }
}

impl From<IoError> for std::io::Error {
    fn from(err: IoError) -> Self {
        let kind = match &err {
            IoError::Read { errno } => errno_to_kind(*errno),
            IoError::Write { errno } => errno_to_kind(*errno),
            IoError::ConnectionClosed => std::io::ErrorKind::ConnectionReset,
            IoError::WouldBlock => std::io::ErrorKind::WouldBlock,
            IoError::Interrupted => std::io::ErrorKind::Interrupted,
        };
        std::io::Error::new(kind, err)
    }
}

impl From<FdError> for std::io::Error {
    fn from(err: FdError) -> Self {
        let errno = match &err {
            FdError::Dup { errno } => *errno,
            FdError::Rebind { errno } => *errno,
            FdError::Fcntl { errno, .. } => *errno,
            FdError::BadDescriptor { .. } => libc::EBADF,
            FdError::MemfdCreate { errno, .. } => *errno,
            FdError::Truncate { errno, .. } => *errno,
            FdError::Stat { errno } => *errno,
            FdError::InvalidName => libc::EINVAL,
        };
        std::io::Error::new(errno_to_kind(errno), err)
    }
}

impl From<EpollError> for std::io::Error {
    fn from(err: EpollError) -> Self {
        let errno = match &err {
            EpollError::Create { errno } => *errno,
            EpollError::Ctl { errno, .. } => *errno,
            EpollError::Wait { errno } => *errno,
        };
        std::io::Error::new(errno_to_kind(errno), err)
    }
}

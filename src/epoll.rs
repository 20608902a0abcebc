use std::os::fd::{AsRawFd, FromRawFd, IntoRawFd, OwnedFd, RawFd};
use crate::error::{EpollError, errno};
use crate::fd;

/// Readiness mask bits for registration and for reported events.
pub const EVENT_IN: u32 = libc::EPOLLIN as u32;
pub const EVENT_OUT: u32 = libc::EPOLLOUT as u32;
pub const EVENT_PRI: u32 = libc::EPOLLPRI as u32;
pub const EVENT_ERR: u32 = libc::EPOLLERR as u32;
pub const EVENT_HUP: u32 = libc::EPOLLHUP as u32;
pub const EVENT_RDHUP: u32 = libc::EPOLLRDHUP as u32;
pub const EVENT_ET: u32 = libc::EPOLLET as u32;
pub const EVENT_ONESHOT: u32 = libc::EPOLLONESHOT as u32;

/// Opaque per-registration payload.
///
/// The kernel stores 64 bits per watched descriptor and hands them back
/// untouched with every ready event. What those bits mean is entirely up
/// to you — an fd, an index into a table, a pointer you cast yourself.
/// One payload type covers all of those; pick the accessor matching the
/// constructor you used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventData(u64);

impl EventData {
	pub const fn from_u64(value: u64) -> Self {
		Self(value)
	}

	pub const fn from_u32(value: u32) -> Self {
		Self(value as u64)
	}

	/// Stores a descriptor number — the most common payload by far.
	pub const fn from_fd(fd: RawFd) -> Self {
		Self(fd as u64)
	}

	pub fn from_ptr<T>(ptr: *mut T) -> Self {
		Self(ptr as u64)
	}

	pub const fn as_u64(&self) -> u64 {
		self.0
	}

	pub const fn as_u32(&self) -> u32 {
		self.0 as u32
	}

	pub const fn as_fd(&self) -> RawFd {
		self.0 as RawFd
	}

	pub fn as_ptr<T>(&self) -> *mut T {
		self.0 as *mut T
	}
}

/// A single readiness event, as filled in by `wait()`.
///
/// Layout-compatible with the kernel's epoll_event, so a slice of these
/// is handed to the syscall directly.
#[repr(transparent)]
#[derive(Clone, Copy)]
pub struct Event(libc::epoll_event);

impl Event {
	/// An empty slot for the wait buffer.
	pub const fn empty() -> Self {
		Self(libc::epoll_event { events: 0, data: libc::epoll_data { u64: 0 } })
	}

	/// The readiness bits the kernel reported (EVENT_IN | ...).
	pub fn events(&self) -> u32 {
		self.0.events
	}

	/// The payload supplied at registration.
	pub fn data(&self) -> EventData {
		EventData(unsafe { self.0.data.u64 })
	}

	pub fn is_readable(&self) -> bool {
		self.events() & EVENT_IN != 0
	}

	pub fn is_writable(&self) -> bool {
		self.events() & EVENT_OUT != 0
	}

	pub fn is_error(&self) -> bool {
		self.events() & EVENT_ERR != 0
	}

	pub fn is_hangup(&self) -> bool {
		self.events() & (EVENT_HUP | EVENT_RDHUP) != 0
	}
}

impl Default for Event {
	fn default() -> Self {
		Self::empty()
	}
}

/// A readiness multiplexer over a set of watched descriptors.
///
/// The instance is itself a descriptor; registrations are
/// (descriptor, mask, payload) triples held by the kernel. Registering
/// does NOT transfer ownership — the watched descriptor must outlive
/// its registration or be removed first, otherwise the kernel drops
/// the registration silently when the last descriptor for that object
/// closes.
pub struct Epoll {
	fd: OwnedFd,
}

impl Epoll {
	/// Creates a new epoll instance with close-on-exec set.
	pub fn new() -> std::io::Result<Self> {
		Self::with_flags(libc::EPOLL_CLOEXEC)
	}

	/// Creates a new epoll instance with explicit creation flags.
	pub fn with_flags(flags: libc::c_int) -> std::io::Result<Self> {
		let fd = unsafe { libc::epoll_create1(flags) };

		if fd == -1 {
			return Err(EpollError::Create { errno: errno() }.into());
		}

		Ok(Self { fd: unsafe { OwnedFd::from_raw_fd(fd) } })
	}

	/// Returns the raw file descriptor.
	#[inline]
	pub fn as_raw_fd(&self) -> libc::c_int {
		self.fd.as_raw_fd()
	}

	/// Starts watching a descriptor.
	///
	/// Each descriptor can be registered once per instance; a second
	/// add for the same one fails with EEXIST (AlreadyExists). That is
	/// the kernel talking — it is not retried or masked here.
	pub fn add<F: AsRawFd>(&self, fd: &F, events: u32, data: EventData) -> std::io::Result<()> {
		let mut ev = libc::epoll_event { events, data: libc::epoll_data { u64: data.as_u64() } };
		self.ctl_raw(libc::EPOLL_CTL_ADD, "EPOLL_CTL_ADD", fd.as_raw_fd(), &mut ev)
	}

	/// Changes the mask or payload of a watched descriptor.
	///
	/// Fails with ENOENT (NotFound) if the descriptor was never added.
	pub fn modify<F: AsRawFd>(&self, fd: &F, events: u32, data: EventData) -> std::io::Result<()> {
		let mut ev = libc::epoll_event { events, data: libc::epoll_data { u64: data.as_u64() } };
		self.ctl_raw(libc::EPOLL_CTL_MOD, "EPOLL_CTL_MOD", fd.as_raw_fd(), &mut ev)
	}

	/// Stops watching a descriptor.
	///
	/// Fails with ENOENT (NotFound) if it was not registered.
	pub fn remove<F: AsRawFd>(&self, fd: &F) -> std::io::Result<()> {
		let result = unsafe {
			libc::epoll_ctl(
				self.as_raw_fd(),
				libc::EPOLL_CTL_DEL,
				fd.as_raw_fd(),
				std::ptr::null_mut(),
			)
		};

		if result == -1 {
			return Err(EpollError::Ctl {
				errno: errno(),
				op: "EPOLL_CTL_DEL",
				fd: fd.as_raw_fd(),
			}.into());
		}

		Ok(())
	}

	/// Raw registration-control call for ops the typed forms don't cover.
	pub fn ctl(&self, op: libc::c_int, fd: RawFd, event: Option<&mut Event>) -> std::io::Result<()> {
		let ptr = match event {
			Some(ev) => &mut ev.0 as *mut libc::epoll_event,
			None => std::ptr::null_mut(),
		};

		let result = unsafe { libc::epoll_ctl(self.as_raw_fd(), op, fd, ptr) };

		if result == -1 {
			return Err(EpollError::Ctl { errno: errno(), op: "epoll_ctl", fd }.into());
		}

		Ok(())
	}

	fn ctl_raw(
		&self,
		op: libc::c_int,
		op_name: &'static str,
		fd: RawFd,
		event: &mut libc::epoll_event,
	) -> std::io::Result<()> {
		let result = unsafe { libc::epoll_ctl(self.as_raw_fd(), op, fd, event) };

		if result == -1 {
			return Err(EpollError::Ctl { errno: errno(), op: op_name, fd }.into());
		}

		Ok(())
	}

	/// Waits until at least one watched descriptor is ready or the
	/// timeout elapses.
	///
	/// Fills `events` from the front and returns the ready count.
	/// A timeout of 0 polls, -1 waits forever. A signal arriving during
	/// the wait surfaces as an EINTR error — retrying is the caller's
	/// call, not this crate's.
	pub fn wait(&self, events: &mut [Event], timeout_ms: i32) -> std::io::Result<usize> {
		let n = unsafe {
			libc::epoll_wait(
				self.as_raw_fd(),
				events.as_mut_ptr() as *mut libc::epoll_event,
				events.len() as libc::c_int,
				timeout_ms,
			)
		};

		if n == -1 {
			Err(EpollError::Wait { errno: errno() }.into())
		} else {
			Ok(n as usize)
		}
	}

	/// Like `wait()`, but atomically swaps in a signal mask for the
	/// duration of the call.
	///
	/// Closes the race between unblocking a signal and starting the
	/// wait — the signal can only be delivered while the kernel is
	/// actually waiting.
	pub fn pwait(
		&self,
		events: &mut [Event],
		timeout_ms: i32,
		sigmask: &libc::sigset_t,
	) -> std::io::Result<usize> {
		let n = unsafe {
			libc::epoll_pwait(
				self.as_raw_fd(),
				events.as_mut_ptr() as *mut libc::epoll_event,
				events.len() as libc::c_int,
				timeout_ms,
				sigmask,
			)
		};

		if n == -1 {
			Err(EpollError::Wait { errno: errno() }.into())
		} else {
			Ok(n as usize)
		}
	}

	/// Creates a second independently-owned descriptor for the same
	/// epoll instance.
	///
	/// Both see the same registration set; closing one leaves the
	/// other fully usable.
	pub fn duplicate(&self) -> std::io::Result<Self> {
		Ok(Self { fd: fd::duplicate_fd(self.as_raw_fd())? })
	}

	/// Repoints this descriptor number at `other`'s kernel object.
	/// See `Fd::replace_with` for the exact contract.
	pub fn replace_with<F: AsRawFd>(&self, other: &F) -> std::io::Result<()> {
		fd::replace_fd(other.as_raw_fd(), self.as_raw_fd())
	}
}

impl From<OwnedFd> for Epoll {
	fn from(fd: OwnedFd) -> Self {
		Self { fd }
	}
}

impl std::os::fd::AsRawFd for Epoll {
	fn as_raw_fd(&self) -> RawFd {
		self.fd.as_raw_fd()
	}
}

impl std::os::fd::AsFd for Epoll {
	fn as_fd(&self) -> std::os::fd::BorrowedFd<'_> {
		self.fd.as_fd()
	}
}

impl FromRawFd for Epoll {
	unsafe fn from_raw_fd(fd: RawFd) -> Self {
		unsafe { Self { fd: OwnedFd::from_raw_fd(fd) } }
	}
}

impl IntoRawFd for Epoll {
	fn into_raw_fd(self) -> RawFd {
		self.fd.into_raw_fd()
	}
}

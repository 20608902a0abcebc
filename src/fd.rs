use std::os::fd::{AsRawFd, FromRawFd, IntoRawFd, OwnedFd, RawFd};
use crate::error::{FdError, IoError, errno};

// Every wrapper in this crate funnels its descriptor plumbing through the
// helpers below. The wrappers differ in which syscalls they forward; the
// dup/dup2/fcntl/read/write contract is the same for all of them.

/// Duplicates a raw descriptor via `dup()`.
///
/// The new descriptor refers to the same kernel object but is owned
/// independently — closing one does not affect the other.
pub(crate) fn duplicate_fd(fd: libc::c_int) -> std::io::Result<OwnedFd> {
	let new_fd = unsafe { libc::dup(fd) };

	if new_fd == -1 {
		return Err(FdError::Dup { errno: errno() }.into());
	}

	Ok(unsafe { OwnedFd::from_raw_fd(new_fd) })
}

/// Repoints `dst` at the kernel object behind `src` via `dup2()`.
///
/// After this call the descriptor *number* `dst` refers to `src`'s kernel
/// object. The previous object behind `dst` is released by the kernel.
/// Neither wrapper changes its number.
pub(crate) fn replace_fd(src: libc::c_int, dst: libc::c_int) -> std::io::Result<()> {
	let result = unsafe { libc::dup2(src, dst) };

	if result == -1 {
		return Err(FdError::Rebind { errno: errno() }.into());
	}

	Ok(())
}

/// Sets or clears `O_NONBLOCK` on a raw descriptor.
pub(crate) fn set_nonblocking_fd(fd: libc::c_int, nonblocking: bool) -> std::io::Result<()> {
	let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
	if flags == -1 {
		return Err(FdError::Fcntl { errno: errno(), op: "F_GETFL" }.into());
	}

	let new_flags = if nonblocking {
		flags | libc::O_NONBLOCK
	} else {
		flags & !libc::O_NONBLOCK
	};

	let result = unsafe { libc::fcntl(fd, libc::F_SETFL, new_flags) };
	if result == -1 {
		return Err(FdError::Fcntl { errno: errno(), op: "F_SETFL" }.into());
	}

	Ok(())
}

pub(crate) fn read_fd(fd: libc::c_int, buf: &mut [u8]) -> std::io::Result<usize> {
	let n = unsafe {
		libc::read(
			fd,
			buf.as_mut_ptr() as *mut libc::c_void,
			buf.len(),
		)
	};

	if n == -1 {
		Err(IoError::Read { errno: errno() }.into())
	} else {
		Ok(n as usize)
	}
}

pub(crate) fn write_fd(fd: libc::c_int, buf: &[u8]) -> std::io::Result<usize> {
	let n = unsafe {
		libc::write(
			fd,
			buf.as_ptr() as *const libc::c_void,
			buf.len(),
		)
	};

	if n == -1 {
		Err(IoError::Write { errno: errno() }.into())
	} else {
		Ok(n as usize)
	}
}

/// A generic owned descriptor.
///
/// Wraps exactly one open descriptor and closes it exactly once on drop.
/// Ownership transfers by move; `duplicate()` is the only way to get a
/// second independently-owned handle to the same kernel object.
///
/// Use this for descriptors that don't fit a more specific wrapper
/// (pipes, inherited fds, whatever a foreign API hands you). Sockets,
/// memfds and epoll instances have their own types.
pub struct Fd {
	fd: OwnedFd,
}

impl Fd {
	/// Takes ownership of an already-open raw descriptor, rejecting
	/// sentinel values.
	///
	/// A negative value fails with `BadDescriptor` instead of producing
	/// a wrapper that would close garbage on drop.
	///
	/// # Safety
	/// `fd` must be open and not owned by anything else — this wrapper
	/// will close it.
	pub unsafe fn try_from_raw(fd: RawFd) -> std::io::Result<Self> {
		if fd < 0 {
			return Err(FdError::BadDescriptor { fd }.into());
		}

		Ok(Self { fd: unsafe { OwnedFd::from_raw_fd(fd) } })
	}

	/// Returns the raw file descriptor.
	#[inline]
	pub fn as_raw_fd(&self) -> libc::c_int {
		self.fd.as_raw_fd()
	}

	pub fn read(&self, buf: &mut [u8]) -> std::io::Result<usize> {
		read_fd(self.as_raw_fd(), buf)
	}

	pub fn write(&self, buf: &[u8]) -> std::io::Result<usize> {
		write_fd(self.as_raw_fd(), buf)
	}

	/// Creates a second independently-owned descriptor for the same
	/// kernel object.
	pub fn duplicate(&self) -> std::io::Result<Fd> {
		Ok(Self { fd: duplicate_fd(self.as_raw_fd())? })
	}

	/// Repoints this descriptor number at `other`'s kernel object.
	///
	/// This mutates what the *existing* number refers to — it does not
	/// rebind the wrapper to a new number. `other` stays valid and
	/// independently closable.
	pub fn replace_with<F: std::os::fd::AsRawFd>(&self, other: &F) -> std::io::Result<()> {
		replace_fd(other.as_raw_fd(), self.as_raw_fd())
	}

	pub fn set_nonblocking(&self, nonblocking: bool) -> std::io::Result<()> {
		set_nonblocking_fd(self.as_raw_fd(), nonblocking)
	}
}

impl From<OwnedFd> for Fd {
	fn from(fd: OwnedFd) -> Self {
		Self { fd }
	}
}

impl From<Fd> for OwnedFd {
	fn from(fd: Fd) -> Self {
		fd.fd
	}
}

impl std::os::fd::AsRawFd for Fd {
	fn as_raw_fd(&self) -> RawFd {
		self.fd.as_raw_fd()
	}
}

impl std::os::fd::AsFd for Fd {
	fn as_fd(&self) -> std::os::fd::BorrowedFd<'_> {
		self.fd.as_fd()
	}
}

impl FromRawFd for Fd {
	unsafe fn from_raw_fd(fd: RawFd) -> Self {
		unsafe { Self { fd: OwnedFd::from_raw_fd(fd) } }
	}
}

impl IntoRawFd for Fd {
	fn into_raw_fd(self) -> RawFd {
		self.fd.into_raw_fd()
	}
}

impl std::io::Read for Fd {
	fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
		Fd::read(self, buf)
	}
}

impl std::io::Write for Fd {
	fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
		Fd::write(self, buf)
	}

	fn flush(&mut self) -> std::io::Result<()> {
		Ok(())
	}
}

use std::ffi::CString;
use std::os::fd::{AsRawFd, FromRawFd, IntoRawFd, OwnedFd, RawFd};
use crate::error::{FdError, IoError, errno};
use crate::fd;

/// Allows fcntl() sealing operations on the file.
pub const MEMFD_ALLOW_SEALING: libc::c_uint = libc::MFD_ALLOW_SEALING;
/// Backs the file with huge pages.
pub const MEMFD_HUGETLB: libc::c_uint = libc::MFD_HUGETLB;

/// An anonymous memory-backed file.
///
/// Behaves like a regular file (read/write/truncate/stat) but lives
/// entirely in memory and has no filesystem entry. The name only shows
/// up in /proc/self/fd for debugging; two memfds may share a name.
///
/// Useful for shared-memory setups: create, size with `ftruncate()`,
/// then hand the descriptor to another process over a Unix socket.
#[derive(Debug)]
pub struct MemFd {
	fd: OwnedFd,
}

impl MemFd {
	/// Creates a new memfd with close-on-exec set.
	pub fn create(name: &str) -> std::io::Result<Self> {
		Self::create_with_flags(name, libc::MFD_CLOEXEC)
	}

	/// Creates a new memfd with explicit flags.
	///
	/// Combine `MFD_CLOEXEC` with `MEMFD_ALLOW_SEALING` or
	/// `MEMFD_HUGETLB` as needed.
	pub fn create_with_flags(name: &str, flags: libc::c_uint) -> std::io::Result<Self> {
		let c_name = CString::new(name).map_err(|_| FdError::InvalidName)?;

		let fd = unsafe { libc::memfd_create(c_name.as_ptr(), flags) };

		if fd == -1 {
			return Err(FdError::MemfdCreate {
				errno: errno(),
				name: name.to_string(),
			}.into());
		}

		Ok(Self { fd: unsafe { OwnedFd::from_raw_fd(fd) } })
	}

	/// Returns the raw file descriptor.
	#[inline]
	pub fn as_raw_fd(&self) -> libc::c_int {
		self.fd.as_raw_fd()
	}

	/// Resizes the backing storage.
	///
	/// Growing fills with zeroes; shrinking discards the tail. A fresh
	/// memfd has size 0, so this is almost always the first call.
	pub fn ftruncate(&self, size: u64) -> std::io::Result<()> {
		let result = unsafe { libc::ftruncate(self.as_raw_fd(), size as libc::off_t) };

		if result == -1 {
			return Err(FdError::Truncate { errno: errno(), size }.into());
		}

		Ok(())
	}

	/// Returns the file status (size, mode, ...).
	pub fn stat(&self) -> std::io::Result<libc::stat> {
		let mut st: libc::stat = unsafe { std::mem::zeroed() };

		let result = unsafe { libc::fstat(self.as_raw_fd(), &mut st) };

		if result == -1 {
			return Err(FdError::Stat { errno: errno() }.into());
		}

		Ok(st)
	}

	/// Returns the current size of the backing storage.
	pub fn len(&self) -> std::io::Result<u64> {
		Ok(self.stat()?.st_size as u64)
	}

	pub fn is_empty(&self) -> std::io::Result<bool> {
		Ok(self.len()? == 0)
	}

	/// Reads at the shared file offset.
	///
	/// The offset lives in the kernel's file description, so a
	/// duplicate of this memfd advances the same offset.
	pub fn read(&self, buf: &mut [u8]) -> std::io::Result<usize> {
		fd::read_fd(self.as_raw_fd(), buf)
	}

	/// Writes at the shared file offset.
	pub fn write(&self, buf: &[u8]) -> std::io::Result<usize> {
		fd::write_fd(self.as_raw_fd(), buf)
	}

	/// Reads at an explicit offset, leaving the file offset untouched.
	pub fn pread(&self, buf: &mut [u8], offset: u64) -> std::io::Result<usize> {
		let n = unsafe {
			libc::pread(
				self.as_raw_fd(),
				buf.as_mut_ptr() as *mut libc::c_void,
				buf.len(),
				offset as libc::off_t,
			)
		};

		if n == -1 {
			Err(IoError::Read { errno: errno() }.into())
		} else {
			Ok(n as usize)
		}
	}

	/// Writes at an explicit offset, leaving the file offset untouched.
	pub fn pwrite(&self, buf: &[u8], offset: u64) -> std::io::Result<usize> {
		let n = unsafe {
			libc::pwrite(
				self.as_raw_fd(),
				buf.as_ptr() as *const libc::c_void,
				buf.len(),
				offset as libc::off_t,
			)
		};

		if n == -1 {
			Err(IoError::Write { errno: errno() }.into())
		} else {
			Ok(n as usize)
		}
	}

	/// Creates a second independently-owned descriptor for the same
	/// memory file.
	///
	/// Both see the same contents and the same size; closing one does
	/// not release the memory while the other lives.
	pub fn duplicate(&self) -> std::io::Result<Self> {
		Ok(Self { fd: fd::duplicate_fd(self.as_raw_fd())? })
	}

	/// Repoints this descriptor number at `other`'s kernel object.
	/// See `Fd::replace_with` for the exact contract.
	pub fn replace_with<F: std::os::fd::AsRawFd>(&self, other: &F) -> std::io::Result<()> {
		fd::replace_fd(other.as_raw_fd(), self.as_raw_fd())
	}
}

impl From<OwnedFd> for MemFd {
	fn from(fd: OwnedFd) -> Self {
		Self { fd }
	}
}

impl std::os::fd::AsRawFd for MemFd {
	fn as_raw_fd(&self) -> RawFd {
		self.fd.as_raw_fd()
	}
}

impl std::os::fd::AsFd for MemFd {
	fn as_fd(&self) -> std::os::fd::BorrowedFd<'_> {
		self.fd.as_fd()
	}
}

impl FromRawFd for MemFd {
	unsafe fn from_raw_fd(fd: RawFd) -> Self {
		unsafe { Self { fd: OwnedFd::from_raw_fd(fd) } }
	}
}

impl IntoRawFd for MemFd {
	fn into_raw_fd(self) -> RawFd {
		self.fd.into_raw_fd()
	}
}

impl std::io::Read for MemFd {
	fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
		MemFd::read(self, buf)
	}
}

impl std::io::Write for MemFd {
	fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
		MemFd::write(self, buf)
	}

	fn flush(&mut self) -> std::io::Result<()> {
		Ok(())
	}
}

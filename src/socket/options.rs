use std::os::fd::FromRawFd;
use std::os::fd::OwnedFd;
use std::os::fd::RawFd;
use std::os::fd::AsRawFd;
use crate::error::{SocketError, IoError, errno};

/// Reads a socket option into a caller-supplied buffer.
///
/// Returns the number of bytes the kernel actually wrote, which may be
/// less than the buffer size. This is the raw form — use
/// `getsockopt_int` for the common integer options.
pub fn getsockopt_raw<S: AsRawFd>(
	socket: &S,
	level: libc::c_int,
	name: libc::c_int,
	buf: &mut [u8],
) -> std::io::Result<usize> {
	let mut len = buf.len() as libc::socklen_t;

	let result = unsafe {
		libc::getsockopt(
			socket.as_raw_fd(),
			level,
			name,
			buf.as_mut_ptr() as *mut libc::c_void,
			&mut len,
		)
	};

	if result == -1 {
		Err(SocketError::GetOption { errno: errno(), option: "socket option" }.into())
	} else {
		Ok(len as usize)
	}
}

/// Writes a socket option from a caller-supplied buffer.
pub fn setsockopt_raw<S: AsRawFd>(
	socket: &S,
	level: libc::c_int,
	name: libc::c_int,
	buf: &[u8],
) -> std::io::Result<()> {
	let result = unsafe {
		libc::setsockopt(
			socket.as_raw_fd(),
			level,
			name,
			buf.as_ptr() as *const libc::c_void,
			buf.len() as libc::socklen_t,
		)
	};

	if result == -1 {
		Err(SocketError::SetOption { errno: errno(), option: "socket option" }.into())
	} else {
		Ok(())
	}
}

/// Reads an integer socket option.
///
/// Most options are a plain int. If the kernel hands back anything that
/// is *not* exactly sizeof(int) bytes, the syscall succeeded but the
/// result is malformed for this option — that is reported as a distinct
/// `OptionSize` error, not as a syscall failure.
pub fn getsockopt_int<S: AsRawFd>(
	socket: &S,
	level: libc::c_int,
	name: libc::c_int,
) -> std::io::Result<libc::c_int> {
	let mut val: libc::c_int = 0;
	let mut len = std::mem::size_of::<libc::c_int>() as libc::socklen_t;

	let result = unsafe {
		libc::getsockopt(
			socket.as_raw_fd(),
			level,
			name,
			&mut val as *mut _ as *mut libc::c_void,
			&mut len,
		)
	};

	if result == -1 {
		return Err(SocketError::GetOption { errno: errno(), option: "socket option" }.into());
	}

	if len != std::mem::size_of::<libc::c_int>() as libc::socklen_t {
		return Err(SocketError::OptionSize { option: "socket option", len: len as u32 }.into());
	}

	Ok(val)
}

/// Writes an integer socket option.
pub fn setsockopt_int<S: AsRawFd>(
	socket: &S,
	level: libc::c_int,
	name: libc::c_int,
	val: libc::c_int,
) -> std::io::Result<()> {
	let result = unsafe {
		libc::setsockopt(
			socket.as_raw_fd(),
			level,
			name,
			&val as *const _ as *const libc::c_void,
			std::mem::size_of::<libc::c_int>() as libc::socklen_t,
		)
	};

	if result == -1 {
		Err(SocketError::SetOption { errno: errno(), option: "socket option" }.into())
	} else {
		Ok(())
	}
}

/// Sets SO_REUSEADDR on a socket.
///
/// Allows binding to an address that's in TIME_WAIT state.
/// Essential for server restarts.
pub fn set_reuse_addr<S: AsRawFd>(socket: &S, enable: bool) -> std::io::Result<()> {
	setsockopt_int(socket, libc::SOL_SOCKET, libc::SO_REUSEADDR, enable as libc::c_int)
}

/// Sets SO_REUSEPORT on a socket.
///
/// Allows multiple sockets to bind the same port.
/// Used for load balancing across threads/processes.
pub fn set_reuse_port<S: AsRawFd>(socket: &S, enable: bool) -> std::io::Result<()> {
	setsockopt_int(socket, libc::SOL_SOCKET, libc::SO_REUSEPORT, enable as libc::c_int)
}

/// Enables keep-alive probing (SO_KEEPALIVE).
///
/// When enabled, the kernel sends probes on idle connections to detect dead peers.
/// Essential for long-lived connections and detecting half-open sockets.
pub fn set_keepalive<S: AsRawFd>(socket: &S, enable: bool) -> std::io::Result<()> {
	setsockopt_int(socket, libc::SOL_SOCKET, libc::SO_KEEPALIVE, enable as libc::c_int)
}

/// Sets receive buffer size (SO_RCVBUF).
///
/// Controls how much data the kernel buffers for incoming packets.
/// Kernel typically doubles this value internally.
pub fn set_recv_buffer_size<S: AsRawFd>(socket: &S, size: usize) -> std::io::Result<()> {
	setsockopt_int(socket, libc::SOL_SOCKET, libc::SO_RCVBUF, size as libc::c_int)
}

/// Sets send buffer size (SO_SNDBUF).
///
/// Controls how much outgoing data the kernel buffers before blocking/returning EAGAIN.
/// Kernel typically doubles this value internally.
pub fn set_send_buffer_size<S: AsRawFd>(socket: &S, size: usize) -> std::io::Result<()> {
	setsockopt_int(socket, libc::SOL_SOCKET, libc::SO_SNDBUF, size as libc::c_int)
}

/// Sets socket linger behavior (SO_LINGER).
///
/// Controls what happens when close() is called with unsent data:
/// - `None` — default behavior, close returns immediately, kernel sends data in background
/// - `Some(0)` — hard reset (RST), discards unsent data, no TIME_WAIT
/// - `Some(n)` — close blocks up to n seconds waiting for data to send
pub fn set_linger<S: AsRawFd>(socket: &S, linger: Option<u32>) -> std::io::Result<()> {
	let val = match linger {
		None => libc::linger { l_onoff: 0, l_linger: 0 },
		Some(seconds) => libc::linger {
			l_onoff: 1,
			l_linger: seconds as libc::c_int,
		},
	};
	let result = unsafe {
		libc::setsockopt(
			socket.as_raw_fd(),
			libc::SOL_SOCKET,
			libc::SO_LINGER,
			&val as *const _ as *const libc::c_void,
			std::mem::size_of::<libc::linger>() as libc::socklen_t,
		)
	};
	if result == -1 {
		Err(SocketError::SetOption { errno: errno(), option: "SO_LINGER" }.into())
	} else {
		Ok(())
	}
}

/// Sends a file descriptor over a Unix socket.
///
/// The receiving process gets a new fd pointing to the same resource.
pub fn send_fd<S: AsRawFd, F: AsRawFd>(socket: &S, fd: &F) -> std::io::Result<()> {
	let fd_to_send = fd.as_raw_fd();

	// Control message buffer
	let cmsg_space = unsafe { libc::CMSG_SPACE(std::mem::size_of::<RawFd>() as u32) } as usize;
	let mut cmsg_buf = vec![0u8; cmsg_space];

	// Dummy data (must send at least 1 byte)
	let dummy = [0u8; 1];
	let mut iov = libc::iovec {
		iov_base: dummy.as_ptr() as *mut libc::c_void,
		iov_len: 1,
	};

	let mut msg: libc::msghdr = unsafe { std::mem::zeroed() };
	msg.msg_iov = &mut iov;
	msg.msg_iovlen = 1;
	msg.msg_control = cmsg_buf.as_mut_ptr() as *mut libc::c_void;
	msg.msg_controllen = cmsg_space;

	// Set up control message
	let cmsg = unsafe { libc::CMSG_FIRSTHDR(&msg) };
	unsafe {
		(*cmsg).cmsg_level = libc::SOL_SOCKET;
		(*cmsg).cmsg_type = libc::SCM_RIGHTS;
		(*cmsg).cmsg_len = libc::CMSG_LEN(std::mem::size_of::<RawFd>() as u32) as usize;
		std::ptr::copy_nonoverlapping(
			&fd_to_send as *const RawFd,
			libc::CMSG_DATA(cmsg) as *mut RawFd,
			1,
		);
	}

	let result = unsafe { libc::sendmsg(socket.as_raw_fd(), &msg, 0) };

	if result == -1 {
		Err(IoError::Write { errno: errno() }.into())
	} else {
		Ok(())
	}
}

/// Receives a file descriptor from a Unix socket.
///
/// Returns the received fd as OwnedFd.
pub fn recv_fd<S: AsRawFd>(socket: &S) -> std::io::Result<OwnedFd> {
	let cmsg_space = unsafe { libc::CMSG_SPACE(std::mem::size_of::<RawFd>() as u32) } as usize;
	let mut cmsg_buf = vec![0u8; cmsg_space];

	let mut dummy = [0u8; 1];
	let mut iov = libc::iovec {
		iov_base: dummy.as_mut_ptr() as *mut libc::c_void,
		iov_len: 1,
	};

	let mut msg: libc::msghdr = unsafe { std::mem::zeroed() };
	msg.msg_iov = &mut iov;
	msg.msg_iovlen = 1;
	msg.msg_control = cmsg_buf.as_mut_ptr() as *mut libc::c_void;
	msg.msg_controllen = cmsg_space;

	let result = unsafe { libc::recvmsg(socket.as_raw_fd(), &mut msg, 0) };

	if result == -1 {
		return Err(IoError::Read { errno: errno() }.into());
	}

	// Extract fd from control message
	let cmsg = unsafe { libc::CMSG_FIRSTHDR(&msg) };
	if cmsg.is_null() {
		return Err(SocketError::InvalidAddress { reason: "no control message received" }.into());
	}

	unsafe {
		if (*cmsg).cmsg_level != libc::SOL_SOCKET || (*cmsg).cmsg_type != libc::SCM_RIGHTS {
			return Err(SocketError::InvalidAddress { reason: "unexpected control message type" }.into());
		}

		let fd = *(libc::CMSG_DATA(cmsg) as *const RawFd);
		Ok(OwnedFd::from_raw_fd(fd))
	}
}

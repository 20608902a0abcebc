use fdlane::{Datagram, Epoll, Ipv4, Ipv6, MemFd, RawSocket, Stream, Unix};

// Single test in this file on purpose: descriptor-number probing only
// works when no other thread can grab a freed number in between.

fn is_closed(fd: libc::c_int) -> bool {
	unsafe { libc::fcntl(fd, libc::F_GETFD) == -1 }
}

#[test]
fn drop_closes_every_wrapper_exactly_once() {
	// Sockets, across (domain, type) pairs. The temporary lives to the
	// end of each statement, so the probe always runs after the drop.
	let socket = RawSocket::<Ipv4, Stream>::new().expect("socket");
	let raw = socket.as_raw_fd();
	assert!(!is_closed(raw));
	drop(socket);
	assert!(is_closed(raw));

	let raw = RawSocket::<Ipv4, Datagram>::new().expect("socket").as_raw_fd();
	assert!(is_closed(raw));

	let raw = RawSocket::<Ipv6, Stream>::new().expect("socket").as_raw_fd();
	assert!(is_closed(raw));

	let raw = RawSocket::<Ipv6, Datagram>::new().expect("socket").as_raw_fd();
	assert!(is_closed(raw));

	let raw = RawSocket::<Unix, Stream>::new().expect("socket").as_raw_fd();
	assert!(is_closed(raw));

	let raw = RawSocket::<Unix, Datagram>::new().expect("socket").as_raw_fd();
	assert!(is_closed(raw));

	// Memfd and epoll follow the same contract.
	let raw = MemFd::create("fdlane-leak").expect("memfd").as_raw_fd();
	assert!(is_closed(raw));

	let raw = Epoll::new().expect("epoll").as_raw_fd();
	assert!(is_closed(raw));

	// A duplicate is owned independently: closing the original leaves
	// it open, closing it releases the second number too.
	let socket = RawSocket::<Ipv4, Stream>::new().expect("socket");
	let original = socket.as_raw_fd();
	let dup = socket.duplicate().expect("duplicate");
	let duplicated = dup.as_raw_fd();

	drop(socket);
	assert!(is_closed(original));
	assert!(!is_closed(duplicated));

	drop(dup);
	assert!(is_closed(duplicated));
}

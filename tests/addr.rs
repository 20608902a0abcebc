use fdlane::{Datagram, Ipv4, Ipv6, RawSocket, SocketAddrV4, SocketAddrV6, Stream, Unix, UnixAddr};

#[test]
fn ipv4_accessors() {
	let addr = SocketAddrV4::new([192, 168, 1, 1], 8080);
	assert_eq!(addr.ip(), [192, 168, 1, 1]);
	assert_eq!(addr.port(), 8080);

	assert_eq!(SocketAddrV4::loopback(80).ip(), [127, 0, 0, 1]);
	assert_eq!(SocketAddrV4::any(0).ip(), [0, 0, 0, 0]);
}

#[test]
fn ipv6_accessors() {
	let loopback = SocketAddrV6::loopback(443);
	let mut expected = [0u8; 16];
	expected[15] = 1;
	assert_eq!(loopback.ip(), expected);
	assert_eq!(loopback.port(), 443);
	assert_eq!(loopback.scope_id(), 0);

	let scoped = SocketAddrV6::with_scope(expected, 443, 3);
	assert_eq!(scoped.scope_id(), 3);
}

#[test]
fn ipv4_kernel_roundtrip() {
	// The real conversion check: bind through the kernel and read the
	// address back out of it.
	let bound = RawSocket::<Ipv4, Datagram>::new()
		.expect("socket")
		.bind_datagram(SocketAddrV4::loopback(0))
		.expect("bind");

	let addr = bound.local_addr().expect("local_addr");
	assert_eq!(addr.ip(), [127, 0, 0, 1]);
	assert_ne!(addr.port(), 0);
}

#[test]
fn ipv6_kernel_roundtrip() {
	let bound = RawSocket::<Ipv6, Datagram>::new()
		.expect("socket")
		.bind_datagram(SocketAddrV6::loopback(0))
		.expect("bind");

	let addr = bound.local_addr().expect("local_addr");
	assert_eq!(addr.ip(), SocketAddrV6::loopback(0).ip());
	assert_ne!(addr.port(), 0);
}

#[test]
fn unix_path_kernel_roundtrip() {
	let path = format!("/tmp/fdlane-addr-{}", std::process::id());
	let _ = std::fs::remove_file(&path);

	let bound = RawSocket::<Unix, Stream>::new()
		.expect("socket")
		.bind(UnixAddr::new(path.as_bytes()))
		.expect("bind");

	let addr = bound.local_addr().expect("local_addr");
	assert!(!addr.is_abstract());
	assert_eq!(addr.path(), path.as_bytes());

	let _ = std::fs::remove_file(&path);
}

#[test]
fn abstract_name_kernel_roundtrip() {
	// Abstract sockets never touch the filesystem, so no cleanup.
	let name = format!("fdlane-abstract-{}", std::process::id());

	let bound = RawSocket::<Unix, Datagram>::new()
		.expect("socket")
		.bind_datagram(UnixAddr::abstract_name(name.as_bytes()))
		.expect("bind");

	let addr = bound.local_addr().expect("local_addr");
	assert!(addr.is_abstract());
	assert_eq!(addr.path(), name.as_bytes());
}

#[test]
fn over_long_unix_path_fails_bind() {
	// sun_path holds 108 bytes; this cannot fit and must be rejected
	// outright, never truncated into some other path.
	let addr = UnixAddr::new(vec![b'y'; 150]);

	let err = RawSocket::<Unix, Stream>::new()
		.expect("socket")
		.bind(addr)
		.expect_err("must reject");

	assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
}

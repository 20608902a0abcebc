use fdlane::{Datagram, Ipv4, RawSocket, SocketAddrV4};

fn bound_pair() -> (fdlane::BoundDatagram<Ipv4>, fdlane::BoundDatagram<Ipv4>) {
	let a = RawSocket::<Ipv4, Datagram>::new()
		.expect("socket a")
		.bind_datagram(SocketAddrV4::loopback(0))
		.expect("bind a");
	let b = RawSocket::<Ipv4, Datagram>::new()
		.expect("socket b")
		.bind_datagram(SocketAddrV4::loopback(0))
		.expect("bind b");
	(a, b)
}

#[test]
fn send_to_recv_from_roundtrip() {
	let (a, b) = bound_pair();
	let b_addr = b.local_addr().expect("b addr");

	let sent = a.send_to(b"ping", &b_addr).expect("send_to");
	assert_eq!(sent, 4);

	let mut buf = [0u8; 16];
	let (n, from) = b.recv_from(&mut buf).expect("recv_from");
	assert_eq!(&buf[..n], b"ping");
	assert_eq!(from.port(), a.local_addr().expect("a addr").port());
}

#[test]
fn connected_datagram_send_recv() {
	let (a, b) = bound_pair();
	let b_addr = b.local_addr().expect("b addr");
	let a_addr = a.local_addr().expect("a addr");

	let a = a.connect(b_addr).expect("connect");
	assert_eq!(a.peer_addr().expect("peer").port(), b_addr.port());
	assert_eq!(a.local_addr().expect("local").port(), a_addr.port());

	a.send(b"connected").expect("send");
	let mut buf = [0u8; 16];
	let (n, _) = b.recv_from(&mut buf).expect("recv");
	assert_eq!(&buf[..n], b"connected");

	// Replies routed back through the association.
	b.send_to(b"reply", &a_addr).expect("send_to");
	let n = a.recv(&mut buf).expect("recv");
	assert_eq!(&buf[..n], b"reply");
}

#[test]
fn unconnected_client_gets_kernel_address() {
	let (_, b) = bound_pair();
	let b_addr = b.local_addr().expect("b addr");

	// connect_datagram skips the explicit bind; the kernel assigns a
	// local port at connect time.
	let client = RawSocket::<Ipv4, Datagram>::new()
		.expect("socket")
		.connect_datagram(b_addr)
		.expect("connect");

	assert_ne!(client.local_addr().expect("local").port(), 0);

	client.send(b"hi").expect("send");
	let mut buf = [0u8; 8];
	let (n, _) = b.recv_from(&mut buf).expect("recv");
	assert_eq!(&buf[..n], b"hi");
}

#[test]
fn vectored_datagram_send() {
	let (a, b) = bound_pair();
	let b_addr = b.local_addr().expect("b addr");

	let bufs = [
		std::io::IoSlice::new(b"one "),
		std::io::IoSlice::new(b"packet"),
	];
	let sent = a.send_msg_to(&bufs, &b_addr, 0).expect("send_msg_to");
	assert_eq!(sent, 10);

	// Both slices arrive as a single datagram.
	let mut buf = [0u8; 32];
	let (n, _) = b.recv_from(&mut buf).expect("recv_from");
	assert_eq!(&buf[..n], b"one packet");
}

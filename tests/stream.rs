use fdlane::{
	ConnectedStream, Ipv4, Listener, MemFd, RawSocket, Shutdown, SocketAddrV4, Stream, Unix,
	getsockopt_int, recv_fd, send_fd, set_reuse_addr, unix_socket,
};

fn temp_path(tag: &str) -> String {
	let path = format!("/tmp/fdlane-{}-{}", tag, std::process::id());
	let _ = std::fs::remove_file(&path);
	path
}

fn handshake(tag: &str) -> (Listener<Unix>, ConnectedStream<Unix>, ConnectedStream<Unix>, String) {
	let path = temp_path(tag);
	let listener = unix_socket::server(&path, 16).expect("server");
	// The backlog completes the handshake, so connecting before
	// accept() is fine even single-threaded.
	let client = unix_socket::client(&path).expect("client");
	let accepted = listener.accept().expect("accept");
	(listener, client, accepted, path)
}

#[test]
fn unix_connect_accept_roundtrip() {
	let (_listener, client, accepted, path) = handshake("roundtrip");

	let sent = client.write(b"hello, peer").expect("write");
	assert_eq!(sent, 11);

	let mut buf = [0u8; 64];
	let received = accepted.read(&mut buf).expect("read");
	assert_eq!(received, 11);
	assert_eq!(&buf[..received], b"hello, peer");

	// And the other direction.
	accepted.write(b"ack").expect("write back");
	let n = client.read(&mut buf).expect("read back");
	assert_eq!(&buf[..n], b"ack");

	let _ = std::fs::remove_file(&path);
}

#[test]
fn ipv4_loopback_connect() {
	let listener = RawSocket::<Ipv4, Stream>::new()
		.expect("socket")
		.bind(SocketAddrV4::loopback(0))
		.expect("bind")
		.listen(8)
		.expect("listen");

	// Port 0 means the kernel picked one; read it back.
	let addr = listener.local_addr().expect("local_addr");
	assert_eq!(addr.ip(), [127, 0, 0, 1]);
	assert_ne!(addr.port(), 0);

	let client = RawSocket::<Ipv4, Stream>::new()
		.expect("socket")
		.connect(addr)
		.expect("connect");

	let (accepted, peer) = listener.accept_with_addr().expect("accept");
	assert_eq!(peer.ip(), [127, 0, 0, 1]);
	assert_eq!(peer.port(), client.local_addr().expect("client addr").port());

	client.write(b"over tcp").expect("write");
	let mut buf = [0u8; 16];
	let n = accepted.read(&mut buf).expect("read");
	assert_eq!(&buf[..n], b"over tcp");
}

#[test]
fn duplicate_outlives_original() {
	let (_listener, client, accepted, path) = handshake("dup");

	let dup = accepted.duplicate().expect("duplicate");

	// Same kernel object: same local address.
	let a = accepted.local_addr().expect("addr").path().to_vec();
	let b = dup.local_addr().expect("dup addr").path().to_vec();
	assert_eq!(a, b);

	// Closing the original must not invalidate the duplicate.
	drop(accepted);
	dup.write(b"still alive").expect("write via dup");

	let mut buf = [0u8; 32];
	let n = client.read(&mut buf).expect("read");
	assert_eq!(&buf[..n], b"still alive");

	let _ = std::fs::remove_file(&path);
}

#[test]
fn replace_with_rebinds_the_target_number() {
	let path = temp_path("replace");
	let listener = unix_socket::server(&path, 16).expect("server");

	let client_one = unix_socket::client(&path).expect("client one");
	let client_two = unix_socket::client(&path).expect("client two");
	let conn_one = listener.accept().expect("accept one");
	let conn_two = listener.accept().expect("accept two");

	// conn_one's descriptor *number* now refers to conn_two's
	// connection. conn_two itself is untouched.
	conn_one.replace_with(&conn_two).expect("replace_with");

	conn_one.write(b"to the second client").expect("write");
	let mut buf = [0u8; 32];
	let n = client_two.read(&mut buf).expect("read on client two");
	assert_eq!(&buf[..n], b"to the second client");

	// The source is still valid and independently usable.
	conn_two.write(b"also works").expect("write via source");
	let n = client_two.read(&mut buf).expect("read again");
	assert_eq!(&buf[..n], b"also works");

	drop(client_one);
	let _ = std::fs::remove_file(&path);
}

#[test]
fn shutdown_write_half() {
	let (_listener, client, accepted, path) = handshake("shutdown");

	client.shutdown(Shutdown::Write).expect("shutdown");

	// The peer sees end-of-stream...
	let mut buf = [0u8; 8];
	let n = accepted.read(&mut buf).expect("read");
	assert_eq!(n, 0);

	// ...but the other direction still flows.
	accepted.write(b"one way").expect("write");
	let n = client.read(&mut buf).expect("read");
	assert_eq!(&buf[..n], b"one way");

	let _ = std::fs::remove_file(&path);
}

#[test]
fn sockopt_int_roundtrip() {
	let socket = RawSocket::<Ipv4, Stream>::new().expect("socket");

	set_reuse_addr(&socket, true).expect("set");
	let on = getsockopt_int(&socket, libc::SOL_SOCKET, libc::SO_REUSEADDR).expect("get");
	assert_ne!(on, 0);

	set_reuse_addr(&socket, false).expect("clear");
	let off = getsockopt_int(&socket, libc::SOL_SOCKET, libc::SO_REUSEADDR).expect("get");
	assert_eq!(off, 0);
}

#[test]
fn vectored_send_recv() {
	let (_listener, client, accepted, path) = handshake("vectored");

	let bufs = [
		std::io::IoSlice::new(b"scatter "),
		std::io::IoSlice::new(b"gather"),
	];
	let sent = client.send_msg(&bufs, 0).expect("send_msg");
	assert_eq!(sent, 14);

	let mut front = [0u8; 8];
	let mut back = [0u8; 8];
	let mut bufs = [
		std::io::IoSliceMut::new(&mut front),
		std::io::IoSliceMut::new(&mut back),
	];
	let received = accepted.recv_msg(&mut bufs, 0).expect("recv_msg");
	assert_eq!(received, 14);
	assert_eq!(&front, b"scatter ");
	assert_eq!(&back[..6], b"gather");

	let _ = std::fs::remove_file(&path);
}

#[test]
fn pass_descriptor_over_unix_socket() {
	let (_listener, client, accepted, path) = handshake("passfd");

	let memfd = MemFd::create("passed").expect("memfd");
	memfd.pwrite(b"through the socket", 0).expect("pwrite");

	send_fd(&client, &memfd).expect("send_fd");
	let received = recv_fd(&accepted).expect("recv_fd");

	// The received descriptor refers to the same memory file.
	let received = MemFd::from(received);
	let mut buf = [0u8; 32];
	let n = received.pread(&mut buf, 0).expect("pread");
	assert_eq!(&buf[..n], b"through the socket");

	let _ = std::fs::remove_file(&path);
}

#[test]
fn over_long_path_is_rejected() {
	let long = vec![b'x'; 200];
	let err = unix_socket::client(&long).expect_err("must reject");
	assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
}

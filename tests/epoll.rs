use fdlane::{
	Datagram, EVENT_IN, Epoll, Event, EventData, Ipv4, RawSocket, SocketAddrV4,
};

fn bound_datagram() -> fdlane::BoundDatagram<Ipv4> {
	RawSocket::<Ipv4, Datagram>::new()
		.expect("socket")
		.bind_datagram(SocketAddrV4::loopback(0))
		.expect("bind")
}

#[test]
fn double_add_is_already_exists() {
	let epoll = Epoll::new().expect("epoll");
	let socket = bound_datagram();

	epoll.add(&socket, EVENT_IN, EventData::from_u64(1)).expect("first add");

	// Same descriptor, same instance: the kernel says EEXIST and we
	// pass that through untouched.
	let err = epoll
		.add(&socket, EVENT_IN, EventData::from_u64(2))
		.expect_err("second add must fail");
	assert_eq!(err.kind(), std::io::ErrorKind::AlreadyExists);
}

#[test]
fn remove_unregistered_is_not_found() {
	let epoll = Epoll::new().expect("epoll");
	let socket = bound_datagram();

	let err = epoll.remove(&socket).expect_err("remove must fail");
	assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
}

#[test]
fn readable_event_is_reported() {
	let epoll = Epoll::new().expect("epoll");
	let receiver = bound_datagram();
	let sender = bound_datagram();

	let data = EventData::from_fd(receiver.as_raw_fd());
	epoll.add(&receiver, EVENT_IN, data).expect("add");

	// Nothing pending yet: a zero-timeout wait polls and comes back
	// empty-handed.
	let mut events = [Event::empty(); 4];
	let n = epoll.wait(&mut events, 0).expect("poll");
	assert_eq!(n, 0);

	let addr = receiver.local_addr().expect("addr");
	sender.send_to(b"wake up", &addr).expect("send_to");

	let n = epoll.wait(&mut events, 1000).expect("wait");
	assert_eq!(n, 1);
	assert!(events[0].is_readable());
	assert_eq!(events[0].data(), data);
	assert_eq!(events[0].data().as_fd(), receiver.as_raw_fd());
}

#[test]
fn modify_changes_the_payload() {
	let epoll = Epoll::new().expect("epoll");
	let receiver = bound_datagram();
	let sender = bound_datagram();

	epoll.add(&receiver, EVENT_IN, EventData::from_u64(7)).expect("add");
	epoll.modify(&receiver, EVENT_IN, EventData::from_u64(99)).expect("modify");

	let addr = receiver.local_addr().expect("addr");
	sender.send_to(b"x", &addr).expect("send_to");

	let mut events = [Event::empty(); 4];
	let n = epoll.wait(&mut events, 1000).expect("wait");
	assert_eq!(n, 1);
	assert_eq!(events[0].data().as_u64(), 99);
}

#[test]
fn remove_stops_reporting() {
	let epoll = Epoll::new().expect("epoll");
	let receiver = bound_datagram();
	let sender = bound_datagram();

	epoll.add(&receiver, EVENT_IN, EventData::from_u64(1)).expect("add");
	epoll.remove(&receiver).expect("remove");

	let addr = receiver.local_addr().expect("addr");
	sender.send_to(b"ignored", &addr).expect("send_to");

	let mut events = [Event::empty(); 4];
	let n = epoll.wait(&mut events, 0).expect("poll");
	assert_eq!(n, 0);
}

#[test]
fn pwait_with_empty_mask() {
	let epoll = Epoll::new().expect("epoll");
	let receiver = bound_datagram();
	let sender = bound_datagram();

	epoll.add(&receiver, EVENT_IN, EventData::from_u64(5)).expect("add");

	let addr = receiver.local_addr().expect("addr");
	sender.send_to(b"signal-safe", &addr).expect("send_to");

	let mut mask: libc::sigset_t = unsafe { std::mem::zeroed() };
	unsafe { libc::sigemptyset(&mut mask) };

	let mut events = [Event::empty(); 4];
	let n = epoll.pwait(&mut events, 1000, &mask).expect("pwait");
	assert_eq!(n, 1);
	assert_eq!(events[0].data().as_u64(), 5);
}

#[test]
fn duplicate_shares_the_registration_set() {
	let epoll = Epoll::new().expect("epoll");
	let socket = bound_datagram();

	epoll.add(&socket, EVENT_IN, EventData::from_u64(1)).expect("add");

	// The duplicate refers to the same kernel instance, so the
	// registration is already there.
	let dup = epoll.duplicate().expect("duplicate");
	let err = dup
		.add(&socket, EVENT_IN, EventData::from_u64(2))
		.expect_err("add via dup must see EEXIST");
	assert_eq!(err.kind(), std::io::ErrorKind::AlreadyExists);
}

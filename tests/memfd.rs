use fdlane::{MEMFD_ALLOW_SEALING, MemFd};

#[test]
fn create_truncate_stat() {
	let memfd = MemFd::create("fdlane-test").expect("create");

	// A fresh memfd is empty.
	assert_eq!(memfd.len().expect("len"), 0);
	assert!(memfd.is_empty().expect("is_empty"));

	memfd.ftruncate(4096).expect("grow");
	assert_eq!(memfd.len().expect("len"), 4096);

	memfd.ftruncate(16).expect("shrink");
	let st = memfd.stat().expect("stat");
	assert_eq!(st.st_size, 16);
}

#[test]
fn positional_read_write() {
	let memfd = MemFd::create("fdlane-rw").expect("create");
	memfd.ftruncate(64).expect("ftruncate");

	let written = memfd.pwrite(b"positioned", 5).expect("pwrite");
	assert_eq!(written, 10);

	let mut buf = [0u8; 10];
	let read = memfd.pread(&mut buf, 5).expect("pread");
	assert_eq!(read, 10);
	assert_eq!(&buf, b"positioned");

	// The hole before the write reads as zeroes.
	let mut head = [0xffu8; 5];
	memfd.pread(&mut head, 0).expect("pread head");
	assert_eq!(head, [0u8; 5]);
}

#[test]
fn sequential_read_write_share_offset() {
	let memfd = MemFd::create("fdlane-seq").expect("create");

	let n = memfd.write(b"abc").expect("write");
	assert_eq!(n, 3);

	// The file offset is now at 3; reading sequentially sees EOF.
	let mut buf = [0u8; 8];
	assert_eq!(memfd.read(&mut buf).expect("read"), 0);

	// But the bytes are there.
	let n = memfd.pread(&mut buf, 0).expect("pread");
	assert_eq!(&buf[..n], b"abc");
}

#[test]
fn duplicate_sees_the_same_file() {
	let memfd = MemFd::create("fdlane-dup").expect("create");
	memfd.ftruncate(32).expect("ftruncate");

	let dup = memfd.duplicate().expect("duplicate");
	dup.pwrite(b"written via dup", 0).expect("pwrite");

	// Same kernel object: the original reads what the dup wrote, and
	// survives the dup being closed.
	drop(dup);
	let mut buf = [0u8; 15];
	memfd.pread(&mut buf, 0).expect("pread");
	assert_eq!(&buf, b"written via dup");
}

#[test]
fn replace_with_rebinds_the_target_number() {
	let first = MemFd::create("fdlane-first").expect("create first");
	let second = MemFd::create("fdlane-second").expect("create second");
	first.ftruncate(16).expect("ftruncate first");
	second.ftruncate(16).expect("ftruncate second");
	first.pwrite(b"first", 0).expect("pwrite first");
	second.pwrite(b"second", 0).expect("pwrite second");

	first.replace_with(&second).expect("replace_with");

	// first's number now refers to second's memory file.
	let mut buf = [0u8; 6];
	first.pread(&mut buf, 0).expect("pread");
	assert_eq!(&buf, b"second");

	// The source is untouched and independently closable.
	second.pwrite(b"SECOND", 0).expect("pwrite");
	drop(second);
	first.pread(&mut buf, 0).expect("pread after source close");
	assert_eq!(&buf, b"SECOND");
}

#[test]
fn interior_nul_name_is_rejected() {
	let err = MemFd::create("bad\0name").expect_err("must reject");
	assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
}

#[test]
fn create_with_sealing_flag() {
	let memfd = MemFd::create_with_flags("fdlane-sealed", libc::MFD_CLOEXEC | MEMFD_ALLOW_SEALING)
		.expect("create");
	memfd.ftruncate(8).expect("ftruncate");
}

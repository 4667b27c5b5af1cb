//! End-to-end behaviour of the file format: round trips, header checks,
//! truncation and the (unauthenticated) wrong-password case.

use cubecrypt::pipeline::{self, Mode, CHUNK_SIZE, HEADER_SIZE, MAGIC};
use cubecrypt::prng::{new_fixed_cuberng, SystemRng};
use cubecrypt::Error;
use std::io::{Cursor, Seek, SeekFrom, Write};

const PASSWORD: &[u8] = b"hunter2";

fn sample(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 256) as u8).collect()
}

fn seal(password: &[u8], data: &[u8], seed: u128) -> Vec<u8> {
    let mut out = Vec::new();
    let mut rng = new_fixed_cuberng(seed);
    pipeline::encrypt(password, Cursor::new(data), &mut out, &mut rng).unwrap();
    out
}

fn open(password: &[u8], sealed: &[u8]) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();
    pipeline::decrypt(password, sealed, &mut out)?;
    Ok(out)
}

#[test]
fn round_trip_lengths() {
    for len in [0usize, 1, 7, 8, 9, 1000] {
        let data = sample(len);
        let sealed = seal(PASSWORD, &data, len as u128);
        let chunks = (len + CHUNK_SIZE - 1) / CHUNK_SIZE;
        assert_eq!(sealed.len(), HEADER_SIZE + chunks * CHUNK_SIZE, "len {}", len);
        assert_eq!(sealed[..4], MAGIC);
        assert_eq!(sealed[4] as usize, (8 - len % 8) % 8, "len {}", len);
        assert_eq!(open(PASSWORD, &sealed).unwrap(), data, "len {}", len);
    }
}

#[test]
fn round_trip_with_os_randomness() {
    let data = sample(4099);
    let mut sealed = Vec::new();
    pipeline::encrypt(PASSWORD, Cursor::new(&data), &mut sealed, &mut SystemRng).unwrap();
    assert_eq!(open(PASSWORD, &sealed).unwrap(), data);
}

#[test]
fn empty_input_is_header_only() {
    let sealed = seal(PASSWORD, b"", 1);
    assert_eq!(sealed.len(), HEADER_SIZE);
    assert_eq!(sealed[4], 0);
    assert!(open(PASSWORD, &sealed).unwrap().is_empty());
}

#[test]
fn salts_differ_between_encryptions() {
    let data = sample(64);
    let a = seal(PASSWORD, &data, 1);
    let b = seal(PASSWORD, &data, 2);
    assert_ne!(a[5..HEADER_SIZE], b[5..HEADER_SIZE]);
    assert_ne!(a[HEADER_SIZE..], b[HEADER_SIZE..]);
}

#[test]
fn identical_chunks_encrypt_differently_across_subkeys() {
    let data = [0x55u8; 8 * 4];
    let sealed = seal(PASSWORD, &data, 3);
    let chunks: Vec<&[u8]> = sealed[HEADER_SIZE..].chunks(CHUNK_SIZE).collect();
    for i in 0..chunks.len() {
        for j in i + 1..chunks.len() {
            assert_ne!(chunks[i], chunks[j], "chunks {} and {}", i, j);
        }
    }

    // index 4 reuses the first sub-key, so the same plaintext repeats
    let data = [0x55u8; 8 * 5];
    let sealed = seal(PASSWORD, &data, 3);
    let body = &sealed[HEADER_SIZE..];
    assert_eq!(body[..8], body[32..40]);
}

#[test]
fn bad_marker_is_rejected_without_output() {
    let mut sealed = seal(PASSWORD, &sample(20), 4);
    sealed[0] ^= 0xff;
    let mut out = Vec::new();
    let err = pipeline::decrypt(PASSWORD, &sealed[..], &mut out).unwrap_err();
    assert!(matches!(err, Error::HeaderMismatch));
    assert!(out.is_empty());

    let err = pipeline::decrypt(PASSWORD, &b"PK\x03\x04 not ours"[..], &mut out).unwrap_err();
    assert!(matches!(err, Error::HeaderMismatch));
    assert!(out.is_empty());
}

#[test]
fn wrong_password_gives_garbage_not_errors() {
    let data = sample(100);
    let sealed = seal(PASSWORD, &data, 5);
    let garbage = open(b"hunter3", &sealed).unwrap();
    assert_eq!(garbage.len(), data.len());
    assert_ne!(garbage, data);
}

#[test]
fn trailing_partial_chunk_is_truncated() {
    let mut sealed = seal(PASSWORD, &sample(24), 6);
    sealed.truncate(sealed.len() - 3);
    assert!(matches!(open(PASSWORD, &sealed), Err(Error::TruncatedInput { trailing: 5 })));
}

#[test]
fn short_header_is_truncated() {
    let sealed = seal(PASSWORD, &sample(24), 7);
    assert!(matches!(open(PASSWORD, &sealed[..HEADER_SIZE - 1]),
                     Err(Error::TruncatedInput { .. })));
}

#[test]
fn padded_header_without_chunks_is_truncated() {
    let mut sealed = seal(PASSWORD, &sample(3), 8);
    sealed.truncate(HEADER_SIZE);
    assert!(matches!(open(PASSWORD, &sealed), Err(Error::TruncatedInput { trailing: 0 })));
}

#[test]
fn pad_count_out_of_range() {
    let mut sealed = seal(PASSWORD, &sample(16), 9);
    sealed[4] = 8;
    assert!(matches!(open(PASSWORD, &sealed), Err(Error::InvalidPadCount(8))));
}

#[test]
fn encrypt_starts_at_current_position() {
    let data = sample(50);
    let mut input = Cursor::new(&data);
    input.seek(SeekFrom::Start(10)).unwrap();
    let mut sealed = Vec::new();
    let n = pipeline::encrypt(PASSWORD, &mut input, &mut sealed, &mut new_fixed_cuberng(10)).unwrap();
    assert_eq!(n, 40);
    assert_eq!(open(PASSWORD, &sealed).unwrap(), &data[10..]);
}

#[test]
fn encrypt_stream_rejects_short_input() {
    let mut sealed = Vec::new();
    let err = pipeline::encrypt_stream(PASSWORD, &b"abc"[..], 10, &mut sealed,
                                       &mut new_fixed_cuberng(11)).unwrap_err();
    assert!(matches!(err, Error::Io(ref e) if e.kind() == std::io::ErrorKind::UnexpectedEof));
}

#[test]
fn run_dispatches_on_mode() {
    let data = sample(33);
    let mut sealed = Vec::new();
    let mut rng = new_fixed_cuberng(12);
    pipeline::run(Mode::Encrypt, PASSWORD, Cursor::new(&data), &mut sealed, &mut rng).unwrap();

    let mut opened = Vec::new();
    let n = pipeline::run(Mode::Decrypt, PASSWORD, Cursor::new(&sealed), &mut opened, &mut rng).unwrap();
    assert_eq!(n, 33);
    assert_eq!(opened, data);
}

#[test]
fn files_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let plain_path = dir.path().join("plain.bin");
    let sealed_path = dir.path().join("plain.bin.cc");
    let data = sample(10_000);
    std::fs::File::create(&plain_path).unwrap().write_all(&data).unwrap();

    {
        let input = std::fs::File::open(&plain_path).unwrap();
        let output = std::fs::File::create(&sealed_path).unwrap();
        pipeline::encrypt(PASSWORD, input, output, &mut SystemRng).unwrap();
    }
    let sealed_len = std::fs::metadata(&sealed_path).unwrap().len();
    assert_eq!(sealed_len, (HEADER_SIZE + 10_000) as u64);

    let input = std::fs::File::open(&sealed_path).unwrap();
    let mut opened = Vec::new();
    pipeline::decrypt(PASSWORD, input, &mut opened).unwrap();
    assert_eq!(opened, data);
}

// Reader that hands out one byte at a time and interrupts every other call.
struct Stutter<'a> { data: &'a [u8], flip: bool }

impl std::io::Read for Stutter<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.flip = !self.flip;
        if self.flip {
            return Err(std::io::ErrorKind::Interrupted.into());
        }
        if self.data.is_empty() || buf.is_empty() {
            return Ok(0);
        }
        buf[0] = self.data[0];
        self.data = &self.data[1..];
        Ok(1)
    }
}

#[test]
fn interrupted_reads_are_retried() {
    let data = sample(77);
    let sealed = seal(PASSWORD, &data, 13);
    let mut opened = Vec::new();
    pipeline::decrypt(PASSWORD, Stutter { data: &sealed, flip: false }, &mut opened).unwrap();
    assert_eq!(opened, data);
}

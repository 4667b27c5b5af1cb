//! The cubecrypt file format and the encrypt / decrypt drivers.
//!
//! ```text
//! offset  size  content
//! 0       4     marker 01 02 03 04
//! 4       1     pad-count, 0..=7
//! 5       128   salt
//! 133     8*n   chunks, XTEA(K[n % 4], RC4(K[n % 4], plaintext chunk))
//! ```
//!
//! K[0..4] are the four 16 byte quarters of
//! `cubehash(password || pad-count || salt)`. The last plaintext chunk is
//! completed with pad-count random bytes, which decryption drops. An empty
//! input produces a header and no chunks.

use crate::*;
use hash::new_cubehash;
use log::debug;
use std::io::{self, BufReader, BufWriter, ErrorKind, Read, Seek, SeekFrom, Write};
use xtea::Xtea;
use zeroize::{Zeroize, Zeroizing};

pub const MAGIC: [u8; 4] = [0x01, 0x02, 0x03, 0x04];
pub const SALT_SIZE: usize = 128;
pub const HEADER_SIZE: usize = MAGIC.len() + 1 + SALT_SIZE;
pub const CHUNK_SIZE: usize = 8;
pub const SUBKEY_COUNT: usize = 4;

const BUF_CAP: usize = 64 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Encrypt,
    Decrypt,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    pub pad_count: u8,
    pub salt: [u8; SALT_SIZE],
}

/// Number of filler bytes needed to bring `len` to a whole number of chunks.
pub fn pad_count_for(len: u64) -> u8 {
    let chunk = CHUNK_SIZE as u64;
    ((chunk - len % chunk) % chunk) as u8
}

impl Header {
    /// Header for a plaintext of `len` bytes with a fresh salt.
    pub fn new(len: u64, rng: &mut dyn SeedRNG) -> Result<Header, Error> {
        let mut salt = [0u8; SALT_SIZE];
        rng.fill(&mut salt)?;
        Ok(Header { pad_count: pad_count_for(len), salt })
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<(), Error> {
        w.write_all(&MAGIC)?;
        w.write_all(&[self.pad_count])?;
        w.write_all(&self.salt)?;
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R) -> Result<Header, Error> {
        let mut magic = [0u8; MAGIC.len()];
        if read_full(r, &mut magic)? < MAGIC.len() || magic != MAGIC {
            return Err(Error::HeaderMismatch);
        }

        let mut rest = [0u8; 1 + SALT_SIZE];
        let n = read_full(r, &mut rest)?;
        if n < rest.len() {
            return Err(Error::TruncatedInput { trailing: MAGIC.len() + n });
        }
        let pad_count = rest[0];
        if pad_count as usize >= CHUNK_SIZE {
            return Err(Error::InvalidPadCount(pad_count));
        }
        let mut salt = [0u8; SALT_SIZE];
        salt.copy_from_slice(&rest[1..]);
        Ok(Header { pad_count, salt })
    }
}

// ----------------------------------------------------------------------------
/// The four per-chunk keys, wiped when dropped.
pub struct SubKeys([SubKey; SUBKEY_COUNT]);

pub fn derive_subkeys(password: &[u8], header: &Header) -> SubKeys {
    let mut h = new_cubehash();
    h.update(password);
    h.update(&[header.pad_count]);
    h.update(&header.salt);
    let digest = Zeroizing::new(h.finalize());

    let mut keys = [[0u8; 16]; SUBKEY_COUNT];
    for (key, part) in keys.iter_mut().zip(digest.chunks_exact(16)) {
        key.copy_from_slice(part);
    }
    SubKeys(keys)
}

impl SubKeys {
    pub fn for_chunk(&self, index: u64) -> &SubKey {
        &self.0[(index % SUBKEY_COUNT as u64) as usize]
    }
}

impl Drop for SubKeys {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

// ----------------------------------------------------------------------------
pub fn encrypt_chunk(key: &SubKey, chunk: &mut Block) -> Result<(), Error> {
    rc4::transform(key, chunk)?;
    Xtea::from_key(key).encrypt_block(chunk);
    Ok(())
}

pub fn decrypt_chunk(key: &SubKey, chunk: &mut Block) -> Result<(), Error> {
    Xtea::from_key(key).decrypt_block(chunk);
    rc4::transform(key, chunk)
}

// ----------------------------------------------------------------------------
// Fills as much of buf as the reader can give, retrying interrupted reads.
// Returns less than buf.len() only at end of input.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, Error> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

fn read_chunk<R: Read>(reader: &mut R, chunk: &mut Block) -> Result<bool, Error> {
    match read_full(reader, chunk)? {
        0 => Ok(false),
        CHUNK_SIZE => Ok(true),
        n => Err(Error::TruncatedInput { trailing: n }),
    }
}

// ----------------------------------------------------------------------------
/// Encrypts exactly `len` bytes from `input`. Returns the plaintext length.
pub fn encrypt_stream<R: Read, W: Write>(password: &[u8],
                                         input: R, len: u64,
                                         output: W,
                                         rng: &mut dyn SeedRNG) -> Result<u64, Error> {
    let header = Header::new(len, rng)?;
    let keys = derive_subkeys(password, &header);
    debug!("encrypting {} bytes, pad count {}", len, header.pad_count);

    let mut reader = BufReader::with_capacity(BUF_CAP, input);
    let mut writer = BufWriter::with_capacity(BUF_CAP, output);
    header.write_to(&mut writer)?;

    let mut chunk: Block = [0; CHUNK_SIZE];
    let mut remaining = len;
    let mut index = 0u64;
    while remaining > 0 {
        let take = remaining.min(CHUNK_SIZE as u64) as usize;
        if read_full(&mut reader, &mut chunk[..take])? < take {
            return Err(io::Error::new(ErrorKind::UnexpectedEof,
                                      "input ended before its announced length").into());
        }
        if take < CHUNK_SIZE {
            rng.fill(&mut chunk[take..])?;
        }
        encrypt_chunk(keys.for_chunk(index), &mut chunk)?;
        writer.write_all(&chunk)?;
        remaining -= take as u64;
        index += 1;
    }
    chunk.zeroize();
    writer.flush()?;

    debug!("wrote {} chunks", index);
    Ok(len)
}

/// Encrypts everything from the current position of `input` to its end.
pub fn encrypt<R: Read + Seek, W: Write>(password: &[u8],
                                         mut input: R,
                                         output: W,
                                         rng: &mut dyn SeedRNG) -> Result<u64, Error> {
    let start = input.stream_position()?;
    let end = input.seek(SeekFrom::End(0))?;
    input.seek(SeekFrom::Start(start))?;
    encrypt_stream(password, input, end.saturating_sub(start), output, rng)
}

/// Decrypts a cubecrypt stream. Returns the plaintext length.
///
/// A bad marker is reported before anything is written. A wrong password is
/// not detected and yields garbage of the right length.
pub fn decrypt<R: Read, W: Write>(password: &[u8],
                                  input: R,
                                  output: W) -> Result<u64, Error> {
    let mut reader = BufReader::with_capacity(BUF_CAP, input);
    let header = Header::read_from(&mut reader)?;
    let keys = derive_subkeys(password, &header);
    let mut writer = BufWriter::with_capacity(BUF_CAP, output);

    let mut current: Block = [0; CHUNK_SIZE];
    let mut next: Block = [0; CHUNK_SIZE];
    let mut more = read_chunk(&mut reader, &mut current)?;
    if !more && header.pad_count != 0 {
        return Err(Error::TruncatedInput { trailing: 0 });
    }

    // one chunk of look-ahead tells us which chunk carries the filler
    let mut index = 0u64;
    let mut written = 0u64;
    while more {
        more = read_chunk(&mut reader, &mut next)?;
        decrypt_chunk(keys.for_chunk(index), &mut current)?;
        let keep = if more { CHUNK_SIZE } else { CHUNK_SIZE - header.pad_count as usize };
        writer.write_all(&current[..keep])?;
        written += keep as u64;
        current = next;
        index += 1;
    }
    current.zeroize();
    next.zeroize();
    writer.flush()?;

    debug!("decrypted {} chunks, {} bytes", index, written);
    Ok(written)
}

/// Single entry point for callers that pick the direction at runtime.
pub fn run<R: Read + Seek, W: Write>(mode: Mode,
                                     password: &[u8],
                                     input: R,
                                     output: W,
                                     rng: &mut dyn SeedRNG) -> Result<u64, Error> {
    match mode {
        Mode::Encrypt => encrypt(password, input, output, rng),
        Mode::Decrypt => decrypt(password, input, output),
    }
}

//! XTEA: 64 bit blocks, 128 bit keys, 32 cycles of two Feistel half-rounds.
//!
//! Key and block bytes are read as little-endian words, so a block is
//! `v0 = block[0..4]`, `v1 = block[4..8]`.

use crate::*;

pub const KEY_SIZE: usize = 16;
pub const BLOCK_SIZE: usize = 8;

// floor(2^32 / golden ratio), checked in tests.rs
pub const DELTA: u32 = 0x9E37_79B9;
pub const CYCLES: u32 = 32;

pub struct Xtea {
    k: [u32; 4],
}

// ----------------------------------------------------------------------------
pub fn new_xtea(key: &[u8]) -> Result<Xtea, Error> {
    let key: &SubKey = key.try_into().map_err(|_| Error::KeyLengthViolation {
        what: "xtea key",
        actual: key.len(),
    })?;
    Ok(Xtea::from_key(key))
}

// ----------------------------------------------------------------------------
fn to_block(block: &[u8]) -> Result<Block, Error> {
    block.try_into().map_err(|_| Error::KeyLengthViolation {
        what: "xtea block",
        actual: block.len(),
    })
}

/// Encrypts one 8 byte block under a 16 byte key.
pub fn encrypt_block(key: &[u8], block: &[u8]) -> Result<Block, Error> {
    let cipher = new_xtea(key)?;
    let mut b = to_block(block)?;
    cipher.encrypt_block(&mut b);
    Ok(b)
}

/// Inverse of [`encrypt_block`].
pub fn decrypt_block(key: &[u8], block: &[u8]) -> Result<Block, Error> {
    let cipher = new_xtea(key)?;
    let mut b = to_block(block)?;
    cipher.decrypt_block(&mut b);
    Ok(b)
}

impl Xtea {
    pub fn from_key(key: &SubKey) -> Xtea {
        let mut k = [0u32; 4];
        for (w, chunk) in k.iter_mut().zip(key.chunks_exact(4)) {
            *w = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Xtea { k }
    }

    pub fn encrypt_block(&self, block: &mut Block) {
        let v = encipher(load(block), &self.k);
        store(v, block);
    }

    pub fn decrypt_block(&self, block: &mut Block) {
        let v = decipher(load(block), &self.k);
        store(v, block);
    }
}

impl Drop for Xtea {
    fn drop(&mut self) {
        zeroize::Zeroize::zeroize(&mut self.k);
    }
}

#[inline(always)]
fn load(block: &Block) -> [u32; 2] {
    [
        u32::from_le_bytes([block[0], block[1], block[2], block[3]]),
        u32::from_le_bytes([block[4], block[5], block[6], block[7]]),
    ]
}

#[inline(always)]
fn store(v: [u32; 2], block: &mut Block) {
    block[..4].copy_from_slice(&v[0].to_le_bytes());
    block[4..].copy_from_slice(&v[1].to_le_bytes());
}

#[inline(always)]
fn mix(v: u32) -> u32 {
    ((v << 4) ^ (v >> 5)).wrapping_add(v)
}

// ----------------------------------------------------------------------------
/// Word level encryption, independent of any byte order.
pub fn encipher(v: [u32; 2], k: &[u32; 4]) -> [u32; 2] {
    let [mut v0, mut v1] = v;
    let mut sum = 0u32;
    for _ in 0..CYCLES {
        v0 = v0.wrapping_add(mix(v1) ^ sum.wrapping_add(k[(sum & 3) as usize]));
        sum = sum.wrapping_add(DELTA);
        v1 = v1.wrapping_add(mix(v0) ^ sum.wrapping_add(k[((sum >> 11) & 3) as usize]));
    }
    [v0, v1]
}

pub fn decipher(v: [u32; 2], k: &[u32; 4]) -> [u32; 2] {
    let [mut v0, mut v1] = v;
    let mut sum = DELTA.wrapping_mul(CYCLES);
    for _ in 0..CYCLES {
        v1 = v1.wrapping_sub(mix(v0) ^ sum.wrapping_add(k[((sum >> 11) & 3) as usize]));
        sum = sum.wrapping_sub(DELTA);
        v0 = v0.wrapping_sub(mix(v1) ^ sum.wrapping_add(k[(sum & 3) as usize]));
    }
    [v0, v1]
}

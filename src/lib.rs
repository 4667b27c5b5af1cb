//! cubecrypt: password based file encryption built from three small primitives.
//!
//! A 128 byte random salt, the password and the pad-count are hashed with a
//! CubeHash 16/32-512 variant. The 64 byte digest is split into four 16 byte
//! sub-keys, and every 8 byte chunk of the file goes through RC4 then XTEA
//! under the sub-key picked by its index modulo 4.
//!
//! There is no authentication tag: decrypting with the wrong password
//! succeeds and returns garbage.

#![cfg_attr(not(feature = "std"), no_std)]

pub trait SeedRNG { fn fill(&mut self, buf: &mut [u8]) -> Result<(), Error>; }

pub type Digest = [u8; 64];   // CubeHash output, 512 bits.
pub type SubKey = [u8; 16];   // One quarter of a digest, 128 bits.
pub type Block = [u8; 8];     // XTEA block and file chunk, 64 bits.

pub mod error;
pub use error::Error;

pub mod hash; // CubeHash 16/32-512 with 16 init and 32 final rounds.
pub mod rc4;
pub mod xtea;
pub mod prng;

#[cfg(feature = "std")]
pub mod pipeline;

use crate::*;
use hash::{cubehash, DIGEST_SIZE};

// Deterministic byte source: the digest of a 128 bit counter, consumed one
// byte at a time, then the digest of counter+1. For tests and demos only.
pub struct CubeRng {
    c: u128,
    block: Digest,
    i: usize
}
// ----------------------------------------------------------------------------
pub fn new_fixed_cuberng(seed: u128) -> CubeRng {
    let mut r = CubeRng {
        c: seed, block: [0; DIGEST_SIZE], i: 0
    };
    r.rehash();
    r
}
impl CubeRng {
    fn rehash(&mut self) {
        self.block = cubehash(&self.c.to_le_bytes());
    }
}
impl SeedRNG for CubeRng {
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        for b in buf {
            *b = self.block[self.i];
            self.i += 1;
            if self.i == DIGEST_SIZE {
                self.c = self.c.wrapping_add(1);
                self.rehash();
                self.i = 0;
            }
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
/// Operating system randomness, used for salts and padding filler.
#[cfg(feature = "std")]
pub struct SystemRng;

#[cfg(feature = "std")]
impl SeedRNG for SystemRng {
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        getrandom::getrandom(buf).map_err(Error::RandomSource)
    }
}

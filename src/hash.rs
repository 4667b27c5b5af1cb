use crate::*;
use zeroize::Zeroize;

type State = [u32; 32];
pub const DIGEST_SIZE: usize = 64;
pub const BLOCK_SIZE: usize = 32;

pub const INIT_ROUNDS: usize = 16;
pub const BLOCK_ROUNDS: usize = 16;
pub const FINAL_ROUNDS: usize = 32;

// The whole 1024 bit state lives in the value, so independent hashes never
// share anything. acc holds the tail of the message not yet absorbed.
pub struct CubeHash {
    s: State,
    acc: [u8; BLOCK_SIZE], acc_index: usize,
}

// ----------------------------------------------------------------------------
pub fn new_cubehash() -> CubeHash {
    let mut r = CubeHash {
        s: [0; 32],
        acc: [0; BLOCK_SIZE], acc_index: 0,
    };
    r.s[0] = DIGEST_SIZE as u32;
    r.s[1] = BLOCK_SIZE as u32;
    r.s[2] = BLOCK_ROUNDS as u32;
    run_rounds(&mut r.s, INIT_ROUNDS);
    r
}

// ----------------------------------------------------------------------------
/// Hashes a complete message.
pub fn cubehash(message: &[u8]) -> Digest {
    let mut h = new_cubehash();
    h.update(message);
    h.finalize()
}

// ----------------------------------------------------------------------------
fn state_to_u8(state: &State, dst: &mut Digest) {
    for (chunk, val) in dst.chunks_exact_mut(4).zip(state.iter()) {
        chunk.copy_from_slice(&val.to_le_bytes());
    }
}

impl CubeHash {
    fn absorb(&mut self) {
        for (s, acc) in self.s.iter_mut().zip(self.acc.chunks_exact(4)) {
            *s ^= u32::from_le_bytes([acc[0], acc[1], acc[2], acc[3]]);
        }
        run_rounds(&mut self.s, BLOCK_ROUNDS);
        self.acc_index = 0;
    }

    pub fn update(&mut self, data: &[u8]) {
        for b in data {
            self.acc[self.acc_index] = *b;
            self.acc_index += 1;
            if self.acc_index == BLOCK_SIZE {
                self.absorb();
            }
        }
    }

    /// Pads with 0x80 then zeros up to the block boundary, absorbs the last
    /// block and runs the finalization rounds.
    pub fn finalize(mut self) -> Digest {
        self.acc[self.acc_index] = 0x80;
        self.acc[self.acc_index + 1..].fill(0);
        self.absorb();

        self.s[31] ^= 1;
        run_rounds(&mut self.s, FINAL_ROUNDS);

        let mut out = [0u8; DIGEST_SIZE];
        state_to_u8(&self.s, &mut out);
        self.s.zeroize();
        self.acc.zeroize();
        out
    }
}

// ----------------------------------------------------------------------------
fn run_rounds(state: &mut State, n: usize) {
    for _ in 0..n {
        add_rotate(state, 7);
        mix_swap(state, 8, 2);
        add_rotate(state, 11);
        mix_swap(state, 4, 1);
    }
}

// x[16+i] += x[i], then x[i] <<<= r for the low half.
#[inline(always)]
fn add_rotate(state: &mut State, r: u32) {
    for i in 0..16 {
        state[16 + i] = state[16 + i].wrapping_add(state[i]);
        state[i] = state[i].rotate_left(r);
    }
}

// Pairs (i, i^mask1) of the low half are swapped while each picks up the high
// word of its partner, then pairs (i, i^mask2) of the high half are swapped.
// Each pair is visited once, from the index holding the mask bit.
#[inline(always)]
fn mix_swap(state: &mut State, mask1: usize, mask2: usize) {
    for i in 0..16 {
        if i & mask1 != 0 {
            let j = i ^ mask1;
            let tmp = state[i] ^ state[j + 16];
            state[i] = state[j] ^ state[i + 16];
            state[j] = tmp;
        }
    }
    for i in 16..32 {
        if i & mask2 != 0 {
            state.swap(i, i ^ mask2);
        }
    }
}

//! RC4 (ARC4) stream cipher.
//!
//! The permutation table is built from the key on every `new_rc4` call and
//! belongs to the returned value; nothing is cached between calls.

use crate::*;
use zeroize::Zeroize;

pub struct Rc4 {
    state: [u8; 256],
    i: u8,
    j: u8,
}

// ----------------------------------------------------------------------------
/// Runs the key schedule. Any non-empty key is accepted; keys longer than
/// 256 bytes only contribute their first 256 bytes.
pub fn new_rc4(key: &[u8]) -> Result<Rc4, Error> {
    if key.is_empty() {
        return Err(Error::KeyLengthViolation { what: "rc4 key", actual: 0 });
    }
    let mut r = Rc4 { state: [0; 256], i: 0, j: 0 };
    r.ksa(key);
    Ok(r)
}

// ----------------------------------------------------------------------------
/// XORs `data` in place with the keystream of a fresh cipher keyed by `key`.
/// Applying it twice with the same key restores the input.
pub fn transform(key: &[u8], data: &mut [u8]) -> Result<(), Error> {
    new_rc4(key)?.apply_keystream(data);
    Ok(())
}

impl Rc4 {
    fn ksa(&mut self, key: &[u8]) {
        self.state.iter_mut().enumerate().for_each(|(i, x)| {
            *x = i as u8;
        });

        let mut j = 0u8;
        for (i, k) in (0..256usize).zip(key.iter().cycle()) {
            j = j.wrapping_add(self.state[i]).wrapping_add(*k);
            self.state.swap(i, j.into());
        }
    }

    fn prga(&mut self) -> u8 {
        self.i = self.i.wrapping_add(1);
        self.j = self.j.wrapping_add(self.state[self.i as usize]);

        self.state.swap(self.i.into(), self.j.into());

        let index = self.state[self.i as usize].wrapping_add(self.state[self.j as usize]);
        self.state[index as usize]
    }

    pub fn apply_keystream(&mut self, data: &mut [u8]) {
        data.iter_mut().for_each(|x| {
            *x ^= self.prga();
        });
    }
}

impl Drop for Rc4 {
    fn drop(&mut self) {
        self.state.zeroize();
        self.i.zeroize();
        self.j.zeroize();
    }
}

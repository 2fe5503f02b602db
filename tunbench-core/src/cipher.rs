//! Substitution table derived from the shared password.

use md5::{Digest, Md5};

const TABLE_SIZE: usize = 256;
const SORT_ROUNDS: u64 = 1024;

/// Byte substitution table pair.
///
/// Built once per run and shared read-only (`Arc<CipherTable>`) by every
/// connection; nothing mutates it after construction.
#[derive(Clone, PartialEq, Eq)]
pub struct CipherTable {
    encode: [u8; TABLE_SIZE],
    decode: [u8; TABLE_SIZE],
}

impl CipherTable {
    /// Derive the table from a password.
    ///
    /// The first eight bytes of the password's MD5 digest, read little-endian,
    /// seed 1023 stable sorts of `0..256` keyed by `seed % (x + round)`.
    pub fn from_password(password: &str) -> Self {
        let digest = Md5::digest(password.as_bytes());
        let mut seed_bytes = [0u8; 8];
        seed_bytes.copy_from_slice(&digest[..8]);
        let seed = u64::from_le_bytes(seed_bytes);

        let mut order: Vec<u64> = (0..TABLE_SIZE as u64).collect();
        for round in 1..SORT_ROUNDS {
            order.sort_by_key(|&x| seed % (x + round));
        }

        let mut encode = [0u8; TABLE_SIZE];
        for (slot, value) in encode.iter_mut().zip(&order) {
            *slot = *value as u8;
        }
        let mut decode = [0u8; TABLE_SIZE];
        for (plain, &cipher) in encode.iter().enumerate() {
            decode[usize::from(cipher)] = plain as u8;
        }

        Self { encode, decode }
    }

    #[inline]
    pub fn encode_in_place(&self, buf: &mut [u8]) {
        for b in buf {
            *b = self.encode[usize::from(*b)];
        }
    }

    #[inline]
    pub fn decode_in_place(&self, buf: &mut [u8]) {
        for b in buf {
            *b = self.decode[usize::from(*b)];
        }
    }
}

impl std::fmt::Debug for CipherTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material stays out of logs.
        f.debug_struct("CipherTable").finish_non_exhaustive()
    }
}

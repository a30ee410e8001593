//! Datagram corruption
//!
//! Mangles well-formed datagrams the way hostile or broken senders do:
//! - Bit flips
//! - Truncation
//! - Zeroed or random declared lengths
//! - Trailing garbage

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Offset of the declared length inside a PDU header
const LENGTH_OFFSET: usize = 8;

/// One kind of damage applied to a datagram
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Corruption {
    /// Flip this many random bits
    BitFlips(usize),
    /// Cut the datagram at a random point
    Truncate,
    /// Zero the declared length of the first PDU
    ZeroLength,
    /// Random declared length in the first PDU
    RandomLength,
    /// Append random bytes
    TrailingGarbage(usize),
}

/// Seeded datagram corrupter
pub struct DatagramChaos {
    rng: StdRng,
    max_bit_flips: usize,
    max_garbage: usize,
}

impl DatagramChaos {
    pub fn new(seed: u64) -> Self {
        DatagramChaos {
            rng: StdRng::seed_from_u64(seed),
            max_bit_flips: 8,
            max_garbage: 64,
        }
    }

    pub fn with_limits(mut self, max_bit_flips: usize, max_garbage: usize) -> Self {
        self.max_bit_flips = max_bit_flips.max(1);
        self.max_garbage = max_garbage.max(1);
        self
    }

    /// Pick a corruption at random
    pub fn pick(&mut self) -> Corruption {
        match self.rng.gen_range(0..5) {
            0 => Corruption::BitFlips(self.rng.gen_range(1..=self.max_bit_flips)),
            1 => Corruption::Truncate,
            2 => Corruption::ZeroLength,
            3 => Corruption::RandomLength,
            _ => Corruption::TrailingGarbage(self.rng.gen_range(1..=self.max_garbage)),
        }
    }

    /// Corrupted copy of `datagram` and what was done to it
    pub fn corrupt(&mut self, datagram: &[u8]) -> (Vec<u8>, Corruption) {
        let corruption = self.pick();
        (self.apply(datagram, corruption), corruption)
    }

    pub fn apply(&mut self, datagram: &[u8], corruption: Corruption) -> Vec<u8> {
        let mut out = datagram.to_vec();
        match corruption {
            Corruption::BitFlips(count) => {
                if !out.is_empty() {
                    for _ in 0..count {
                        let bit = self.rng.gen_range(0..out.len() * 8);
                        out[bit / 8] ^= 1 << (bit % 8);
                    }
                }
            }
            Corruption::Truncate => {
                let keep = self.rng.gen_range(0..=out.len());
                out.truncate(keep);
            }
            Corruption::ZeroLength => {
                if out.len() >= LENGTH_OFFSET + 2 {
                    out[LENGTH_OFFSET..LENGTH_OFFSET + 2].copy_from_slice(&[0, 0]);
                }
            }
            Corruption::RandomLength => {
                if out.len() >= LENGTH_OFFSET + 2 {
                    let length: u16 = self.rng.gen();
                    out[LENGTH_OFFSET..LENGTH_OFFSET + 2].copy_from_slice(&length.to_be_bytes());
                }
            }
            Corruption::TrailingGarbage(count) => {
                out.extend((0..count).map(|_| self.rng.gen::<u8>()));
            }
        }
        out
    }

    /// Random bytes of random length up to `max_len`
    pub fn garbage(&mut self, max_len: usize) -> Vec<u8> {
        let len = self.rng.gen_range(0..=max_len);
        (0..len).map(|_| self.rng.gen()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let data = vec![0u8; 64];
        let mut a = DatagramChaos::new(7);
        let mut b = DatagramChaos::new(7);
        for _ in 0..20 {
            assert_eq!(a.corrupt(&data), b.corrupt(&data));
        }
    }

    #[test]
    fn test_zero_length() {
        let mut chaos = DatagramChaos::new(1);
        let data = vec![0xFFu8; 20];
        let out = chaos.apply(&data, Corruption::ZeroLength);
        assert_eq!(&out[8..10], &[0, 0]);
        assert_eq!(out.len(), 20);

        // Too short to have a length field
        assert_eq!(chaos.apply(&[1, 2, 3], Corruption::ZeroLength), vec![1, 2, 3]);
    }

    #[test]
    fn test_bit_flips_change_bytes() {
        let mut chaos = DatagramChaos::new(3);
        let data = vec![0u8; 32];
        let out = chaos.apply(&data, Corruption::BitFlips(1));
        assert_eq!(out.iter().map(|b| b.count_ones()).sum::<u32>(), 1);
        assert!(chaos.apply(&[], Corruption::BitFlips(4)).is_empty());
    }

    #[test]
    fn test_truncate_and_garbage() {
        let mut chaos = DatagramChaos::new(5).with_limits(2, 10);
        let data = vec![9u8; 50];
        for _ in 0..50 {
            assert!(chaos.apply(&data, Corruption::Truncate).len() <= 50);
            let (out, corruption) = chaos.corrupt(&data);
            if let Corruption::TrailingGarbage(n) = corruption {
                assert!(n <= 10);
                assert_eq!(out.len(), 50 + n);
            }
            if let Corruption::BitFlips(n) = corruption {
                assert!(n <= 2);
            }
        }
        assert!(chaos.garbage(16).len() <= 16);
    }
}

//! Hash-seeded pseudo-randomness
//! The same (hash, salt) pair always yields the same value

/// Map a commit hash and salt to a value in [0, 1)
pub fn seed(hash: &str, salt: &str) -> f64 {
    let digest = md5::compute(format!("{salt}:{hash}"));
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest.0[..8]);
    let bits = u64::from_be_bytes(bytes) >> 11;
    bits as f64 / (1u64 << 53) as f64
}

/// Value of the last hex digit in the hash, 0 if there is none
pub fn low_nibble(hash: &str) -> u8 {
    hash.chars()
        .rev()
        .find_map(|c| c.to_digit(16))
        .map_or(0, |d| d as u8)
}

/// Centered variant of [`seed`] in [-0.5, 0.5)
pub fn signed_seed(hash: &str, salt: &str) -> f64 {
    seed(hash, salt) - 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_deterministic_and_in_range() {
        let hashes = ["a1b2c3", "ffffffffffffffff", "", "0000000"];
        for hash in hashes {
            let first = seed(hash, "jitter-y");
            let second = seed(hash, "jitter-y");
            assert_eq!(first.to_bits(), second.to_bits());
            assert!((0.0..1.0).contains(&first), "seed out of range: {first}");
        }
    }

    #[test]
    fn test_salt_changes_value() {
        assert_ne!(seed("deadbeef", "y"), seed("deadbeef", "z"));
    }

    #[test]
    fn test_low_nibble() {
        assert_eq!(low_nibble("abc1"), 1);
        assert_eq!(low_nibble("abcf"), 15);
        assert_eq!(low_nibble("ABCD"), 13);
        assert_eq!(low_nibble("12zz"), 2);
        assert_eq!(low_nibble(""), 0);
    }
}

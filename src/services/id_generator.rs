use rand::Rng;

/// URL-safe alphabet. 64 symbols, so each character carries 6 bits of entropy.
const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

pub trait IdGenerator: Send + Sync + std::fmt::Debug {
    /// Returns a fresh identifier. Uniqueness is probabilistic; the store detects collisions.
    fn generate(&self) -> String;
}

#[derive(Debug, Clone, Copy)]
pub struct RandomIdGenerator {
    length: usize,
}

impl RandomIdGenerator {
    #[must_use]
    pub const fn new(length: usize) -> Self {
        Self { length }
    }
}

impl IdGenerator for RandomIdGenerator {
    fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..self.length).map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())])).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_have_configured_length_and_alphabet() {
        let generator = RandomIdGenerator::new(12);
        for _ in 0..100 {
            let id = generator.generate();
            assert_eq!(id.len(), 12);
            assert!(id.bytes().all(|b| ALPHABET.contains(&b)), "unexpected character in {id}");
        }
    }

    #[test]
    fn test_ids_do_not_repeat_in_practice() {
        let generator = RandomIdGenerator::new(10);
        let ids: HashSet<String> = (0..10_000).map(|_| generator.generate()).collect();
        assert_eq!(ids.len(), 10_000);
    }
}

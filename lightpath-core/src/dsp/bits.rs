use rand::Rng;

/// Uniform pseudo-random bit sequence generator.
#[derive(Debug, Clone, Copy)]
pub struct BitSource {
    count: usize,
}

impl BitSource {
    pub fn new(count: usize) -> Self {
        Self { count }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Draws `count` independent bits, each 0 or 1 with probability 1/2.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<u8> {
        (0..self.count).map(|_| rng.gen_range(0..=1u8)).collect()
    }
}

/// Number of positions where the two sequences differ, over the shorter length.
pub fn count_bit_errors(reference: &[u8], received: &[u8]) -> usize {
    reference
        .iter()
        .zip(received)
        .filter(|(a, b)| a != b)
        .count()
}

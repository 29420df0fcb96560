use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seeded randomness owned by one game session, so bot play can be replayed from the seed.
#[derive(Debug, Clone)]
pub struct SessionRng {
    rng: StdRng,
    seed: u64,
}

impl SessionRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn from_random() -> Self {
        let seed: u64 = rand::rng().random();
        Self::new(seed)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn random_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distr::uniform::SampleUniform,
        R: rand::distr::uniform::SampleRange<T>,
    {
        self.rng.random_range(range)
    }

    /// True with probability `p`, clamped to `[0, 1]`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.random_bool(p.clamp(0.0, 1.0))
    }

    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.rng.random_range(0..items.len());
        items.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = SessionRng::new(7);
        let mut b = SessionRng::new(7);

        let left: Vec<usize> = (0..16).map(|_| a.random_range(0..100)).collect();
        let right: Vec<usize> = (0..16).map(|_| b.random_range(0..100)).collect();

        assert_eq!(left, right);
        assert_eq!(a.seed(), 7);
    }

    #[test]
    fn test_choose_empty_slice() {
        let mut rng = SessionRng::new(1);
        let empty: [u8; 0] = [];

        assert!(rng.choose(&empty).is_none());
        assert_eq!(rng.choose(&[5]), Some(&5));
    }

    #[test]
    fn test_chance_extremes() {
        let mut rng = SessionRng::new(3);

        assert!((0..50).all(|_| rng.chance(1.0)));
        assert!((0..50).all(|_| !rng.chance(0.0)));
        assert!(!rng.chance(-2.0));
    }
}

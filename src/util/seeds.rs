use rand::{
    SeedableRng,
    distributions::{Distribution, Uniform},
    rngs::StdRng,
};

/// SplitMix64 finalizer over `base + counter * golden`. Gives every replicate
/// its own seed without sharing an RNG across threads.
#[inline]
pub fn replicate_seed(base_seed: u64, counter: u64) -> u64 {
    let mut z = base_seed.wrapping_add(counter.wrapping_mul(0x9e3779b97f4a7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// K child seeds drawn from one master seed, one per independent stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedStreams<const K: usize> {
    pub seeds: [u64; K],
}

impl<const K: usize> SeedStreams<K> {
    pub fn new(seed: u64) -> Self {
        let mut master_rng = StdRng::seed_from_u64(seed);
        let seed_distribution = Uniform::new_inclusive(1_000_000_u64, i64::MAX as u64);
        let mut seeds = [0_u64; K];
        for s in seeds.iter_mut() {
            *s = seed_distribution.sample(&mut master_rng);
        }
        SeedStreams { seeds }
    }

    pub fn rng(&self, stream: usize) -> StdRng {
        StdRng::seed_from_u64(self.seeds[stream])
    }
}

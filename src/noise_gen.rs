//! Seeded permutation-table Perlin noise.
//!
//! Every terrain layer samples one of these. A generator is a pure function of
//! its seed: two generators built from the same seed return bit-identical
//! values for the same coordinates.

use noise::NoiseFn;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// 2D gradient noise backed by a shuffled 256-entry permutation table.
#[derive(Clone, Debug)]
pub struct NoiseGenerator {
    seed: u64,
    permutation: [u8; 512],
}

impl NoiseGenerator {
    pub fn new(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut table: Vec<u8> = (0..=255u8).collect();
        table.shuffle(&mut rng);

        // Doubled so lattice lookups never need a modulo
        let mut permutation = [0u8; 512];
        for (i, slot) in permutation.iter_mut().enumerate() {
            *slot = table[i % 256];
        }

        Self { seed, permutation }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn fade(t: f64) -> f64 {
        t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
    }

    fn lerp(t: f64, a: f64, b: f64) -> f64 {
        a + t * (b - a)
    }

    /// Dot product of the offset with one of four diagonal gradients.
    fn grad(hash: u8, x: f64, y: f64) -> f64 {
        match hash & 3 {
            0 => x + y,
            1 => -x + y,
            2 => x - y,
            _ => -x - y,
        }
    }

    /// Single-octave noise in [-1, 1]. Zero on integer lattice points.
    pub fn noise2d(&self, x: f64, y: f64) -> f64 {
        let xi = (x.floor() as i64 & 255) as usize;
        let yi = (y.floor() as i64 & 255) as usize;
        let xf = x - x.floor();
        let yf = y - y.floor();

        let u = Self::fade(xf);
        let v = Self::fade(yf);

        let p = &self.permutation;
        let aa = p[p[xi] as usize + yi];
        let ab = p[p[xi] as usize + yi + 1];
        let ba = p[p[xi + 1] as usize + yi];
        let bb = p[p[xi + 1] as usize + yi + 1];

        let bottom = Self::lerp(u, Self::grad(aa, xf, yf), Self::grad(ba, xf - 1.0, yf));
        let top = Self::lerp(
            u,
            Self::grad(ab, xf, yf - 1.0),
            Self::grad(bb, xf - 1.0, yf - 1.0),
        );

        Self::lerp(v, bottom, top).clamp(-1.0, 1.0)
    }

    /// Fractal noise: `octaves` samples at doubling frequency, each weighted by
    /// `persistence^i`, normalized by the total amplitude so the result stays in [-1, 1].
    pub fn octave_noise2d(
        &self,
        x: f64,
        y: f64,
        octaves: u32,
        persistence: f64,
        scale: f64,
    ) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = scale;
        let mut max_value = 0.0;

        for _ in 0..octaves {
            total += amplitude * self.noise2d(x * frequency, y * frequency);
            max_value += amplitude;
            amplitude *= persistence;
            frequency *= 2.0;
        }

        if max_value == 0.0 {
            return 0.0;
        }
        (total / max_value).clamp(-1.0, 1.0)
    }
}

impl NoiseFn<f64, 2> for NoiseGenerator {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.noise2d(point[0], point[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_same_seed_is_bit_identical() {
        let a = NoiseGenerator::new(12345);
        let b = NoiseGenerator::new(12345);
        for i in 0..50 {
            let x = i as f64 * 0.37;
            let y = i as f64 * 0.91;
            assert_eq!(a.noise2d(x, y).to_bits(), b.noise2d(x, y).to_bits());
            assert_eq!(
                a.octave_noise2d(x, y, 4, 0.5, 0.1).to_bits(),
                b.octave_noise2d(x, y, 4, 0.5, 0.1).to_bits()
            );
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = NoiseGenerator::new(1);
        let b = NoiseGenerator::new(2);
        let differs = (0..25).any(|i| {
            let x = i as f64 * 0.43 + 0.1;
            a.noise2d(x, x * 0.7) != b.noise2d(x, x * 0.7)
        });
        assert!(differs);
    }

    #[test]
    fn test_lattice_points_are_zero() {
        let n = NoiseGenerator::new(99);
        assert_eq!(n.noise2d(3.0, 7.0), 0.0);
    }

    #[test]
    fn test_zero_octaves() {
        let n = NoiseGenerator::new(5);
        assert_eq!(n.octave_noise2d(1.3, 2.7, 0, 0.5, 1.0), 0.0);
    }

    #[test]
    fn test_noise_fn_matches_noise2d() {
        let n = NoiseGenerator::new(17);
        assert_eq!(n.get([0.25, 1.75]), n.noise2d(0.25, 1.75));
    }

    proptest! {
        #[test]
        fn noise_stays_in_range(seed in any::<u64>(), x in -500.0f64..500.0, y in -500.0f64..500.0) {
            let n = NoiseGenerator::new(seed);
            let v = n.noise2d(x, y);
            prop_assert!((-1.0..=1.0).contains(&v));
            let o = n.octave_noise2d(x, y, 5, 0.55, 0.07);
            prop_assert!((-1.0..=1.0).contains(&o));
        }
    }
}

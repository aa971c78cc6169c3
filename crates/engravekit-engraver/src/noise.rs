//! Seeded 2D gradient noise for spatially coherent jitter.
//!
//! Point and line offsets must vary smoothly across the surface, so the
//! generators sample this field instead of drawing independent random values
//! per point.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// 2D Perlin (gradient) noise.
///
/// Returns values in `[-1, 1]`, zero at every integer lattice point.
#[derive(Debug, Clone)]
pub struct Perlin2D {
    perm: [u8; 512],
}

impl Perlin2D {
    /// Creates a noise field whose permutation table is shuffled from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        let mut table: Vec<u8> = (0..=255).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        table.shuffle(&mut rng);

        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = table[i & 255];
        }
        Self { perm }
    }

    #[inline]
    fn hash(&self, x: i64, y: i64) -> u8 {
        let xi = (x & 255) as usize;
        let yi = (y & 255) as usize;
        self.perm[self.perm[xi] as usize + yi]
    }

    /// Sample the noise at `(x, y)`.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        if !x.is_finite() || !y.is_finite() {
            return 0.0;
        }
        let x0 = x.floor();
        let y0 = y.floor();
        let xf = x - x0;
        let yf = y - y0;
        let xi = x0 as i64;
        let yi = y0 as i64;

        let u = fade(xf);
        let v = fade(yf);

        let aa = grad(self.hash(xi, yi), xf, yf);
        let ba = grad(self.hash(xi + 1, yi), xf - 1.0, yf);
        let ab = grad(self.hash(xi, yi + 1), xf, yf - 1.0);
        let bb = grad(self.hash(xi + 1, yi + 1), xf - 1.0, yf - 1.0);

        let x1 = lerp(aa, ba, u);
        let x2 = lerp(ab, bb, u);
        (lerp(x1, x2, v) * std::f64::consts::FRAC_1_SQRT_2 * 2.0).clamp(-1.0, 1.0)
    }
}

#[inline]
fn grad(hash: u8, x: f64, y: f64) -> f64 {
    match hash & 7 {
        0 => x + y,
        1 => x - y,
        2 => -x + y,
        3 => -x - y,
        4 => x,
        5 => -x,
        6 => y,
        _ => -y,
    }
}

#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

//! Seeded 2D Perlin noise for heightmaps.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Unit gradients on the XZ plane.
const GRAD2: [(f64, f64); 8] = [
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
    (std::f64::consts::FRAC_1_SQRT_2, std::f64::consts::FRAC_1_SQRT_2),
    (-std::f64::consts::FRAC_1_SQRT_2, std::f64::consts::FRAC_1_SQRT_2),
    (std::f64::consts::FRAC_1_SQRT_2, -std::f64::consts::FRAC_1_SQRT_2),
    (-std::f64::consts::FRAC_1_SQRT_2, -std::f64::consts::FRAC_1_SQRT_2),
];

/// 6t^5 - 15t^4 + 10t^3
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

/// Single-octave Perlin noise.
pub struct PerlinNoise {
    perm: [u8; 512],
}

impl PerlinNoise {
    pub fn new(seed: u64) -> Self {
        let mut table: Vec<u8> = (0..=255).collect();
        table.shuffle(&mut StdRng::seed_from_u64(seed));

        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = table[i & 255];
        }
        Self { perm }
    }

    #[inline]
    fn gradient(&self, x: i32, z: i32) -> (f64, f64) {
        let xi = (x & 255) as usize;
        let zi = (z & 255) as usize;
        GRAD2[self.perm[self.perm[xi] as usize + zi] as usize % GRAD2.len()]
    }

    #[inline]
    fn corner(&self, x: i32, z: i32, dx: f64, dz: f64) -> f64 {
        let (gx, gz) = self.gradient(x, z);
        gx * dx + gz * dz
    }

    /// Noise at (x, z), roughly in [-1, 1].
    pub fn sample(&self, x: f64, z: f64) -> f64 {
        let x0 = x.floor();
        let z0 = z.floor();
        let (xi, zi) = (x0 as i32, z0 as i32);
        let (fx, fz) = (x - x0, z - z0);

        let n00 = self.corner(xi, zi, fx, fz);
        let n10 = self.corner(xi + 1, zi, fx - 1.0, fz);
        let n01 = self.corner(xi, zi + 1, fx, fz - 1.0);
        let n11 = self.corner(xi + 1, zi + 1, fx - 1.0, fz - 1.0);

        let u = fade(fx);
        lerp(fade(fz), lerp(u, n00, n10), lerp(u, n01, n11))
    }
}

/// Fractal Brownian motion over several Perlin octaves.
pub struct OctaveNoise {
    octaves: Vec<PerlinNoise>,
    lacunarity: f64,
    persistence: f64,
}

impl OctaveNoise {
    /// Octave `i` is seeded with `seed + i`.
    pub fn new(seed: u64, octaves: usize, lacunarity: f64, persistence: f64) -> Self {
        Self {
            octaves: (0..octaves)
                .map(|i| PerlinNoise::new(seed.wrapping_add(i as u64)))
                .collect(),
            lacunarity,
            persistence,
        }
    }

    /// Normalised sum of all octaves, roughly in [-1, 1].
    pub fn sample(&self, x: f64, z: f64) -> f64 {
        let mut total = 0.0;
        let mut norm = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        for octave in &self.octaves {
            total += octave.sample(x * frequency, z * frequency) * amplitude;
            norm += amplitude;
            amplitude *= self.persistence;
            frequency *= self.lacunarity;
        }
        if norm == 0.0 {
            0.0
        } else {
            total / norm
        }
    }
}

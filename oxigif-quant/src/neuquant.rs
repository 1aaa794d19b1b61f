//! NeuQuant neural-net colour quantization (Anthony Dekker, 1994).
//!
//! A one-dimensional Kohonen self-organising map of 256 neurons is trained
//! on a sample of the image's pixels. Each neuron ends up as one palette
//! colour. Lookups go through an index of the neurons sorted by green.
//!
//! All arithmetic is fixed-point on `i32`, so results are deterministic and
//! identical on every platform.

use crate::{ColourQuantizer, Quantized, Result, map_pixels};
use oxigif_core::Colour;

/// Number of neurons, and so the number of palette colours.
pub const NETWORK_SIZE: usize = 256;

// Four primes near 500. The sampling stride is one that does not divide the
// input length, so successive samples wander over the whole image.
const PRIME_1: usize = 499;
const PRIME_2: usize = 491;
const PRIME_3: usize = 487;
const PRIME_4: usize = 503;

/// Coarsest sampling: every 30th pixel.
pub const MAX_SAMPLE_FACTOR: usize = 30;

/// Inputs shorter than this many bytes are sampled exhaustively.
const MIN_PICTURE_BYTES: usize = 3 * PRIME_4;

const MAX_NET_POS: usize = NETWORK_SIZE - 1;
const NET_BIAS_SHIFT: i32 = 4;
const LEARNING_CYCLES: usize = 100;

const INT_BIAS_SHIFT: i32 = 16;
const INT_BIAS: i32 = 1 << INT_BIAS_SHIFT;
const GAMMA_SHIFT: i32 = 10;
const BETA_SHIFT: i32 = 10;
const BETA: i32 = INT_BIAS >> BETA_SHIFT;
const BETA_GAMMA: i32 = INT_BIAS << (GAMMA_SHIFT - BETA_SHIFT);

const INIT_RAD: usize = NETWORK_SIZE >> 3;
const RADIUS_BIAS_SHIFT: i32 = 6;
const RADIUS_BIAS: i32 = 1 << RADIUS_BIAS_SHIFT;
const INIT_RADIUS: i32 = INIT_RAD as i32 * RADIUS_BIAS;
const RADIUS_DEC: i32 = 30;

const ALPHA_BIAS_SHIFT: i32 = 10;
const INIT_ALPHA: i32 = 1 << ALPHA_BIAS_SHIFT;

const RAD_BIAS_SHIFT: i32 = 8;
const RAD_BIAS: i32 = 1 << RAD_BIAS_SHIFT;
const ALPHA_RAD_B_SHIFT: i32 = ALPHA_BIAS_SHIFT + RAD_BIAS_SHIFT;
const ALPHA_RAD_BIAS: i32 = 1 << ALPHA_RAD_B_SHIFT;

/// One neuron: red, green, blue and the neuron's original position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Neuron {
    r: i32,
    g: i32,
    b: i32,
    index: usize,
}

/// A trained NeuQuant network.
#[derive(Debug, Clone)]
pub struct NeuQuant {
    network: Vec<Neuron>,
    /// For each green value, where to start searching the sorted network.
    net_index: [usize; 256],
    bias: Vec<i32>,
    freq: Vec<i32>,
    rad_power: [i32; INIT_RAD],
    sample_factor: usize,
}

impl NeuQuant {
    /// Train a network on `pixels`.
    ///
    /// `sample_factor` is the quality setting: 1 samples every pixel, 10 is
    /// a good speed/quality balance and larger values train faster on fewer
    /// samples. Values are clamped to 1..=[`MAX_SAMPLE_FACTOR`]. Alpha is
    /// ignored.
    pub fn new(sample_factor: usize, pixels: &[Colour]) -> Self {
        let mut network = Vec::with_capacity(NETWORK_SIZE);
        for i in 0..NETWORK_SIZE {
            let v = ((i << (NET_BIAS_SHIFT + 8)) / NETWORK_SIZE) as i32;
            network.push(Neuron {
                r: v,
                g: v,
                b: v,
                index: i,
            });
        }

        let mut nq = Self {
            network,
            net_index: [0; 256],
            bias: vec![0; NETWORK_SIZE],
            freq: vec![INT_BIAS / NETWORK_SIZE as i32; NETWORK_SIZE],
            rad_power: [0; INIT_RAD],
            sample_factor: sample_factor.clamp(1, MAX_SAMPLE_FACTOR),
        };
        nq.learn(pixels);
        nq.unbias();
        nq.build_index();
        nq
    }

    /// Palette colours, indexed by neuron (the index [`NeuQuant::index_of`]
    /// returns).
    pub fn colour_map(&self) -> Vec<Colour> {
        let mut map = vec![Colour::BLACK; NETWORK_SIZE];
        for n in &self.network {
            map[n.index] = Colour::rgb(n.r as u8, n.g as u8, n.b as u8);
        }
        map
    }

    /// Palette index of the neuron nearest to `colour` (city-block distance).
    pub fn index_of(&self, colour: &Colour) -> u8 {
        let (r, g, b) = (colour.r as i32, colour.g as i32, colour.b as i32);
        let mut best_d = 1000;
        let mut best = 0;
        let mut i = self.net_index[colour.g as usize];
        let mut j = i as isize - 1;

        while i < NETWORK_SIZE || j >= 0 {
            if i < NETWORK_SIZE {
                let n = &self.network[i];
                let mut dist = n.g - g;
                if dist >= best_d {
                    i = NETWORK_SIZE;
                } else {
                    i += 1;
                    dist = dist.abs() + (n.r - r).abs();
                    if dist < best_d {
                        dist += (n.b - b).abs();
                        if dist < best_d {
                            best_d = dist;
                            best = n.index;
                        }
                    }
                }
            }
            if j >= 0 {
                let n = &self.network[j as usize];
                let mut dist = g - n.g;
                if dist >= best_d {
                    j = -1;
                } else {
                    j -= 1;
                    dist = dist.abs() + (n.r - r).abs();
                    if dist < best_d {
                        dist += (n.b - b).abs();
                        if dist < best_d {
                            best_d = dist;
                            best = n.index;
                        }
                    }
                }
            }
        }
        best as u8
    }

    fn learn(&mut self, pixels: &[Colour]) {
        let length_count = pixels.len() * 3;
        if length_count < MIN_PICTURE_BYTES {
            self.sample_factor = 1;
        }
        let alpha_dec = 30 + ((self.sample_factor as i32 - 1) / 3);
        let sample_pixels = length_count / (3 * self.sample_factor);
        let delta = (sample_pixels / LEARNING_CYCLES).max(1);
        let mut alpha = INIT_ALPHA;
        let mut radius = INIT_RADIUS;
        let mut rad = radius_to_rad(radius);
        self.set_rad_power(alpha, rad);

        let step = if length_count < MIN_PICTURE_BYTES {
            1
        } else if length_count % PRIME_1 != 0 {
            PRIME_1
        } else if length_count % PRIME_2 != 0 {
            PRIME_2
        } else if length_count % PRIME_3 != 0 {
            PRIME_3
        } else {
            PRIME_4
        };

        tracing::debug!(
            pixels = pixels.len(),
            samples = sample_pixels,
            sample_factor = self.sample_factor,
            "training NeuQuant network"
        );

        let mut pos = 0;
        for i in 1..=sample_pixels {
            let p = &pixels[pos];
            let r = (p.r as i32) << NET_BIAS_SHIFT;
            let g = (p.g as i32) << NET_BIAS_SHIFT;
            let b = (p.b as i32) << NET_BIAS_SHIFT;

            let winner = self.contest(r, g, b);
            self.alter_single(alpha, winner, r, g, b);
            if rad != 0 {
                self.alter_neighbours(rad, winner, r, g, b);
            }

            pos += step;
            if pos >= pixels.len() {
                pos -= pixels.len();
            }

            if i % delta == 0 {
                alpha -= alpha / alpha_dec;
                radius -= radius / RADIUS_DEC;
                rad = radius_to_rad(radius);
                self.set_rad_power(alpha, rad);
            }
        }
    }

    fn set_rad_power(&mut self, alpha: i32, rad: usize) {
        let rad_sq = (rad * rad) as i32;
        for (i, power) in self.rad_power.iter_mut().enumerate().take(rad) {
            let i_sq = (i * i) as i32;
            *power = alpha * (((rad_sq - i_sq) * RAD_BIAS) / rad_sq);
        }
    }

    /// Find the closest neuron, update frequencies and biases, and return
    /// the best neuron once bias is taken into account.
    fn contest(&mut self, r: i32, g: i32, b: i32) -> usize {
        let mut best_d = i32::MAX;
        let mut best_bias_d = i32::MAX;
        let mut best_pos = 0;
        let mut best_bias_pos = 0;

        for (i, n) in self.network.iter().enumerate() {
            let dist = (n.r - r).abs() + (n.g - g).abs() + (n.b - b).abs();
            if dist < best_d {
                best_d = dist;
                best_pos = i;
            }
            let bias_dist = dist - (self.bias[i] >> (INT_BIAS_SHIFT - NET_BIAS_SHIFT));
            if bias_dist < best_bias_d {
                best_bias_d = bias_dist;
                best_bias_pos = i;
            }
            let beta_freq = self.freq[i] >> BETA_SHIFT;
            self.freq[i] -= beta_freq;
            self.bias[i] += beta_freq << GAMMA_SHIFT;
        }
        self.freq[best_pos] += BETA;
        self.bias[best_pos] -= BETA_GAMMA;
        best_bias_pos
    }

    /// Move neuron `i` towards the sample by factor `alpha`.
    fn alter_single(&mut self, alpha: i32, i: usize, r: i32, g: i32, b: i32) {
        let n = &mut self.network[i];
        n.r -= (alpha * (n.r - r)) / INIT_ALPHA;
        n.g -= (alpha * (n.g - g)) / INIT_ALPHA;
        n.b -= (alpha * (n.b - b)) / INIT_ALPHA;
    }

    /// Move the neighbours of neuron `i` within `rad` towards the sample.
    fn alter_neighbours(&mut self, rad: usize, i: usize, r: i32, g: i32, b: i32) {
        let lo = i as isize - rad as isize;
        let lo = lo.max(-1);
        let hi = (i + rad).min(NETWORK_SIZE);

        let mut j = i + 1;
        let mut k = i as isize - 1;
        let mut m = 1;
        while j < hi || k > lo {
            let a = self.rad_power[m];
            m += 1;
            if j < hi {
                move_towards(&mut self.network[j], a, r, g, b);
                j += 1;
            }
            if k > lo {
                move_towards(&mut self.network[k as usize], a, r, g, b);
                k -= 1;
            }
        }
    }

    fn unbias(&mut self) {
        for (i, n) in self.network.iter_mut().enumerate() {
            n.r = (n.r >> NET_BIAS_SHIFT).clamp(0, 255);
            n.g = (n.g >> NET_BIAS_SHIFT).clamp(0, 255);
            n.b = (n.b >> NET_BIAS_SHIFT).clamp(0, 255);
            n.index = i;
        }
    }

    /// Selection-sort the network by green and record where each green value
    /// starts.
    fn build_index(&mut self) {
        let mut previous_col = 0usize;
        let mut start_pos = 0usize;

        for i in 0..NETWORK_SIZE {
            let mut small_pos = i;
            let mut small_val = self.network[i].g;
            for j in (i + 1)..NETWORK_SIZE {
                if self.network[j].g < small_val {
                    small_pos = j;
                    small_val = self.network[j].g;
                }
            }
            self.network.swap(i, small_pos);

            let small_val = small_val as usize;
            if small_val != previous_col {
                self.net_index[previous_col] = (start_pos + i) >> 1;
                for entry in &mut self.net_index[previous_col + 1..small_val] {
                    *entry = i;
                }
                previous_col = small_val;
                start_pos = i;
            }
        }
        self.net_index[previous_col] = (start_pos + MAX_NET_POS) >> 1;
        for entry in &mut self.net_index[previous_col + 1..] {
            *entry = MAX_NET_POS;
        }
    }
}

fn radius_to_rad(radius: i32) -> usize {
    let rad = radius >> RADIUS_BIAS_SHIFT;
    if rad <= 1 { 0 } else { rad as usize }
}

fn move_towards(n: &mut Neuron, a: i32, r: i32, g: i32, b: i32) {
    n.r -= (a * (n.r - r)) / ALPHA_RAD_BIAS;
    n.g -= (a * (n.g - g)) / ALPHA_RAD_BIAS;
    n.b -= (a * (n.b - b)) / ALPHA_RAD_BIAS;
}

/// [`ColourQuantizer`] producing a 256-colour NeuQuant palette.
#[derive(Debug, Clone, Copy)]
pub struct NeuQuantizer {
    sample_factor: usize,
}

impl NeuQuantizer {
    /// Create a quantizer with the given quality (sample factor, clamped to
    /// 1..=[`MAX_SAMPLE_FACTOR`]).
    pub fn new(quality: usize) -> Self {
        Self {
            sample_factor: quality.clamp(1, MAX_SAMPLE_FACTOR),
        }
    }
}

impl Default for NeuQuantizer {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ColourQuantizer for NeuQuantizer {
    fn quantize(&mut self, pixels: &[Colour]) -> Result<Quantized> {
        let nq = NeuQuant::new(self.sample_factor, pixels);
        let indices = map_pixels(pixels, |c| nq.index_of(c));
        Ok(Quantized {
            palette: nq.colour_map(),
            indices,
            transparent_index: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(n: usize) -> Vec<Colour> {
        (0..n)
            .map(|i| Colour::rgb((i % 256) as u8, ((i / 256) * 17 % 256) as u8, (i * 7 % 256) as u8))
            .collect()
    }

    #[test]
    fn test_extreme_quality_is_clamped() {
        let pixels = gradient(20_000);
        let nq = NeuQuant::new(usize::MAX, &pixels);
        assert_eq!(nq.sample_factor, MAX_SAMPLE_FACTOR);
        assert_eq!(nq.colour_map().len(), NETWORK_SIZE);

        let q = NeuQuantizer::new(usize::MAX).quantize(&pixels).unwrap();
        assert_eq!(q.indices.len(), pixels.len());
        assert_eq!(NeuQuantizer::new(0).sample_factor, 1);
    }

    #[test]
    fn test_palette_size() {
        let nq = NeuQuant::new(10, &gradient(20_000));
        assert_eq!(nq.colour_map().len(), NETWORK_SIZE);
    }

    #[test]
    fn test_net_index_monotonic() {
        let nq = NeuQuant::new(1, &gradient(5_000));
        for w in nq.network.windows(2) {
            assert!(w[0].g <= w[1].g);
        }
        for w in nq.net_index.windows(2) {
            assert!(w[0] <= w[1] || w[1] == MAX_NET_POS);
        }
    }

    #[test]
    fn test_learns_dominant_colours() {
        let mut pixels = vec![Colour::rgb(255, 0, 0); 3000];
        pixels.extend(vec![Colour::rgb(0, 0, 255); 3000]);
        let nq = NeuQuant::new(1, &pixels);
        let map = nq.colour_map();

        let red = map[nq.index_of(&Colour::rgb(255, 0, 0)) as usize];
        let blue = map[nq.index_of(&Colour::rgb(0, 0, 255)) as usize];
        assert!(red.distance_squared(&Colour::rgb(255, 0, 0)) < 1200);
        assert!(blue.distance_squared(&Colour::rgb(0, 0, 255)) < 1200);
    }

    #[test]
    fn test_index_of_matches_exhaustive_search() {
        let nq = NeuQuant::new(5, &gradient(10_000));
        let map = nq.colour_map();
        for c in gradient(10_000).iter().step_by(97) {
            let found = map[nq.index_of(c) as usize];
            let city = |m: &Colour| {
                (m.r as i32 - c.r as i32).abs()
                    + (m.g as i32 - c.g as i32).abs()
                    + (m.b as i32 - c.b as i32).abs()
            };
            let best = map.iter().map(city).min().unwrap();
            assert_eq!(city(&found), best);
        }
    }

    #[test]
    fn test_tiny_and_empty_inputs() {
        let nq = NeuQuant::new(30, &[Colour::WHITE]);
        assert_eq!(nq.colour_map().len(), NETWORK_SIZE);

        let q = NeuQuantizer::new(0).quantize(&[]).unwrap();
        assert_eq!(q.palette.len(), NETWORK_SIZE);
        assert!(q.indices.is_empty());
    }

    #[test]
    fn test_deterministic() {
        let pixels = gradient(8_000);
        let a = NeuQuantizer::new(10).quantize(&pixels).unwrap();
        let b = NeuQuantizer::new(10).quantize(&pixels).unwrap();
        assert_eq!(a, b);
    }
}

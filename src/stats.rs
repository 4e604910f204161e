//! Avalanche and bit-independence measurements.
//!
//! For each sample input, every input bit is flipped in turn and the output
//! is compared against the unflipped output.  A good hash flips each output
//! bit with probability one half, independently of every other output bit.

use std::{fmt, fs::File, path::Path};

use nanorand::{Rng, WyRand};

use crate::{config::Algorithm, digest::Digest};

/// Accumulated flip counts for one (function, input pattern) pairing.
pub struct Stats {
    pub input_bit_len: usize,
    pub output_bit_len: usize,

    /// Number of sample inputs seen.
    pub sample_count: usize,

    /// `input_bit_len * output_bit_len` flip counts, one row per input bit.
    /// Empty when avalanche wasn't measured.
    pub avalanche_chart: Vec<u32>,

    /// Per input bit, for every ordered pair of distinct output bits, the
    /// number of samples where both, neither, only the first, or only the
    /// second flipped.  Empty when BIC wasn't measured.
    pub bic_chart: Vec<[u32; 4]>,
}

/// Min/avg/max over a set of per-cell or per-row values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

impl Summary {
    /// What every summary reads when there is nothing to summarize.
    pub const EMPTY: Summary = Summary {
        min: 0.0,
        avg: 0.0,
        max: 0.0,
    };

    fn of(values: impl IntoIterator<Item = f64>) -> Self {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut count = 0usize;
        for v in values {
            min = min.min(v);
            max = max.max(v);
            sum += v;
            count += 1;
        }
        if count == 0 {
            return Summary::EMPTY;
        }
        Summary {
            min,
            avg: sum / count as f64,
            max,
        }
    }
}

impl Stats {
    pub fn new(input_bit_len: usize, output_bit_len: usize, avalanche: bool, bic: bool) -> Self {
        Self {
            input_bit_len,
            output_bit_len,
            sample_count: 0,
            avalanche_chart: if avalanche {
                vec![0; input_bit_len * output_bit_len]
            } else {
                Vec::new()
            },
            bic_chart: if bic {
                vec![[0; 4]; input_bit_len * Self::bic_stride(output_bit_len)]
            } else {
                Vec::new()
            },
        }
    }

    fn bic_stride(output_bit_len: usize) -> usize {
        output_bit_len * output_bit_len.saturating_sub(1)
    }

    pub fn flips(&self, in_bit: usize, out_bit: usize) -> u32 {
        self.avalanche_chart[in_bit * self.output_bit_len + out_bit]
    }

    pub fn row(&self, in_bit: usize) -> &[u32] {
        let start = in_bit * self.output_bit_len;
        &self.avalanche_chart[start..start + self.output_bit_len]
    }

    /// True until a sample has been accumulated.  Every summary of an empty
    /// `Stats` is [`Summary::EMPTY`].
    pub fn is_empty(&self) -> bool {
        self.sample_count == 0
    }

    fn probability(&self, flips: u32) -> f64 {
        debug_assert!(!self.is_empty());
        flips as f64 / self.sample_count as f64
    }

    /// Bias of every (input bit, output bit) cell: 0 is ideal, 1 means the
    /// output bit always or never flips.
    pub fn bias(&self) -> Summary {
        if self.is_empty() {
            return Summary::EMPTY;
        }
        Summary::of(
            self.avalanche_chart
                .iter()
                .map(|&flips| p_to_bias(self.probability(flips))),
        )
    }

    /// How many output bits' worth of change each input bit causes.
    pub fn row_diffusion(&self, in_bit: usize) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.row(in_bit)
            .iter()
            .map(|&flips| 1.0 - p_to_bias(self.probability(flips)))
            .sum()
    }

    pub fn row_entropy(&self, in_bit: usize) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.row(in_bit)
            .iter()
            .map(|&flips| p_to_entropy(self.probability(flips)))
            .sum()
    }

    pub fn diffusion(&self) -> Summary {
        Summary::of((0..self.input_bit_len).map(|i| self.row_diffusion(i)))
    }

    pub fn entropy(&self) -> Summary {
        Summary::of((0..self.input_bit_len).map(|i| self.row_entropy(i)))
    }

    fn bic_row(&self, in_bit: usize) -> &[[u32; 4]] {
        let stride = Self::bic_stride(self.output_bit_len);
        let start = in_bit * stride;
        &self.bic_chart[start..start + stride]
    }

    /// The four BIC quadrants of one input bit, each sorted ascending and
    /// then averaged over all output bit pairs, as fractions of the samples.
    /// Ideal is a quarter each.
    pub fn row_bic_quadrants(&self, in_bit: usize) -> [f64; 4] {
        let row = self.bic_row(in_bit);
        if row.is_empty() || self.is_empty() {
            return [0.0; 4];
        }
        let mut sum = [0u64; 4];
        for mut quadrants in row.iter().copied() {
            quadrants.sort_unstable();
            for (total, q) in sum.iter_mut().zip(quadrants) {
                *total += q as u64;
            }
        }
        let norm = (row.len() * self.sample_count) as f64;
        sum.map(|total| total as f64 / norm)
    }

    /// Sorted BIC quadrants: the worst row, the average, and the best row.
    /// The worst row pairs the smallest low quadrants with the largest high
    /// one.
    pub fn bic_quadrants(&self) -> [[f64; 4]; 3] {
        if self.input_bit_len == 0 || self.is_empty() {
            return [[0.0; 4]; 3];
        }
        let first = self.row_bic_quadrants(0);
        let mut worst = first;
        let mut avg = [0.0; 4];
        let mut best = first;
        for i in 0..self.input_bit_len {
            let q = self.row_bic_quadrants(i);
            worst[0] = worst[0].min(q[0]);
            worst[1] = worst[1].min(q[1]);
            worst[2] = worst[2].min(q[2]);
            worst[3] = worst[3].max(q[3]);
            for (a, v) in avg.iter_mut().zip(q) {
                *a += v;
            }
            if q[0] > best[0] {
                best = q;
            }
        }
        let n = self.input_bit_len as f64;
        [worst, avg.map(|a| a / n), best]
    }

    /// Writes the avalanche chart as a grayscale image, one row per input
    /// bit: mid-gray is ideal, black never flips, white always flips.
    pub fn write_avalanche_png<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let mut pixels = Vec::with_capacity(self.avalanche_chart.len() * 4);
        let samples = self.sample_count.max(1) as u64;
        for &flips in &self.avalanche_chart {
            let v = (flips as u64 * 255 / samples).min(255) as u8;
            pixels.extend_from_slice(&[v, v, v, 255]);
        }

        png_encode_mini::write_rgba_from_u8(
            &mut File::create(path.as_ref())?,
            &pixels,
            self.output_bit_len as u32,
            self.input_bit_len as u32,
        )
    }
}

/// The report printed by the `bias` tool.
impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "    No samples.");
        }

        if !self.avalanche_chart.is_empty() {
            let bias = self.bias();
            let diffusion = self.diffusion();
            let entropy = self.entropy();
            writeln!(f, "    Bias:")?;
            writeln!(f, "        Min: {:0.2}", bias.min)?;
            writeln!(f, "        Avg: {:0.2}", bias.avg)?;
            writeln!(f, "        Max: {:0.2}", bias.max)?;
            writeln!(
                f,
                "    Input Bit Diffusion (digest size = {} bits):",
                self.output_bit_len
            )?;
            writeln!(f, "        Min: {:0.1} bits", diffusion.min)?;
            writeln!(f, "        Avg: {:0.1} bits", diffusion.avg)?;
            writeln!(f, "        Max: {:0.1} bits", diffusion.max)?;
            writeln!(f, "    Input Bit Diffusion Entropy:")?;
            writeln!(f, "        Min: {:0.1} bits", entropy.min)?;
            writeln!(f, "        Avg: {:0.1} bits", entropy.avg)?;
            writeln!(f, "        Max: {:0.1} bits", entropy.max)?;
        }

        if !self.bic_chart.is_empty() {
            writeln!(f, "    BIC quadrants (sorted):")?;
            let [worst, avg, best] = self.bic_quadrants();
            for (label, q) in [("Wrst", worst), (" Avg", avg), ("Best", best)] {
                writeln!(
                    f,
                    "        {label}: [{:0.4}, {:0.4}, {:0.4}, {:0.4}]",
                    q[0], q[1], q[2], q[3]
                )?;
            }
        }

        Ok(())
    }
}

/// How sample inputs are generated.  All patterns are deterministic in the
/// sample index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPattern {
    /// Uniformly random bytes.
    Random,
    /// The sample index as a little-endian integer, zero padded.
    Counting,
    /// All zeros but one bit, walking through every bit position.
    SingleBit,
    /// All zeros but up to this many randomly placed bits.
    SparseBits(usize),
}

impl InputPattern {
    pub const ALL: [InputPattern; 4] = [
        InputPattern::Random,
        InputPattern::Counting,
        InputPattern::SparseBits(8),
        InputPattern::SingleBit,
    ];

    pub fn name(self) -> String {
        match self {
            InputPattern::Random => "random".to_string(),
            InputPattern::Counting => "counting".to_string(),
            InputPattern::SingleBit => "single-bit".to_string(),
            InputPattern::SparseBits(n) => format!("{n} random bits"),
        }
    }

    /// Rounds to run for an input of `input_len` bytes.  Single-bit inputs
    /// only have one sample per bit, so `default` doesn't apply to them and
    /// their statistics are noisier by nature.
    pub fn rounds(self, input_len: usize, default: usize) -> usize {
        match self {
            InputPattern::SingleBit => input_len * 8,
            _ => default,
        }
    }

    /// Overwrites `bytes` with sample number `index`.
    pub fn fill(self, index: usize, bytes: &mut [u8]) {
        bytes.fill(0);
        if bytes.is_empty() {
            return;
        }
        match self {
            InputPattern::Random => {
                let mut rng = WyRand::new_seed(mix64(index as u64));
                rng.fill_bytes(bytes);
            }
            InputPattern::Counting => {
                let counter = (index as u64).to_le_bytes();
                let n = bytes.len().min(counter.len());
                bytes[..n].copy_from_slice(&counter[..n]);
            }
            InputPattern::SingleBit => {
                let bit = index % (bytes.len() * 8);
                bytes[bit / 8] = 1 << (bit % 8);
            }
            InputPattern::SparseBits(n) => {
                let mut rng = WyRand::new_seed(mix64(index as u64 ^ mix64(n as u64)));
                for _ in 0..n {
                    let bit = rng.generate_range(0..(bytes.len() * 8));
                    bytes[bit / 8] |= 1 << (bit % 8);
                }
            }
        }
    }
}

/// Measures `mix`, a function from `input_len` bytes to `output_len` bytes,
/// over `rounds` samples of `pattern`.
///
/// `mix` must overwrite its whole output buffer on every call.
pub fn compute_stats<F>(
    pattern: InputPattern,
    mix: F,
    input_len: usize,
    output_len: usize,
    rounds: usize,
    avalanche: bool,
    bic: bool,
) -> Stats
where
    F: FnMut(&[u8], &mut [u8]),
{
    compute_stats_with_progress(
        pattern,
        mix,
        input_len,
        output_len,
        rounds,
        avalanche,
        bic,
        |_, _| {},
    )
}

/// Like [`compute_stats`], calling `progress(round, rounds)` before each
/// round.
#[allow(clippy::too_many_arguments)]
pub fn compute_stats_with_progress<F, P>(
    pattern: InputPattern,
    mut mix: F,
    input_len: usize,
    output_len: usize,
    rounds: usize,
    avalanche: bool,
    bic: bool,
    mut progress: P,
) -> Stats
where
    F: FnMut(&[u8], &mut [u8]),
    P: FnMut(usize, usize),
{
    let in_bits = input_len * 8;
    let out_bits = output_len * 8;
    let mut stats = Stats::new(in_bits, out_bits, avalanche, bic);

    let mut input = vec![0u8; input_len];
    let mut output = vec![0u8; output_len];
    let mut tweaked_input = vec![0u8; input_len];
    let mut tweaked_output = vec![0u8; output_len];
    let mut flipped = vec![false; out_bits];

    for round in 0..rounds {
        progress(round, rounds);

        pattern.fill(round, &mut input);
        mix(&input, &mut output);

        for in_bit in 0..in_bits {
            tweaked_input.copy_from_slice(&input);
            tweaked_input[in_bit / 8] ^= 1 << (in_bit % 8);
            mix(&tweaked_input, &mut tweaked_output);

            for (out_bit, f) in flipped.iter_mut().enumerate() {
                let mask = 1 << (out_bit % 8);
                *f = (output[out_bit / 8] ^ tweaked_output[out_bit / 8]) & mask != 0;
            }

            if avalanche {
                let row = in_bit * out_bits;
                for (count, &f) in stats.avalanche_chart[row..row + out_bits]
                    .iter_mut()
                    .zip(&flipped)
                {
                    *count += f as u32;
                }
            }

            if bic {
                let stride = Stats::bic_stride(out_bits);
                for a in 0..out_bits {
                    for j in 0..(out_bits - 1) {
                        let b = (a + j + 1) % out_bits;
                        let quadrant = match (flipped[a], flipped[b]) {
                            (true, true) => 0,
                            (false, false) => 1,
                            (true, false) => 2,
                            (false, true) => 3,
                        };
                        stats.bic_chart[in_bit * stride + a * (out_bits - 1) + j][quadrant] += 1;
                    }
                }
            }
        }

        stats.sample_count += 1;
    }

    stats
}

/// Adapts an algorithm to the `mix` shape [`compute_stats`] expects.  The
/// output buffer must be the algorithm's digest size.
pub fn algorithm_mix(algorithm: Algorithm, seed: u64) -> impl Fn(&[u8], &mut [u8]) {
    move |input: &[u8], output: &mut [u8]| match algorithm.hash(seed, input) {
        Digest::U64(v) => output.copy_from_slice(&v.to_le_bytes()),
        Digest::U128(v) => output.copy_from_slice(&v.to_le_bytes()),
    }
}

pub fn p_to_bias(p: f64) -> f64 {
    (p * 2.0 - 1.0).abs()
}

/// Shannon entropy of a bit that is set with probability `p`.
pub fn p_to_entropy(p: f64) -> f64 {
    if p <= 0.0 || p >= 1.0 {
        0.0
    } else {
        let q = 1.0 - p;
        -(p * p.log2()) - (q * q.log2())
    }
}

/// 64-bit bijective bit mixer, for seeding the sample generators.
fn mix64(mut n: u64) -> u64 {
    // Break zero sensitivity.
    n ^= 0x7be355f7c2e736d2;

    // Stafford's "Mix13".
    n ^= n >> 30;
    n = n.wrapping_mul(0xbf58476d1ce4e5b9);
    n ^= n >> 27;
    n = n.wrapping_mul(0x94d049bb133111eb);
    n ^= n >> 31;

    n
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(input: &[u8], output: &mut [u8]) {
        output.copy_from_slice(input);
    }

    #[test]
    fn identity_has_no_avalanche() {
        let stats = compute_stats(InputPattern::Random, identity, 8, 8, 16, true, false);
        assert_eq!(stats.sample_count, 16);
        for i in 0..64 {
            for o in 0..64 {
                assert_eq!(stats.flips(i, o), if i == o { 16 } else { 0 });
            }
        }
        let bias = stats.bias();
        assert_eq!((bias.min, bias.avg, bias.max), (1.0, 1.0, 1.0));
        assert_eq!(stats.diffusion().max, 0.0);
        assert_eq!(stats.entropy().max, 0.0);
        assert!(stats.bic_chart.is_empty());
    }

    #[test]
    fn mum_avalanches() {
        let stats = compute_stats(
            InputPattern::Random,
            algorithm_mix(Algorithm::Mum64, 0),
            16,
            8,
            1000,
            true,
            false,
        );
        assert!(stats.bias().avg < 0.1, "{:?}", stats.bias());
        assert!(stats.diffusion().avg > 58.0, "{:?}", stats.diffusion());
    }

    #[test]
    fn bic_quadrants_cover_every_sample() {
        let stats = compute_stats(
            InputPattern::Counting,
            algorithm_mix(Algorithm::Metro64V1, 1),
            4,
            8,
            10,
            false,
            true,
        );
        assert!(stats.avalanche_chart.is_empty());
        assert_eq!(stats.bic_chart.len(), 32 * 64 * 63);
        for quadrants in &stats.bic_chart {
            assert_eq!(quadrants.iter().sum::<u32>(), 10);
        }
        let [worst, avg, _] = stats.bic_quadrants();
        assert!((avg.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(worst[3] >= avg[3]);
    }

    #[test]
    fn zero_rounds_gives_empty_summaries() {
        let stats = compute_stats(
            InputPattern::Random,
            algorithm_mix(Algorithm::Mum64, 0),
            4,
            8,
            0,
            true,
            true,
        );
        assert!(stats.is_empty());
        assert_eq!(stats.bias(), Summary::EMPTY);
        assert_eq!(stats.diffusion(), Summary::EMPTY);
        assert_eq!(stats.entropy(), Summary::EMPTY);
        assert_eq!(stats.bic_quadrants(), [[0.0; 4]; 3]);

        let report = stats.to_string();
        assert_eq!(report, "    No samples.\n");
        assert!(!report.contains("NaN"));
        assert!(!report.contains("inf"));
    }

    #[test]
    fn best_bic_row_is_a_real_row() {
        // Only output bit 0 depends on the input, and any input flip flips
        // it, so every sorted pair has all samples in the top quadrant and
        // the lowest quadrant is zero in every row.
        let parity = |input: &[u8], output: &mut [u8]| {
            let ones: u32 = input.iter().map(|b| b.count_ones()).sum();
            output[0] = (ones & 1) as u8 | 0xfe;
        };
        let stats = compute_stats(InputPattern::Counting, parity, 2, 1, 8, false, true);
        let [worst, avg, best] = stats.bic_quadrants();
        let row = stats.row_bic_quadrants(0);
        assert_eq!(best, row);
        assert_eq!(avg, row);
        assert_eq!(worst, row);
        assert_eq!(best[3] + best[2], 1.0);
    }

    #[test]
    fn algorithm_mix_writes_le_digest() {
        for algorithm in Algorithm::ALL {
            let mut output = vec![0u8; algorithm.digest_size_bytes()];
            algorithm_mix(algorithm, 7)(b"mix", &mut output);
            assert_eq!(output, algorithm.hash(7, b"mix").to_le_bytes());
        }
    }

    #[test]
    fn patterns() {
        let mut a = [0xffu8; 3];
        InputPattern::SingleBit.fill(9, &mut a);
        assert_eq!(a, [0, 2, 0]);
        InputPattern::Counting.fill(0x0102, &mut a);
        assert_eq!(a, [2, 1, 0]);
        InputPattern::SparseBits(2).fill(5, &mut a);
        let ones: u32 = a.iter().map(|b| b.count_ones()).sum();
        assert!((1..=2).contains(&ones));

        let mut b = [0u8; 32];
        let mut c = [0u8; 32];
        InputPattern::Random.fill(3, &mut b);
        InputPattern::Random.fill(3, &mut c);
        assert_eq!(b, c);
        InputPattern::Random.fill(4, &mut c);
        assert_ne!(b, c);

        assert_eq!(InputPattern::SingleBit.rounds(16, 1000), 128);
        assert_eq!(InputPattern::Random.rounds(16, 1000), 1000);
    }

    #[test]
    fn entropy_and_bias_endpoints() {
        assert_eq!(p_to_bias(0.5), 0.0);
        assert_eq!(p_to_bias(0.0), 1.0);
        assert_eq!(p_to_entropy(0.5), 1.0);
        assert_eq!(p_to_entropy(1.0), 0.0);
    }

    #[test]
    fn report_and_png() {
        let stats = compute_stats(InputPattern::Random, identity, 2, 2, 4, true, true);
        let report = stats.to_string();
        assert!(report.contains("Bias:"));
        assert!(report.contains("BIC quadrants"));

        let path = std::env::temp_dir().join(format!("metromum-stats-{}.png", std::process::id()));
        stats.write_avalanche_png(&path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}

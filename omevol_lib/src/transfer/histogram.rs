use crate::common::ValueRange;

use super::gradient::MIN_WINDOW;

pub const DEFAULT_BIN_COUNT: usize = 512;

/// Intensity histogram of one channel
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub bins: Vec<u32>,
    /// Index of the most populated bin
    pub max_bin: usize,
    /// Raw intensity range covered by the bins
    pub range: ValueRange,
    sample_count: u64,
}

impl Histogram {
    pub fn new(data: &[u16], bin_count: usize) -> Histogram {
        let bin_count = usize::max(bin_count, 1);
        let range = ValueRange::from_samples(data.iter());

        let mut histogram = Histogram {
            bins: vec![0; bin_count],
            max_bin: 0,
            range,
            sample_count: data.len() as u64,
        };

        for &sample in data {
            let bin = histogram.bin_of(sample as f32);
            histogram.bins[bin] += 1;
        }

        histogram.max_bin = histogram
            .bins
            .iter()
            .enumerate()
            .max_by_key(|&(i, count)| (*count, std::cmp::Reverse(i)))
            .map(|(i, _)| i)
            .unwrap_or(0);

        histogram
    }

    pub fn bin_count(&self) -> usize {
        self.bins.len()
    }

    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    /// Bin containing raw intensity `value`, clamped to the histogram range
    pub fn bin_of(&self, value: f32) -> usize {
        let n = self.range.normalize(value);
        let last = self.bins.len() - 1;
        usize::min((n * self.bins.len() as f32) as usize, last)
    }

    /// Normalized intensity at the lower edge of `bin`
    fn bin_position(&self, bin: usize) -> f32 {
        bin as f32 / self.bins.len() as f32
    }

    /// First bin where the cumulative count reaches `pct` of all samples
    fn percentile_bin(&self, pct: f32) -> usize {
        let threshold = (pct.clamp(0.0, 1.0) as f64 * self.sample_count as f64).ceil() as u64;
        let mut cumulative = 0u64;
        for (i, &count) in self.bins.iter().enumerate() {
            cumulative += count as u64;
            if cumulative >= threshold && cumulative > 0 {
                return i;
            }
        }
        self.bins.len() - 1
    }

    /// Window and level, in normalized intensity, spanning the `pct_low` and `pct_high` percentiles
    pub fn compute_window_level_from_percentiles(&self, pct_low: f32, pct_high: f32) -> (f32, f32) {
        let (pct_low, pct_high) = if pct_low <= pct_high {
            (pct_low, pct_high)
        } else {
            (pct_high, pct_low)
        };

        let low = self.bin_position(self.percentile_bin(pct_low));
        let high = self.bin_position(self.percentile_bin(pct_high) + 1);

        let window = f32::max(high - low, MIN_WINDOW);
        let level = low + window * 0.5;
        (window, level)
    }
}

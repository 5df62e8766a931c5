use crate::{
    common::ValueRange,
    transfer::{GradientStops, Histogram, DEFAULT_BIN_COUNT},
};

/// Number of entries of the opacity lookup table
pub const LUT_SIZE: usize = 256;

/// Percentiles used for freshly loaded channels
pub const DEFAULT_PERCENTILES: (f32, f32) = (0.5, 0.98);

/// One channel of a multi-channel volume, with its own transfer function
#[derive(Debug, Clone)]
pub struct Channel {
    pub name: String,
    data: Vec<u16>,
    range: ValueRange,
    histogram: Histogram,
    stops: GradientStops,
    lut: Vec<f32>,
}

impl Channel {
    pub fn new(name: impl Into<String>, data: Vec<u16>) -> Channel {
        let histogram = Histogram::new(&data, DEFAULT_BIN_COUNT);
        let range = histogram.range;
        let stops = GradientStops::window_level(1.0, 0.5);
        let mut channel = Channel {
            name: name.into(),
            data,
            range,
            histogram,
            lut: stops.to_lut(LUT_SIZE),
            stops,
        };
        channel.generate_percentiles(DEFAULT_PERCENTILES.0, DEFAULT_PERCENTILES.1);
        channel
    }

    pub fn data(&self) -> &[u16] {
        &self.data
    }

    pub fn range(&self) -> ValueRange {
        self.range
    }

    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    pub fn stops(&self) -> &GradientStops {
        &self.stops
    }

    pub fn lut(&self) -> &[f32] {
        &self.lut
    }

    /// Map raw intensity to `<0;1>` relative to the channel range
    pub fn normalize(&self, raw: f32) -> f32 {
        self.range.normalize(raw)
    }

    /// Opacity for normalized intensity, linearly interpolated between table entries
    pub fn lut_lookup(&self, normalized: f32) -> f32 {
        lut_lookup(&self.lut, normalized)
    }

    pub fn generate_window_level(&mut self, window: f32, level: f32) {
        self.set_stops(GradientStops::window_level(window, level));
    }

    pub fn generate_isovalue(&mut self, isovalue: f32, isorange: f32) {
        self.set_stops(GradientStops::isovalue(isovalue, isorange));
    }

    pub fn generate_percentiles(&mut self, pct_low: f32, pct_high: f32) {
        let (window, level) = self
            .histogram
            .compute_window_level_from_percentiles(pct_low, pct_high);
        self.generate_window_level(window, level);
    }

    pub fn generate_control_points(&mut self, stops: GradientStops) {
        self.set_stops(stops);
    }

    fn set_stops(&mut self, stops: GradientStops) {
        self.lut = stops.to_lut(LUT_SIZE);
        self.stops = stops;
    }
}

/// Sample a lookup table covering `<0;1>`
pub fn lut_lookup(lut: &[f32], normalized: f32) -> f32 {
    let last = match lut.len().checked_sub(1) {
        Some(last) => last,
        None => return 0.0,
    };
    let pos = normalized.clamp(0.0, 1.0) * last as f32;
    let index = pos as usize;
    if index >= last {
        return lut[last];
    }
    let t = pos.fract();
    lut[index] * (1.0 - t) + lut[index + 1] * t
}

#[cfg(test)]
mod test {

    use approx::assert_relative_eq;

    use super::*;

    fn ramp_channel() -> Channel {
        let data: Vec<u16> = (0..=1000).collect();
        Channel::new("ramp", data)
    }

    #[test]
    fn new_channel_uses_percentiles() {
        let channel = ramp_channel();

        // below the median everything is transparent
        assert_relative_eq!(channel.lut_lookup(0.2), 0.0);
        assert!(channel.lut_lookup(1.0) > 0.9);
        assert_eq!(channel.lut().len(), LUT_SIZE);
    }

    #[test]
    fn window_level_lut() {
        let mut channel = ramp_channel();

        channel.generate_window_level(0.5, 0.5);

        assert_relative_eq!(channel.lut_lookup(0.0), 0.0);
        assert_relative_eq!(channel.lut_lookup(0.5), 0.5, epsilon = 0.01);
        assert_relative_eq!(channel.lut_lookup(1.0), 1.0);
    }

    #[test]
    fn isovalue_lut() {
        let mut channel = ramp_channel();

        channel.generate_isovalue(0.5, 0.2);

        assert_relative_eq!(channel.lut_lookup(0.2), 0.0);
        assert_relative_eq!(channel.lut_lookup(0.5), 1.0);
        assert_relative_eq!(channel.lut_lookup(0.8), 0.0);
    }

    #[test]
    fn normalize_uses_data_range() {
        let data = vec![100u16, 200, 300];
        let channel = Channel::new("c", data);

        assert_relative_eq!(channel.normalize(200.0), 0.5);
        assert_relative_eq!(channel.normalize(50.0), 0.0);
    }

    #[test]
    fn constant_channel_is_visible() {
        let channel = Channel::new("flat", vec![300u16; 27]);

        assert_relative_eq!(channel.normalize(300.0), 1.0);
        assert_relative_eq!(channel.lut_lookup(channel.normalize(300.0)), 1.0, epsilon = 1e-4);
        // outside of the volume
        assert_relative_eq!(channel.lut_lookup(channel.normalize(0.0)), 0.0);
    }

    #[test]
    fn empty_channel_stays_transparent() {
        let channel = Channel::new("zeros", vec![0u16; 27]);

        assert_relative_eq!(channel.lut_lookup(channel.normalize(0.0)), 0.0);
    }

    #[test]
    fn lookup_interpolates() {
        let lut = [0.0, 1.0];

        assert_relative_eq!(lut_lookup(&lut, 0.25), 0.25);
        assert_relative_eq!(lut_lookup(&lut, 1.5), 1.0);
    }
}

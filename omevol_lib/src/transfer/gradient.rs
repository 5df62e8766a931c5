use crate::color::{self, RGBA};

use super::GradientError;

/// Smallest accepted window, keeps window/level stops from collapsing
pub const MIN_WINDOW: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Normalized intensity `<0;1>`
    pub position: f32,
    /// R G B A -- all in <0;1>
    pub color: RGBA,
}

impl GradientStop {
    pub fn new(position: f32, color: RGBA) -> GradientStop {
        GradientStop { position, color }
    }

    fn gray(position: f32, v: f32) -> GradientStop {
        let v = v.clamp(0.0, 1.0);
        GradientStop::new(position.clamp(0.0, 1.0), color::mono(v, v))
    }

    fn transparent(position: f32) -> GradientStop {
        GradientStop::new(position.clamp(0.0, 1.0), color::zero())
    }

    fn white(position: f32) -> GradientStop {
        GradientStop::new(position.clamp(0.0, 1.0), color::mono(1.0, 1.0))
    }
}

/// Piecewise linear mapping from normalized intensity to color and opacity
///
/// Stops are kept sorted by position. Several stops may share a position,
/// which produces a step in the function.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientStops {
    stops: Vec<GradientStop>,
}

impl GradientStops {
    /// Validates that positions are finite, inside `<0;1>` and non-decreasing
    pub fn new(stops: Vec<GradientStop>) -> Result<GradientStops, GradientError> {
        if stops.is_empty() {
            return Err(GradientError::Empty);
        }

        let mut previous = 0.0;
        for (index, stop) in stops.iter().enumerate() {
            let position = stop.position;
            if !position.is_finite() || !(0.0..=1.0).contains(&position) {
                return Err(GradientError::PositionOutOfRange { index, position });
            }
            if position < previous {
                return Err(GradientError::NotMonotonic { index });
            }
            previous = position;
        }

        Ok(GradientStops { stops })
    }

    /// Sorts stops by position first, stops with equal position keep their order
    pub fn from_unsorted(mut stops: Vec<GradientStop>) -> Result<GradientStops, GradientError> {
        stops.sort_by(|a, b| a.position.total_cmp(&b.position));
        GradientStops::new(stops)
    }

    /// Stops of a window/level ramp
    ///
    /// Ramp goes from transparent at `level - window/2` to white at `level + window/2`.
    pub fn window_level(window: f32, level: f32) -> GradientStops {
        let window = f32::max(window, MIN_WINDOW);
        let low = level - window * 0.5;
        let high = level + window * 0.5;

        let mut stops = Vec::with_capacity(4);
        if low <= 0.0 {
            stops.push(GradientStop::gray(0.0, -low / (high - low)));
        } else {
            stops.push(GradientStop::transparent(0.0));
            stops.push(GradientStop::transparent(low));
        }
        if high >= 1.0 {
            stops.push(GradientStop::gray(1.0, (1.0 - low) / (high - low)));
        } else {
            stops.push(GradientStop::white(high));
            stops.push(GradientStop::white(1.0));
        }

        GradientStops { stops }
    }

    /// Opaque band of width `isorange` around `isovalue`
    pub fn isovalue(isovalue: f32, isorange: f32) -> GradientStops {
        let low = isovalue - isorange * 0.5;
        let high = isovalue + isorange * 0.5;

        let stops = vec![
            GradientStop::transparent(0.0),
            GradientStop::transparent(low),
            GradientStop::white(low),
            GradientStop::white(high),
            GradientStop::transparent(high),
            GradientStop::transparent(1.0),
        ];

        GradientStops { stops }
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Color at normalized intensity `x`
    pub fn evaluate(&self, x: f32) -> RGBA {
        let first = self.stops[0];
        let last = self.stops[self.stops.len() - 1];

        if x < first.position {
            return first.color;
        }
        if x >= last.position {
            return last.color;
        }

        // first stop strictly after x, exists because x < last.position
        let next = self.stops.partition_point(|s| s.position <= x);
        let a = self.stops[next - 1];
        let b = self.stops[next];

        let t = (x - a.position) / (b.position - a.position);
        a.color.lerp(&b.color, t)
    }

    /// Opacity sampled at `size` evenly spaced points of `<0;1>`
    pub fn to_lut(&self, size: usize) -> Vec<f32> {
        if size == 1 {
            return vec![self.evaluate(0.0).w];
        }
        let step = 1.0 / (size as f32 - 1.0);
        (0..size).map(|i| self.evaluate(i as f32 * step).w).collect()
    }
}

use std::{cmp::min, ops::Range};

use nalgebra::{point, Point2, Vector2};

/// Rectangle on the image plane, in `<0;1>x<0;1>` screen coordinates
#[derive(Debug, Clone, Copy)]
pub struct ViewportBox {
    pub lower: Point2<f32>,
    pub upper: Point2<f32>,
}

impl ViewportBox {
    /// Inverted (empty) viewport, grows with `add_point`
    pub fn new() -> Self {
        Self {
            lower: point![f32::INFINITY, f32::INFINITY],
            upper: point![f32::NEG_INFINITY, f32::NEG_INFINITY],
        }
    }

    /// Whole screen
    pub fn full() -> Self {
        Self {
            lower: point![0.0, 0.0],
            upper: point![1.0, 1.0],
        }
    }

    pub fn add_point(&mut self, x: f32, y: f32) {
        self.upper.x = f32::max(self.upper.x, x);
        self.upper.y = f32::max(self.upper.y, y);
        self.lower.x = f32::min(self.lower.x, x);
        self.lower.y = f32::min(self.lower.y, y);
    }

    pub fn size(&self) -> Vector2<f32> {
        self.upper - self.lower
    }

    /// Pixel ranges covered by the viewport, clamped to the image
    pub fn get_pixel_range(&self, resolution: (usize, usize)) -> (Range<usize>, Range<usize>) {
        let (width, height) = resolution;
        let width_f = width as f32;
        let height_f = height as f32;

        if self.upper.x < 0.0 || self.upper.y < 0.0 || self.lower.x > 1.0 || self.lower.y > 1.0 {
            return (0..0, 0..0);
        }

        let start_x = f32::floor(f32::max(self.lower.x, 0.0) * width_f) as usize;
        let start_y = f32::floor(f32::max(self.lower.y, 0.0) * height_f) as usize;

        let end_x = f32::ceil(f32::min(self.upper.x, 1.0) * width_f) as usize;
        let end_y = f32::ceil(f32::min(self.upper.y, 1.0) * height_f) as usize;

        (
            min(start_x, width)..min(end_x, width),
            min(start_y, height)..min(end_y, height),
        )
    }
}

impl Default for ViewportBox {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn viewport_grows() {
        let mut vp = ViewportBox::new();

        vp.add_point(0.5, 0.5);

        assert_eq!(vp.lower, point![0.5, 0.5]);
        assert_eq!(vp.upper, point![0.5, 0.5]);

        vp.add_point(0.3, 0.7);

        assert_eq!(vp.lower, point![0.3, 0.5]);
        assert_eq!(vp.upper, point![0.5, 0.7]);
    }

    #[test]
    fn pixel_range_clamped() {
        let vp = ViewportBox {
            lower: point![-0.5, 0.25],
            upper: point![0.5, 2.0],
        };

        let (xs, ys) = vp.get_pixel_range((100, 40));

        assert_eq!(xs, 0..50);
        assert_eq!(ys, 10..40);
    }

    #[test]
    fn offscreen_is_empty() {
        let vp = ViewportBox {
            lower: point![1.5, 0.0],
            upper: point![2.0, 1.0],
        };

        let (xs, ys) = vp.get_pixel_range((100, 100));

        assert!(xs.is_empty());
        assert!(ys.is_empty());
    }
}

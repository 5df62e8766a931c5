//! Color types
//!
//! [`RGBA`] is used for transfer function stops, components in `<0;1>`.
//! [`ColorRgbHdr`] is unbounded linear RGB used while shading and accumulating.

use std::ops::{Add, AddAssign, Div, DivAssign, Index, Mul, MulAssign};

use nalgebra::{vector, Vector4};
use serde::{Deserialize, Serialize};

pub type RGBA = Vector4<f32>;

pub fn new(r: f32, g: f32, b: f32, a: f32) -> RGBA {
    vector![r, g, b, a]
}

pub fn zero() -> RGBA {
    vector![0.0, 0.0, 0.0, 0.0]
}

pub fn mono(v: f32, opacity: f32) -> RGBA {
    vector![v, v, v, opacity]
}

/// Unpack `0xAARRGGBB`
pub fn from_argb32(argb: u32) -> RGBA {
    let channel = |shift: u32| ((argb >> shift) & 0xff) as f32 / 255.0;
    vector![channel(16), channel(8), channel(0), channel(24)]
}

/// Linear HDR color
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ColorRgbHdr {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

// sRGB primaries, D65 white point
const XYZ_TO_R: [f32; 3] = [3.240479, -1.537150, -0.498535];
const XYZ_TO_G: [f32; 3] = [-0.969256, 1.875991, 0.041556];
const XYZ_TO_B: [f32; 3] = [0.055648, -0.204043, 1.057311];

const RGB_TO_X: [f32; 3] = [0.412453, 0.357580, 0.180423];
const RGB_TO_Y: [f32; 3] = [0.212671, 0.715160, 0.072169];
const RGB_TO_Z: [f32; 3] = [0.019334, 0.119193, 0.950227];

impl ColorRgbHdr {
    pub const BLACK: ColorRgbHdr = ColorRgbHdr {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    pub const WHITE: ColorRgbHdr = ColorRgbHdr {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    pub const fn new(r: f32, g: f32, b: f32) -> ColorRgbHdr {
        ColorRgbHdr { r, g, b }
    }

    pub const fn splat(v: f32) -> ColorRgbHdr {
        ColorRgbHdr { r: v, g: v, b: v }
    }

    pub fn is_black(&self) -> bool {
        self.r == 0.0 && self.g == 0.0 && self.b == 0.0
    }

    pub fn pow(&self, e: f32) -> ColorRgbHdr {
        ColorRgbHdr::new(self.r.powf(e), self.g.powf(e), self.b.powf(e))
    }

    pub fn max_component(&self) -> f32 {
        f32::max(self.r, f32::max(self.g, self.b))
    }

    pub fn map(&self, f: impl Fn(f32) -> f32) -> ColorRgbHdr {
        ColorRgbHdr::new(f(self.r), f(self.g), f(self.b))
    }

    pub fn from_xyz(x: f32, y: f32, z: f32) -> ColorRgbHdr {
        let dot = |w: &[f32; 3]| w[0] * x + w[1] * y + w[2] * z;
        ColorRgbHdr::new(dot(&XYZ_TO_R), dot(&XYZ_TO_G), dot(&XYZ_TO_B))
    }

    pub fn to_xyz(&self) -> [f32; 3] {
        let dot = |w: &[f32; 3]| w[0] * self.r + w[1] * self.g + w[2] * self.b;
        [dot(&RGB_TO_X), dot(&RGB_TO_Y), dot(&RGB_TO_Z)]
    }

    /// Relative luminance (Y of XYZ)
    pub fn luminance(&self) -> f32 {
        self.to_xyz()[1]
    }

    pub fn lerp(t: f32, c1: &ColorRgbHdr, c2: &ColorRgbHdr) -> ColorRgbHdr {
        let one_minus_t = 1.0 - t;
        ColorRgbHdr::new(
            one_minus_t * c1.r + t * c2.r,
            one_minus_t * c1.g + t * c2.g,
            one_minus_t * c1.b + t * c2.b,
        )
    }
}

impl From<[f32; 3]> for ColorRgbHdr {
    fn from(c: [f32; 3]) -> Self {
        ColorRgbHdr::new(c[0], c[1], c[2])
    }
}

impl Add for ColorRgbHdr {
    type Output = ColorRgbHdr;

    fn add(self, rhs: ColorRgbHdr) -> ColorRgbHdr {
        ColorRgbHdr::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl AddAssign for ColorRgbHdr {
    fn add_assign(&mut self, rhs: ColorRgbHdr) {
        self.r += rhs.r;
        self.g += rhs.g;
        self.b += rhs.b;
    }
}

impl Mul<f32> for ColorRgbHdr {
    type Output = ColorRgbHdr;

    fn mul(self, f: f32) -> ColorRgbHdr {
        ColorRgbHdr::new(self.r * f, self.g * f, self.b * f)
    }
}

impl Mul<ColorRgbHdr> for f32 {
    type Output = ColorRgbHdr;

    fn mul(self, c: ColorRgbHdr) -> ColorRgbHdr {
        c * self
    }
}

impl Mul for ColorRgbHdr {
    type Output = ColorRgbHdr;

    fn mul(self, rhs: ColorRgbHdr) -> ColorRgbHdr {
        ColorRgbHdr::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }
}

impl MulAssign<f32> for ColorRgbHdr {
    fn mul_assign(&mut self, f: f32) {
        self.r *= f;
        self.g *= f;
        self.b *= f;
    }
}

impl Div<f32> for ColorRgbHdr {
    type Output = ColorRgbHdr;

    fn div(self, f: f32) -> ColorRgbHdr {
        let inv = 1.0 / f;
        self * inv
    }
}

impl DivAssign<f32> for ColorRgbHdr {
    fn div_assign(&mut self, f: f32) {
        let inv = 1.0 / f;
        *self *= inv;
    }
}

impl Index<usize> for ColorRgbHdr {
    type Output = f32;

    fn index(&self, i: usize) -> &f32 {
        match i {
            0 => &self.r,
            1 => &self.g,
            2 => &self.b,
            _ => panic!("ColorRgbHdr index {i} out of range"),
        }
    }
}

use crate::color;

use super::{GradientError, GradientStop, GradientStops};

// (position, 0xAARRGGBB)
const PRESET_1: &[(f32, u32)] = &[
    (0.00, 0x00000000),
    (0.04, 0xff131360),
    (0.08, 0xff202ccc),
    (0.42, 0xff93d3f9),
    (0.51, 0xffb3e6ff),
    (0.73, 0xffffffec),
    (0.92, 0xff5353d9),
    (0.96, 0xff262666),
    (1.00, 0x00000000),
];

const PRESET_2: &[(f32, u32)] = &[
    (0.00, 0xffffffff),
    (0.11, 0xfff9ffa0),
    (0.13, 0xfff9ff99),
    (0.14, 0xfff3ff86),
    (0.49, 0xff93b353),
    (0.87, 0xff264619),
    (0.96, 0xff0c1306),
    (1.00, 0x00000000),
];

const PRESET_3: &[(f32, u32)] = &[
    (0.00, 0x00000000),
    (0.10, 0xffe0cc73),
    (0.17, 0xffc6a006),
    (0.46, 0xff600659),
    (0.72, 0xff0680ac),
    (0.92, 0xffb9d9e6),
    (1.00, 0x00000000),
];

// Reset, black to white
const PRESET_4: &[(f32, u32)] = &[(0.00, 0xff000000), (1.00, 0xffffffff)];

impl GradientStops {
    /// Built-in gradients, numbered from 1
    pub fn preset(number: u32) -> Result<GradientStops, GradientError> {
        let table = match number {
            1 => PRESET_1,
            2 => PRESET_2,
            3 => PRESET_3,
            4 => PRESET_4,
            _ => return Err(GradientError::UnknownPreset(number)),
        };

        let stops = table
            .iter()
            .map(|&(position, argb)| GradientStop::new(position, color::from_argb32(argb)))
            .collect();
        GradientStops::new(stops)
    }
}

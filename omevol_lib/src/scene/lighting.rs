use std::f32::consts::FRAC_PI_4;

use nalgebra::{vector, Point3, Vector3};

use crate::color::ColorRgbHdr;

#[derive(Debug, Clone, PartialEq)]
pub struct SkyLight {
    pub color_top: ColorRgbHdr,
    pub color_middle: ColorRgbHdr,
    pub color_bottom: ColorRgbHdr,
}

impl Default for SkyLight {
    fn default() -> Self {
        Self {
            color_top: ColorRgbHdr::splat(0.5),
            color_middle: ColorRgbHdr::splat(0.5),
            color_bottom: ColorRgbHdr::splat(0.5),
        }
    }
}

impl SkyLight {
    /// Radiance arriving from direction `dir`, blending bottom, middle and top by its height
    pub fn radiance(&self, dir: &Vector3<f32>) -> ColorRgbHdr {
        let y = dir.y.clamp(-1.0, 1.0);
        if y >= 0.0 {
            ColorRgbHdr::lerp(y, &self.color_middle, &self.color_top)
        } else {
            ColorRgbHdr::lerp(-y, &self.color_middle, &self.color_bottom)
        }
    }
}

/// Rectangular light facing the scene target
///
/// Position is given in spherical coordinates around the target, angles in radians.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaLight {
    pub theta: f32,
    pub phi: f32,
    pub distance: f32,
    pub width: f32,
    pub height: f32,
    pub color: ColorRgbHdr,
    pub intensity: f32,
}

impl Default for AreaLight {
    fn default() -> Self {
        Self {
            theta: 0.0,
            phi: FRAC_PI_4,
            distance: 10.0,
            width: 1.0,
            height: 1.0,
            color: ColorRgbHdr::WHITE,
            intensity: 1.0,
        }
    }
}

impl AreaLight {
    pub fn world_position(&self, target: &Point3<f32>) -> Point3<f32> {
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        target + self.distance * vector![cos_phi * sin_theta, sin_phi, cos_phi * cos_theta]
    }

    pub fn radiance(&self) -> ColorRgbHdr {
        self.color * self.intensity
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Light {
    Sky(SkyLight),
    Area(AreaLight),
}

impl Light {
    /// Sky lights have no position, they surround the scene
    pub fn world_position(&self, target: &Point3<f32>) -> Option<Point3<f32>> {
        match self {
            Light::Sky(_) => None,
            Light::Area(area) => Some(area.world_position(target)),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LightingError {
    #[error("light {index} does not exist, scene has {count} lights")]
    OutOfRange { index: usize, count: usize },
    #[error("light {index} is not {expected} light")]
    WrongKind { index: usize, expected: &'static str },
}

/// Scene lights, slot 0 is the sky light, area light `i` lives in slot `1 + i`
#[derive(Debug, Clone, PartialEq)]
pub struct Lighting {
    pub lights: Vec<Light>,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            lights: vec![
                Light::Sky(SkyLight::default()),
                Light::Area(AreaLight::default()),
            ],
        }
    }
}

impl Lighting {
    pub fn sky_light(&self) -> Result<&SkyLight, LightingError> {
        match self.lights.first() {
            Some(Light::Sky(sky)) => Ok(sky),
            Some(_) => Err(LightingError::WrongKind {
                index: 0,
                expected: "a sky",
            }),
            None => Err(LightingError::OutOfRange { index: 0, count: 0 }),
        }
    }

    pub fn sky_light_mut(&mut self) -> Result<&mut SkyLight, LightingError> {
        match self.lights.first_mut() {
            Some(Light::Sky(sky)) => Ok(sky),
            Some(_) => Err(LightingError::WrongKind {
                index: 0,
                expected: "a sky",
            }),
            None => Err(LightingError::OutOfRange { index: 0, count: 0 }),
        }
    }

    /// Area light number `index`, not counting the sky light
    pub fn area_light_mut(&mut self, index: usize) -> Result<&mut AreaLight, LightingError> {
        let count = self.area_light_count();
        match self.lights.get_mut(1 + index) {
            Some(Light::Area(area)) => Ok(area),
            Some(_) => Err(LightingError::WrongKind {
                index: 1 + index,
                expected: "an area",
            }),
            None => Err(LightingError::OutOfRange { index, count }),
        }
    }

    pub fn area_lights(&self) -> impl Iterator<Item = &AreaLight> {
        self.lights.iter().skip(1).filter_map(|light| match light {
            Light::Area(area) => Some(area),
            Light::Sky(_) => None,
        })
    }

    pub fn area_light_count(&self) -> usize {
        self.lights.len().saturating_sub(1)
    }

    pub fn add_area_light(&mut self, light: AreaLight) {
        self.lights.push(Light::Area(light));
    }
}

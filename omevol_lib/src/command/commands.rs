use nalgebra::{point, vector};
use serde::{Deserialize, Serialize};

use crate::{
    color::{self, ColorRgbHdr},
    render::DirtyFlags,
    scene::{AppScene, MAX_CHANNELS},
    transfer::{GradientStop, GradientStops},
    volumetric::{load_ome_tiff, Channel},
};

use super::{CommandError, ExecutionContext};

fn one() -> f32 {
    1.0
}

/// Transfer function stop as sent by the gradient editor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    /// Normalized intensity
    pub x: f32,
    #[serde(default = "one")]
    pub r: f32,
    #[serde(default = "one")]
    pub g: f32,
    #[serde(default = "one")]
    pub b: f32,
    /// Opacity
    pub a: f32,
}

impl From<ControlPoint> for GradientStop {
    fn from(point: ControlPoint) -> Self {
        GradientStop::new(point.x, color::new(point.r, point.g, point.b, point.a))
    }
}

/// Parameter update sent by a remote client
///
/// Serialized as an object tagged by `cmd`, e.g.
/// `{"cmd":"SetCameraPos","x":0.0,"y":0.0,"z":2.0}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd")]
pub enum Command {
    Session {
        name: String,
    },
    AssetPath {
        name: String,
    },
    LoadOmeTif {
        #[serde(alias = "name")]
        path: String,
    },
    SetCameraPos {
        x: f32,
        y: f32,
        z: f32,
    },
    SetCameraTarget {
        x: f32,
        y: f32,
        z: f32,
    },
    SetCameraUp {
        x: f32,
        y: f32,
        z: f32,
    },
    SetCameraAperture {
        x: f32,
    },
    /// Vertical field of view in degrees
    SetCameraFovY {
        x: f32,
    },
    SetCameraFocalDistance {
        x: f32,
    },
    /// `x` in `<0;1>`, higher is brighter
    SetCameraExposure {
        x: f32,
    },
    SetDiffuseColor {
        channel: usize,
        r: f32,
        g: f32,
        b: f32,
    },
    SetSpecularColor {
        channel: usize,
        r: f32,
        g: f32,
        b: f32,
    },
    SetEmissiveColor {
        channel: usize,
        r: f32,
        g: f32,
        b: f32,
    },
    SetRenderIterations {
        x: u32,
    },
    SetStreamMode {
        x: i32,
    },
    RequestRedraw,
    SetResolution {
        x: usize,
        y: usize,
    },
    SetDensity {
        x: f32,
    },
    FrameScene,
    SetGlossiness {
        channel: usize,
        glossiness: f32,
    },
    EnableChannel {
        channel: usize,
        enabled: i32,
    },
    SetWindowLevel {
        channel: usize,
        window: f32,
        level: f32,
    },
    /// Angles in degrees
    OrbitCamera {
        theta: f32,
        phi: f32,
    },
    SetSkylightTopColor {
        r: f32,
        g: f32,
        b: f32,
    },
    SetSkylightMiddleColor {
        r: f32,
        g: f32,
        b: f32,
    },
    SetSkylightBottomColor {
        r: f32,
        g: f32,
        b: f32,
    },
    /// Spherical position around the scene center, angles in radians
    SetLightPos {
        index: usize,
        r: f32,
        theta: f32,
        phi: f32,
    },
    SetLightColor {
        index: usize,
        r: f32,
        g: f32,
        b: f32,
    },
    SetLightSize {
        index: usize,
        x: f32,
        y: f32,
    },
    SetPercentileThreshold {
        channel: usize,
        pct_low: f32,
        pct_high: f32,
    },
    SetIsovalueThreshold {
        channel: usize,
        isovalue: f32,
        isorange: f32,
    },
    SetControlPoints {
        channel: usize,
        stops: Vec<ControlPoint>,
    },
}

/// Material slot of `channel`
fn material_slot(channel: usize) -> Result<usize, CommandError> {
    if channel < MAX_CHANNELS {
        Ok(channel)
    } else {
        Err(CommandError::ChannelOutOfRange {
            channel,
            count: MAX_CHANNELS,
        })
    }
}

fn volume_channel(scene: &mut AppScene, channel: usize) -> Result<&mut Channel, CommandError> {
    let image = scene.volume.as_mut().ok_or(CommandError::NoVolume)?;
    let count = image.size_c();
    image
        .channel_mut(channel)
        .ok_or(CommandError::ChannelOutOfRange { channel, count })
}

fn check_fraction(name: &str, value: f32) -> Result<f32, CommandError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(CommandError::InvalidArgument(format!(
            "{name} must be in <0;1>, got {value}"
        )))
    }
}

impl Command {
    pub fn execute(&self, ctx: &mut ExecutionContext) -> Result<(), CommandError> {
        log::debug!("{self:?}");

        let ExecutionContext {
            camera,
            scene,
            render_settings: settings,
            renderer,
            session,
        } = ctx;

        match self {
            Command::Session { name } => {
                session.name = Some(name.clone());
            }
            Command::AssetPath { name } => {
                session.asset_path = Some(name.into());
            }
            Command::LoadOmeTif { path } => {
                let path = session.resolve(path);
                if !path.is_file() {
                    log::warn!("Volume file {} not found, ignoring load", path.display());
                    return Ok(());
                }

                let image = load_ome_tiff(&path)?;
                scene.init_scene_from_img(image);
                camera.frame_scene(scene.bounding_box);
                settings.set_no_iterations(0);
                settings.set_flag(DirtyFlags::VOLUME | DirtyFlags::VOLUME_DATA);
            }
            Command::SetCameraPos { x, y, z } => {
                camera.from = point![*x, *y, *z];
                settings.set_no_iterations(0);
            }
            Command::SetCameraTarget { x, y, z } => {
                camera.target = point![*x, *y, *z];
                settings.set_no_iterations(0);
            }
            Command::SetCameraUp { x, y, z } => {
                camera.up = vector![*x, *y, *z];
                settings.set_no_iterations(0);
            }
            Command::SetCameraAperture { x } => {
                camera.aperture.size = *x;
                settings.set_no_iterations(0);
            }
            Command::SetCameraFovY { x } => {
                camera.fov_v = *x;
                settings.set_no_iterations(0);
            }
            Command::SetCameraFocalDistance { x } => {
                camera.focus.focal_distance = *x;
                settings.set_no_iterations(0);
            }
            Command::SetCameraExposure { x } => {
                camera.film.exposure = 1.0 - *x;
                settings.set_no_iterations(0);
            }
            Command::SetDiffuseColor { channel, r, g, b } => {
                let slot = material_slot(*channel)?;
                scene.material.diffuse[slot] = ColorRgbHdr::new(*r, *g, *b);
                settings.set_no_iterations(0);
            }
            Command::SetSpecularColor { channel, r, g, b } => {
                let slot = material_slot(*channel)?;
                scene.material.specular[slot] = ColorRgbHdr::new(*r, *g, *b);
                settings.set_no_iterations(0);
            }
            Command::SetEmissiveColor { channel, r, g, b } => {
                let slot = material_slot(*channel)?;
                scene.material.emissive[slot] = ColorRgbHdr::new(*r, *g, *b);
                settings.set_no_iterations(0);
            }
            Command::SetRenderIterations { x } => {
                camera.film.exposure_iterations = *x;
            }
            Command::SetStreamMode { x } => {
                renderer.set_stream_mode(*x != 0);
            }
            Command::RequestRedraw => {
                renderer.request_redraw();
            }
            Command::SetResolution { x, y } => {
                if *x == 0 || *y == 0 {
                    return Err(CommandError::InvalidArgument(format!(
                        "resolution {x}x{y} has no pixels"
                    )));
                }
                camera.film.set_resolution(*x, *y);
                renderer.resize(*x, *y);
                settings.set_no_iterations(0);
            }
            Command::SetDensity { x } => {
                settings.params.density_scale = *x;
                settings.set_no_iterations(0);
            }
            Command::FrameScene => {
                camera.frame_scene(scene.bounding_box);
                settings.set_no_iterations(0);
            }
            Command::SetGlossiness {
                channel,
                glossiness,
            } => {
                let slot = material_slot(*channel)?;
                scene.material.roughness[slot] = *glossiness;
                settings.set_flag(DirtyFlags::TRANSFER_FUNCTION);
            }
            Command::EnableChannel { channel, enabled } => {
                let slot = material_slot(*channel)?;
                scene.material.enabled[slot] = *enabled != 0;
                settings.set_flag(DirtyFlags::VOLUME_DATA);
            }
            Command::SetWindowLevel {
                channel,
                window,
                level,
            } => {
                volume_channel(scene, *channel)?.generate_window_level(*window, *level);
                settings.set_flag(DirtyFlags::TRANSFER_FUNCTION);
            }
            Command::OrbitCamera { theta, phi } => {
                camera.orbit(*theta, *phi);
                settings.set_no_iterations(0);
            }
            Command::SetSkylightTopColor { r, g, b } => {
                scene.lighting.sky_light_mut()?.color_top = ColorRgbHdr::new(*r, *g, *b);
                settings.set_flag(DirtyFlags::LIGHTS);
            }
            Command::SetSkylightMiddleColor { r, g, b } => {
                scene.lighting.sky_light_mut()?.color_middle = ColorRgbHdr::new(*r, *g, *b);
                settings.set_flag(DirtyFlags::LIGHTS);
            }
            Command::SetSkylightBottomColor { r, g, b } => {
                scene.lighting.sky_light_mut()?.color_bottom = ColorRgbHdr::new(*r, *g, *b);
                settings.set_flag(DirtyFlags::LIGHTS);
            }
            Command::SetLightPos {
                index,
                r,
                theta,
                phi,
            } => {
                let light = scene.lighting.area_light_mut(*index)?;
                light.distance = *r;
                light.theta = *theta;
                light.phi = *phi;
                settings.set_flag(DirtyFlags::LIGHTS);
            }
            Command::SetLightColor { index, r, g, b } => {
                scene.lighting.area_light_mut(*index)?.color = ColorRgbHdr::new(*r, *g, *b);
                settings.set_flag(DirtyFlags::LIGHTS);
            }
            Command::SetLightSize { index, x, y } => {
                let light = scene.lighting.area_light_mut(*index)?;
                light.width = *x;
                light.height = *y;
                settings.set_flag(DirtyFlags::LIGHTS);
            }
            Command::SetPercentileThreshold {
                channel,
                pct_low,
                pct_high,
            } => {
                let low = check_fraction("pct_low", *pct_low)?;
                let high = check_fraction("pct_high", *pct_high)?;
                volume_channel(scene, *channel)?.generate_percentiles(low, high);
                settings.set_flag(DirtyFlags::TRANSFER_FUNCTION);
            }
            Command::SetIsovalueThreshold {
                channel,
                isovalue,
                isorange,
            } => {
                volume_channel(scene, *channel)?.generate_isovalue(*isovalue, *isorange);
                settings.set_flag(DirtyFlags::TRANSFER_FUNCTION);
            }
            Command::SetControlPoints { channel, stops } => {
                let target = volume_channel(scene, *channel)?;
                let stops = GradientStops::from_unsorted(stops.iter().map(|&p| p.into()).collect())?;
                target.generate_control_points(stops);
                settings.set_flag(DirtyFlags::TRANSFER_FUNCTION);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {

    use approx::assert_relative_eq;
    use nalgebra::vector;

    use super::*;
    use crate::{
        camera::{Camera, ViewMode},
        command::SessionInfo,
        render::{RenderControl, RenderSettings},
        test_helpers::{gradient_image, solid_scene},
        volumetric::write_ome_tiff,
    };

    #[derive(Default)]
    struct RecordingControl {
        stream: Option<bool>,
        size: Option<(usize, usize)>,
        redraws: usize,
    }

    impl RenderControl for RecordingControl {
        fn set_stream_mode(&mut self, stream: bool) {
            self.stream = Some(stream);
        }

        fn resize(&mut self, width: usize, height: usize) {
            self.size = Some((width, height));
        }

        fn request_redraw(&mut self) {
            self.redraws += 1;
        }
    }

    struct State {
        camera: Camera,
        scene: AppScene,
        settings: RenderSettings,
        control: RecordingControl,
        session: SessionInfo,
    }

    impl State {
        fn new(scene: AppScene) -> State {
            let mut settings = RenderSettings::default();
            settings.take_dirty_flags();
            settings.set_no_iterations(7);
            State {
                camera: Camera::default(),
                scene,
                settings,
                control: RecordingControl::default(),
                session: SessionInfo::default(),
            }
        }

        fn run(&mut self, command: Command) -> Result<(), CommandError> {
            let mut ctx = ExecutionContext {
                camera: &mut self.camera,
                scene: &mut self.scene,
                render_settings: &mut self.settings,
                renderer: &mut self.control,
                session: &mut self.session,
            };
            command.execute(&mut ctx)
        }
    }

    #[test]
    fn camera_commands_reset_iterations() {
        let mut state = State::new(AppScene::default());

        state
            .run(Command::SetCameraPos {
                x: 1.0,
                y: 2.0,
                z: 3.0,
            })
            .unwrap();

        assert_eq!(state.camera.from, point![1.0, 2.0, 3.0]);
        assert_eq!(state.settings.no_iterations(), 0);
        assert!(state.settings.dirty_flags().is_empty());
    }

    #[test]
    fn exposure_is_inverted() {
        let mut state = State::new(AppScene::default());

        state.run(Command::SetCameraExposure { x: 0.25 }).unwrap();

        assert_relative_eq!(state.camera.film.exposure, 0.75);
    }

    #[test]
    fn render_iterations_keep_progress() {
        let mut state = State::new(AppScene::default());

        state.run(Command::SetRenderIterations { x: 32 }).unwrap();

        assert_eq!(state.camera.film.exposure_iterations, 32);
        assert_eq!(state.settings.no_iterations(), 7);
    }

    #[test]
    fn renderer_control_commands() {
        let mut state = State::new(AppScene::default());

        state.run(Command::SetStreamMode { x: 1 }).unwrap();
        state.run(Command::RequestRedraw).unwrap();
        state.run(Command::SetResolution { x: 64, y: 32 }).unwrap();

        assert_eq!(state.control.stream, Some(true));
        assert_eq!(state.control.redraws, 1);
        assert_eq!(state.control.size, Some((64, 32)));
        assert_eq!(state.camera.film.resolution, (64, 32));
        assert_eq!(state.settings.no_iterations(), 0);
    }

    #[test]
    fn zero_resolution_rejected() {
        let mut state = State::new(AppScene::default());

        let result = state.run(Command::SetResolution { x: 0, y: 32 });

        assert!(matches!(result, Err(CommandError::InvalidArgument(_))));
        assert_eq!(state.control.size, None);
        assert_eq!(state.settings.no_iterations(), 7);
    }

    #[test]
    fn material_channel_checked() {
        let mut state = State::new(AppScene::default());

        let result = state.run(Command::SetDiffuseColor {
            channel: MAX_CHANNELS,
            r: 1.0,
            g: 0.0,
            b: 0.0,
        });

        assert!(matches!(
            result,
            Err(CommandError::ChannelOutOfRange { channel: 4, count: 4 })
        ));
        assert_eq!(state.settings.no_iterations(), 7);
    }

    #[test]
    fn enable_channel_marks_volume_data() {
        let mut state = State::new(solid_scene(vector![2, 2, 2]));

        state
            .run(Command::EnableChannel {
                channel: 0,
                enabled: 0,
            })
            .unwrap();

        assert!(!state.scene.material.enabled[0]);
        assert!(state.settings.has_flag(DirtyFlags::VOLUME_DATA));
    }

    #[test]
    fn glossiness_marks_transfer_function() {
        let mut state = State::new(AppScene::default());

        state
            .run(Command::SetGlossiness {
                channel: 2,
                glossiness: 0.3,
            })
            .unwrap();

        assert_relative_eq!(state.scene.material.roughness[2], 0.3);
        assert!(state.settings.has_flag(DirtyFlags::TRANSFER_FUNCTION));
    }

    #[test]
    fn window_level_needs_volume() {
        let mut state = State::new(AppScene::default());

        let result = state.run(Command::SetWindowLevel {
            channel: 0,
            window: 0.5,
            level: 0.5,
        });

        assert!(matches!(result, Err(CommandError::NoVolume)));
        assert!(state.settings.dirty_flags().is_empty());
    }

    #[test]
    fn window_level_updates_lut() {
        let mut state = State::new(solid_scene(vector![2, 2, 2]));

        state
            .run(Command::SetWindowLevel {
                channel: 0,
                window: 0.2,
                level: 0.5,
            })
            .unwrap();

        let channel = state.scene.volume.as_ref().unwrap().channel(0).unwrap();
        assert_eq!(channel.stops(), &GradientStops::window_level(0.2, 0.5));
        assert_relative_eq!(channel.lut_lookup(0.1), 0.0);
        assert_relative_eq!(channel.lut_lookup(0.9), 1.0);
        assert!(state.settings.has_flag(DirtyFlags::TRANSFER_FUNCTION));
    }

    #[test]
    fn volume_channel_out_of_range() {
        let mut state = State::new(solid_scene(vector![2, 2, 2]));

        let result = state.run(Command::SetIsovalueThreshold {
            channel: 1,
            isovalue: 0.5,
            isorange: 0.1,
        });

        assert!(matches!(
            result,
            Err(CommandError::ChannelOutOfRange { channel: 1, count: 1 })
        ));
    }

    #[test]
    fn percentiles_validated() {
        let mut state = State::new(solid_scene(vector![2, 2, 2]));

        let result = state.run(Command::SetPercentileThreshold {
            channel: 0,
            pct_low: 0.1,
            pct_high: 1.5,
        });

        assert!(matches!(result, Err(CommandError::InvalidArgument(_))));
        assert!(state.settings.dirty_flags().is_empty());
    }

    #[test]
    fn control_points_sorted() {
        let mut state = State::new(solid_scene(vector![2, 2, 2]));
        let point = |x, a| ControlPoint {
            x,
            r: 1.0,
            g: 1.0,
            b: 1.0,
            a,
        };

        state
            .run(Command::SetControlPoints {
                channel: 0,
                stops: vec![point(1.0, 1.0), point(0.0, 0.0)],
            })
            .unwrap();

        let channel = state.scene.volume.as_ref().unwrap().channel(0).unwrap();
        assert_eq!(channel.stops().len(), 2);
        assert_relative_eq!(channel.lut_lookup(0.5), 0.5, epsilon = 0.01);
    }

    #[test]
    fn invalid_control_points_keep_channel() {
        let mut state = State::new(solid_scene(vector![2, 2, 2]));
        let before = state.scene.volume.as_ref().unwrap().channel(0).unwrap().stops().clone();

        let result = state.run(Command::SetControlPoints {
            channel: 0,
            stops: vec![],
        });

        assert!(matches!(result, Err(CommandError::Gradient(_))));
        let after = state.scene.volume.as_ref().unwrap().channel(0).unwrap().stops();
        assert_eq!(&before, after);
    }

    #[test]
    fn light_commands() {
        let mut state = State::new(AppScene::default());

        state
            .run(Command::SetLightPos {
                index: 0,
                r: 5.0,
                theta: 1.0,
                phi: 0.5,
            })
            .unwrap();
        state
            .run(Command::SetLightSize {
                index: 0,
                x: 2.0,
                y: 3.0,
            })
            .unwrap();
        state
            .run(Command::SetSkylightTopColor {
                r: 1.0,
                g: 0.0,
                b: 0.0,
            })
            .unwrap();

        let light = state.scene.lighting.area_light_mut(0).unwrap().clone();
        assert_relative_eq!(light.distance, 5.0);
        assert_relative_eq!(light.theta, 1.0);
        assert_relative_eq!(light.height, 3.0);
        let sky = state.scene.lighting.sky_light().unwrap();
        assert_eq!(sky.color_top, ColorRgbHdr::new(1.0, 0.0, 0.0));
        assert!(state.settings.has_flag(DirtyFlags::LIGHTS));
    }

    #[test]
    fn missing_light_is_error() {
        let mut state = State::new(AppScene::default());

        let result = state.run(Command::SetLightColor {
            index: 3,
            r: 1.0,
            g: 1.0,
            b: 1.0,
        });

        assert!(matches!(result, Err(CommandError::Lighting(_))));
        assert!(state.settings.dirty_flags().is_empty());
    }

    #[test]
    fn frame_scene_looks_from_front() {
        let mut state = State::new(solid_scene(vector![4, 2, 2]));

        state.run(Command::OrbitCamera { theta: 30.0, phi: 0.0 }).unwrap();
        assert_eq!(state.camera.view_mode, ViewMode::User);

        state.run(Command::FrameScene).unwrap();

        assert_eq!(state.camera.view_mode, ViewMode::Front);
        assert_eq!(state.camera.scene_bounding_box, state.scene.bounding_box);
        assert_relative_eq!(state.camera.target, state.scene.bounding_box.center());
    }

    #[test]
    fn session_values_recorded() {
        let mut state = State::new(AppScene::default());

        state
            .run(Command::Session {
                name: "client-1".into(),
            })
            .unwrap();
        state
            .run(Command::AssetPath {
                name: "/data".into(),
            })
            .unwrap();

        assert_eq!(state.session.name.as_deref(), Some("client-1"));
        assert_eq!(state.session.asset_path, Some("/data".into()));
    }

    #[test]
    fn load_missing_file_is_noop() {
        let mut state = State::new(AppScene::default());

        state
            .run(Command::LoadOmeTif {
                path: "/definitely/not/here.ome.tif".into(),
            })
            .unwrap();

        assert!(state.scene.volume.is_none());
        assert_eq!(state.settings.no_iterations(), 7);
    }

    #[test]
    fn load_relative_to_asset_path() {
        let dir = tempfile::tempdir().unwrap();
        write_ome_tiff(dir.path().join("cube.ome.tif"), &gradient_image(vector![3, 4, 5], 5)).unwrap();

        let mut state = State::new(AppScene::default());
        state
            .run(Command::AssetPath {
                name: dir.path().to_string_lossy().into_owned(),
            })
            .unwrap();
        state
            .run(Command::LoadOmeTif {
                path: "cube.ome.tif".into(),
            })
            .unwrap();

        assert_eq!(state.scene.channel_count(), 5);
        assert_eq!(state.scene.material.enabled, [true, true, true, false]);
        assert_eq!(state.camera.view_mode, ViewMode::Front);
        assert_eq!(state.settings.no_iterations(), 0);
        assert!(state
            .settings
            .has_flag(DirtyFlags::VOLUME | DirtyFlags::VOLUME_DATA));
    }

    #[test]
    fn json_form() {
        let command: Command =
            serde_json::from_str(r#"{"cmd":"SetWindowLevel","channel":1,"window":0.5,"level":0.25}"#)
                .unwrap();
        assert_eq!(
            command,
            Command::SetWindowLevel {
                channel: 1,
                window: 0.5,
                level: 0.25
            }
        );

        let command: Command = serde_json::from_str(r#"{"cmd":"FrameScene"}"#).unwrap();
        assert_eq!(command, Command::FrameScene);

        let command: Command =
            serde_json::from_str(r#"{"cmd":"SetControlPoints","channel":0,"stops":[{"x":0.5,"a":1}]}"#)
                .unwrap();
        match command {
            Command::SetControlPoints { stops, .. } => assert_relative_eq!(stops[0].g, 1.0),
            other => panic!("unexpected command {other:?}"),
        }
    }
}

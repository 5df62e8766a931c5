use std::collections::HashMap;

use nalgebra::vector;
use omevol_lib::{
    camera::{Camera, ViewMode},
    cgi::url_decode,
    command::{Command, ExecutionContext, SessionInfo},
    render::{DirtyFlags, RenderOptions, RenderSettings, Renderer},
    scene::AppScene,
    test_helpers,
    volumetric::{load_ome_tiff, write_ome_tiff},
};

pub const WIDTH: usize = 24;
pub const HEIGHT: usize = 16;

struct Session {
    camera: Camera,
    scene: AppScene,
    settings: RenderSettings,
    renderer: Renderer,
    info: SessionInfo,
}

impl Session {
    fn new() -> Session {
        let mut camera = Camera::new(WIDTH, HEIGHT);
        camera.film.exposure_iterations = 3;
        Session {
            camera,
            scene: AppScene::default(),
            settings: RenderSettings::default(),
            renderer: Renderer::new(RenderOptions::new((WIDTH, HEIGHT), true, true)),
            info: SessionInfo::default(),
        }
    }

    fn execute(&mut self, command: Command) {
        let mut ctx = ExecutionContext {
            camera: &mut self.camera,
            scene: &mut self.scene,
            render_settings: &mut self.settings,
            renderer: &mut self.renderer,
            session: &mut self.info,
        };
        command.execute(&mut ctx).unwrap();
    }

    /// Render until converged, returns number of rendered iterations
    fn converge(&mut self) -> u32 {
        let mut rendered = 0;
        while self
            .renderer
            .render(&self.camera, &self.scene, &mut self.settings)
            .rendered
        {
            rendered += 1;
        }
        rendered
    }
}

#[test]
fn ome_tiff_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gradient.ome.tif");
    let image = test_helpers::gradient_image(vector![5, 4, 3], 2);

    write_ome_tiff(&path, &image).unwrap();
    let loaded = load_ome_tiff(&path).unwrap();

    assert_eq!(loaded.size(), vector![5, 4, 3]);
    assert_eq!(loaded.size_c(), 2);
    assert_eq!(loaded.channel(1).unwrap().name, "gradient_1");
    assert_eq!(
        loaded.get_voxel(1, 4, 3, 2),
        Some(test_helpers::gradient_value(4, 3, 2, 1))
    );
}

#[test]
fn load_and_render() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cube.ome.tif");
    write_ome_tiff(&path, &test_helpers::solid_image(vector![8, 8, 8])).unwrap();

    let mut session = Session::new();
    session.execute(Command::LoadOmeTif {
        path: path.to_string_lossy().into_owned(),
    });

    assert!(session.settings.has_flag(DirtyFlags::VOLUME));
    assert_eq!(session.camera.view_mode, ViewMode::Front);

    assert_eq!(session.converge(), 3);
    assert!(session.settings.dirty_flags().is_empty());
    assert!(session.renderer.frame().iter().any(|&v| v > 0));
}

#[test]
fn commands_restart_progression() {
    let dir = tempfile::tempdir().unwrap();
    write_ome_tiff(
        dir.path().join("cube.ome.tif"),
        &test_helpers::solid_image(vector![6, 6, 6]),
    )
    .unwrap();

    let mut session = Session::new();
    session.execute(Command::AssetPath {
        name: dir.path().to_string_lossy().into_owned(),
    });
    session.execute(Command::LoadOmeTif {
        path: "cube.ome.tif".into(),
    });
    session.converge();

    session.execute(Command::OrbitCamera {
        theta: 45.0,
        phi: 10.0,
    });
    assert_eq!(session.settings.no_iterations(), 0);
    assert_eq!(session.converge(), 3);

    session.execute(Command::SetRenderIterations { x: 5 });
    assert_eq!(session.converge(), 2);

    session.execute(Command::SetSkylightTopColor {
        r: 1.0,
        g: 0.5,
        b: 0.0,
    });
    assert_eq!(session.converge(), 5);
}

#[test]
fn disabled_channels_render_black() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cube.ome.tif");
    write_ome_tiff(&path, &test_helpers::solid_image(vector![6, 6, 6])).unwrap();

    let mut session = Session::new();
    session.execute(Command::LoadOmeTif {
        path: path.to_string_lossy().into_owned(),
    });
    session.execute(Command::EnableChannel {
        channel: 0,
        enabled: 0,
    });
    session.converge();

    assert!(session.renderer.frame().iter().all(|&v| v == 0));
}

#[test]
fn url_encoded_commands() {
    let mut session = Session::new();

    let params: HashMap<String, String> = url_decode("cmd=SetResolution&x=32&y=8");
    session.execute(Command::from_params(&params).unwrap());

    let params = url_decode("cmd=SetCameraFovY&x=40");
    session.execute(Command::from_params(&params).unwrap());

    assert_eq!(session.camera.film.resolution, (32, 8));
    assert_eq!(session.renderer.resolution(), (32, 8));
    assert_eq!(session.camera.fov_v, 40.0);
}

#[test]
fn render_frame_helper() {
    let frame = omevol_lib::render_frame(test_helpers::solid_image(vector![4, 4, 4]), 8, 8, 2);

    assert_eq!(frame.len(), 8 * 8 * 3);
    assert!(frame.iter().any(|&v| v > 0));
}

//! Render state of one server

use omevol_lib::{
    camera::Camera,
    command::{Command, CommandError, ExecutionContext, SessionInfo},
    render::{RenderSettings, RenderStatus, Renderer},
    scene::AppScene,
};

use crate::config::ServerConfig;

/// Finished or in progress frame, RGB8 with row 0 at the top
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub iteration: u32,
    pub converged: bool,
    pub data: Vec<u8>,
}

pub struct Session {
    pub camera: Camera,
    pub scene: AppScene,
    pub settings: RenderSettings,
    pub renderer: Renderer,
    pub info: SessionInfo,
    /// Last render result
    status: RenderStatus,
}

impl Session {
    pub fn new(config: &ServerConfig) -> Session {
        let (width, height) = config.resolution;
        let mut camera = Camera::new(width, height);
        camera.film.exposure_iterations = config.exposure_iterations;

        Session {
            camera,
            scene: AppScene::default(),
            settings: RenderSettings::new(config.render_params()),
            renderer: Renderer::new(config.render_options()),
            info: SessionInfo {
                name: None,
                asset_path: config.asset_path.clone(),
            },
            status: RenderStatus {
                iteration: 0,
                converged: false,
                rendered: false,
            },
        }
    }

    pub fn execute(&mut self, command: &Command) -> Result<(), CommandError> {
        let mut ctx = ExecutionContext {
            camera: &mut self.camera,
            scene: &mut self.scene,
            render_settings: &mut self.settings,
            renderer: &mut self.renderer,
            session: &mut self.info,
        };
        let result = command.execute(&mut ctx);
        // anything may have changed, let the next render decide
        self.status.converged = false;
        result
    }

    /// Nothing left to render until the next command
    pub fn is_idle(&self) -> bool {
        self.status.converged
    }

    pub fn iteration(&self) -> u32 {
        self.settings.no_iterations()
    }

    /// Add one progressive iteration
    pub fn render_step(&mut self) -> RenderStatus {
        self.status = self.renderer.render(&self.camera, &self.scene, &mut self.settings);
        log::trace!("Render step {:?}", self.status);
        self.status
    }

    /// Whether the current frame should be published after [`render_step`](Session::render_step)
    ///
    /// Consumes a pending redraw request.
    pub fn should_publish(&mut self) -> bool {
        let redraw = self.renderer.take_redraw_request();
        let status = self.status;
        redraw || (status.rendered && (self.renderer.stream_mode() || status.converged))
    }

    pub fn snapshot(&self) -> Frame {
        let (width, height) = self.renderer.resolution();
        Frame {
            width,
            height,
            iteration: self.status.iteration,
            converged: self.status.converged,
            data: self.renderer.frame().to_vec(),
        }
    }
}

#[cfg(test)]
mod test {

    use omevol_lib::{test_helpers, volumetric::write_ome_tiff};

    use super::*;

    fn small_config() -> ServerConfig {
        ServerConfig {
            resolution: (12, 10),
            exposure_iterations: 3,
            multi_thread: false,
            ..Default::default()
        }
    }

    #[test]
    fn empty_session_is_idle_after_render() {
        let mut session = Session::new(&small_config());
        assert!(!session.is_idle());

        let status = session.render_step();

        assert!(!status.rendered);
        assert!(session.is_idle());
        assert!(!session.should_publish());
    }

    #[test]
    fn converges_and_publishes_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.ome.tif");
        write_ome_tiff(&path, &test_helpers::solid_image(cube_size())).unwrap();

        let mut session = Session::new(&small_config());
        session
            .execute(&Command::LoadOmeTif {
                path: path.to_string_lossy().into_owned(),
            })
            .unwrap();

        let mut published = 0;
        while !session.is_idle() {
            session.render_step();
            if session.should_publish() {
                published += 1;
            }
        }

        assert_eq!(published, 1);
        let frame = session.snapshot();
        assert_eq!((frame.width, frame.height), (12, 10));
        assert_eq!(frame.data.len(), 12 * 10 * 3);
        assert_eq!(frame.iteration, 3);
        assert!(frame.converged);
    }

    #[test]
    fn stream_mode_publishes_every_iteration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.ome.tif");
        write_ome_tiff(&path, &test_helpers::solid_image(cube_size())).unwrap();

        let mut session = Session::new(&small_config());
        session.info.asset_path = Some(dir.path().to_path_buf());
        session
            .execute(&Command::LoadOmeTif {
                path: "cube.ome.tif".into(),
            })
            .unwrap();
        session.execute(&Command::SetStreamMode { x: 1 }).unwrap();

        let mut published = 0;
        while !session.is_idle() {
            session.render_step();
            if session.should_publish() {
                published += 1;
            }
        }

        assert_eq!(published, 3);
    }

    #[test]
    fn command_wakes_idle_session() {
        let mut session = Session::new(&small_config());
        session.render_step();
        assert!(session.is_idle());

        session.execute(&Command::RequestRedraw).unwrap();

        assert!(!session.is_idle());
        session.render_step();
        assert!(session.should_publish());
    }

    #[test]
    fn failed_command_reported() {
        let mut session = Session::new(&small_config());

        let result = session.execute(&Command::SetWindowLevel {
            channel: 0,
            window: 1.0,
            level: 0.5,
        });

        assert!(matches!(result, Err(CommandError::NoVolume)));
    }

    fn cube_size() -> nalgebra::Vector3<usize> {
        nalgebra::vector![6, 6, 6]
    }
}

use std::path::{Path, PathBuf};

use crate::{camera::Camera, render::RenderControl, render::RenderSettings, scene::AppScene};

/// Per-client session values set by commands
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionInfo {
    pub name: Option<String>,
    /// Root of relative load paths
    pub asset_path: Option<PathBuf>,
}

impl SessionInfo {
    /// Resolve `path` against the asset path, absolute paths are kept
    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match &self.asset_path {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// State a command may mutate
pub struct ExecutionContext<'a> {
    pub camera: &'a mut Camera,
    pub scene: &'a mut AppScene,
    pub render_settings: &'a mut RenderSettings,
    pub renderer: &'a mut dyn RenderControl,
    pub session: &'a mut SessionInfo,
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn resolve_relative() {
        let session = SessionInfo {
            name: None,
            asset_path: Some(PathBuf::from("/data/volumes")),
        };

        assert_eq!(
            session.resolve("cell.ome.tif"),
            PathBuf::from("/data/volumes/cell.ome.tif")
        );
        assert_eq!(session.resolve("/abs/x.tif"), PathBuf::from("/abs/x.tif"));
    }

    #[test]
    fn resolve_without_asset_path() {
        let session = SessionInfo::default();

        assert_eq!(session.resolve("a/b.tif"), PathBuf::from("a/b.tif"));
    }
}

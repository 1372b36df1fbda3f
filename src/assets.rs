use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, warn};

use crate::error::AssetLoadError;

/// Undecoded image asset. Decoding belongs to whichever surface samples it.
#[derive(Clone, PartialEq)]
pub struct TextureHandle {
    path: Arc<str>,
    bytes: Arc<[u8]>,
}

impl TextureHandle {
    pub fn new(path: &str, bytes: Vec<u8>) -> Self {
        Self {
            path: Arc::from(path),
            bytes: Arc::from(bytes),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for TextureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureHandle")
            .field("path", &self.path)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Resolves texture paths into handles.
pub trait AssetLoader {
    fn load_texture(&self, path: &str) -> Result<TextureHandle, AssetLoadError>;
}

/// Loads textures relative to a root directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsAssetLoader {
    root: PathBuf,
}

impl FsAssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetLoader for FsAssetLoader {
    fn load_texture(&self, path: &str) -> Result<TextureHandle, AssetLoadError> {
        let full = self.root.join(path);
        let bytes = fs::read(&full).map_err(|err| AssetLoadError {
            path: path.to_string(),
            reason: err.to_string(),
        })?;
        debug!("loaded texture {} ({} bytes)", full.display(), bytes.len());
        Ok(TextureHandle::new(path, bytes))
    }
}

/// Loader for hosts without asset access; every request fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAssets;

impl AssetLoader for NoAssets {
    fn load_texture(&self, path: &str) -> Result<TextureHandle, AssetLoadError> {
        Err(AssetLoadError {
            path: path.to_string(),
            reason: "asset loading is not available on this host".to_string(),
        })
    }
}

/// Loads `path` if one is configured. Failures are reported and swallowed so
/// the entity falls back to its flat material color.
pub fn load_optional(loader: &dyn AssetLoader, path: Option<&str>) -> Option<TextureHandle> {
    let path = path?;
    match loader.load_texture(path) {
        Ok(texture) => Some(texture),
        Err(err) => {
            warn!("{err}; continuing without texture");
            None
        }
    }
}

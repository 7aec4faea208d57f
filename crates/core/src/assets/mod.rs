use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::{BeatVizError, Result};

/// Provider of text assets (shader sources) addressed by logical path.
pub trait ShaderSource {
    fn get_string(&self, path: &str) -> Result<String>;
}

/// Assets compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinAssets;

impl ShaderSource for BuiltinAssets {
    fn get_string(&self, path: &str) -> Result<String> {
        let source = match path {
            "assets/shaders/flashlight.vsh" => include_str!("../../assets/shaders/flashlight.vsh"),
            "assets/shaders/flashlight.fsh" => include_str!("../../assets/shaders/flashlight.fsh"),
            _ => return Err(BeatVizError::asset_not_found(path)),
        };
        Ok(source.to_string())
    }
}

/// Assets read from disk below a root directory.
#[derive(Debug, Clone)]
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ShaderSource for DirAssets {
    fn get_string(&self, path: &str) -> Result<String> {
        match std::fs::read_to_string(self.root.join(path)) {
            Ok(text) => Ok(text),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(BeatVizError::asset_not_found(path))
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// In-memory registry, handy for overriding individual shaders.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    entries: HashMap<String, String>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(path.into(), text.into());
    }

    pub fn with(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }
}

impl ShaderSource for MemoryAssets {
    fn get_string(&self, path: &str) -> Result<String> {
        self.entries
            .get(path)
            .cloned()
            .ok_or_else(|| BeatVizError::asset_not_found(path))
    }
}

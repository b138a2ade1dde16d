//! Optional run settings, read from `trajviz.toml` in the working directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

pub const DEFAULT_CONFIG_PATH: &str = "trajviz.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Trajectory CSV, relative to the working directory.
    pub input: PathBuf,
    /// GIF written in save mode.
    pub output: PathBuf,
    /// Frame rate of the saved GIF.
    pub fps: u32,
    /// Delay between frames in the window, in milliseconds.
    pub interval_ms: u64,
    pub width: u32,
    pub height: u32,
    /// Open the interactive window after loading (and saving).
    pub display: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            input: PathBuf::from("../results.csv"),
            output: PathBuf::from("trajectory_animation.gif"),
            fps: 30,
            interval_ms: 50,
            width: 640,
            height: 480,
            display: true,
        }
    }
}

impl Config {
    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

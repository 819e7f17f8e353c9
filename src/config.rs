use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::pipeline::splitter::SplitOptions;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output_dir: PathBuf,
    /// Consider rule names when filtering duplicate rectangles.
    pub named: bool,
    /// Scale ratio between the sprite image and the CSS sprite size (2 for retina).
    pub ratio: i32,
    pub verbose: bool,
    /// Fail the run if any part could not be written.
    pub strict: bool,
    /// Parts processed at once; unset means the open file limit.
    pub jobs: Option<usize>,
    pub thread_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("split/"),
            named: false,
            ratio: 1,
            verbose: false,
            strict: false,
            jobs: None,
            thread_count: 0,
        }
    }
}

impl Config {
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let content = self
            .to_toml_string()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        fs::write(path, content)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// `<config dir>/desprite/config.toml`, e.g. `~/.config/desprite/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("desprite").join("config.toml"))
    }

    /// Loads `path` if given, else the default config file if it exists,
    /// else the built-in defaults.
    pub fn load(path: Option<&Path>) -> std::io::Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => match Self::default_path() {
                Some(default) if default.is_file() => Self::load_from_file(default),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn split_options(&self) -> SplitOptions {
        SplitOptions::new(&self.output_dir)
            .with_jobs(self.jobs)
            .with_thread_count(self.thread_count)
    }
}

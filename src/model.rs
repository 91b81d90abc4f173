use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    Amoled,
}

impl Theme {
    pub fn next(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Amoled,
            Self::Amoled => Self::Light,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Amoled => "amoled",
        }
    }
}

/// What a handle points at: something to enumerate or something to read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handle {
    Directory(PathBuf),
    File(PathBuf),
}

impl Handle {
    pub fn path(&self) -> &Path {
        match self {
            Self::Directory(path) | Self::File(path) => path,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub handle: Handle,
}

impl Entry {
    pub fn directory(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            handle: Handle::Directory(path.into()),
        }
    }

    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            handle: Handle::File(path.into()),
        }
    }
}

/// The playing track and the artist/album it was started from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NowPlaying {
    pub track: Entry,
    pub artist: String,
    pub album: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipDirection {
    Previous,
    Next,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub library: Option<PathBuf>,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_volume() -> f32 {
    1.0
}

fn default_log_filter() -> String {
    String::from("info")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            library: None,
            theme: Theme::default(),
            volume: default_volume(),
            log_filter: default_log_filter(),
        }
    }
}

use crate::model::Entry;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;
use walkdir::WalkDir;

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "m4a", "flac"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("permission denied: {}", .0.display())]
    Denied(PathBuf),
    #[error("no such folder: {}", .0.display())]
    NotFound(PathBuf),
    #[error("not a folder: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("cannot read {}", .0.display())]
    Unreadable(PathBuf),
    #[error("failed to read {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },
}

impl ScanError {
    fn from_io(path: &Path, err: &io::Error) -> Self {
        let path = path.to_path_buf();
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::Denied(path),
            io::ErrorKind::NotFound => Self::NotFound(path),
            io::ErrorKind::NotADirectory => Self::NotADirectory(path),
            _ => Self::Io {
                path,
                message: err.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Directory,
    File,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub name: String,
    pub path: PathBuf,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanLevel {
    Artists,
    Albums,
    Tracks,
}

impl ScanLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Artists => "artists",
            Self::Albums => "albums",
            Self::Tracks => "tracks",
        }
    }
}

pub trait DirectorySource: Send + Sync {
    fn children(&self, dir: &Path) -> Result<Vec<RawEntry>, ScanError>;

    /// Resolves a file to something the audio engine can open.
    fn byte_source(&self, file: &Path) -> Result<PathBuf, ScanError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl DirectorySource for FsSource {
    fn children(&self, dir: &Path) -> Result<Vec<RawEntry>, ScanError> {
        let metadata = fs::metadata(dir).map_err(|err| ScanError::from_io(dir, &err))?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory(dir.to_path_buf()));
        }

        let mut children = Vec::new();
        for item in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = match item {
                Ok(entry) => entry,
                Err(err) if err.depth() > 0 => {
                    trace!(path = ?err.path(), "skipping unreadable entry: {err}");
                    continue;
                }
                Err(err) => {
                    return Err(match err.io_error() {
                        Some(io_err) => ScanError::from_io(dir, io_err),
                        None => ScanError::Unreadable(dir.to_path_buf()),
                    });
                }
            };

            let file_type = entry.file_type();
            let kind = if file_type.is_dir() {
                NodeKind::Directory
            } else if file_type.is_file() {
                NodeKind::File
            } else {
                NodeKind::Other
            };

            children.push(RawEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                path: entry.into_path(),
                kind,
            });
        }

        Ok(children)
    }

    fn byte_source(&self, file: &Path) -> Result<PathBuf, ScanError> {
        let metadata = fs::metadata(file).map_err(|err| ScanError::from_io(file, &err))?;
        if !metadata.is_file() {
            return Err(ScanError::Unreadable(file.to_path_buf()));
        }
        File::open(file).map_err(|err| ScanError::from_io(file, &err))?;
        Ok(file.to_path_buf())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    nodes: BTreeMap<PathBuf, NodeKind>,
    denied: HashSet<PathBuf>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.insert(path.as_ref(), NodeKind::Directory);
        self
    }

    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.insert(path.as_ref(), NodeKind::File);
        self
    }

    pub fn with_other(mut self, path: impl AsRef<Path>) -> Self {
        self.insert(path.as_ref(), NodeKind::Other);
        self
    }

    /// Makes `path` fail to enumerate (directories) or open (files).
    pub fn deny(mut self, path: impl AsRef<Path>) -> Self {
        self.denied.insert(path.as_ref().to_path_buf());
        self
    }

    fn insert(&mut self, path: &Path, kind: NodeKind) {
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            self.nodes
                .entry(ancestor.to_path_buf())
                .or_insert(NodeKind::Directory);
        }
        self.nodes.insert(path.to_path_buf(), kind);
    }
}

impl DirectorySource for MemorySource {
    fn children(&self, dir: &Path) -> Result<Vec<RawEntry>, ScanError> {
        if self.denied.contains(dir) {
            return Err(ScanError::Denied(dir.to_path_buf()));
        }
        match self.nodes.get(dir) {
            None => return Err(ScanError::NotFound(dir.to_path_buf())),
            Some(NodeKind::Directory) => {}
            Some(_) => return Err(ScanError::NotADirectory(dir.to_path_buf())),
        }

        Ok(self
            .nodes
            .iter()
            .filter(|(path, _)| path.parent() == Some(dir))
            .map(|(path, kind)| RawEntry {
                name: path
                    .file_name()
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_default(),
                path: path.clone(),
                kind: *kind,
            })
            .collect())
    }

    fn byte_source(&self, file: &Path) -> Result<PathBuf, ScanError> {
        if self.denied.contains(file) {
            return Err(ScanError::Denied(file.to_path_buf()));
        }
        match self.nodes.get(file) {
            Some(NodeKind::File) => Ok(file.to_path_buf()),
            Some(_) => Err(ScanError::Unreadable(file.to_path_buf())),
            None => Err(ScanError::NotFound(file.to_path_buf())),
        }
    }
}

/// Lists `dir`, keeping only the children `level` asks for.
pub fn scan(
    source: &dyn DirectorySource,
    dir: &Path,
    level: ScanLevel,
) -> Result<Vec<Entry>, ScanError> {
    let children = source.children(dir)?;
    let total = children.len();

    let mut entries: Vec<Entry> = children
        .into_iter()
        .filter_map(|child| match (level, child.kind) {
            (ScanLevel::Artists | ScanLevel::Albums, NodeKind::Directory) => {
                Some(Entry::directory(child.name, child.path))
            }
            (ScanLevel::Tracks, NodeKind::File) if is_audio_file(&child.name) => {
                Some(Entry::file(child.name, child.path))
            }
            _ => None,
        })
        .collect();
    sort_by_name(&mut entries);

    debug!(
        dir = %dir.display(),
        level = level.label(),
        kept = entries.len(),
        total,
        "scanned folder"
    );
    Ok(entries)
}

pub fn sort_by_name(entries: &mut [Entry]) {
    entries.sort_by_cached_key(|entry| (collation_key(&entry.name), entry.name.clone()));
}

/// Accent- and case-insensitive sort key.
pub fn collation_key(name: &str) -> String {
    name.nfkd()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase)
        .collect()
}

pub fn is_audio_file(name: &str) -> bool {
    audio_extension_start(name).is_some()
}

pub fn remove_file_extension(name: &str) -> &str {
    match audio_extension_start(name) {
        Some(dot) => &name[..dot],
        None => name,
    }
}

fn audio_extension_start(name: &str) -> Option<usize> {
    let dot = name.rfind('.')?;
    let ext = &name[dot + 1..];
    AUDIO_EXTENSIONS
        .iter()
        .any(|supported| ext.eq_ignore_ascii_case(supported))
        .then_some(dot)
}

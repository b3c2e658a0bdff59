use crate::error::ServiceError;
use crate::parser::decode_lossy;
use serde::Serialize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Directory,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub size: u64,
    /// Seconds since the Unix epoch.
    pub modified: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub directory: PathBuf,
    pub entries: Vec<FileEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedFile {
    pub filepath: PathBuf,
    pub filename: String,
    pub size: usize,
}

/// File access confined to a sandbox root.
#[derive(Debug, Clone)]
pub struct FileHost {
    root: PathBuf,
    gcodes_dir: PathBuf,
}

impl FileHost {
    pub fn new(root: &Path, gcodes_dir: &Path) -> Self {
        let root = normalize(root);
        let gcodes_dir = normalize(&root.join(gcodes_dir));
        Self { root, gcodes_dir }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `requested` against the root. Relative paths are taken from the
    /// root; `..` is folded lexically before the containment check.
    pub fn resolve(&self, requested: &str) -> Result<PathBuf, ServiceError> {
        let resolved = normalize(&self.root.join(requested));
        if resolved.starts_with(&self.root) {
            Ok(resolved)
        } else {
            Err(ServiceError::AccessDenied {
                path: resolved,
                root: self.root.clone(),
            })
        }
    }

    /// Directories and G-code files in `requested`, sorted by name.
    ///
    /// Paths outside the sandbox or missing fall back to the G-code directory.
    pub fn list(&self, requested: Option<&str>) -> Result<Listing, ServiceError> {
        let directory = requested
            .and_then(|path| self.resolve(path).ok())
            .filter(|path| path.exists())
            .unwrap_or_else(|| self.gcodes_dir.clone());

        if !directory.is_dir() {
            return Err(ServiceError::NotADirectory(directory));
        }

        let mut items: Vec<fs::DirEntry> = fs::read_dir(&directory)
            .map_err(|e| ServiceError::io(&directory, e))?
            .filter_map(Result::ok)
            .collect();
        items.sort_by_key(fs::DirEntry::file_name);

        let mut entries = Vec::new();
        if directory != self.root {
            entries.push(FileEntry {
                name: "..".to_string(),
                kind: EntryKind::Directory,
                size: 0,
                modified: None,
            });
        }

        for item in items {
            let name = item.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            // Follows symlinks; unreadable entries are left out.
            let Ok(metadata) = fs::metadata(item.path()) else {
                continue;
            };
            let is_dir = metadata.is_dir();
            if !is_dir && !has_gcode_extension(&name) {
                continue;
            }

            let modified = metadata
                .modified()
                .ok()
                .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
                .map(|age| age.as_secs());

            entries.push(FileEntry {
                name,
                kind: if is_dir {
                    EntryKind::Directory
                } else {
                    EntryKind::File
                },
                size: if is_dir { 0 } else { metadata.len() },
                modified,
            });
        }

        tracing::debug!(directory = %directory.display(), count = entries.len(), "listed");
        Ok(Listing { directory, entries })
    }

    /// Contents of a `.gcode`/`.g` file, invalid UTF-8 dropped.
    pub fn read_gcode(&self, filepath: &str) -> Result<String, ServiceError> {
        let path = self.resolve(filepath)?;
        if !path.exists() {
            return Err(ServiceError::NotFound(path));
        }
        if !has_gcode_extension(&path.to_string_lossy()) {
            return Err(ServiceError::InvalidFileType(path));
        }
        let bytes = fs::read(&path).map_err(|e| ServiceError::io(&path, e))?;
        Ok(decode_lossy(&bytes))
    }

    /// Write `content` as `filename` into `directory` (default: the G-code
    /// directory). Only the basename of `filename` is used, and it is given a
    /// `.gcode` extension unless it already has a G-code one.
    pub fn save(
        &self,
        filename: &str,
        content: &str,
        directory: Option<&str>,
    ) -> Result<SavedFile, ServiceError> {
        let directory = match directory {
            Some(dir) => self.resolve(dir)?,
            None => self.gcodes_dir.clone(),
        };

        let filename = gcode_filename(filename)?;
        let filepath = directory.join(&filename);

        fs::create_dir_all(&directory).map_err(|e| ServiceError::io(&directory, e))?;
        fs::write(&filepath, content).map_err(|e| ServiceError::io(&filepath, e))?;

        tracing::info!(filepath = %filepath.display(), bytes = content.len(), "saved");
        Ok(SavedFile {
            filepath,
            filename,
            size: content.len(),
        })
    }
}

pub fn has_gcode_extension(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.ends_with(".gcode") || lower.ends_with(".g")
}

fn gcode_filename(requested: &str) -> Result<String, ServiceError> {
    let base = Path::new(requested)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    if base.is_empty() {
        return Err(ServiceError::InvalidFilename);
    }
    if has_gcode_extension(&base) {
        return Ok(base);
    }

    let path = Path::new(&base);
    let renamed = if path.extension().is_some() {
        path.with_extension("gcode").to_string_lossy().into_owned()
    } else {
        format!("{base}.gcode")
    };
    Ok(renamed)
}

/// Fold `.` and `..` components without touching the file system.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

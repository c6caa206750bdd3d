use crate::error::{DirectoryNotFoundErr, ReadDirectoryErr};
use crate::LoadError;
use snafu::{ResultExt, ensure};
use std::fs;
use std::path::{Path, PathBuf};

/// File names the operating system drops into directories on its own.
const METADATA_FILES: &[&str] = &[".DS_Store", "Thumbs.db", "desktop.ini"];

pub fn is_metadata_file(name: &str) -> bool {
    // AppleDouble resource forks
    METADATA_FILES.contains(&name) || name.starts_with("._")
}

/// Uses `path` if it exists, otherwise tries it relative to `resource_root`.
pub fn resolve_directory(path: &Path, resource_root: Option<&Path>) -> Result<PathBuf, LoadError> {
    if path.is_dir() {
        return Ok(path.to_path_buf());
    }

    let fallback = resource_root.map(|root| root.join(path));
    match fallback {
        Some(dir) if dir.is_dir() => Ok(dir),
        Some(dir) => DirectoryNotFoundErr { path: dir }.fail(),
        None => DirectoryNotFoundErr { path }.fail(),
    }
}

/// Every regular, non-metadata file in `dir`, sorted by name.
pub fn image_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    ensure!(dir.is_dir(), DirectoryNotFoundErr { path: dir });

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).context(ReadDirectoryErr { path: dir })? {
        let path = entry.context(ReadDirectoryErr { path: dir })?.path();
        if !path.is_file() {
            continue;
        }

        let is_metadata = path
            .file_name()
            .is_some_and(|name| is_metadata_file(&name.to_string_lossy()));
        if is_metadata {
            continue;
        }

        files.push(path);
    }

    files.sort();
    Ok(files)
}

/// Cache key for a file found by [`image_files`].
pub fn file_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

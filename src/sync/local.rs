use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// A regular file found under the sync directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    /// Base filename; the key matched against the album.
    pub name: String,
    /// Absolute path, used only to read the bytes.
    pub path: PathBuf,
}

/// Recursively list the regular files under `directory`, sorted by path.
///
/// Symlinks and directories are excluded, hidden files are included. Fails if
/// `directory` is missing, unreadable or not a directory. Unreadable
/// subdirectories below the root are logged and skipped.
pub async fn list_local_files(directory: &Path) -> io::Result<Vec<LocalFile>> {
    let directory = directory.to_path_buf();
    tokio::task::spawn_blocking(move || walk(&directory))
        .await
        .map_err(io::Error::other)?
}

fn walk(directory: &Path) -> io::Result<Vec<LocalFile>> {
    let root = std::path::absolute(directory)?;
    let meta = std::fs::metadata(&root)?;
    if !meta.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotADirectory,
            format!("{} is not a directory", root.display()),
        ));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(&root).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            tracing::warn!(
                "Skipping {}: filename is not valid UTF-8",
                entry.path().display()
            );
            continue;
        };
        files.push(LocalFile {
            name: name.to_string(),
            path: entry.path().to_path_buf(),
        });
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

use std::io;
use std::path::{Component, Path, PathBuf};

/// Maps a request path onto a file under `root`. Empty, absolute and
/// parent-relative paths never resolve.
pub fn resolve(root: &Path, request_path: &str) -> Option<PathBuf> {
    if request_path.is_empty() {
        return None;
    }

    let relative = Path::new(request_path);
    let safe = relative
        .components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
    if !safe {
        return None;
    }

    Some(root.join(relative))
}

/// Reads a regular file. Directories and missing files are both `NotFound`.
pub async fn read_file(path: &Path) -> io::Result<Vec<u8>> {
    let metadata = tokio::fs::metadata(path).await?;
    if !metadata.is_file() {
        return Err(io::Error::new(io::ErrorKind::NotFound, "not a regular file"));
    }
    tokio::fs::read(path).await
}

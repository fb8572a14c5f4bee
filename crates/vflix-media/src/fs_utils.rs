//! Filesystem cleanup helpers.
//!
//! Deletion targets may legitimately be absent (a source upload that failed
//! before any transcode ran, a re-delivered cleanup). A missing path is not
//! an error; anything else — permissions, I/O — propagates.

use std::io;
use std::path::Path;

use tokio::fs;

/// Remove a file, treating "already gone" as success.
pub async fn remove_file_if_exists(path: impl AsRef<Path>) -> io::Result<()> {
    match fs::remove_file(path.as_ref()).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Recursively remove a directory tree, treating "already gone" as success.
pub async fn remove_tree_if_exists(path: impl AsRef<Path>) -> io::Result<()> {
    match fs::remove_dir_all(path.as_ref()).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_remove_file_if_exists() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("rendition.mp4");
        fs::write(&file, b"data").await.unwrap();

        remove_file_if_exists(&file).await.unwrap();
        assert!(!file.exists());

        // Second removal is a no-op, not an error.
        remove_file_if_exists(&file).await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_tree_if_exists() {
        let dir = TempDir::new().unwrap();
        let tree = dir.path().join("videos").join("Test_Video");
        fs::create_dir_all(tree.join("HLS_files")).await.unwrap();
        fs::write(tree.join("HLS_files").join("video_360p.m3u8"), b"#EXTM3U")
            .await
            .unwrap();

        remove_tree_if_exists(&tree).await.unwrap();
        assert!(!tree.exists());
    }

    #[tokio::test]
    async fn test_remove_missing_tree_is_ok() {
        let dir = TempDir::new().unwrap();
        let never_created = dir.path().join("videos").join("Never_Created");
        remove_tree_if_exists(&never_created).await.unwrap();
    }
}

//! Host-to-mounted path translation.
//!
//! The catalog process and the encoder may live in different filesystem
//! namespaces (a host web process storing `DRIVE:\...` paths, the encoding
//! tools running against a mounted view of the same drive). Paths are
//! translated immediately before being handed to a tool; paths already in
//! mounted form pass through unchanged.

use std::path::{Path, PathBuf};

/// Translate a host-native path into its mounted equivalent.
///
/// `C:\media\video.mp4` becomes `/mnt/c/media/video.mp4`. Anything without a
/// drive prefix is returned as-is.
pub fn to_mounted_path(path: impl AsRef<Path>) -> PathBuf {
    let raw = path.as_ref().to_string_lossy();
    match map_host_path(&raw) {
        Some(mapped) => PathBuf::from(mapped),
        None => path.as_ref().to_path_buf(),
    }
}

fn map_host_path(raw: &str) -> Option<String> {
    if !raw.contains(':') || !raw.contains('\\') {
        return None;
    }
    let (drive, rest) = raw.split_once(':')?;
    let rest = rest.trim_matches('\\').replace('\\', "/");
    Some(format!("/mnt/{}/{}", drive.to_lowercase(), rest))
}

use std::path::Path;

use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;

use crate::error::InitError;

const BUF_SIZE: usize = 64 * 1024;

/// Marker identifying the image line in a `.sha256` manifest.
pub const IMAGE_MARKER: &str = ".qcow2";

/// Compute the SHA-256 of a file as lowercase hex, reading it in 64 KiB chunks.
pub async fn compute_local_digest(path: &Path) -> Result<String, InitError> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| InitError::Io {
            context: format!("opening {}", path.display()),
            source: e,
        })?;

    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = file.read(&mut buf).await.map_err(|e| InitError::Io {
            context: format!("reading {}", path.display()),
            source: e,
        })?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Pull the expected digest out of a checksum manifest.
///
/// Takes the first line mentioning [`IMAGE_MARKER`] and returns its first
/// whitespace-separated token. Returns `None` when no line matches.
pub fn extract_remote_digest(manifest: &str) -> Option<&str> {
    let mut matches = manifest.lines().filter(|l| l.contains(IMAGE_MARKER));
    let first = matches.next()?;
    let extra = matches.count();
    if extra > 0 {
        tracing::warn!(extra, "manifest lists several images, using the first");
    }
    first.split_whitespace().next()
}

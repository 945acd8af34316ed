//! Image bootstrap sequence.
//!
//! Check the local image against the published checksum, download it when it
//! is missing or stale, then render the cloud-init config. Both branches end
//! in the render step.

use std::path::PathBuf;

use crate::checksum;
use crate::cloudinit;
use crate::error::InitError;
use crate::paths;
use crate::progress::DownloadProgress;
use crate::remote::{self, ImageSource};

/// Result of comparing the local image with the remote manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageState {
    /// Local digest matches, download skipped.
    UpToDate,
    /// Missing or mismatched, a fresh copy is needed.
    NeedsDownload,
}

/// Inputs for one bootstrap run.
#[derive(Debug, Clone)]
pub struct InitOptions {
    pub repository: String,
    pub image: String,
    pub ssh_pub_key: PathBuf,
    pub image_path: PathBuf,
    pub template_path: PathBuf,
    pub config_path: PathBuf,
    pub show_progress: bool,
}

impl InitOptions {
    /// Options using the fixed file names in the working directory.
    pub fn new(repository: String, image: String, ssh_pub_key: PathBuf) -> Self {
        Self {
            repository,
            image,
            ssh_pub_key,
            image_path: PathBuf::from(paths::IMAGE_FILE),
            template_path: PathBuf::from(paths::TEMPLATE_FILE),
            config_path: PathBuf::from(paths::CONFIG_FILE),
            show_progress: true,
        }
    }
}

/// Decide whether the image at `opts.image_path` is current.
///
/// The manifest is only fetched when a local file exists.
pub async fn check_local<S: ImageSource>(
    source: &S,
    url: &str,
    opts: &InitOptions,
) -> Result<ImageState, InitError> {
    if !opts.image_path.is_file() {
        tracing::debug!(path = %opts.image_path.display(), "no local image");
        return Ok(ImageState::NeedsDownload);
    }

    let local = checksum::compute_local_digest(&opts.image_path).await?;
    let manifest = source.fetch_manifest(url).await?;
    let expected = checksum::extract_remote_digest(&manifest).ok_or_else(|| {
        InitError::ManifestNoMatch {
            url: remote::manifest_url(url),
        }
    })?;

    tracing::debug!(local = %local, expected = %expected, "compared image digests");
    if local == expected {
        Ok(ImageState::UpToDate)
    } else {
        Ok(ImageState::NeedsDownload)
    }
}

/// Run the whole bootstrap: check, maybe download, render config.
pub async fn run<S: ImageSource>(source: &S, opts: &InitOptions) -> Result<ImageState, InitError> {
    // Fail on a missing key before spending time on the download.
    let ssh_pub_key = cloudinit::load_ssh_public_key(&opts.ssh_pub_key).await?;

    let url = remote::build_url(&opts.repository, &opts.image);
    let state = check_local(source, &url, opts).await?;

    match state {
        ImageState::UpToDate => println!("VM image already downloaded."),
        ImageState::NeedsDownload => {
            println!("downloading {url}");
            let mut progress = if opts.show_progress {
                DownloadProgress::new()
            } else {
                DownloadProgress::hidden()
            };
            if let Err(e) = source.download(&url, &opts.image_path, &mut progress).await {
                progress.abandon();
                return Err(e);
            }
            progress.finish();
            tracing::info!(path = %opts.image_path.display(), "image downloaded");
        }
    }

    println!("Initializing cloudinit config.");
    let config = cloudinit::render_config(&opts.template_path, &ssh_pub_key).await?;
    cloudinit::write_config(&opts.config_path, &config).await?;

    Ok(state)
}

use std::path::Path;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::error::InitError;
use crate::paths;
use crate::progress::DownloadProgress;
use crate::retry::{self, ErrorKind, Failure, RetryPolicy};

/// OBS project publishing the Kubic images.
pub const BASE_URL: &str = "https://download.opensuse.org/repositories/devel:/kubic:/images";

/// Image URL for `image` in OBS `repository`. Inputs are not escaped.
pub fn build_url(repository: &str, image: &str) -> String {
    format!("{BASE_URL}/{repository}/{image}")
}

/// Checksum manifest published next to `url`.
pub fn manifest_url(url: &str) -> String {
    format!("{url}.sha256")
}

/// Where images and their manifests come from.
#[allow(async_fn_in_trait)] // trait is internal-only
pub trait ImageSource {
    /// Fetch the `.sha256` manifest published alongside `url`.
    async fn fetch_manifest(&self, url: &str) -> Result<String, InitError>;

    /// Replace `dest` with the resource at `url`.
    async fn download(
        &self,
        url: &str,
        dest: &Path,
        progress: &mut DownloadProgress,
    ) -> Result<(), InitError>;
}

/// [`ImageSource`] backed by plain HTTP(S) GETs.
pub struct HttpSource {
    client: reqwest::Client,
    policy: RetryPolicy,
}

fn request_failure(url: &str, e: reqwest::Error) -> Failure {
    Failure::new(
        ErrorKind::from_reqwest(&e),
        InitError::ImageDownload {
            message: format!("request to {url} failed"),
            source: Box::new(e),
        },
    )
}

fn check_status(response: &reqwest::Response, url: &str) -> Result<(), Failure> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    Err(Failure::new(
        ErrorKind::from_status(status.as_u16()),
        InitError::ImageDownload {
            message: format!("HTTP {status} from {url}"),
            source: format!("HTTP {status}").into(),
        },
    ))
}

/// Stream a response body to a file, reporting every chunk.
async fn download_to_file(
    path: &Path,
    response: reqwest::Response,
    progress: &mut DownloadProgress,
) -> Result<(), Failure> {
    let total = response.content_length();
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| InitError::Io {
            context: format!("creating {}", path.display()),
            source: e,
        })?;

    let mut done = 0u64;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            Failure::new(
                ErrorKind::from_reqwest(&e),
                InitError::ImageDownload {
                    message: "error reading response body".into(),
                    source: Box::new(e),
                },
            )
        })?;
        file.write_all(&chunk).await.map_err(|e| InitError::Io {
            context: "writing image data".into(),
            source: e,
        })?;
        done += chunk.len() as u64;
        progress.update(done, total);
    }

    file.flush().await.map_err(|e| InitError::Io {
        context: "flushing image file".into(),
        source: e,
    })?;

    Ok(())
}

impl HttpSource {
    pub fn new(policy: RetryPolicy) -> Result<Self, InitError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| InitError::ImageDownload {
                message: "building HTTP client".into(),
                source: Box::new(e),
            })?;
        Ok(Self { client, policy })
    }

    async fn try_fetch_text(&self, url: &str) -> Result<String, Failure> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| request_failure(url, e))?;
        check_status(&response, url)?;
        let body = response.bytes().await.map_err(|e| request_failure(url, e))?;
        String::from_utf8(body.to_vec()).map_err(|e| {
            Failure::from(InitError::ImageDownload {
                message: format!("{url} is not valid UTF-8"),
                source: Box::new(e),
            })
        })
    }

    async fn try_download(
        &self,
        url: &str,
        dest: &Path,
        progress: &mut DownloadProgress,
    ) -> Result<(), Failure> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| request_failure(url, e))?;
        check_status(&response, url)?;

        let tmp_path = paths::part_path(dest);

        // Remove any stale .part file from an interrupted run.
        let _ = tokio::fs::remove_file(&tmp_path).await;

        if let Err(f) = download_to_file(&tmp_path, response, progress).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(f);
        }

        tokio::fs::rename(&tmp_path, dest)
            .await
            .map_err(|e| InitError::Io {
                context: format!("renaming {} to {}", tmp_path.display(), dest.display()),
                source: e,
            })?;
        Ok(())
    }
}

impl ImageSource for HttpSource {
    async fn fetch_manifest(&self, url: &str) -> Result<String, InitError> {
        let url = manifest_url(url);
        let mut attempt = 1;
        loop {
            match self.try_fetch_text(&url).await {
                Ok(text) => return Ok(text),
                Err(f) => {
                    self.policy
                        .wait_or_give_up(attempt, f, "manifest fetch")
                        .await?
                }
            }
            attempt += 1;
        }
    }

    async fn download(
        &self,
        url: &str,
        dest: &Path,
        progress: &mut DownloadProgress,
    ) -> Result<(), InitError> {
        progress.suspend(|| {
            tracing::info!(url = %url, dest = %dest.display(), "downloading image");
        });
        let mut attempt = 1;
        loop {
            match self.try_download(url, dest, progress).await {
                Ok(()) => return Ok(()),
                Err(f) => {
                    // The bar is still drawn between attempts.
                    let Some(delay) = self.policy.next_delay(attempt, f.kind) else {
                        return Err(f.error);
                    };
                    progress.suspend(|| retry::log_retry("image download", attempt, delay, &f.error));
                    tokio::time::sleep(delay).await;
                }
            }
            attempt += 1;
        }
    }
}

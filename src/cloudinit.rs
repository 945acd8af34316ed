use std::path::Path;

use crate::error::InitError;
use crate::paths;
use crate::template::{self, Variables};

/// Placeholder the template uses for the injected public key.
pub const SSH_KEY_PLACEHOLDER: &str = "ssh_pub_key";

/// Read the public key to inject, without its trailing newline.
pub async fn load_ssh_public_key(path: &Path) -> Result<String, InitError> {
    match tokio::fs::read_to_string(path).await {
        Ok(key) => Ok(key.trim_end().to_string()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(InitError::SshKeyNotFound {
            path: path.display().to_string(),
        }),
        Err(e) => Err(InitError::Io {
            context: format!("reading SSH public key {}", path.display()),
            source: e,
        }),
    }
}

/// Render the cloud-init template at `template_path` with the given key.
pub async fn render_config(template_path: &Path, ssh_pub_key: &str) -> Result<String, InitError> {
    let text = tokio::fs::read_to_string(template_path)
        .await
        .map_err(|e| InitError::Io {
            context: format!("reading template {}", template_path.display()),
            source: e,
        })?;
    let vars = Variables::from([(SSH_KEY_PLACEHOLDER, ssh_pub_key)]);
    template::render_template(&text, &vars)
}

/// Replace `path` with `text`, going through a `.part` file and a rename.
pub async fn write_config(path: &Path, text: &str) -> Result<(), InitError> {
    let tmp_path = paths::part_path(path);
    if let Err(e) = tokio::fs::write(&tmp_path, text).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(InitError::Io {
            context: format!("writing {}", tmp_path.display()),
            source: e,
        });
    }

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| InitError::Io {
            context: format!("renaming {} to {}", tmp_path.display(), path.display()),
            source: e,
        })?;

    tracing::info!(path = %path.display(), "wrote cloud-init config");
    Ok(())
}

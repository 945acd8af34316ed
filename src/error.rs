use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum InitError {
    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("image download failed: {message}")]
    ImageDownload {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("no .qcow2 entry in checksum manifest {url}")]
    #[diagnostic(help("check that the image name exists in the repository"))]
    ManifestNoMatch { url: String },

    #[error("Could not find a public SSH key at {path}")]
    #[diagnostic(help("generate one with the ssh-keygen command, or pass --ssh-pub-key"))]
    SshKeyNotFound { path: String },

    #[error("invalid template: {message}")]
    Template { message: String },

    #[error("template references unknown placeholder '{name}'")]
    MissingPlaceholder { name: String },
}

use std::path::{Path, PathBuf};

/// Downloaded VM image, relative to the working directory.
pub const IMAGE_FILE: &str = "kubic.qcow2";

/// Cloud-init template read from the working directory.
pub const TEMPLATE_FILE: &str = "commoninit.cfg.in";

/// Rendered cloud-init config written next to the template.
pub const CONFIG_FILE: &str = "commoninit.cfg";

/// Default public key injected into the nodes: `~/.ssh/id_rsa.pub`.
pub fn default_ssh_pub_key() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/root"))
        .join(".ssh")
        .join("id_rsa.pub")
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

/// Sibling path used while a file is being written: `<name>.part`.
pub fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

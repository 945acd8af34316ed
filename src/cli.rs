use clap::Parser;
use std::path::PathBuf;

use crate::paths;

pub const DEFAULT_REPOSITORY: &str = "openSUSE_Tumbleweed";
pub const DEFAULT_IMAGE: &str = "openSUSE-MicroOS.x86_64-Kubic-kubeadm-kvm-and-xen.qcow2";

#[derive(Parser, Debug)]
#[command(
    name = "kubic-init",
    about = "Fetch the Kubic VM image and render its cloud-init config"
)]
pub struct Cli {
    /// OBS repository to download the image from
    #[arg(short, long, default_value = DEFAULT_REPOSITORY)]
    pub repository: String,

    /// Image name
    #[arg(short, long, default_value = DEFAULT_IMAGE)]
    pub image: String,

    /// Path to the SSH public key to inject into nodes
    #[arg(short, long = "ssh-pub-key", default_value_os_t = paths::default_ssh_pub_key())]
    pub ssh_pub_key: PathBuf,

    /// Extra attempts for failed network requests
    #[arg(long, default_value_t = 0)]
    pub retries: u32,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

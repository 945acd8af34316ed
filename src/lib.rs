#![allow(unused_assignments)] // thiserror/miette proc macros trigger false positives

pub mod checksum;
pub mod cli;
pub mod cloudinit;
pub mod error;
pub mod init;
pub mod logging;
pub mod paths;
pub mod progress;
pub mod remote;
pub mod retry;
pub mod template;

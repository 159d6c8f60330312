use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs::File, path::Path};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub toolchain: Toolchain,
    pub misc: Misc,
    pub rclone: Rclone,
    pub rar: Rar,
    pub par2: Par2,
}

/// Paths to the external binaries the tool shells out to.
#[derive(Debug, Deserialize)]
pub struct Toolchain {
    pub rar: String,
    pub par2: String,
    pub rclone: String,
    pub tsp: String,
}

#[derive(Debug, Deserialize)]
pub struct Misc {
    /// Local staging root for compressed output.
    pub prefix: String,
}

#[derive(Debug, Deserialize)]
pub struct Rclone {
    /// Remote receiving the compressed archive; empty disables compression.
    pub compress_account: String,
    /// Remote receiving the raw folder; empty disables the raw upload.
    pub raw_account: String,
    pub threads: String,
    pub bandwidth_limit: String,
}

#[derive(Debug, Deserialize)]
pub struct Rar {
    /// Split-volume size, e.g. "1g".
    pub split: String,
    /// Recovery record percentage.
    pub rr: String,
}

#[derive(Debug, Deserialize)]
pub struct Par2 {
    /// Block size in bytes.
    pub block: u64,
    /// Redundancy percentage; 0 disables the parity step.
    pub redundancy: u32,
    /// Memory limit handed to par2, e.g. "2000".
    pub memory: String,
}

impl Config {
    pub fn read_from_file(filepath: &Path) -> Result<Self> {
        let file = File::open(filepath).context(format!(
            "could not open configuration file \"{}\" (run bootstrap first)",
            filepath.to_string_lossy()
        ))?;

        Ok(serde_json::from_reader(file)?)
    }
}

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(version, about = "Serve a flat file system image over TCP")]
pub struct Cli {
    /// Disk image, created when missing
    #[arg(long, short, default_value = "filesystem.dat")]
    pub image: PathBuf,

    /// Listening address
    #[arg(long, short, default_value = "127.0.0.1:12345")]
    pub addr: String,

    /// Image size in bytes, defaults to the size the geometry needs
    #[arg(long)]
    pub total_size: Option<u64>,

    /// Number of file slots
    #[arg(long, default_value_t = 5)]
    pub max_files: usize,

    /// Number of blocks, metadata included
    #[arg(long, default_value_t = 10)]
    pub max_blocks: usize,
}

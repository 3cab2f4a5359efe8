mod cli;

use std::error::Error;
use std::sync::Arc;

use clap::Parser;
use flat_fs::{FileSystem, Geometry};
use flat_fs_server::Server;

use self::cli::Cli;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let geometry = Geometry::new(cli.max_files, cli.max_blocks);
    let total_size = cli
        .total_size
        .unwrap_or(geometry.image_len() as u64);
    log::info!("image={:?} total_size={total_size} {geometry:?}", cli.image);

    let fs = FileSystem::open_image(&cli.image, total_size, geometry)?;
    log::info!(
        "files={:?} free_blocks={}",
        fs.list_files(),
        fs.free_blocks()
    );

    Server::bind(&cli.addr, Arc::new(fs))?.run()?;

    Ok(())
}

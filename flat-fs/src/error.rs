use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FsError {
    #[error("Filename must be 1 to 11 bytes without spaces or control characters.")]
    InvalidName,
    #[error("File already exists.")]
    AlreadyExists,
    #[error("File table is full.")]
    CapacityExceeded,
    #[error("File does not exist.")]
    NotFound,
    #[error("Not enough free blocks available.")]
    InsufficientSpace,
    #[error("File has no data.")]
    NoData,
    #[error("Disk I/O failure: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid file system geometry: {0}")]
    InvalidGeometry(String),
}

impl From<binrw::Error> for FsError {
    fn from(e: binrw::Error) -> Self {
        match e {
            binrw::Error::Io(e) => Self::Io(e),
            e => Self::Io(io::Error::new(io::ErrorKind::InvalidData, e.to_string())),
        }
    }
}

pub type Result<T> = core::result::Result<T, FsError>;

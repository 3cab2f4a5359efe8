use std::fs::{File, OpenOptions, TryLockError};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use crate::BlockDevice;

/// 宿主机文件充当的磁盘镜像。
///
/// 打开时对文件加排他的建议锁，同一镜像不会被两个实例同时挂载。
#[derive(Debug)]
pub struct BlockFile {
    inner: Mutex<File>,
    block_size: usize,
    blocks: usize,
}

impl BlockFile {
    /// 打开或创建镜像，返回设备以及镜像是否为全新（长度为0）。
    ///
    /// 短于`total_size`的镜像会被延长，但绝不截短。
    pub fn open(
        path: impl AsRef<Path>,
        block_size: usize,
        total_size: u64,
    ) -> io::Result<(Self, bool)> {
        let path = path.as_ref();
        let fd = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        match fd.try_lock() {
            Ok(()) => {}
            Err(TryLockError::WouldBlock) => {
                return Err(io::Error::new(
                    io::ErrorKind::WouldBlock,
                    format!("disk image {path:?} is already in use"),
                ));
            }
            Err(TryLockError::Error(e)) => return Err(e),
        }

        let len = fd.metadata()?.len();
        let fresh = len == 0;
        if len < total_size {
            log::info!("extending disk image {path:?} from {len} to {total_size} bytes");
            fd.set_len(total_size)?;
        }

        let blocks = (len.max(total_size) / block_size as u64) as usize;
        Ok((
            Self {
                inner: Mutex::new(fd),
                block_size,
                blocks,
            },
            fresh,
        ))
    }
}

impl BlockDevice for BlockFile {
    fn block_size(&self) -> usize {
        self.block_size
    }

    fn blocks(&self) -> usize {
        self.blocks
    }

    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> io::Result<()> {
        let offset = crate::byte_range(self, block_id, buf.len())?;
        let mut file = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) -> io::Result<()> {
        let offset = crate::byte_range(self, block_id, buf.len())?;
        let mut file = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(buf)
    }

    fn flush(&self) -> io::Result<()> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .sync_data()
    }
}

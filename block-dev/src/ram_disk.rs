use std::io;
use std::sync::{Mutex, PoisonError};

use crate::BlockDevice;

/// 内存中的磁盘镜像
#[derive(Debug)]
pub struct RamDisk {
    data: Mutex<Vec<u8>>,
    block_size: usize,
}

impl RamDisk {
    pub fn new(blocks: usize, block_size: usize) -> Self {
        Self {
            data: Mutex::new(vec![0; blocks * block_size]),
            block_size,
        }
    }

    /// 镜像的完整拷贝
    pub fn snapshot(&self) -> Vec<u8> {
        self.data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl BlockDevice for RamDisk {
    fn block_size(&self) -> usize {
        self.block_size
    }

    fn blocks(&self) -> usize {
        self.data.lock().unwrap_or_else(PoisonError::into_inner).len() / self.block_size
    }

    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> io::Result<()> {
        let offset = crate::byte_range(self, block_id, buf.len())? as usize;
        let data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        buf.copy_from_slice(&data[offset..offset + buf.len()]);
        Ok(())
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) -> io::Result<()> {
        let offset = crate::byte_range(self, block_id, buf.len())? as usize;
        let mut data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        data[offset..offset + buf.len()].copy_from_slice(buf);
        Ok(())
    }
}

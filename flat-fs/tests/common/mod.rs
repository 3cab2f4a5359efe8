//! Common utilities for tests

#![allow(dead_code)]

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use block_dev::{BlockDevice, RamDisk};
use flat_fs::{BLOCK_SIZE, FileSystem, Geometry};

/// 在若干次写入之后开始报错的设备
#[derive(Debug)]
pub struct FaultyDisk {
    inner: RamDisk,
    armed: AtomicBool,
    writes_left: AtomicUsize,
}

impl FaultyDisk {
    pub fn new(blocks: usize) -> Self {
        Self {
            inner: RamDisk::new(blocks, BLOCK_SIZE),
            armed: AtomicBool::new(false),
            writes_left: AtomicUsize::new(0),
        }
    }

    /// 再允许`writes`次写入，之后的写入全部失败
    pub fn fail_after(&self, writes: usize) {
        self.writes_left.store(writes, Ordering::SeqCst);
        self.armed.store(true, Ordering::SeqCst);
    }

    pub fn heal(&self) {
        self.armed.store(false, Ordering::SeqCst);
    }

    pub fn block(&self, block_id: usize) -> Vec<u8> {
        let mut buf = vec![0u8; BLOCK_SIZE];
        self.inner.read_block(block_id, &mut buf).unwrap();
        buf
    }
}

impl BlockDevice for FaultyDisk {
    fn block_size(&self) -> usize {
        self.inner.block_size()
    }

    fn blocks(&self) -> usize {
        self.inner.blocks()
    }

    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> io::Result<()> {
        self.inner.read_block(block_id, buf)
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) -> io::Result<()> {
        if self.armed.load(Ordering::SeqCst)
            && self
                .writes_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_err()
        {
            return Err(io::Error::other("injected write failure"));
        }
        self.inner.write_block(block_id, buf)
    }
}

pub fn disk() -> Arc<FaultyDisk> {
    Arc::new(FaultyDisk::new(Geometry::default().max_blocks))
}

pub fn format(disk: &Arc<FaultyDisk>) -> FileSystem {
    FileSystem::format(disk.clone(), Geometry::default()).unwrap()
}

/// 长度为`len`、内容可辨认的数据
pub fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len).map(|i| (i as u8).wrapping_mul(31) ^ seed).collect()
}

pub fn assert_consistent(fs: &FileSystem) {
    if let Err(e) = fs.check() {
        panic!("inconsistent file system: {e}");
    }
}

//! # 块设备层
//!
//! 文件系统只通过[`BlockDevice`]读写磁盘镜像，
//! 镜像可以是宿主机上的文件，也可以是内存。

mod block_file;
mod ram_disk;

use std::fmt::Debug;
use std::io;

pub use self::{block_file::BlockFile, ram_disk::RamDisk};

/// 以块为单位寻址的存储设备。
///
/// `buf`的长度必须是块大小的整数倍，一次读写可以跨越多个连续的块。
pub trait BlockDevice: Debug + Send + Sync {
    /// 块大小（字节）
    fn block_size(&self) -> usize;

    /// 设备容纳的总块数
    fn blocks(&self) -> usize;

    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> io::Result<()>;

    fn write_block(&self, block_id: usize, buf: &[u8]) -> io::Result<()>;

    /// 将已写入的数据落盘
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

/// 检查一次读写是否对齐且不越界，返回其字节偏移。
fn byte_range(dev: &dyn BlockDevice, block_id: usize, len: usize) -> io::Result<u64> {
    let block_size = dev.block_size();
    if len % block_size != 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("buffer of {len} bytes is not a multiple of the block size {block_size}"),
        ));
    }

    let end = block_id + len / block_size;
    if end > dev.blocks() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("blocks {block_id}..{end} out of device range 0..{}", dev.blocks()),
        ));
    }

    Ok((block_id * block_size) as u64)
}

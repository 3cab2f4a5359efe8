//! # 磁盘数据结构层
//!
//! 镜像的布局，以块为单位：
//! 元数据区 | 数据块区
//!
//! 元数据区从偏移0开始，依次存放：
//! 索引节点表（`max_files`项） | 空闲块位图（`max_blocks`字节） | 块链表（`max_blocks`项）
//!
//! 元数据区占据的块同样记录在位图中，且永远不会分配给文件。

mod entry;
mod metadata;

pub use self::{
    entry::{DiskEntry, ENTRY_SIZE, EntryFlag},
    metadata::RawMetadata,
};

use crate::{BLOCK_SIZE, BlockId, FsError, Result};

/// 位图中一项的字节数，1表示已占用，0表示空闲
pub const BITMAP_ENTRY_SIZE: usize = 1;

/// 块链表中一项的字节数
pub const LINK_SIZE: usize = 2;

/// 文件系统的规格：索引节点个数与块个数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub max_files: usize,
    pub max_blocks: usize,
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new(5, 10)
    }
}

impl Geometry {
    pub const fn new(max_files: usize, max_blocks: usize) -> Self {
        Self {
            max_files,
            max_blocks,
        }
    }

    /// 元数据区的有效字节数
    pub const fn metadata_len(&self) -> usize {
        self.max_files * ENTRY_SIZE + self.max_blocks * (BITMAP_ENTRY_SIZE + LINK_SIZE)
    }

    /// 首个数据块的编号，此前的块都属于元数据区
    pub const fn first_data_block(&self) -> usize {
        self.metadata_len().div_ceil(BLOCK_SIZE)
    }

    /// 所有块占据的字节数，即镜像的最小长度
    pub const fn image_len(&self) -> usize {
        self.max_blocks * BLOCK_SIZE
    }

    /// 可分配给文件的块数
    pub const fn data_blocks(&self) -> usize {
        self.max_blocks - self.first_data_block()
    }

    pub fn is_data_block(&self, id: BlockId) -> bool {
        (self.first_data_block()..self.max_blocks).contains(&id.index())
    }

    pub fn validate(self) -> Result<Self> {
        if self.max_files == 0 {
            return Err(FsError::InvalidGeometry(
                "at least one file slot is required".into(),
            ));
        }
        if self.max_blocks >= BlockId::NONE as usize {
            return Err(FsError::InvalidGeometry(format!(
                "{} blocks cannot be addressed by 16-bit block ids",
                self.max_blocks
            )));
        }
        if self.first_data_block() >= self.max_blocks {
            return Err(FsError::InvalidGeometry(format!(
                "metadata of {} bytes leaves no data block among {} blocks",
                self.metadata_len(),
                self.max_blocks
            )));
        }

        Ok(self)
    }
}

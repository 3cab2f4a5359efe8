use std::collections::HashSet;

use thiserror::Error;

use crate::volume::Volume;
use crate::{BLOCK_SIZE, BlockId};

/// 元数据违反的不变量
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Inconsistency {
    #[error("name {0:?} is used by more than one file")]
    DuplicateName(String),
    #[error("file {name:?} starts at block {block}, which is not a used data block")]
    DanglingHead { name: String, block: BlockId },
    #[error("file {name:?} of {size} bytes spans {actual} blocks, expected {expected}")]
    ChainLength {
        name: String,
        size: usize,
        expected: usize,
        actual: usize,
    },
    #[error("block {0} belongs to more than one chain")]
    SharedBlock(BlockId),
    #[error("block {0} is marked used but belongs to no file")]
    LeakedBlock(BlockId),
    #[error("block {0} is in a chain but marked free")]
    UnmarkedBlock(BlockId),
    #[error("metadata block {0} is marked free")]
    UnreservedMetadata(BlockId),
}

impl Volume {
    /// 检查元数据是否满足全部不变量：
    /// 名称互不相同、块链长度与文件大小相符、块链互不相交，
    /// 且被占用的块恰好是所有块链与元数据区之并。
    pub fn check(&self) -> Result<(), Inconsistency> {
        let geometry = self.geometry();
        let mut names = HashSet::new();
        let mut owned = HashSet::new();

        for entry in self.table.in_use() {
            if !names.insert(entry.name()) {
                return Err(Inconsistency::DuplicateName(entry.name().to_owned()));
            }

            if let Some(head) = entry.first_block() {
                if !geometry.is_data_block(head) || !self.bitmap.is_used(head) {
                    return Err(Inconsistency::DanglingHead {
                        name: entry.name().to_owned(),
                        block: head,
                    });
                }
            }

            let chain = self.fat.chain(entry.first_block());
            let expected = entry.size().div_ceil(BLOCK_SIZE);
            if chain.len() != expected {
                return Err(Inconsistency::ChainLength {
                    name: entry.name().to_owned(),
                    size: entry.size(),
                    expected,
                    actual: chain.len(),
                });
            }

            for id in chain {
                if !owned.insert(id) {
                    return Err(Inconsistency::SharedBlock(id));
                }
                if !self.bitmap.is_used(id) {
                    return Err(Inconsistency::UnmarkedBlock(id));
                }
            }
        }

        for index in 0..geometry.first_data_block() {
            let id = BlockId::new(index as u16);
            if !self.bitmap.is_used(id) {
                return Err(Inconsistency::UnreservedMetadata(id));
            }
        }

        match self
            .bitmap
            .used_blocks()
            .find(|&id| geometry.is_data_block(id) && !owned.contains(&id))
        {
            Some(id) => Err(Inconsistency::LeakedBlock(id)),
            None => Ok(()),
        }
    }
}

use binrw::binrw;
use enumflags2::{BitFlags, bitflags};

use crate::NAME_CAP;

/// 磁盘上一个索引节点所占的字节数
pub const ENTRY_SIZE: usize = NAME_CAP + 2 + 2 + 1;

/// 磁盘上的索引节点
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiskEntry {
    /// 文件名，不足的部分以0填充
    pub name: [u8; NAME_CAP],
    /// 文件字节数
    pub size: u16,
    /// 首个数据块，[`BlockId::NONE`](crate::BlockId::NONE)表示没有数据块
    pub first_block: u16,
    flags: u8,
}

impl DiskEntry {
    pub fn new(name: &[u8], size: u16, first_block: u16, flags: BitFlags<EntryFlag>) -> Self {
        let mut padded = [0u8; NAME_CAP];
        let len = name.len().min(NAME_CAP);
        padded[..len].copy_from_slice(&name[..len]);

        Self {
            name: padded,
            size,
            first_block,
            flags: flags.bits(),
        }
    }

    pub fn flags(&self) -> BitFlags<EntryFlag> {
        BitFlags::from_bits_truncate(self.flags)
    }

    /// 去掉填充后的文件名
    pub fn name(&self) -> &[u8] {
        let len = self
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(NAME_CAP);
        &self.name[..len]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[bitflags]
#[repr(u8)]
pub enum EntryFlag {
    /// 该槽位上有文件
    InUse = 0b0000_0001,
}

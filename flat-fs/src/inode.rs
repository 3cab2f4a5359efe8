use core::ops::{Index, IndexMut};

use enumflags2::BitFlags;

use crate::layout::{DiskEntry, EntryFlag};
use crate::{BlockId, FsError, NAME_CAP, Result};

/// 文件的元信息，即索引节点。
///
/// 槽位永远不会被移除，删除文件只是把槽位复位为空。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileEntry {
    name: String,
    size: u16,
    first_block: Option<BlockId>,
    in_use: bool,
}

impl FileEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.size as usize
    }

    pub fn first_block(&self) -> Option<BlockId> {
        self.first_block
    }

    /// 占用空槽位，得到一个空文件
    fn claim(&mut self, name: &str) {
        *self = Self {
            name: name.to_owned(),
            size: 0,
            first_block: None,
            in_use: true,
        };
    }

    /// 替换文件内容所在的块链
    pub fn set_content(&mut self, first_block: Option<BlockId>, size: u16) {
        self.first_block = first_block;
        self.size = size;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl From<&DiskEntry> for FileEntry {
    fn from(entry: &DiskEntry) -> Self {
        Self {
            name: String::from_utf8_lossy(entry.name()).into_owned(),
            size: entry.size,
            first_block: BlockId::from_raw(entry.first_block),
            in_use: entry.flags().contains(EntryFlag::InUse),
        }
    }
}

impl From<&FileEntry> for DiskEntry {
    fn from(entry: &FileEntry) -> Self {
        let flags = if entry.in_use {
            EntryFlag::InUse.into()
        } else {
            BitFlags::empty()
        };
        DiskEntry::new(
            entry.name.as_bytes(),
            entry.size,
            BlockId::to_raw(entry.first_block),
            flags,
        )
    }
}

/// 定长的索引节点表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InodeTable {
    entries: Vec<FileEntry>,
}

impl InodeTable {
    pub fn new(max_files: usize) -> Self {
        Self {
            entries: vec![FileEntry::default(); max_files],
        }
    }

    pub fn from_disk(entries: &[DiskEntry]) -> Self {
        Self {
            entries: entries.iter().map(FileEntry::from).collect(),
        }
    }

    pub fn to_disk(&self) -> Vec<DiskEntry> {
        self.entries.iter().map(DiskEntry::from).collect()
    }

    /// 文件名须为1至[`NAME_CAP`]字节，且不含空白与控制字符
    pub fn validate_name(name: &str) -> Result<()> {
        if name.is_empty()
            || name.len() > NAME_CAP
            || name.chars().any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(FsError::InvalidName);
        }
        Ok(())
    }

    /// 按名称精确查找正在使用的槽位
    pub fn find(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.in_use && entry.name == name)
    }

    pub fn find_free(&self) -> Option<usize> {
        self.entries.iter().position(|entry| !entry.in_use)
    }

    /// 为新文件分配槽位，返回槽位下标
    pub fn create(&mut self, name: &str) -> Result<usize> {
        Self::validate_name(name)?;
        if self.find(name).is_some() {
            return Err(FsError::AlreadyExists);
        }
        let slot = self.find_free().ok_or(FsError::CapacityExceeded)?;
        self.entries[slot].claim(name);
        Ok(slot)
    }

    /// 正在使用的槽位，按槽位顺序
    pub fn in_use(&self) -> impl Iterator<Item = &FileEntry> {
        self.entries.iter().filter(|entry| entry.in_use)
    }
}

impl Index<usize> for InodeTable {
    type Output = FileEntry;

    fn index(&self, slot: usize) -> &FileEntry {
        &self.entries[slot]
    }
}

impl IndexMut<usize> for InodeTable {
    fn index_mut(&mut self, slot: usize) -> &mut FileEntry {
        &mut self.entries[slot]
    }
}

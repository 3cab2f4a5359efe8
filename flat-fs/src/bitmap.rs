use crate::{BlockId, FsError, Result};

/// 空闲块位图，记录每个块是否被占用。
///
/// 元数据区的块在创建时即被标记为占用，且分配时从不扫描。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    used: Vec<bool>,
    /// 首个可分配的块
    first_data_block: usize,
}

impl Bitmap {
    pub fn new(blocks: usize, first_data_block: usize) -> Self {
        let mut used = vec![false; blocks];
        used[..first_data_block].fill(true);
        Self {
            used,
            first_data_block,
        }
    }

    pub fn from_disk(bits: &[u8], first_data_block: usize) -> Self {
        Self {
            used: bits.iter().map(|&bit| bit != 0).collect(),
            first_data_block,
        }
    }

    pub fn to_disk(&self) -> Vec<u8> {
        self.used.iter().map(|&used| used as u8).collect()
    }

    /// 按编号升序选取前`n`个空闲块，选中即标记占用。
    /// 空闲块不足时撤销本次的全部标记。
    pub fn alloc(&mut self, n: usize) -> Result<Vec<BlockId>> {
        let mut picked = Vec::with_capacity(n);
        for index in self.first_data_block..self.used.len() {
            if picked.len() == n {
                break;
            }
            if !self.used[index] {
                self.used[index] = true;
                picked.push(BlockId::new(index as u16));
            }
        }

        if picked.len() < n {
            log::debug!("alloc {n} blocks: only {} free", picked.len());
            self.dealloc(&picked);
            return Err(FsError::InsufficientSpace);
        }

        log::debug!("alloc {n} blocks: {picked:?}");
        Ok(picked)
    }

    pub fn dealloc(&mut self, ids: &[BlockId]) {
        for &id in ids {
            if !self.used[id.index()] {
                log::warn!("block {id} freed while already free");
            }
            self.used[id.index()] = false;
        }
    }

    /// 重新占用曾经释放的块，用于回滚
    pub fn reserve(&mut self, ids: &[BlockId]) {
        for &id in ids {
            self.used[id.index()] = true;
        }
    }

    pub fn is_used(&self, id: BlockId) -> bool {
        self.used.get(id.index()).copied().unwrap_or(false)
    }

    pub fn free_count(&self) -> usize {
        self.used[self.first_data_block..]
            .iter()
            .filter(|&&used| !used)
            .count()
    }

    /// 所有被占用的块
    pub fn used_blocks(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.used
            .iter()
            .enumerate()
            .filter(|(_, used)| **used)
            .map(|(index, _)| BlockId::new(index as u16))
    }
}

//! 块链表
//!
//! 与FAT一样，每个数据块在表中有一项，指向文件中的下一个块。
//! 文件的索引节点只记录链表头。

use crate::BlockId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fat {
    links: Vec<Option<BlockId>>,
}

impl Fat {
    pub fn new(blocks: usize) -> Self {
        Self {
            links: vec![None; blocks],
        }
    }

    pub fn from_disk(links: &[u16]) -> Self {
        Self {
            links: links.iter().copied().map(BlockId::from_raw).collect(),
        }
    }

    pub fn to_disk(&self) -> Vec<u16> {
        self.links.iter().copied().map(BlockId::to_raw).collect()
    }

    /// 获取下一个块编号。
    /// `None`表示`id`为链表上最后一个块。
    pub fn next(&self, id: BlockId) -> Option<BlockId> {
        self.links.get(id.index()).copied().flatten()
    }

    /// 从`head`开始的整条链。
    ///
    /// 越界的编号会截断链表；步数不超过表长，成环的链表也能结束。
    pub fn chain(&self, head: Option<BlockId>) -> Vec<BlockId> {
        let mut chain = Vec::new();
        let mut current = head;
        while let Some(id) = current {
            if id.index() >= self.links.len() || chain.len() == self.links.len() {
                log::warn!("block chain from {head:?} is broken at {id}");
                break;
            }
            chain.push(id);
            current = self.next(id);
        }
        chain
    }

    /// 按顺序串联`ids`，最后一块指向链尾
    pub fn couple(&mut self, ids: &[BlockId]) {
        for pair in ids.windows(2) {
            self.links[pair[0].index()] = Some(pair[1]);
        }
        if let Some(last) = ids.last() {
            self.links[last.index()] = None;
        }
    }

    /// 断开`ids`上的所有链接
    pub fn unlink(&mut self, ids: &[BlockId]) {
        for id in ids {
            self.links[id.index()] = None;
        }
    }
}

use derive_more::{Display, From, Into};

/// 数据块编号，即块在镜像中的下标。
///
/// 块链与索引节点只保存编号，不保存引用。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into, Display)]
#[repr(transparent)]
pub struct BlockId(u16);

impl BlockId {
    /// 磁盘上表示“没有块”的编号
    pub const NONE: u16 = u16::MAX;

    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// 从磁盘上的编号解析，哨兵值解析为`None`
    pub fn from_raw(raw: u16) -> Option<Self> {
        (raw != Self::NONE).then_some(Self(raw))
    }

    pub fn to_raw(id: Option<Self>) -> u16 {
        id.map_or(Self::NONE, |id| id.0)
    }

    /// 块在设备上的块号
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<BlockId> for usize {
    fn from(id: BlockId) -> Self {
        id.index()
    }
}

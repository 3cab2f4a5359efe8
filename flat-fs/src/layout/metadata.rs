use std::io::Cursor;

use binrw::{BinRead, BinWrite, binrw};

use super::{DiskEntry, Geometry};
use crate::{BLOCK_SIZE, Result};

/// 元数据区的完整内容，按固定顺序一次性编解码
#[binrw]
#[brw(little)]
#[br(import(max_files: usize, max_blocks: usize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMetadata {
    #[br(count = max_files)]
    pub entries: Vec<DiskEntry>,
    /// 1表示已占用
    #[br(count = max_blocks)]
    pub bitmap: Vec<u8>,
    /// 每个块的后继，[`BlockId::NONE`](crate::BlockId::NONE)表示链尾
    #[br(count = max_blocks)]
    pub links: Vec<u16>,
}

impl RawMetadata {
    /// 编码为整数个块，末尾以0填充
    pub fn encode(&self, geometry: &Geometry) -> Result<Vec<u8>> {
        debug_assert_eq!(self.entries.len(), geometry.max_files);
        debug_assert_eq!(self.bitmap.len(), geometry.max_blocks);
        debug_assert_eq!(self.links.len(), geometry.max_blocks);

        let mut cursor = Cursor::new(Vec::with_capacity(geometry.first_data_block() * BLOCK_SIZE));
        self.write(&mut cursor)?;

        let mut buf = cursor.into_inner();
        buf.resize(geometry.first_data_block() * BLOCK_SIZE, 0);
        Ok(buf)
    }

    pub fn decode(buf: &[u8], geometry: &Geometry) -> Result<Self> {
        let raw = Self::read_args(
            &mut Cursor::new(buf),
            (geometry.max_files, geometry.max_blocks),
        )?;
        Ok(raw)
    }
}

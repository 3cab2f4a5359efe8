/* flat-fs 的整体架构，自上而下 */

// 并发包装层：读写锁保护整个卷
mod fs;

// 卷管理层：编排索引节点表、位图与块链，负责原子替换
mod volume;

// 一致性检查
mod check;

// 索引节点表
mod inode;

// 块分配器：空闲块位图
mod bitmap;

// 块链表：每个数据块的后继
mod fat;

mod block;
mod error;

// 磁盘数据结构层：元数据区的编解码
pub mod layout;

pub use self::{
    block::BlockId,
    check::Inconsistency,
    error::{FsError, Result},
    fs::FileSystem,
    layout::Geometry,
    volume::FileStat,
};

/// 数据块大小
pub const BLOCK_SIZE: usize = 128;

/// 文件名的最大字节数
pub const NAME_CAP: usize = 11;

type DataBlock = [u8; BLOCK_SIZE];

//! # 卷管理层
//!
//! 持有块设备与全部元数据，在内存中完成变更后，
//! 通过一次元数据区的写入提交。本层不加锁，由[`FileSystem`](crate::FileSystem)串行化。

use std::sync::Arc;

use block_dev::BlockDevice;
use log::{debug, info, warn};

use crate::bitmap::Bitmap;
use crate::fat::Fat;
use crate::inode::{FileEntry, InodeTable};
use crate::layout::{Geometry, RawMetadata};
use crate::{BLOCK_SIZE, BlockId, DataBlock, FsError, Result};

#[derive(Debug)]
pub struct Volume {
    dev: Arc<dyn BlockDevice>,
    geometry: Geometry,
    pub(crate) table: InodeTable,
    pub(crate) bitmap: Bitmap,
    pub(crate) fat: Fat,
}

/// 文件的状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    pub name: String,
    pub size: usize,
    /// 按顺序排列的数据块
    pub blocks: Vec<BlockId>,
}

/// 回滚镜像：写入前文件的索引节点与块链
struct Rollback {
    entry: FileEntry,
    chain: Vec<BlockId>,
}

impl Volume {
    /// 在设备上建立空的文件系统
    pub fn format(dev: Arc<dyn BlockDevice>, geometry: Geometry) -> Result<Self> {
        let geometry = Self::check_device(&dev, geometry)?;
        let volume = Self {
            dev,
            geometry,
            table: InodeTable::new(geometry.max_files),
            bitmap: Bitmap::new(geometry.max_blocks, geometry.first_data_block()),
            fat: Fat::new(geometry.max_blocks),
        };
        volume.persist()?;

        info!(
            "formatted: {} file slots, {} blocks of {BLOCK_SIZE} bytes, data from block {}",
            geometry.max_files,
            geometry.max_blocks,
            geometry.first_data_block()
        );
        Ok(volume)
    }

    /// 读取设备上已有的文件系统，不校验其内容
    pub fn open(dev: Arc<dyn BlockDevice>, geometry: Geometry) -> Result<Self> {
        let geometry = Self::check_device(&dev, geometry)?;
        let buf = Self::read_metadata(&dev, &geometry)?;
        let raw = RawMetadata::decode(&buf, &geometry)?;

        let volume = Self {
            dev,
            geometry,
            table: InodeTable::from_disk(&raw.entries),
            bitmap: Bitmap::from_disk(&raw.bitmap, geometry.first_data_block()),
            fat: Fat::from_disk(&raw.links),
        };

        info!(
            "opened: {} files, {} free blocks",
            volume.table.in_use().count(),
            volume.bitmap.free_count()
        );
        Ok(volume)
    }

    /// 元数据区是否全为0，即设备从未被格式化。
    ///
    /// 格式化后的位图至少标记了元数据块，不会全为0。
    pub fn is_blank(dev: &Arc<dyn BlockDevice>, geometry: Geometry) -> Result<bool> {
        let geometry = Self::check_device(dev, geometry)?;
        let buf = Self::read_metadata(dev, &geometry)?;
        Ok(buf.iter().all(|&b| b == 0))
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn create(&mut self, name: &str) -> Result<()> {
        let slot = self.table.create(name)?;
        if let Err(e) = self.persist() {
            warn!("create {name:?}: commit failed: {e}");
            self.table[slot].clear();
            self.restore_metadata();
            return Err(e);
        }

        debug!("create {name:?} at slot {slot}");
        Ok(())
    }

    /// 以`data`整体替换文件内容。
    ///
    /// 要么成功提交，要么文件的大小、块链与数据都保持调用前的样子。
    pub fn write(&mut self, name: &str, data: &[u8]) -> Result<()> {
        let slot = self.table.find(name).ok_or(FsError::NotFound)?;
        let size = u16::try_from(data.len()).map_err(|_| FsError::InsufficientSpace)?;
        let needed = data.len().div_ceil(BLOCK_SIZE);

        let rollback = Rollback {
            chain: self.fat.chain(self.table[slot].first_block()),
            entry: self.table[slot].clone(),
        };

        // 新内容总是写入新块，旧链在提交前保持占用
        let chain = self.bitmap.alloc(needed)?;

        if let Err(e) = self.write_chain(&chain, data) {
            warn!("write {name:?}: data I/O failed, rolling back: {e}");
            self.roll_back(slot, &chain, &rollback);
            return Err(e);
        }

        // 旧链与新链不相交，提交时一并归还位图
        self.fat.unlink(&rollback.chain);
        self.bitmap.dealloc(&rollback.chain);
        self.fat.couple(&chain);
        self.table[slot].set_content(chain.first().copied(), size);

        // 提交点
        if let Err(e) = self.persist() {
            warn!("write {name:?}: commit failed, rolling back: {e}");
            self.roll_back(slot, &chain, &rollback);
            self.restore_metadata();
            return Err(e);
        }

        debug!(
            "write {name:?}: {} bytes in {chain:?}, released {:?}",
            data.len(),
            rollback.chain
        );
        Ok(())
    }

    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        let slot = self.table.find(name).ok_or(FsError::NotFound)?;
        let entry = &self.table[slot];
        let head = entry
            .first_block()
            .filter(|&id| self.geometry.is_data_block(id))
            .ok_or(FsError::NoData)?;

        self.read_chain(&self.fat.chain(Some(head)), entry.size())
    }

    /// 删除文件：先将其数据块清零，再释放块与槽位。
    ///
    /// 清零失败时不释放任何块，也不清除槽位。
    pub fn delete(&mut self, name: &str) -> Result<()> {
        let slot = self.table.find(name).ok_or(FsError::NotFound)?;
        let chain = self.fat.chain(self.table[slot].first_block());

        let zero: DataBlock = [0; BLOCK_SIZE];
        for &id in &chain {
            if let Err(e) = self.dev.write_block(id.index(), &zero) {
                warn!("delete {name:?}: zeroing block {id} failed: {e}");
                return Err(e.into());
            }
        }

        let entry = self.table[slot].clone();
        self.fat.unlink(&chain);
        self.bitmap.dealloc(&chain);
        self.table[slot].clear();

        if let Err(e) = self.persist() {
            warn!("delete {name:?}: commit failed: {e}");
            self.bitmap.reserve(&chain);
            self.fat.couple(&chain);
            self.table[slot] = entry;
            self.restore_metadata();
            return Err(e);
        }

        debug!("delete {name:?}: released {chain:?}");
        Ok(())
    }

    pub fn list(&self) -> Vec<String> {
        self.table
            .in_use()
            .map(|entry| entry.name().to_owned())
            .collect()
    }

    pub fn stat(&self, name: &str) -> Result<FileStat> {
        let slot = self.table.find(name).ok_or(FsError::NotFound)?;
        let entry = &self.table[slot];
        Ok(FileStat {
            name: entry.name().to_owned(),
            size: entry.size(),
            blocks: self.fat.chain(entry.first_block()),
        })
    }

    pub fn free_blocks(&self) -> usize {
        self.bitmap.free_count()
    }
}

impl Volume {
    fn check_device(dev: &Arc<dyn BlockDevice>, geometry: Geometry) -> Result<Geometry> {
        let geometry = geometry.validate()?;
        if dev.block_size() != BLOCK_SIZE {
            return Err(FsError::InvalidGeometry(format!(
                "device block size {} differs from {BLOCK_SIZE}",
                dev.block_size()
            )));
        }
        if dev.blocks() < geometry.max_blocks {
            return Err(FsError::InvalidGeometry(format!(
                "device holds {} blocks, {} required",
                dev.blocks(),
                geometry.max_blocks
            )));
        }
        Ok(geometry)
    }

    fn read_metadata(dev: &Arc<dyn BlockDevice>, geometry: &Geometry) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; geometry.first_data_block() * BLOCK_SIZE];
        dev.read_block(0, &mut buf)?;
        Ok(buf)
    }

    /// 将索引节点表、位图与块链表一次性写回元数据区
    fn persist(&self) -> Result<()> {
        let raw = RawMetadata {
            entries: self.table.to_disk(),
            bitmap: self.bitmap.to_disk(),
            links: self.fat.to_disk(),
        };
        let buf = raw.encode(&self.geometry)?;
        self.dev.write_block(0, &buf)?;
        self.dev.flush()?;
        Ok(())
    }

    /// 提交失败后尽力把内存中的状态重新写回，覆盖可能写了一半的元数据区
    fn restore_metadata(&self) {
        if let Err(e) = self.persist() {
            warn!("restoring metadata failed: {e}");
        }
    }

    /// 按顺序读出块链上的前`size`字节
    fn read_chain(&self, chain: &[BlockId], size: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; chain.len() * BLOCK_SIZE];
        for (&id, block) in chain.iter().zip(buf.chunks_exact_mut(BLOCK_SIZE)) {
            self.dev.read_block(id.index(), block)?;
        }

        if buf.len() < size {
            return Err(FsError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("chain of {} blocks cannot hold {size} bytes", chain.len()),
            )));
        }
        buf.truncate(size);
        Ok(buf)
    }

    /// 按块写入`data`，最后一块的剩余部分以0填充
    fn write_chain(&self, chain: &[BlockId], data: &[u8]) -> Result<()> {
        for (&id, chunk) in chain.iter().zip(data.chunks(BLOCK_SIZE)) {
            let mut block: DataBlock = [0; BLOCK_SIZE];
            block[..chunk.len()].copy_from_slice(chunk);
            self.dev.write_block(id.index(), &block)?;
        }
        Ok(())
    }

    /// 撤销一次未提交的写入，内存中的状态回到写入前
    fn roll_back(&mut self, slot: usize, chain: &[BlockId], rollback: &Rollback) {
        self.fat.unlink(chain);
        self.bitmap.dealloc(chain);
        self.bitmap.reserve(&rollback.chain);
        self.fat.couple(&rollback.chain);
        self.table[slot] = rollback.entry.clone();
    }
}

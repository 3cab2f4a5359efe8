use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use block_dev::{BlockDevice, BlockFile};

use crate::volume::{FileStat, Volume};
use crate::{BLOCK_SIZE, FsError, Geometry, Inconsistency, Result};

/// 对外的文件系统。
///
/// 索引节点表、位图与元数据区作为一个整体由一把读写锁保护：
/// 读文件与列目录共享读锁，创建、写入与删除独占写锁，
/// 锁从读取状态之前一直持有到元数据写回之后。
/// 每个操作结束时内存与磁盘上的状态一致，锁中毒后仍可继续使用。
#[derive(Debug)]
pub struct FileSystem {
    volume: RwLock<Volume>,
}

impl FileSystem {
    pub fn format(dev: Arc<dyn BlockDevice>, geometry: Geometry) -> Result<Self> {
        Volume::format(dev, geometry).map(Self::wrap)
    }

    pub fn open(dev: Arc<dyn BlockDevice>, geometry: Geometry) -> Result<Self> {
        Volume::open(dev, geometry).map(Self::wrap)
    }

    /// 全新的设备先格式化，否则直接读取
    pub fn mount(dev: Arc<dyn BlockDevice>, geometry: Geometry, fresh: bool) -> Result<Self> {
        if fresh {
            Self::format(dev, geometry)
        } else {
            Self::open(dev, geometry)
        }
    }

    /// 挂载宿主机上的镜像文件，镜像不存在、为空或从未格式化时创建。
    ///
    /// 规格不合法时不会触碰宿主机上的文件。
    /// 镜像在[`FileSystem`]存活期间被独占。
    pub fn open_image(
        path: impl AsRef<Path>,
        total_size: u64,
        geometry: Geometry,
    ) -> Result<Self> {
        let geometry = geometry.validate()?;
        if total_size < geometry.image_len() as u64 {
            return Err(FsError::InvalidGeometry(format!(
                "image of {total_size} bytes cannot hold {} blocks of {BLOCK_SIZE} bytes",
                geometry.max_blocks
            )));
        }

        let (dev, fresh) = BlockFile::open(path, BLOCK_SIZE, total_size)?;
        let dev: Arc<dyn BlockDevice> = Arc::new(dev);
        let fresh = fresh || Volume::is_blank(&dev, geometry)?;
        Self::mount(dev, geometry, fresh)
    }

    fn wrap(volume: Volume) -> Self {
        Self {
            volume: RwLock::new(volume),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Volume> {
        self.volume.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Volume> {
        self.volume.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create_file(&self, name: &str) -> Result<()> {
        self.write().create(name)
    }

    pub fn write_file(&self, name: &str, data: &[u8]) -> Result<()> {
        self.write().write(name, data)
    }

    pub fn read_file(&self, name: &str) -> Result<Vec<u8>> {
        self.read().read(name)
    }

    pub fn delete_file(&self, name: &str) -> Result<()> {
        self.write().delete(name)
    }

    /// 按槽位顺序列出所有文件名
    pub fn list_files(&self) -> Vec<String> {
        self.read().list()
    }

    pub fn stat(&self, name: &str) -> Result<FileStat> {
        self.read().stat(name)
    }

    pub fn free_blocks(&self) -> usize {
        self.read().free_blocks()
    }

    pub fn geometry(&self) -> Geometry {
        self.read().geometry()
    }

    pub fn check(&self) -> core::result::Result<(), Inconsistency> {
        self.read().check()
    }
}

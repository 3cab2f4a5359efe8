//! 写入的原子性与失败时的回滚

mod common;

use common::{assert_consistent, disk, format, pattern};
use flat_fs::{BLOCK_SIZE, FileSystem, FsError, Geometry};

#[test]
fn insufficient_space_keeps_old_content() {
    let disk = disk();
    let fs = format(&disk);
    fs.create_file("A").unwrap();
    fs.create_file("B").unwrap();

    let old = pattern(3 * BLOCK_SIZE - 7, 1);
    fs.write_file("A", &old).unwrap();
    fs.write_file("B", &pattern(5 * BLOCK_SIZE, 2)).unwrap();
    assert_eq!(1, fs.free_blocks());
    let before = fs.stat("A").unwrap();

    // 旧链在提交前保持占用，新块只有1块可用
    let err = fs.write_file("A", &pattern(5 * BLOCK_SIZE, 3)).unwrap_err();
    assert!(matches!(err, FsError::InsufficientSpace));

    assert_eq!(before, fs.stat("A").unwrap());
    assert_eq!(old, fs.read_file("A").unwrap());
    assert_eq!(1, fs.free_blocks());
    assert_consistent(&fs);
}

#[test]
fn rewrite_needs_fresh_blocks() {
    let disk = disk();
    let fs = format(&disk);
    fs.create_file("A").unwrap();
    fs.create_file("B").unwrap();
    let old = pattern(4 * BLOCK_SIZE, 1);
    fs.write_file("A", &old).unwrap();
    fs.write_file("B", &pattern(3 * BLOCK_SIZE, 2)).unwrap();
    assert_eq!(2, fs.free_blocks());
    let before = fs.stat("A").unwrap();

    // A自己的4块不参与分配
    assert!(matches!(
        fs.write_file("A", &pattern(5 * BLOCK_SIZE, 3)),
        Err(FsError::InsufficientSpace)
    ));
    assert_eq!(before, fs.stat("A").unwrap());
    assert_eq!(old, fs.read_file("A").unwrap());
    assert_eq!(2, fs.free_blocks());
    assert_consistent(&fs);

    // 空闲块够用时照常替换，旧块在提交后归还
    let new = pattern(2 * BLOCK_SIZE, 4);
    fs.write_file("A", &new).unwrap();
    assert_eq!(new, fs.read_file("A").unwrap());
    assert_eq!(pattern(3 * BLOCK_SIZE, 2), fs.read_file("B").unwrap());
    assert_eq!(4, fs.free_blocks());
    assert_consistent(&fs);
}

#[test]
fn data_write_failure_rolls_back() {
    let disk = disk();
    let fs = format(&disk);
    fs.create_file("A").unwrap();
    let old = pattern(2 * BLOCK_SIZE, 1);
    fs.write_file("A", &old).unwrap();
    let before = fs.stat("A").unwrap();
    let free = fs.free_blocks();

    // 第二个数据块写入失败
    disk.fail_after(1);
    let err = fs.write_file("A", &pattern(3 * BLOCK_SIZE, 2)).unwrap_err();
    assert!(matches!(err, FsError::Io(_)));
    disk.heal();

    assert_eq!(before, fs.stat("A").unwrap());
    assert_eq!(old, fs.read_file("A").unwrap());
    assert_eq!(free, fs.free_blocks());
    assert_consistent(&fs);

    // 之后的写入照常进行
    let new = pattern(3 * BLOCK_SIZE, 3);
    fs.write_file("A", &new).unwrap();
    assert_eq!(new, fs.read_file("A").unwrap());
    assert_consistent(&fs);
}

#[test]
fn commit_failure_rolls_back() {
    let disk = disk();
    let fs = format(&disk);
    fs.create_file("A").unwrap();
    let old = pattern(BLOCK_SIZE + 1, 1);
    fs.write_file("A", &old).unwrap();
    let before = fs.stat("A").unwrap();

    // 数据块全部写入成功，元数据写回失败
    disk.fail_after(3);
    let err = fs.write_file("A", &pattern(3 * BLOCK_SIZE, 2)).unwrap_err();
    assert!(matches!(err, FsError::Io(_)));
    disk.heal();

    assert_eq!(before, fs.stat("A").unwrap());
    assert_eq!(old, fs.read_file("A").unwrap());
    assert_consistent(&fs);
    drop(fs);

    // 磁盘上仍是写入前的状态
    let fs = FileSystem::open(disk.clone(), Geometry::default()).unwrap();
    assert_eq!(old, fs.read_file("A").unwrap());
    assert_consistent(&fs);
}

#[test]
fn failed_write_keeps_old_blocks_intact() {
    let disk = disk();
    let fs = format(&disk);
    fs.create_file("A").unwrap();
    fs.create_file("B").unwrap();
    let old = pattern(2 * BLOCK_SIZE + 9, 1);
    fs.write_file("A", &old).unwrap();
    fs.write_file("B", &pattern(3 * BLOCK_SIZE, 2)).unwrap();
    let before = fs.stat("A").unwrap();
    let old_blocks: Vec<Vec<u8>> = before
        .blocks
        .iter()
        .map(|id| disk.block(id.index()))
        .collect();

    // 设备持续故障：新内容写了两块后失败，之后的写入全部失败
    disk.fail_after(2);
    assert!(matches!(
        fs.write_file("A", &pattern(3 * BLOCK_SIZE, 3)),
        Err(FsError::Io(_))
    ));

    assert_eq!(before, fs.stat("A").unwrap());
    assert_eq!(old, fs.read_file("A").unwrap());
    for (id, data) in before.blocks.iter().zip(&old_blocks) {
        assert_eq!(*data, disk.block(id.index()));
    }
    assert_consistent(&fs);
    disk.heal();
    drop(fs);

    // 磁盘上的元数据仍指向完好的旧链
    let fs = FileSystem::open(disk.clone(), Geometry::default()).unwrap();
    assert_eq!(old, fs.read_file("A").unwrap());
    assert_consistent(&fs);
}

#[test]
fn create_failure_leaves_no_entry() {
    let disk = disk();
    let fs = format(&disk);

    disk.fail_after(0);
    assert!(matches!(fs.create_file("A"), Err(FsError::Io(_))));
    disk.heal();

    assert!(fs.list_files().is_empty());
    fs.create_file("A").unwrap();
    assert_eq!(vec!["A"], fs.list_files());
}

#[test]
fn delete_zeroing_failure_changes_nothing() {
    let disk = disk();
    let fs = format(&disk);
    fs.create_file("A").unwrap();
    fs.write_file("A", &pattern(3 * BLOCK_SIZE, 1)).unwrap();
    let before = fs.stat("A").unwrap();
    let free = fs.free_blocks();

    disk.fail_after(1);
    assert!(matches!(fs.delete_file("A"), Err(FsError::Io(_))));
    disk.heal();

    assert_eq!(vec!["A"], fs.list_files());
    assert_eq!(before, fs.stat("A").unwrap());
    assert_eq!(free, fs.free_blocks());
    assert_consistent(&fs);

    fs.delete_file("A").unwrap();
    assert!(fs.list_files().is_empty());
    assert_consistent(&fs);
}

#[test]
fn delete_commit_failure_changes_nothing() {
    let disk = disk();
    let fs = format(&disk);
    fs.create_file("A").unwrap();
    fs.write_file("A", &pattern(2 * BLOCK_SIZE, 1)).unwrap();
    let before = fs.stat("A").unwrap();

    // 两个数据块清零成功，元数据写回失败
    disk.fail_after(2);
    assert!(matches!(fs.delete_file("A"), Err(FsError::Io(_))));
    disk.heal();

    assert_eq!(before, fs.stat("A").unwrap());
    assert_consistent(&fs);
}

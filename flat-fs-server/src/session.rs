use std::fmt;

use flat_fs::FileSystem;

use crate::Command;

/// 一条命令的应答，`Display`即线上的文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Created,
    Written,
    Contents(Vec<u8>),
    Files(Vec<String>),
    Deleted,
    Closing,
    Error(String),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => f.write_str("SUCCESS: File created."),
            Self::Written => f.write_str("SUCCESS: File written."),
            Self::Contents(data) => write!(f, "FILE CONTENTS: {}", String::from_utf8_lossy(data)),
            Self::Files(names) => write!(f, "FILES: {}", names.join(", ")),
            Self::Deleted => f.write_str("SUCCESS: File deleted."),
            Self::Closing => f.write_str("Connection closing."),
            Self::Error(msg) => write!(f, "ERROR: {msg}"),
        }
    }
}

/// 在文件系统上执行一条命令，错误也转为应答
pub fn execute(fs: &FileSystem, command: Command) -> Reply {
    let result = match command {
        Command::Create(name) => fs.create_file(&name).map(|()| Reply::Created),
        Command::Write(name, data) => fs.write_file(&name, &data).map(|()| Reply::Written),
        Command::Read(name) => fs.read_file(&name).map(Reply::Contents),
        Command::Delete(name) => fs.delete_file(&name).map(|()| Reply::Deleted),
        Command::List => Ok(Reply::Files(fs.list_files())),
        Command::Quit => Ok(Reply::Closing),
    };

    result.unwrap_or_else(|e| Reply::Error(e.to_string()))
}

use std::str::FromStr;

use thiserror::Error;

const CREATE_USAGE: &str = "CREATE <filename>";
const WRITE_USAGE: &str = "WRITE <filename> <data>";
const READ_USAGE: &str = "READ <filename>";
const DELETE_USAGE: &str = "DELETE <filename>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create(String),
    /// 数据为文件名之后的各段以单个空格连接
    Write(String, Vec<u8>),
    Read(String),
    Delete(String),
    List,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Empty command.")]
    Empty,
    #[error("Command must look like: {0}")]
    Usage(&'static str),
    #[error("Unknown command.")]
    Unknown(String),
}

impl FromStr for Command {
    type Err = ParseError;

    /// 关键字不区分大小写，各段以空白分隔
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let keyword = parts.next().ok_or(ParseError::Empty)?;

        let mut name = |usage| {
            parts
                .next()
                .map(str::to_owned)
                .ok_or(ParseError::Usage(usage))
        };

        match keyword.to_ascii_uppercase().as_str() {
            "CREATE" => name(CREATE_USAGE).map(Self::Create),
            "READ" => name(READ_USAGE).map(Self::Read),
            "DELETE" => name(DELETE_USAGE).map(Self::Delete),
            "WRITE" => {
                let name = name(WRITE_USAGE)?;
                let data = parts.collect::<Vec<_>>().join(" ");
                if data.is_empty() {
                    return Err(ParseError::Usage(WRITE_USAGE));
                }
                Ok(Self::Write(name, data.into_bytes()))
            }
            "LIST" => Ok(Self::List),
            "QUIT" => Ok(Self::Quit),
            _ => Err(ParseError::Unknown(keyword.to_owned())),
        }
    }
}

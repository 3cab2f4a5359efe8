//! # 协议适配层
//!
//! 每行一条命令、每条命令一行应答的文本协议：
//!
//! - `CREATE <name>`
//! - `WRITE <name> <data...>`
//! - `READ <name>`
//! - `DELETE <name>`
//! - `LIST`
//! - `QUIT`
//!
//! 连接在`QUIT`或断开之前一直保持。

mod command;
mod server;
mod session;

pub use self::{
    command::{Command, ParseError},
    server::{Server, handle_client, serve},
    session::{Reply, execute},
};

use std::io::{self, BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::thread;

use flat_fs::FileSystem;
use log::{debug, error, info, warn};

use crate::{Command, Reply, execute};

pub struct Server {
    listener: TcpListener,
    fs: Arc<FileSystem>,
}

impl Server {
    pub fn bind(addr: impl ToSocketAddrs, fs: Arc<FileSystem>) -> io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        Ok(Self { listener, fs })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// 每个连接一个线程，永不返回，除非取得监听地址失败
    pub fn run(self) -> io::Result<()> {
        info!("listening on {}", self.local_addr()?);

        for stream in self.listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    warn!("accept failed: {e}");
                    continue;
                }
            };
            let fs = self.fs.clone();
            thread::spawn(move || handle_client(stream, &fs));
        }

        Ok(())
    }
}

pub fn handle_client(stream: TcpStream, fs: &FileSystem) {
    let peer = stream
        .peer_addr()
        .map_or_else(|_| "<unknown>".to_owned(), |addr| addr.to_string());
    info!("client {peer} connected");

    let result = stream
        .try_clone()
        .and_then(|writer| serve(BufReader::new(stream), writer, fs));

    match result {
        Ok(()) => info!("client {peer} disconnected"),
        Err(e) => error!("client {peer}: {e}"),
    }
}

/// 逐行读取命令并写回应答，直到`QUIT`或输入结束
///
/// 非UTF-8的字节按替换字符处理，不会中断连接。
pub fn serve(mut reader: impl BufRead, mut writer: impl Write, fs: &FileSystem) -> io::Result<()> {
    let mut line = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(());
        }
        let text = String::from_utf8_lossy(&line);
        let text = text.trim_end_matches(['\r', '\n']);
        debug!("request: {text:?}");

        let (reply, quit) = match text.parse::<Command>() {
            Ok(command) => {
                let quit = command == Command::Quit;
                (execute(fs, command), quit)
            }
            Err(e) => (Reply::Error(e.to_string()), false),
        };
        debug!("reply: {reply}");

        writeln!(writer, "{reply}")?;
        writer.flush()?;
        if quit {
            return Ok(());
        }
    }
}

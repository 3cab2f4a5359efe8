//! 文本协议的端到端行为

use std::io::{BufRead, BufReader, Cursor, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::thread;

use block_dev::RamDisk;
use flat_fs::{BLOCK_SIZE, FileSystem, Geometry};
use flat_fs_server::{Command, Reply, Server, execute, serve};

fn file_system() -> Arc<FileSystem> {
    let geometry = Geometry::default();
    let disk = Arc::new(RamDisk::new(geometry.max_blocks, BLOCK_SIZE));
    Arc::new(FileSystem::format(disk, geometry).unwrap())
}

fn transcript(fs: &FileSystem, input: &str) -> Vec<String> {
    let mut output = Vec::new();
    serve(Cursor::new(input.as_bytes()), &mut output, fs).unwrap();
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(str::to_owned)
        .collect()
}

#[test]
fn execute_maps_results() {
    let fs = file_system();

    assert_eq!(Reply::Created, execute(&fs, Command::Create("a".into())));
    assert_eq!(
        Reply::Error("File already exists.".into()),
        execute(&fs, Command::Create("a".into()))
    );
    assert_eq!(
        Reply::Error("File has no data.".into()),
        execute(&fs, Command::Read("a".into()))
    );
    assert_eq!(
        Reply::Written,
        execute(&fs, Command::Write("a".into(), b"hi".to_vec()))
    );
    assert_eq!(
        Reply::Contents(b"hi".to_vec()),
        execute(&fs, Command::Read("a".into()))
    );
    assert_eq!(Reply::Files(vec!["a".into()]), execute(&fs, Command::List));
    assert_eq!(Reply::Deleted, execute(&fs, Command::Delete("a".into())));
    assert_eq!(
        Reply::Error("File does not exist.".into()),
        execute(&fs, Command::Delete("a".into()))
    );
    assert_eq!(Reply::Closing, execute(&fs, Command::Quit));
}

#[test]
fn session_transcript() {
    let fs = file_system();
    let lines = transcript(
        &fs,
        "CREATE notes\r\n\
         write notes hello   big world\n\
         READ notes\n\
         LIST\n\
         FROB\n\
         WRITE notes\n\
         \n\
         QUIT\n\
         LIST\n",
    );

    assert_eq!(
        vec![
            "SUCCESS: File created.",
            "SUCCESS: File written.",
            "FILE CONTENTS: hello big world",
            "FILES: notes",
            "ERROR: Unknown command.",
            "ERROR: Command must look like: WRITE <filename> <data>",
            "ERROR: Empty command.",
            "Connection closing.",
        ],
        lines
    );
}

#[test]
fn end_of_input_closes_session() {
    let fs = file_system();
    assert_eq!(vec!["FILES: "], transcript(&fs, "LIST"));
}

#[test]
fn failed_write_is_reported() {
    let fs = file_system();
    let big = "x".repeat(9 * BLOCK_SIZE + 1);
    let lines = transcript(
        &fs,
        &format!("CREATE f\nWRITE f {big}\nWRITE f small\nREAD f\n"),
    );

    assert_eq!(
        vec![
            "SUCCESS: File created.",
            "ERROR: Not enough free blocks available.",
            "SUCCESS: File written.",
            "FILE CONTENTS: small",
        ],
        lines
    );
}

#[test]
fn tcp_clients_share_one_file_system() {
    let fs = file_system();
    let server = Server::bind("127.0.0.1:0", fs.clone()).unwrap();
    let addr = server.local_addr().unwrap();
    thread::spawn(move || server.run());

    let request = |stream: &mut TcpStream, reader: &mut BufReader<TcpStream>, line: &str| {
        writeln!(stream, "{line}").unwrap();
        let mut reply = String::new();
        reader.read_line(&mut reply).unwrap();
        reply.trim_end().to_owned()
    };

    let mut first = TcpStream::connect(addr).unwrap();
    let mut first_reader = BufReader::new(first.try_clone().unwrap());
    let mut second = TcpStream::connect(addr).unwrap();
    let mut second_reader = BufReader::new(second.try_clone().unwrap());

    assert_eq!(
        "SUCCESS: File created.",
        request(&mut first, &mut first_reader, "CREATE shared")
    );
    assert_eq!(
        "SUCCESS: File written.",
        request(&mut second, &mut second_reader, "WRITE shared from second")
    );
    assert_eq!(
        "FILE CONTENTS: from second",
        request(&mut first, &mut first_reader, "READ shared")
    );
    assert_eq!(
        "Connection closing.",
        request(&mut first, &mut first_reader, "QUIT")
    );

    // 服务端关闭后读到EOF
    let mut rest = String::new();
    assert_eq!(0, first_reader.read_line(&mut rest).unwrap());

    assert_eq!(
        "FILES: shared",
        request(&mut second, &mut second_reader, "LIST")
    );
    assert_eq!(vec!["shared"], fs.list_files());
}

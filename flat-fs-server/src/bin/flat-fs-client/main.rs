mod cli;

use std::io::{self, BufRead, BufReader, Write};
use std::net::TcpStream;
use std::thread;
use std::time::Duration;

use clap::Parser;

use self::cli::Cli;

fn main() -> io::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let stream = TcpStream::connect(&cli.addr)?;
    log::info!("connected to {}", cli.addr);

    if cli.delay_secs > 0 {
        log::info!("holding the connection for {}s", cli.delay_secs);
        thread::sleep(Duration::from_secs(cli.delay_secs));
    }

    let commands: Box<dyn Iterator<Item = io::Result<String>>> = if cli.commands.is_empty() {
        Box::new(io::stdin().lock().lines())
    } else {
        Box::new(cli.commands.into_iter().map(Ok))
    };

    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;
    let mut reply = String::new();

    for command in commands {
        let command = command?;
        writeln!(writer, "{command}")?;
        writer.flush()?;

        reply.clear();
        if reader.read_line(&mut reply)? == 0 {
            log::warn!("server closed the connection");
            break;
        }
        print!("{reply}");

        if command.trim().eq_ignore_ascii_case("QUIT") {
            break;
        }
    }

    Ok(())
}

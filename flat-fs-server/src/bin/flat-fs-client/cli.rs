use clap::Parser;

#[derive(Parser)]
#[command(version, about = "Send commands to a flat file system server")]
pub struct Cli {
    /// Server address
    #[arg(long, short, default_value = "127.0.0.1:12345")]
    pub addr: String,

    /// Seconds to wait after connecting, before the first command
    #[arg(long, short, default_value_t = 0)]
    pub delay_secs: u64,

    /// Commands to send, read from stdin when none are given
    pub commands: Vec<String>,
}

use std::process;

use clap::Parser;

use timed_tcp::observability::logging;
use timed_tcp::{connect_to, recv_timeout, send_timeout, SocketHandle, Timeout, TransferOutcome};

#[derive(Parser)]
#[command(name = "tcp-probe")]
#[command(about = "Send one message over TCP and print the reply", long_about = None)]
struct Cli {
    /// Remote IPv4 address (dotted decimal).
    ip: String,

    port: u16,

    message: String,

    /// Budget in seconds for each read and write.
    #[arg(short, long, default_value_t = 5)]
    timeout: u64,

    /// Cork the socket while writing the message.
    #[arg(long)]
    cork: bool,

    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level);

    let timeout = Timeout::from_secs(cli.timeout);
    let handle = connect_to(&cli.ip, cli.port)?;
    tracing::info!(peer = %handle.peer_endpoint()?, "Connected");

    if cli.cork {
        handle.set_cork(true)?;
    } else {
        handle.set_nodelay()?;
    }

    if let Err(reason) = send_message(&handle, cli.message.as_bytes(), timeout) {
        eprintln!("Error: {reason}");
        process::exit(1);
    }

    if cli.cork {
        handle.set_cork(false)?;
    }

    let mut buf = vec![0u8; 64 * 1024];
    match recv_timeout(&handle, &mut buf, timeout) {
        TransferOutcome::Transferred(0) => eprintln!("Peer closed without replying"),
        TransferOutcome::Transferred(n) => println!("{}", String::from_utf8_lossy(&buf[..n])),
        TransferOutcome::TimedOut => {
            eprintln!("Error: no reply within {}s", cli.timeout);
            process::exit(2);
        }
        TransferOutcome::Failed(e) => return Err(e.into()),
    }

    handle.close()?;
    Ok(())
}

fn send_message(handle: &SocketHandle, mut data: &[u8], timeout: Timeout) -> Result<(), String> {
    while !data.is_empty() {
        match send_timeout(handle, data, timeout) {
            TransferOutcome::Transferred(n) => data = &data[n..],
            TransferOutcome::TimedOut => return Err("write timed out".to_string()),
            TransferOutcome::Failed(e) => return Err(e.to_string()),
        }
    }
    Ok(())
}

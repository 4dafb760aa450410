use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use uartlink::{init_logging, list_ports, load_config, Command, Console, Flow, InputError};

/// Operator console for the UART device link
#[derive(Debug, Parser)]
#[command(name = "uartlink", version, about)]
struct Cli {
    /// Serial port to use (overrides the config file)
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate (overrides the config file)
    #[arg(short, long)]
    baud: Option<u32>,

    /// Config file (.toml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// List serial ports and exit
    #[arg(long)]
    list_ports: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    if cli.list_ports {
        for port in list_ports()? {
            println!("{}", port);
        }
        return Ok(());
    }

    let config = load_config(cli.config.as_deref(), cli.port, cli.baud)?;
    tracing::info!(
        "uartlink {} (built {}), {} baud",
        uartlink::VERSION,
        uartlink::BUILD_DATE,
        config.connection.baud_rate
    );

    let (tx, mut events) = mpsc::unbounded_channel();
    let mut console = Console::new(config, Arc::new(tx));
    let mut stdout = std::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut reap = tokio::time::interval(Duration::from_millis(250));

    println!("{}", console.display());
    println!("Type 'help' for commands.");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let command = match Command::parse(&line) {
                    Ok(command) => command,
                    Err(InputError::Empty) => continue,
                    Err(e) => {
                        eprintln!("{}", e);
                        continue;
                    }
                };
                match console.execute(command, &mut stdout) {
                    Ok(Flow::Quit) => break,
                    Ok(Flow::Continue) => {}
                    Err(e) => eprintln!("{}", console.describe_error(&e)),
                }
            }
            Some(event) = events.recv() => {
                println!("{}", console.handle_event(&event));
            }
            _ = reap.tick() => {
                if let Some(reason) = console.poll_worker() {
                    eprintln!("Connection lost: {}", reason);
                }
            }
        }
    }

    console.session_mut().disconnect()?;
    while let Ok(event) = events.try_recv() {
        println!("{}", console.handle_event(&event));
    }

    Ok(())
}

use std::env;
use std::io;
use std::process::ExitCode;

use atc_billing::Exchange;
use atc_billing::console::{Console, seeded_exchange};
use atc_billing::csv::{read_commands, write_report};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse().unwrap()))
        .with_writer(std::io::stderr)
        .init();

    let result = match env::args().nth(1) {
        Some(path) => run_batch(path).await,
        None => run_console(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Interactive menu on stdin/stdout.
fn run_console() -> Result<(), Box<dyn std::error::Error>> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut console = Console::new(stdin.lock(), stdout.lock(), seeded_exchange());
    console.run()?;
    Ok(())
}

/// Apply every command of a csv file, then print the per-client report.
async fn run_batch(path: String) -> Result<(), Box<dyn std::error::Error>> {
    if !path.ends_with(".csv") {
        warn!(path, "input file seems to not be a csv file");
    }

    let commands = read_commands(path.clone())?;
    let mut exchange = Exchange::new();
    let (cmd_sender, cmd_receiver) = tokio::sync::mpsc::channel(16);

    let reader = tokio::spawn(async move {
        for result in commands {
            match result {
                Ok(command) => {
                    if cmd_sender.send(command).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("{e}");
                }
            }
        }
    });

    exchange.run(ReceiverStream::new(cmd_receiver)).await;
    reader.await?;

    write_report(&exchange, io::stdout().lock())?;
    Ok(())
}

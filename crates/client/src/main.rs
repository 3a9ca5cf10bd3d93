//! The client binary.
//!
//! Loads a client config file, dials the configured node, then reads JSON
//! request lines from stdin (`{"method", "params"}`) and prints whatever
//! response lines the node sends back. Sending and receiving run as
//! independent tasks rather than one request-then-wait-for-reply step
//! each: per the wire contract, `insertOrUpdate`/`delete`/`purge`/
//! `shutdown` emit a response line only on failure, so a strict
//! request/response lockstep would hang forever waiting for a line that a
//! successful call never sends.

mod config;

use clap::Parser;
use config::ClientConfig;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};
use tracing::{error, warn};

/// Connects to a DICT3 chord node and relays request/response lines.
#[derive(Parser, Debug)]
#[command(version, about = "DICT3 chord client")]
struct Args {
    /// Path to the client config JSON file.
    config: std::path::PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = ClientConfig::load(&args.config)?;

    let addr = format!("{}:{}", config.ip_address, config.port);
    let stream = TcpStream::connect(&addr).await?;
    let (read_half, write_half) = stream.into_split();
    let mut incoming = FramedRead::new(read_half, LinesCodec::new());
    let mut outgoing = FramedWrite::new(write_half, LinesCodec::new());

    let printer = tokio::spawn(async move {
        while let Some(line) = incoming.next().await {
            match line {
                Ok(line) => println!("{line}"),
                Err(err) => {
                    error!(%err, "error reading response from node");
                    break;
                }
            }
        }
    });

    let mut stdin_lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = stdin_lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let mut request: Value = match serde_json::from_str(&line) {
            Ok(value) => value,
            Err(err) => {
                warn!(%err, "malformed request line, skipping");
                continue;
            }
        };
        request["port"] = Value::from(config.port);
        outgoing.send(request.to_string()).await?;
    }

    drop(outgoing);
    let _ = printer.await;
    Ok(())
}

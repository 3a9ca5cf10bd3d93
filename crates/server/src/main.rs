//! The node-process binary.
//!
//! Loads a server config file, starts the first node on its configured
//! port, prompts for how many additional nodes to bring up, then hands off
//! to the interactive administrator console (`menu`).

mod config;
mod listener;
mod menu;
mod persistence;

use clap::Parser;
use config::ServerConfig;
use corelib::{Cluster, NodeId};
use menu::NodeCursor;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

/// Starts a DICT3 chord node process from a server config file.
#[derive(Parser, Debug)]
#[command(version, about = "DICT3 chord node process")]
struct Args {
    /// Path to the server config JSON file.
    config: std::path::PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = match ServerConfig::load(&args.config) {
        Ok(config) => config,
        Err(err) => {
            error!(%err, "failed to load server config");
            std::process::exit(1);
        }
    };

    let cluster = Arc::new(Cluster::new());
    let cursor = Arc::new(NodeCursor::new(config.port));
    let purge_timeout = config.purge_timeout();
    let persistent_file = config.persistent_storage_container.file.clone();

    let mut spawn_node = {
        let cluster = Arc::clone(&cluster);
        let config = config.clone();
        let persistent_file = persistent_file.clone();
        move |node: NodeId| {
            if let Err(err) = cluster.join(node) {
                error!(node = node.0, %err, "failed to join node to the ring");
                return;
            }
            let cluster = Arc::clone(&cluster);
            let bind_addr = config.bind_addr(node.0);
            let persistent_file = persistent_file.clone();
            tokio::spawn(async move {
                if let Err(err) = listener::run(cluster, node, bind_addr, purge_timeout, persistent_file).await {
                    error!(node = node.0, %err, "listener task exited");
                }
            });
        }
    };

    spawn_node(cursor.take());
    info!(port = config.port, "first node started");

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();

    println!("Enter the number of nodes to start the system");
    let extra = lines
        .next_line()
        .await?
        .and_then(|line| line.trim().parse::<u32>().ok())
        .unwrap_or(0);
    for _ in 0..extra {
        spawn_node(cursor.take());
    }

    menu::run(cluster, cursor, persistent_file, &mut lines, spawn_node).await?;

    Ok(())
}

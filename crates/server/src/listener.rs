//! Per-node TCP listener.
//!
//! A node's listener task accepts connections serially and handles one RPC
//! at a time per connection: the accept loop awaits and fully drains one
//! connection's request lines before accepting the next, rather than
//! spawning a task per connection.
//!
//! `shutdown` is handled here rather than in `protocol::dispatch`, since
//! leaving the ring and the final persistence dump are process-level
//! concerns that the front-end dispatch table deliberately does not own.

use crate::persistence;
use corelib::{Cluster, NodeId};
use futures::{SinkExt, StreamExt};
use protocol::message::{Method, Response};
use protocol::{dispatch, LineCodec};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::codec::Framed;
use tracing::{debug, error, info, warn};

pub async fn run(
    cluster: Arc<Cluster>,
    node: NodeId,
    bind_addr: String,
    purge_timeout: chrono::Duration,
    persistent_file: String,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&bind_addr).await?;
    info!(node = node.0, addr = %bind_addr, "node listening");

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(pair) => pair,
            Err(err) => {
                warn!(node = node.0, %err, "accept failed");
                continue;
            }
        };
        debug!(node = node.0, %peer, "connection accepted");

        let mut framed = Framed::new(stream, LineCodec::new());
        while let Some(decoded) = framed.next().await {
            let request = match decoded {
                Ok(request) => request,
                Err(err) => {
                    warn!(node = node.0, %err, "malformed request line");
                    continue;
                }
            };

            if request.method == Method::Shutdown {
                handle_shutdown(&cluster, node, &persistent_file, &mut framed).await;
                continue;
            }

            if let Some(response) = dispatch(&cluster, &request, purge_timeout) {
                if let Err(err) = framed.send(response).await {
                    error!(node = node.0, %err, "failed to write response");
                    break;
                }
            }
        }
        debug!(node = node.0, %peer, "connection closed");
    }
}

async fn handle_shutdown(
    cluster: &Arc<Cluster>,
    node: NodeId,
    persistent_file: &str,
    framed: &mut Framed<tokio::net::TcpStream, LineCodec>,
) {
    match cluster.shutdown(node) {
        Ok(outcome) => {
            info!(node = node.0, "node left the ring");
            if outcome.all_nodes_closed {
                info!("every node ever created has shut down; persisting and exiting");
                if let Err(err) = persistence::dump_all(cluster, persistent_file) {
                    error!(%err, "failed to persist final data");
                    std::process::exit(1);
                }
                std::process::exit(0);
            }
        }
        Err(err) => {
            let _ = framed.send(Response::ErrorOnly { error: err.to_string() }).await;
        }
    }
}

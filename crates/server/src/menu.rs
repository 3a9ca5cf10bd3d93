//! The interactive administrator console: add a node, list running
//! servers, show a server's data, show a server's ring position plus
//! neighbours and finger table, or exit (optionally persisting first).

use crate::persistence;
use corelib::{Cluster, NodeId};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, Lines, Stdin};
use tracing::info;

/// Hands out fresh node ids as sequential ports starting after the first
/// configured node.
pub struct NodeCursor {
    next_port: AtomicU32,
}

impl NodeCursor {
    pub fn new(first_unused_port: u32) -> Self {
        Self { next_port: AtomicU32::new(first_unused_port) }
    }

    pub fn take(&self) -> NodeId {
        NodeId(self.next_port.fetch_add(1, Ordering::SeqCst))
    }
}

/// Runs the console until the operator chooses to exit.
///
/// `spawn_node` both joins a freshly-minted node onto the ring and starts
/// its listener task; it is supplied by `main` so this module stays free
/// of any knowledge of how a node's socket is bound.
pub async fn run<F>(
    cluster: Arc<Cluster>,
    cursor: Arc<NodeCursor>,
    persistent_file: String,
    lines: &mut Lines<tokio::io::BufReader<Stdin>>,
    mut spawn_node: F,
) -> anyhow::Result<()>
where
    F: FnMut(NodeId),
{
    loop {
        println!();
        println!("1. Add a node to the system");
        println!("2. List all currently running servers");
        println!("3. Display the data present in the server.");
        println!(
            "4. Display Position in Chord Ring, Successor Node, Predecessor Node and Finger Table for a server"
        );
        println!("5. Exit");
        println!("Enter the choice:");

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim().parse::<u32>() {
            Ok(1) => {
                let node = cursor.take();
                spawn_node(node);
                info!(node = node.0, "node added via admin console");
            }
            Ok(2) => {
                println!();
                println!("The list of currently running servers with their Port Nos are as below-");
                for node in cluster.node_ids() {
                    println!("{}", node.0);
                }
            }
            Ok(3) => show_data(&cluster, lines).await?,
            Ok(4) => show_ring_info(&cluster, lines).await?,
            Ok(5) => {
                println!("Do you want to save the data stored in the server? 'y' or 'n'");
                let answer = lines.next_line().await?.unwrap_or_default();
                if answer.trim().eq_ignore_ascii_case("y") {
                    persistence::dump_all(&cluster, &persistent_file)?;
                }
                break;
            }
            _ => println!("The entered choice is invalid"),
        }
    }

    Ok(())
}

async fn show_data(cluster: &Cluster, lines: &mut Lines<tokio::io::BufReader<Stdin>>) -> anyhow::Result<()> {
    println!("Enter the port number of the server to check the data.");
    let Some(line) = lines.next_line().await? else {
        return Ok(());
    };
    let Ok(port) = line.trim().parse::<u32>() else {
        println!("The entered choice is invalid");
        return Ok(());
    };

    let Ok(handle) = cluster.data_handle(NodeId(port)) else {
        println!("The entered choice is invalid");
        return Ok(());
    };
    let data = handle.lock();
    if data.is_empty() {
        println!("The server does not currently have any stored data.");
        return Ok(());
    }

    println!();
    println!("The data present in the server is as below-");
    for (key, value) in data.iter() {
        println!("{}", value.to_persisted_line(key));
    }
    println!();
    Ok(())
}

async fn show_ring_info(cluster: &Cluster, lines: &mut Lines<tokio::io::BufReader<Stdin>>) -> anyhow::Result<()> {
    println!("Enter the port number of the server.");
    let Some(line) = lines.next_line().await? else {
        return Ok(());
    };
    let Ok(port) = line.trim().parse::<u32>() else {
        println!("The entered choice is invalid");
        return Ok(());
    };
    let node = NodeId(port);

    let (Ok(slot), Ok(topology)) = (cluster.slot_of(node), cluster.topology_of(node)) else {
        println!("The entered choice is invalid");
        return Ok(());
    };

    println!("Position in Chord Ring - {slot}");
    println!("Successor Node - {}", topology.successor.0);
    println!("Predecessor Node- {}", topology.predecessor.0);
    println!("Finger Table - ");
    for (target, owner) in &topology.finger_table {
        println!("{target}\t{}", owner.0);
    }
    Ok(())
}

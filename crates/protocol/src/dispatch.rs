//! Routes a decoded [`Request`] into the DICT3 operation layer and builds
//! the matching [`Response`].
//!
//! `shutdown` is intentionally absent here: leaving the ring and persisting
//! data are process-level concerns the server binary drives directly
//! against [`corelib::Cluster::shutdown`], not something this front-end
//! dispatch table owns.

use crate::message::{Method, Request, Response, NO_ERROR};
use chrono::Duration;
use corelib::cluster::dict3;
use corelib::{Cluster, NodeId, Permission};
use std::str::FromStr;
use tracing::warn;

/// Dispatches a DICT3 request against `cluster`, returning the line to send
/// back, if any. `purge_timeout` is the node's configured `deletetimeout`.
pub fn dispatch(cluster: &Cluster, request: &Request, purge_timeout: Duration) -> Option<Response> {
    let from = NodeId(request.port);

    match request.method {
        Method::Lookup => {
            let key = request.params.first().map(String::as_str).unwrap_or("");
            let rel = request.params.get(1).map(String::as_str).unwrap_or("");
            Some(match dict3::lookup(cluster, key, rel, from) {
                Ok(rows) => Response::Lookup { result: rows, error: NO_ERROR.to_string() },
                Err(err) => Response::Lookup { result: Vec::new(), error: err.to_string() },
            })
        }

        Method::Insert => {
            let key = request.params.first().map(String::as_str).unwrap_or("");
            let rel = request.params.get(1).map(String::as_str).unwrap_or("");
            let value = request.params.get(2).map(String::as_str).unwrap_or("");
            let permission = parse_permission(request.params.get(3));
            Some(match dict3::insert(cluster, key, rel, value, permission, from) {
                Ok(()) => Response::Insert { result: true, error: NO_ERROR.to_string() },
                Err(err) => Response::Insert { result: false, error: err.to_string() },
            })
        }

        Method::InsertOrUpdate => {
            let key = request.params.first().map(String::as_str).unwrap_or("");
            let rel = request.params.get(1).map(String::as_str).unwrap_or("");
            let value = request.params.get(2).map(String::as_str).unwrap_or("");
            let permission = parse_permission(request.params.get(3));
            match dict3::insert_or_update(cluster, key, rel, value, permission, from) {
                Ok(()) => None,
                Err(err) => Some(Response::ErrorOnly { error: err.to_string() }),
            }
        }

        Method::Delete => {
            let key = request.params.first().map(String::as_str).unwrap_or("");
            let rel = request.params.get(1).map(String::as_str).unwrap_or("");
            match dict3::delete(cluster, key, rel, from) {
                Ok(()) => None,
                Err(err) => Some(Response::ErrorOnly { error: err.to_string() }),
            }
        }

        Method::ListKeys => Some(Response::ListKeys {
            result: dict3::list_keys(cluster),
            error: NO_ERROR.to_string(),
        }),

        Method::ListIds => Some(Response::ListIds {
            result: dict3::list_ids(cluster),
            error: NO_ERROR.to_string(),
        }),

        Method::Purge => {
            dict3::purge(cluster, purge_timeout);
            None
        }

        Method::Shutdown => {
            warn!("shutdown dispatched through the DICT3 front-end; ignoring");
            None
        }
    }
}

fn parse_permission(raw: Option<&String>) -> Permission {
    raw.and_then(|s| Permission::from_str(s).ok())
        .unwrap_or(Permission::ReadWrite)
}

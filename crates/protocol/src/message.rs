//! Request/response envelopes exchanged over the line-oriented transport.

use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The eight operations a request line can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Lookup,
    Insert,
    InsertOrUpdate,
    Delete,
    ListKeys,
    ListIds,
    Purge,
    Shutdown,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Lookup => "lookup",
            Method::Insert => "insert",
            Method::InsertOrUpdate => "insertOrUpdate",
            Method::Delete => "delete",
            Method::ListKeys => "listKeys",
            Method::ListIds => "listIDs",
            Method::Purge => "purge",
            Method::Shutdown => "shutdown",
        }
    }
}

impl FromStr for Method {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lookup" => Ok(Method::Lookup),
            "insert" => Ok(Method::Insert),
            "insertOrUpdate" => Ok(Method::InsertOrUpdate),
            "delete" => Ok(Method::Delete),
            "listKeys" => Ok(Method::ListKeys),
            "listIDs" => Ok(Method::ListIds),
            "purge" => Ok(Method::Purge),
            "shutdown" => Ok(Method::Shutdown),
            other => Err(ProtocolError::UnknownMethod(other.to_string())),
        }
    }
}

/// The wire shape of a request line: `{"method", "params", "port"}`.
#[derive(Debug, Deserialize)]
struct WireRequest {
    method: String,
    #[serde(default)]
    params: Vec<String>,
    port: u32,
}

/// A decoded request, ready for [`crate::dispatch::dispatch`].
///
/// `params` is positional, per method: `[key, rel, value, permission]` for
/// `insert`/`insertOrUpdate`, `[key, rel]` for `lookup`/`delete`, empty for
/// the rest.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub params: Vec<String>,
    pub port: u32,
}

impl FromStr for Request {
    type Err = ProtocolError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let wire: WireRequest = serde_json::from_str(line)?;
        Ok(Request {
            method: wire.method.parse()?,
            params: wire.params,
            port: wire.port,
        })
    }
}

/// A response line, shaped exactly per the response envelope rules.
///
/// `Insert`, `Lookup`, `ListKeys`, and `ListIds` are always emitted.
/// `ErrorOnly` (covering `insertOrUpdate`, `delete`, `purge`, `shutdown`) is
/// only ever constructed when the operation failed — callers emit no line
/// at all on success for those four methods.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Response {
    Insert { result: bool, error: String },
    Lookup { result: Vec<(String, String, String)>, error: String },
    ListKeys { result: Vec<String>, error: String },
    ListIds { result: Vec<(String, String)>, error: String },
    ErrorOnly { error: String },
}

/// The string the wire uses to mean "no error": callers check for the
/// literal string `"null"` rather than an empty string.
pub const NO_ERROR: &str = "null";

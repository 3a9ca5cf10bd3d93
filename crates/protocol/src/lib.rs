//! Wire protocol for the DICT3 JSON-RPC front-end: request/response
//! envelopes, a line-oriented codec, and request dispatch into [`corelib`].

pub mod codec;
pub mod dispatch;
pub mod error;
pub mod message;

pub use codec::LineCodec;
pub use dispatch::dispatch;
pub use error::ProtocolError;
pub use message::{Method, Request, Response};

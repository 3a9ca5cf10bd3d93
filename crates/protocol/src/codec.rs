//! Newline-delimited JSON framing: one request or response object per line.

use crate::error::ProtocolError;
use crate::message::{Request, Response};
use bytes::BytesMut;
use std::str::FromStr;
use tokio_util::codec::{Decoder, Encoder, LinesCodec};

/// Decodes [`Request`] lines and encodes [`Response`] lines over a raw
/// `LinesCodec`: one JSON object per line, rather than a length-prefixed or
/// generic JSON-RPC 2.0 transport.
#[derive(Default)]
pub struct LineCodec {
    lines: LinesCodec,
}

impl LineCodec {
    pub fn new() -> Self {
        Self { lines: LinesCodec::new() }
    }
}

impl Decoder for LineCodec {
    type Item = Request;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(line) = self.lines.decode(src).map_err(std::io::Error::from)? else {
            return Ok(None);
        };
        if line.trim().is_empty() {
            return self.decode(src);
        }
        Ok(Some(Request::from_str(&line)?))
    }
}

impl Encoder<Response> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, item: Response, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let rendered = serde_json::to_string(&item)?;
        self.lines
            .encode(rendered, dst)
            .map_err(std::io::Error::from)?;
        Ok(())
    }
}

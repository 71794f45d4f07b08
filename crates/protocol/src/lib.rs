//! Line protocol spoken by the anagram server.
//!
//! A request is one `\n`-terminated line holding the query word. The response is one line per
//! member of the matching anagram class, in stored order. With [`Framing::BlankLine`] every
//! response is followed by an empty line so clients can tell "no matches" from "still
//! arriving".

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

pub const DEFAULT_BIND: &str = "127.0.0.1:4567";
pub const DEFAULT_MAX_LINE_BYTES: usize = 4096;

pub type Result<T> = std::result::Result<T, ProtocolError>;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("request line exceeds {max_bytes} bytes")]
    LineTooLong { max_bytes: usize },

    #[error("unknown framing '{0}' (expected none|blank-line)")]
    UnknownFraming(String),
}

/// How the end of a response is marked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Framing {
    /// Bare member lines, nothing after the last one.
    #[default]
    None,
    /// An empty line after every response.
    BlankLine,
}

impl FromStr for Framing {
    type Err = ProtocolError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "blank-line" | "blank" => Ok(Self::BlankLine),
            other => Err(ProtocolError::UnknownFraming(other.to_string())),
        }
    }
}

impl std::fmt::Display for Framing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::BlankLine => f.write_str("blank-line"),
        }
    }
}

/// Read one request line, without its terminator.
///
/// Returns `Ok(None)` at end of stream, including a final line that never got its `\n`:
/// the peer is gone and there is nobody to answer.
pub async fn read_line_limited<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    max_bytes: usize,
) -> Result<Option<Vec<u8>>> {
    let mut out = Vec::new();
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(None);
        }

        if let Some(pos) = available.iter().position(|b| *b == b'\n') {
            if out.len() + pos > max_bytes {
                return Err(ProtocolError::LineTooLong { max_bytes });
            }
            out.extend_from_slice(&available[..pos]);
            reader.consume(pos + 1);
            return Ok(Some(out));
        }

        let n = available.len();
        if out.len() + n > max_bytes {
            return Err(ProtocolError::LineTooLong { max_bytes });
        }
        out.extend_from_slice(available);
        reader.consume(n);
    }
}

/// Turn a raw request line into the query word.
///
/// Surrounding whitespace, including a `\r` left by CRLF clients, is not part of the word.
pub fn normalize_query(line: &[u8]) -> String {
    String::from_utf8_lossy(line).trim().to_string()
}

/// Encode one response: each member on its own line, then the framing marker.
pub fn encode_response<'a, I>(members: I, framing: Framing) -> Vec<u8>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = Vec::new();
    for member in members {
        out.extend_from_slice(member.as_bytes());
        out.push(b'\n');
    }
    if framing == Framing::BlankLine {
        out.push(b'\n');
    }
    out
}

pub async fn write_response<'a, W, I>(writer: &mut W, members: I, framing: Framing) -> Result<()>
where
    W: AsyncWrite + Unpin,
    I: IntoIterator<Item = &'a str>,
{
    let bytes = encode_response(members, framing);
    if bytes.is_empty() {
        return Ok(());
    }
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    Ok(())
}

/// Client side of [`Framing::BlankLine`]: collect member lines up to the empty line.
pub async fn read_framed_response<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    max_bytes: usize,
) -> Result<Option<Vec<String>>> {
    let mut members = Vec::new();
    loop {
        let Some(line) = read_line_limited(reader, max_bytes).await? else {
            return Ok(None);
        };
        if line.is_empty() {
            return Ok(Some(members));
        }
        members.push(String::from_utf8_lossy(&line).into_owned());
    }
}

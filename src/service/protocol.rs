use crate::error::ServiceError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{self, BufRead, Read, Write};

const CONTENT_LENGTH: &str = "Content-Length:";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub seq: u64,
    #[serde(flatten)]
    pub content: MessageContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageContent {
    Request {
        command: String,
        #[serde(default)]
        arguments: Option<Value>,
    },
    Response {
        request_seq: u64,
        success: bool,
        command: String,
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        body: Option<Value>,
    },
    Event {
        event: String,
        #[serde(default)]
        body: Option<Value>,
    },
}

/// Read one `Content-Length` framed message. `Ok(None)` at end of input.
///
/// A [`ServiceError::Framing`] error means the header could not be read and the
/// stream position relative to the next frame is unknown.
pub fn read_message<R: BufRead>(reader: &mut R) -> Result<Option<Message>, ServiceError> {
    let mut content_length: Option<usize> = None;
    let mut saw_header = false;

    loop {
        let mut line = String::new();
        let n = reader
            .read_line(&mut line)
            .map_err(|e| ServiceError::io("<input>", e))?;
        if n == 0 {
            if saw_header {
                return Err(ServiceError::Framing(
                    "input ended inside a message header".to_string(),
                ));
            }
            return Ok(None);
        }

        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            if saw_header {
                break;
            }
            // Stray blank lines between frames.
            continue;
        }

        saw_header = true;
        if let Some(value) = line.strip_prefix(CONTENT_LENGTH) {
            content_length = value.trim().parse().ok();
        }
    }

    let content_length = content_length
        .filter(|len| *len > 0)
        .ok_or_else(|| ServiceError::Framing("missing Content-Length header".to_string()))?;

    // Buffer grows with the bytes received, not the declared length.
    let mut buffer = Vec::new();
    reader
        .by_ref()
        .take(content_length as u64)
        .read_to_end(&mut buffer)
        .map_err(|e| ServiceError::io("<input>", e))?;
    if buffer.len() < content_length {
        return Err(ServiceError::io(
            "<input>",
            io::Error::new(io::ErrorKind::UnexpectedEof, "input ended inside a message body"),
        ));
    }

    Ok(Some(serde_json::from_slice(&buffer)?))
}

/// Write `msg` as `Content-Length: {len}\r\n\r\n{json}` and flush.
pub fn write_message<W: Write>(writer: &mut W, msg: &Message) -> io::Result<()> {
    let json = serde_json::to_string(msg)?;
    write!(writer, "{CONTENT_LENGTH} {}\r\n\r\n{json}", json.len())?;
    writer.flush()
}

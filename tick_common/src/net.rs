//! Shared networking constants and helpers used by client and server.
//!
//! Messages are framed as one JSON document per line.
use std::io::{BufRead, Read, Write};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ProviderError;

/// TCP port the provider accepts RPC connections on.
pub const RPC_PORT: u16 = 9090;

/// Largest request line the server buffers.
pub const MAX_REQUEST_LEN: usize = 4 * 1024;
/// Largest message line `read_message` buffers; a full `get_ticks` answer fits easily.
pub const MAX_MESSAGE_LEN: usize = 16 * 1024 * 1024;

/// Helper to format an IPv4 address with a port like "ip:port".
pub fn addr(ip: &str, port: u16) -> String {
    format!("{}:{}", ip, port)
}

/// Serializes `message` as a single JSON line and flushes it.
pub fn write_message<W: Write, T: Serialize>(writer: &mut W, message: &T) -> Result<(), ProviderError> {
    let mut line = serde_json::to_vec(message)?;
    line.push(b'\n');
    writer.write_all(&line)?;
    writer.flush()?;
    Ok(())
}

/// Reads the next JSON line from `reader`, allowing at most `MAX_MESSAGE_LEN` bytes.
///
/// Returns `Ok(None)` when the peer closed the connection. Blank lines are skipped.
pub fn read_message<R: BufRead, T: DeserializeOwned>(reader: &mut R) -> Result<Option<T>, ProviderError> {
    read_message_with_limit(reader, MAX_MESSAGE_LEN)
}

/// Reads the next JSON line from `reader`, buffering at most `limit` bytes of it.
///
/// A longer line is consumed up to its line break and reported as
/// `ProviderError::MessageTooLong`, so the next call starts on a fresh message.
/// Invalid UTF-8 is reported as a JSON error.
pub fn read_message_with_limit<R: BufRead, T: DeserializeOwned>(
    reader: &mut R,
    limit: usize,
) -> Result<Option<T>, ProviderError> {
    let mut line = Vec::new();
    loop {
        line.clear();
        let read = reader
            .by_ref()
            .take(limit as u64 + 1)
            .read_until(b'\n', &mut line)?;
        if read == 0 {
            return Ok(None);
        }
        if line.len() > limit && line.last() != Some(&b'\n') {
            reader.skip_until(b'\n')?;
            return Err(ProviderError::MessageTooLong(limit));
        }
        let trimmed = line.trim_ascii();
        if !trimmed.is_empty() {
            return Ok(Some(serde_json::from_slice(trimmed)?));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Method, Request};
    use std::io::Cursor;

    #[test]
    fn framing_writes_one_line_per_message() {
        let mut out = Vec::new();
        write_message(&mut out, &Request::new(Method::GetTicks)).unwrap();
        write_message(&mut out, &Request::new(Method::Shutdown)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn read_skips_blank_lines_and_reports_eof() {
        let mut input = Cursor::new("\n\n{\"method\":\"shutdown\"}\n");
        let first: Option<Request> = read_message(&mut input).unwrap();
        assert_eq!(first.map(|r| r.method), Some(Method::Shutdown));
        let second: Option<Request> = read_message(&mut input).unwrap();
        assert!(second.is_none());
    }

    #[test]
    fn read_rejects_garbage() {
        let mut input = Cursor::new("not json\n");
        let result: Result<Option<Request>, _> = read_message(&mut input);
        assert!(matches!(result, Err(ProviderError::SerdeJson(_))));
    }

    #[test]
    fn oversized_line_is_rejected_and_skipped() {
        let mut input = Cursor::new(format!(
            "{}\n{{\"method\":\"get_ticks\"}}\n",
            "x".repeat(100)
        ));
        let first: Result<Option<Request>, _> = read_message_with_limit(&mut input, 32);
        assert!(matches!(first, Err(ProviderError::MessageTooLong(32))));
        let second: Option<Request> = read_message_with_limit(&mut input, 32).unwrap();
        assert_eq!(second.map(|r| r.method), Some(Method::GetTicks));
    }

    #[test]
    fn line_at_limit_is_accepted() {
        let request = "{\"method\":\"shutdown\"}";
        let mut input = Cursor::new(format!("{request}\n"));
        let parsed: Option<Request> = read_message_with_limit(&mut input, request.len()).unwrap();
        assert_eq!(parsed.map(|r| r.method), Some(Method::Shutdown));
    }

    #[test]
    fn unterminated_stream_stops_at_limit() {
        let mut input = Cursor::new(vec![b'{'; 10_000]);
        let result: Result<Option<Request>, _> = read_message_with_limit(&mut input, 64);
        assert!(matches!(result, Err(ProviderError::MessageTooLong(64))));
        assert_eq!(input.position(), 10_000);
    }

    #[test]
    fn invalid_utf8_is_a_json_error() {
        let mut input = Cursor::new(b"{\"method\":\"\xff\xfe\"}\n".to_vec());
        let result: Result<Option<Request>, _> = read_message(&mut input);
        assert!(matches!(result, Err(ProviderError::SerdeJson(_))));
    }

    #[test]
    fn addr_joins_ip_and_port() {
        assert_eq!(addr("127.0.0.1", RPC_PORT), "127.0.0.1:9090");
    }
}

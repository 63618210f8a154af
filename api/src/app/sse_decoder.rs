//! Incremental decoder for chat-completion event streams
//!
//! The body is a sequence of newline-delimited records; records of interest
//! look like `data: {json}` or `data: [DONE]`. Transport chunks may split a
//! record (or a multi-byte character) anywhere, so bytes are buffered until
//! a full line is available.

use serde::Deserialize;

/// A meaningful record decoded from the stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseRecord {
    /// Incremental text fragment
    Delta(String),
    /// End-of-stream sentinel
    Done,
}

#[derive(Deserialize)]
struct ChunkPayload {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
}

#[derive(Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Line-buffering decoder; feed it chunks in arrival order
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one transport chunk and return the records it completed
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseRecord> {
        self.buffer.extend_from_slice(chunk);

        let mut records = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(record) = parse_line(&line) {
                records.push(record);
            }
        }
        records
    }

    /// Flush a trailing record that was not newline-terminated
    pub fn finish(&mut self) -> Vec<SseRecord> {
        let line = std::mem::take(&mut self.buffer);
        parse_line(&line).into_iter().collect()
    }
}

/// Decode a single line. Anything that is not a usable `data:` record
/// (comments, other fields, malformed JSON, empty deltas) yields `None`.
pub fn parse_line(line: &[u8]) -> Option<SseRecord> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return None;
    }

    let data = line.strip_prefix("data:")?;
    let data = data.strip_prefix(' ').unwrap_or(data);

    if data.trim() == "[DONE]" {
        return Some(SseRecord::Done);
    }

    match serde_json::from_str::<ChunkPayload>(data) {
        Ok(payload) => payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta)
            .and_then(|delta| delta.content)
            .filter(|content| !content.is_empty())
            .map(SseRecord::Delta),
        Err(e) => {
            tracing::trace!(error = %e, "Skipping malformed stream record");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO: &str = "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n\
                         data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n\
                         data: [DONE]\n\n";

    fn delta(s: &str) -> SseRecord {
        SseRecord::Delta(s.to_string())
    }

    #[test]
    fn decodes_whole_body() {
        let mut decoder = SseDecoder::new();
        let records = decoder.feed(HELLO.as_bytes());
        assert_eq!(records, vec![delta("Hel"), delta("lo"), SseRecord::Done]);
    }

    #[test]
    fn byte_by_byte_feeding_is_equivalent() {
        let mut decoder = SseDecoder::new();
        let records: Vec<SseRecord> = HELLO
            .as_bytes()
            .iter()
            .flat_map(|b| decoder.feed(std::slice::from_ref(b)))
            .collect();
        assert_eq!(records, vec![delta("Hel"), delta("lo"), SseRecord::Done]);
    }

    #[test]
    fn multibyte_character_split_across_chunks() {
        let body = "data: {\"choices\":[{\"delta\":{\"content\":\"héllo 你好\"}}]}\n".as_bytes();
        let split = body.iter().position(|b| *b >= 0x80).unwrap() + 1;

        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(&body[..split]).is_empty());
        assert_eq!(decoder.feed(&body[split..]), vec![delta("héllo 你好")]);
    }

    #[test]
    fn malformed_and_foreign_lines_are_skipped() {
        let body = "data: {not json\n\
                    : keep-alive\n\
                    event: ping\n\
                    data: {\"choices\":[]}\n\
                    data: {\"choices\":[{\"delta\":{}}]}\n\
                    data: {\"choices\":[{\"delta\":{\"content\":\"\"}}]}\n\
                    data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n";
        let mut decoder = SseDecoder::new();
        assert_eq!(decoder.feed(body.as_bytes()), vec![delta("ok")]);
    }

    #[test]
    fn crlf_line_endings() {
        let body = "data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\r\n\r\ndata: [DONE]\r\n";
        let mut decoder = SseDecoder::new();
        assert_eq!(decoder.feed(body.as_bytes()), vec![delta("a"), SseRecord::Done]);
    }

    #[test]
    fn finish_flushes_unterminated_record() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: [DONE]").is_empty());
        assert_eq!(decoder.finish(), vec![SseRecord::Done]);
        assert!(decoder.finish().is_empty());
    }
}

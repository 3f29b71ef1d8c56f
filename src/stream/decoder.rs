//! Incremental decoding of `data:`-framed text streams.
//!
//! Bytes arrive in arbitrary chunks. [`Utf8Decoder`] carries incomplete
//! multi-byte sequences between chunks, and [`SseDecoder`] carries incomplete
//! lines, so the decoded result never depends on where the transport split
//! the body.

/// Line prefix marking an event payload.
pub const DATA_PREFIX: &str = "data: ";
/// Payload that terminates the stream.
pub const DONE_TOKEN: &str = "[DONE]";

/// Streaming UTF-8 decoder. Invalid sequences become U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `chunk`, holding back a trailing incomplete sequence for the next call.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let mut out = String::with_capacity(self.pending.len());
        let mut rest: &[u8] = &self.pending;

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    rest = &[];
                    break;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    // `valid_up_to` marks a verified UTF-8 prefix.
                    out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match err.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[bad..];
                        }
                        None => {
                            rest = after;
                            break;
                        }
                    }
                }
            }
        }

        self.pending = rest.to_vec();
        out
    }

    /// Flush held-back bytes at end of input.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        self.pending.clear();
        char::REPLACEMENT_CHARACTER.to_string()
    }
}

/// Turns raw body bytes into cumulative text snapshots.
///
/// Each `data: ` line with a non-empty payload is trimmed and appended to the
/// running text, and the new cumulative text is returned as one increment.
/// Other lines are ignored. A `[DONE]` payload marks the decoder done, after
/// which further input is discarded.
#[derive(Debug, Default)]
pub struct SseDecoder {
    utf8: Utf8Decoder,
    line: String,
    text: String,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of body bytes; returns the increments it produced, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        if self.done {
            return Vec::new();
        }
        let decoded = self.utf8.decode(chunk);
        self.line.push_str(&decoded);

        let mut increments = Vec::new();
        while let Some(end) = self.line.find('\n') {
            let line: String = self.line.drain(..=end).collect();
            if let Some(snapshot) = self.accept_line(&line) {
                increments.push(snapshot);
            }
            if self.done {
                self.line.clear();
                break;
            }
        }
        increments
    }

    /// Process whatever is buffered at end of stream.
    ///
    /// Returns a final increment if the unterminated last line carried data.
    pub fn finish(&mut self) -> Option<String> {
        if self.done {
            return None;
        }
        let tail = self.utf8.finish();
        self.line.push_str(&tail);
        let line = std::mem::take(&mut self.line);
        self.accept_line(&line)
    }

    /// Whether the terminator has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Accumulated text so far, untrimmed.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Accumulated text trimmed of surrounding whitespace.
    pub fn final_text(&self) -> String {
        self.text.trim().to_string()
    }

    fn accept_line(&mut self, line: &str) -> Option<String> {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let line = line.strip_suffix('\r').unwrap_or(line);
        let payload = line.strip_prefix(DATA_PREFIX)?.trim();
        if payload == DONE_TOKEN {
            self.done = true;
            return None;
        }
        if payload.is_empty() {
            return None;
        }
        self.text.push_str(payload);
        Some(self.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decode_all(chunks: &[&[u8]]) -> (Vec<String>, String) {
        let mut decoder = SseDecoder::new();
        let mut increments = Vec::new();
        for chunk in chunks {
            increments.extend(decoder.push(chunk));
            if decoder.is_done() {
                break;
            }
        }
        increments.extend(decoder.finish());
        (increments, decoder.final_text())
    }

    #[test]
    fn single_event_then_done() {
        let (increments, text) = decode_all(&["data: Hello\ndata: [DONE]\n".as_bytes()]);
        assert_eq!(increments, vec!["Hello".to_string()]);
        assert_eq!(text, "Hello");
    }

    #[test]
    fn increments_are_cumulative() {
        let (increments, text) =
            decode_all(&["data: Bon\n\ndata: jour\n\ndata:  !  \n\n".as_bytes()]);
        assert_eq!(increments, vec!["Bon", "Bonjour", "Bonjour!"]);
        assert_eq!(text, "Bonjour!");
    }

    #[test]
    fn multibyte_split_inside_character() {
        let whole = "data: 안녕\ndata: [DONE]\n".as_bytes();
        let (_, expected) = decode_all(&[whole]);
        assert_eq!(expected, "안녕");

        for split in 1..whole.len() {
            let (a, b) = whole.split_at(split);
            let (_, text) = decode_all(&[a, b]);
            assert_eq!(text, expected, "split at byte {split}");
        }
    }

    #[test]
    fn multibyte_split_at_line_boundary() {
        let first = "data: 안\n".as_bytes();
        let second = "녕\ndata: [DONE]\n".as_bytes();
        let mut joined = first.to_vec();
        joined.extend_from_slice(second);

        let (_, split_text) = decode_all(&[first, second]);
        let (_, whole_text) = decode_all(&[joined.as_slice()]);
        assert_eq!(split_text, whole_text);
    }

    #[test]
    fn every_byte_its_own_chunk() {
        let body = "data: こんにちは\ndata: 世界\n".as_bytes();
        let chunks: Vec<&[u8]> = body.chunks(1).collect();
        let (increments, text) = decode_all(&chunks);
        assert_eq!(increments, vec!["こんにちは", "こんにちは世界"]);
        assert_eq!(text, "こんにちは世界");
    }

    #[test]
    fn non_data_lines_are_ignored() {
        let (increments, text) =
            decode_all(&[": keep-alive\nevent: ping\ndata:no-space\ndata: ok\n".as_bytes()]);
        assert_eq!(increments, vec!["ok"]);
        assert_eq!(text, "ok");
    }

    #[test]
    fn done_stops_decoding() {
        let (increments, text) = decode_all(&[
            "data: a\ndata: [DONE]\ndata: b\n".as_bytes(),
            "data: c\n".as_bytes(),
        ]);
        assert_eq!(increments, vec!["a"]);
        assert_eq!(text, "a");
    }

    #[test]
    fn unterminated_last_line_is_flushed() {
        let (increments, text) = decode_all(&["data: one\ndata: two".as_bytes()]);
        assert_eq!(increments, vec!["one", "onetwo"]);
        assert_eq!(text, "onetwo");
    }

    #[test]
    fn crlf_lines() {
        let (increments, _) = decode_all(&["data: x\r\n\r\ndata: y\r\n".as_bytes()]);
        assert_eq!(increments, vec!["x", "xy"]);
    }

    #[test]
    fn empty_body() {
        let (increments, text) = decode_all(&[]);
        assert!(increments.is_empty());
        assert_eq!(text, "");
    }

    #[test]
    fn invalid_bytes_become_replacement_char() {
        let mut utf8 = Utf8Decoder::new();
        assert_eq!(utf8.decode(b"a\xFFb"), "a\u{FFFD}b");
        assert_eq!(utf8.decode(&[0xEC, 0x95]), "");
        assert_eq!(utf8.finish(), "\u{FFFD}");
    }

    #[test]
    fn increment_lengths_never_decrease() {
        let (increments, _) = decode_all(&["data: a\ndata: bb\ndata: \ndata: ccc\n".as_bytes()]);
        assert!(increments.windows(2).all(|w| w[0].len() <= w[1].len()));
    }
}

//! Byte-at-a-time MSRP framer (§4.5): locates one complete transaction in
//! an incoming byte stream without knowing transaction boundaries ahead of
//! time. Single direction — a connection owns one parser per read side.

use ng911_sip_core::buffer::ends_with_at;

use crate::config::MsrpConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    MsrpPatternFound,
    EndLineSearch,
    EndLineFound,
}

/// Streaming MSRP transaction framer. Feed it bytes as they arrive; it
/// yields complete transaction buffers (start line through end-line,
/// inclusive) as they're recognized.
pub struct MsrpStreamParser {
    state: State,
    buf: Vec<u8>,
    end_line_pattern: Vec<u8>,
    /// Bytes still needed after the end-line pattern matches: flag, CR, LF.
    trailer_remaining: u8,
    max_len: usize,
}

impl MsrpStreamParser {
    pub fn new(config: &MsrpConfig) -> Self {
        MsrpStreamParser {
            state: State::Idle,
            buf: Vec::new(),
            end_line_pattern: Vec::new(),
            trailer_remaining: 0,
            max_len: config.max_message_length,
        }
    }

    fn reset(&mut self) {
        self.state = State::Idle;
        self.buf.clear();
        self.end_line_pattern.clear();
        self.trailer_remaining = 0;
    }

    /// Feeds one byte. Returns `Some(transaction_bytes)` when a complete
    /// transaction has just been recognized; the parser resets to `Idle`
    /// immediately after returning it.
    pub fn feed_byte(&mut self, byte: u8) -> Option<Vec<u8>> {
        self.buf.push(byte);

        if self.buf.len() > self.max_len {
            // §4.5: overflow resets silently; the framer resynchronizes on
            // the next `MSRP` token.
            self.reset();
            return None;
        }

        match self.state {
            State::Idle => {
                while self.buf.len() >= 4 && &self.buf[0..4] != b"MSRP" {
                    self.buf.remove(0);
                }
                if self.buf.len() >= 4 && &self.buf[0..4] == b"MSRP" {
                    self.state = State::MsrpPatternFound;
                }
                None
            }
            State::MsrpPatternFound => {
                if let Some(eol) = ng911_sip_core::buffer::find_pattern(&self.buf, 0, self.buf.len(), b"\r\n") {
                    let first_line = String::from_utf8_lossy(&self.buf[..eol]).to_string();
                    let txn_id = first_line.split_whitespace().nth(1).unwrap_or("").to_string();
                    self.end_line_pattern = format!("-------{txn_id}").into_bytes();
                    self.state = State::EndLineSearch;
                }
                None
            }
            State::EndLineSearch => {
                if !self.end_line_pattern.is_empty() && ends_with_at(&self.buf, &self.end_line_pattern) {
                    self.state = State::EndLineFound;
                    self.trailer_remaining = 3; // flag, CR, LF
                }
                None
            }
            State::EndLineFound => {
                self.trailer_remaining -= 1;
                if self.trailer_remaining == 0 {
                    let txn = std::mem::take(&mut self.buf);
                    self.reset();
                    Some(txn)
                } else {
                    None
                }
            }
        }
    }

    /// Feeds a slice, returning every transaction completed while consuming
    /// it (there may be more than one back-to-back in a single read).
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Vec<u8>> {
        bytes.iter().filter_map(|&b| self.feed_byte(b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_complete_transaction_fed_one_byte_at_a_time() {
        let raw = b"MSRP abc SEND\r\nTo-Path: msrp://x/y;tcp\r\nFrom-Path: msrp://a/b;tcp\r\n\r\n-------abc$\r\n";
        let mut parser = MsrpStreamParser::new(&MsrpConfig::default());
        let mut result = None;
        for (i, &b) in raw.iter().enumerate() {
            let out = parser.feed_byte(b);
            if out.is_some() {
                assert_eq!(i, raw.len() - 1, "must report complete exactly after the last byte");
                result = out;
            }
        }
        assert_eq!(result.unwrap(), raw.to_vec());
    }

    #[test]
    fn resynchronizes_after_garbage_prefix() {
        let mut parser = MsrpStreamParser::new(&MsrpConfig::default());
        let garbage = b"\x00\x01garbageMSRP abc 200\r\n\r\n-------abc$\r\n";
        let out = parser.feed(garbage);
        assert_eq!(out.len(), 1);
        assert!(out[0].starts_with(b"MSRP abc 200"));
    }

    #[test]
    fn overflow_resets_silently() {
        let config = MsrpConfig::default().with_max_message_length(16);
        let mut parser = MsrpStreamParser::new(&config);
        let out = parser.feed(b"MSRP abc SEND\r\nTo-Path: way too long to fit\r\n\r\n-------abc$\r\n");
        assert!(out.is_empty());
        // parser should have resynchronized and be ready for a fresh transaction
        let recovered = parser.feed(b"MSRP def 200\r\n\r\n-------def$\r\n");
        assert_eq!(recovered.len(), 1);
    }

    #[test]
    fn two_back_to_back_transactions_in_one_feed() {
        let mut parser = MsrpStreamParser::new(&MsrpConfig::default());
        let raw = b"MSRP a 200\r\n\r\n-------a$\r\nMSRP b 200\r\n\r\n-------b$\r\n";
        let out = parser.feed(raw);
        assert_eq!(out.len(), 2);
    }
}

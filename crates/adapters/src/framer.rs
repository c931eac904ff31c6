// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Framing for a stream of concatenated, pretty-printed JSON objects.
//!
//! The watch subprocess writes one multi-line object per update with no
//! record separator. Objects are recovered by counting braces line by line:
//! when the depth returns to zero the accumulated lines form one object.
//!
//! Braces inside string literals are not special-cased. The resource schema
//! never carries an unbalanced brace in a string value, so the naive count
//! holds for the fields consumed.

use std::collections::VecDeque;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};

const READ_CHUNK: usize = 8 * 1024;

/// Incremental brace-depth framer.
///
/// Bytes may arrive split at any boundary; an incomplete trailing line is
/// held until its newline (or [`ObjectFramer::finish`]) arrives.
#[derive(Debug, Default)]
pub struct ObjectFramer {
    partial: Vec<u8>,
    lines: Vec<String>,
    depth: i64,
}

impl ObjectFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes, returning every object completed by them.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut objects = Vec::new();
        for &byte in bytes {
            match byte {
                b'\n' => {
                    let line = std::mem::take(&mut self.partial);
                    if let Some(object) = self.push_line(&line) {
                        objects.push(object);
                    }
                }
                b'\r' => {}
                _ => self.partial.push(byte),
            }
        }
        objects
    }

    /// Flush an unterminated final line at end of stream.
    pub fn finish(&mut self) -> Option<String> {
        if self.partial.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.partial);
        self.push_line(&line)
    }

    /// True while an object has been started but not closed.
    pub fn is_mid_object(&self) -> bool {
        !self.lines.is_empty() || !self.partial.is_empty()
    }

    fn push_line(&mut self, raw: &[u8]) -> Option<String> {
        // Newlines never occur inside a multi-byte UTF-8 sequence, so a
        // line boundary is always a character boundary.
        let line = String::from_utf8_lossy(raw).into_owned();
        if line.is_empty() && self.depth == 0 {
            return None;
        }

        for c in line.chars() {
            match c {
                '{' => self.depth += 1,
                '}' => self.depth -= 1,
                _ => {}
            }
        }
        self.lines.push(line);

        if self.depth < 0 {
            // Stray closing brace: hand the block to the decoder (which will
            // reject it) rather than buffering forever.
            tracing::debug!(depth = self.depth, "unbalanced closing brace, resetting framer");
            self.depth = 0;
        }

        if self.depth == 0 {
            let object = self.lines.join("\n");
            self.lines.clear();
            return Some(object);
        }
        None
    }
}

/// Why an [`ObjectReader`] stopped producing objects.
#[derive(Debug)]
pub enum StreamEnd {
    /// The byte source reached end-of-stream.
    Eof,
    /// Reading failed; the error is kept so callers can log it.
    ReadError(io::Error),
}

impl StreamEnd {
    pub fn is_eof(&self) -> bool {
        matches!(self, StreamEnd::Eof)
    }
}

/// Lazy sequence of framed objects read from an async byte source.
///
/// One reader serves one watch session; a reconnect builds a fresh reader.
pub struct ObjectReader<R> {
    reader: R,
    framer: ObjectFramer,
    ready: VecDeque<String>,
    buf: Vec<u8>,
    end: Option<StreamEnd>,
}

impl<R: AsyncRead + Unpin> ObjectReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            framer: ObjectFramer::new(),
            ready: VecDeque::new(),
            buf: vec![0; READ_CHUNK],
            end: None,
        }
    }

    /// Next complete object, or `None` once the source has ended.
    ///
    /// Cancel-safe: dropping the future before it resolves loses no bytes,
    /// since framer state only changes after a read has returned.
    pub async fn next_object(&mut self) -> Option<String> {
        loop {
            if let Some(object) = self.ready.pop_front() {
                return Some(object);
            }
            if self.end.is_some() {
                return None;
            }

            match self.reader.read(&mut self.buf).await {
                Ok(0) => {
                    if self.framer.is_mid_object() {
                        tracing::debug!("stream ended inside an object");
                    }
                    self.ready.extend(self.framer.finish());
                    self.end = Some(StreamEnd::Eof);
                }
                Ok(n) => {
                    let objects = self.framer.push(&self.buf[..n]);
                    self.ready.extend(objects);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => self.end = Some(StreamEnd::ReadError(e)),
            }
        }
    }

    /// How the stream ended, once [`ObjectReader::next_object`] has returned `None`.
    pub fn end(&self) -> Option<&StreamEnd> {
        self.end.as_ref()
    }

    /// Consume the reader, returning how it ended.
    ///
    /// A reader abandoned before reaching the end (e.g. force-closed) reports `Eof`.
    pub fn into_end(self) -> StreamEnd {
        self.end.unwrap_or(StreamEnd::Eof)
    }
}

#[cfg(test)]
#[path = "framer_tests.rs"]
mod tests;

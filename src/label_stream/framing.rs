use crate::log_debug;
use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read};

/// Longest accepted label line, excluding the terminator.
pub const MAX_LINE_BYTES: usize = 256;

const READ_CHUNK: usize = 1024;

/// Splits a byte stream into trimmed, non-empty lines.
/// Bytes after the last `\n` stay buffered until more input arrives.
#[derive(Debug)]
pub struct LineFramer {
    pending: Vec<u8>,
    max_line_bytes: usize,
    discarding: bool,
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineFramer {
    pub fn new() -> Self {
        Self::with_max_line_bytes(MAX_LINE_BYTES)
    }

    pub fn with_max_line_bytes(max_line_bytes: usize) -> Self {
        Self {
            pending: Vec::new(),
            max_line_bytes: max_line_bytes.max(1),
            discarding: false,
        }
    }

    pub fn push(&mut self, bytes: &[u8], out: &mut Vec<String>) {
        for &byte in bytes {
            if byte == b'\n' {
                if self.discarding {
                    self.discarding = false;
                } else {
                    let line = String::from_utf8_lossy(&self.pending);
                    let trimmed = line.trim();
                    if !trimmed.is_empty() {
                        out.push(trimmed.to_string());
                    }
                }
                self.pending.clear();
                continue;
            }
            if self.discarding {
                continue;
            }
            self.pending.push(byte);
            if self.pending.len() > self.max_line_bytes {
                log_debug(&format!(
                    "label line exceeded {} bytes; discarding until newline",
                    self.max_line_bytes
                ));
                self.pending.clear();
                self.discarding = true;
            }
        }
    }

    /// Bytes waiting for a terminator.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Iterator over framed lines from any reader. An unterminated tail at EOF is
/// dropped.
pub struct LineReader<R> {
    inner: R,
    framer: LineFramer,
    ready: VecDeque<String>,
    buf: Box<[u8]>,
    done: bool,
}

impl<R: Read> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            framer: LineFramer::new(),
            ready: VecDeque::new(),
            buf: vec![0u8; READ_CHUNK].into_boxed_slice(),
            done: false,
        }
    }
}

impl<R: Read> Iterator for LineReader<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(line) = self.ready.pop_front() {
                return Some(Ok(line));
            }
            if self.done {
                return None;
            }
            match self.inner.read(&mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    if self.framer.pending_len() > 0 {
                        log_debug(&format!(
                            "dropping {} unterminated bytes at end of stream",
                            self.framer.pending_len()
                        ));
                    }
                }
                Ok(n) => {
                    let mut lines = Vec::new();
                    self.framer.push(&self.buf[..n], &mut lines);
                    self.ready.extend(lines);
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

//! Streaming memory-image loader.
//!
//! Parses the textual memh stream produced by the host-side image encoder:
//!
//! ```text
//! @<addr>
//! <byte> <byte> ...
//! END
//! ```
//!
//! and coalesces the decoded bytes into aligned, strobe-qualified 64-bit
//! write transactions through the control facade. At most one partial word
//! is ever pending, so an arbitrarily large image streams through without
//! buffering. A partial word is flushed whenever the stream leaves its
//! 8-byte-aligned base: on a fully populated strobe, on an `@` reposition,
//! on a non-contiguous byte, and at end of stream.

use tracing::trace;

use crate::command::{parse_hex_byte, parse_hex_scalar};
use crate::common::regs::RegisterBus;
use crate::control::CoreControl;

/// Outcome of feeding one line to the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// The session continues; feed the next line.
    Continue,
    /// The line was an `END` terminator; call [`MemhLoader::finish`].
    End,
}

/// Counters reported at the end of a load session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    /// Bytes decoded from the stream.
    pub bytes: u32,
    /// Write transactions issued on the bus.
    pub writes: u32,
}

/// One load session: cursor, pending-word accumulator, and counters.
///
/// Invariants: `pending_strobe == 0` implies `pending_data == 0`; while
/// `pending_strobe != 0`, `pending_base` is the 8-byte-aligned base of the
/// word the pending bytes belong to.
#[derive(Debug, Default)]
pub struct MemhLoader {
    /// Current write position; advances by one per decoded byte.
    cursor: u64,
    /// Aligned base of the in-progress word; meaningful while strobe != 0.
    pending_base: u64,
    /// Byte lanes of the in-progress word.
    pending_data: u64,
    /// Bit `i` set means lane `i` of `pending_data` holds a decoded byte.
    pending_strobe: u8,
    bytes: u32,
    writes: u32,
}

impl MemhLoader {
    /// Begins a fresh load session with the cursor at address zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes one line of the stream.
    ///
    /// The line must already have its terminator stripped. Grammar, after
    /// trimming leading whitespace: empty lines are ignored; `END`
    /// (optionally followed by whitespace) terminates; `@<hex>` flushes any
    /// pending word and repositions the cursor; anything else is scanned as
    /// two-digit hex byte tokens until a comment leader (`#` or `//`) or a
    /// malformed token stops the scan for that line.
    pub fn feed_line<B: RegisterBus>(
        &mut self,
        line: &str,
        core: &mut CoreControl<B>,
    ) -> LineOutcome {
        let p = line.trim_start_matches([' ', '\t']);
        if p.is_empty() {
            return LineOutcome::Continue;
        }

        if let Some(rest) = p.strip_prefix("END") {
            if rest.is_empty() || rest.starts_with([' ', '\t']) {
                return LineOutcome::End;
            }
        }

        if let Some(rest) = p.strip_prefix('@') {
            // Flush before repositioning so a partial word is never merged
            // with bytes from a non-contiguous region.
            self.flush(core);
            if let Some(addr) = parse_hex_scalar(rest) {
                self.cursor = addr;
            }
            return LineOutcome::Continue;
        }

        let bytes = p.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
                i += 1;
            }
            if i >= bytes.len() {
                break;
            }
            if bytes[i] == b'#' || (bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'/')) {
                break;
            }
            let token_end = (i + 2).min(bytes.len());
            let Some(byte) = parse_hex_byte(&bytes[i..token_end]) else {
                // Malformed token: the rest of the line is dropped silently.
                break;
            };
            self.feed_byte(byte, core);
            i += 2;
        }
        LineOutcome::Continue
    }

    /// Flushes any pending word and returns the session counters.
    pub fn finish<B: RegisterBus>(mut self, core: &mut CoreControl<B>) -> LoadReport {
        self.flush(core);
        LoadReport {
            bytes: self.bytes,
            writes: self.writes,
        }
    }

    /// Coalesces one decoded byte at the cursor into the pending word.
    fn feed_byte<B: RegisterBus>(&mut self, byte: u8, core: &mut CoreControl<B>) {
        let base = self.cursor & !7;
        let lane = (self.cursor & 7) as u8;

        if self.pending_strobe == 0 {
            self.pending_base = base;
        } else if self.pending_base != base {
            self.flush(core);
            self.pending_base = base;
        }

        self.pending_data |= u64::from(byte) << (lane * 8);
        self.pending_strobe |= 1 << lane;
        if self.pending_strobe == 0xFF {
            self.flush(core);
        }

        self.cursor = self.cursor.wrapping_add(1);
        self.bytes += 1;
    }

    /// Commits the pending word as one bus transaction, if any.
    fn flush<B: RegisterBus>(&mut self, core: &mut CoreControl<B>) {
        if self.pending_strobe == 0 {
            return;
        }
        trace!(
            "flush: base={:#x} strobe={:#04x}",
            self.pending_base, self.pending_strobe
        );
        core.host_write(self.pending_base, self.pending_data, self.pending_strobe);
        self.pending_data = 0;
        self.pending_strobe = 0;
        self.writes += 1;
    }
}

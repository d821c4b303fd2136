//! Host command classification and hex parsing primitives.
//!
//! One host line maps to one [`Command`]. Classification mirrors the wire
//! protocol: keywords are matched as prefixes of the trimmed line (so
//! trailing text after a keyword is tolerated), `PING` alone requires an
//! exact match, and `BOOT` operands are parsed eagerly so the dispatcher
//! can reply with a usage hint when they are malformed.

/// A parsed host command.
///
/// Created fresh per input line, immutable once parsed, consumed by the
/// dispatcher and discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Liveness probe.
    Ping,
    /// Set the core reset level.
    SetReset(bool),
    /// Latch the boot vector.
    SetBoot {
        /// Boot program counter.
        pc: u64,
        /// Boot stack pointer.
        sp: u64,
    },
    /// A `BOOT` line whose operands failed to parse.
    MalformedBoot,
    /// Enter a memory-image load session.
    BeginLoad,
    /// Report halted/exit/cycles/UART observables.
    Status,
    /// Release reset and supervise the run to completion.
    Run,
    /// Anything else; carries the raw trimmed text.
    Unknown(String),
}

impl Command {
    /// Classifies one host line.
    ///
    /// Returns `None` for a line that is empty after trimming leading
    /// horizontal whitespace; such lines are ignored by the dispatcher.
    pub fn parse(line: &str) -> Option<Self> {
        let p = line.trim_start_matches([' ', '\t']);
        if p.is_empty() {
            return None;
        }
        if p == "PING" {
            return Some(Self::Ping);
        }
        if let Some(rest) = p.strip_prefix("RESET") {
            // Missing or non-`1` level deasserts.
            let level = rest.trim_start_matches([' ', '\t']).starts_with('1');
            return Some(Self::SetReset(level));
        }
        if let Some(rest) = p.strip_prefix("BOOT") {
            let mut cursor = rest;
            let pc = take_hex_token(&mut cursor);
            let sp = take_hex_token(&mut cursor);
            return Some(match (pc, sp) {
                (Some(pc), Some(sp)) => Self::SetBoot { pc, sp },
                _ => Self::MalformedBoot,
            });
        }
        if p.starts_with("LOAD_MEMH") {
            return Some(Self::BeginLoad);
        }
        if p.starts_with("STATUS") {
            return Some(Self::Status);
        }
        if p.starts_with("RUN") {
            return Some(Self::Run);
        }
        Some(Self::Unknown(p.to_string()))
    }
}

/// Parses a maximal prefix of hex digits (case-insensitive) as a `u64`.
///
/// Accumulates most-significant-digit first and stops at the first non-hex
/// character without consuming it. Succeeds only if at least one digit was
/// consumed. More than 16 digits wrap, matching register-width semantics.
pub fn parse_hex_scalar(text: &str) -> Option<u64> {
    let mut value: u64 = 0;
    let mut any = false;
    for ch in text.chars() {
        let Some(digit) = ch.to_digit(16) else { break };
        any = true;
        value = (value << 4) | u64::from(digit);
    }
    any.then_some(value)
}

/// Parses exactly two hex digits as one byte.
///
/// Any other input (short slice, non-hex characters) fails with no side
/// effects.
pub fn parse_hex_byte(pair: &[u8]) -> Option<u8> {
    match pair {
        [hi, lo] => {
            let hi = (*hi as char).to_digit(16)?;
            let lo = (*lo as char).to_digit(16)?;
            Some(((hi << 4) | lo) as u8)
        }
        _ => None,
    }
}

/// Consumes one whitespace-delimited token with a hex prefix from `cursor`.
///
/// Skips leading whitespace, parses the maximal hex prefix, then advances
/// the cursor past the whole token (including any non-hex tail). On failure
/// the cursor is left at the token start and `None` is returned.
fn take_hex_token(cursor: &mut &str) -> Option<u64> {
    let start = cursor.trim_start_matches([' ', '\t']);
    let value = parse_hex_scalar(start)?;
    let end = start
        .find([' ', '\t'])
        .unwrap_or(start.len());
    *cursor = &start[end..];
    Some(value)
}

//! # Dispatcher and Run Controller Tests
//!
//! Drives full monitor sessions against the fake core and checks the reply
//! transcript byte for byte, the hardware side effects, and the run
//! controller's drain/poll interleaving.

use std::io::Cursor;

use hostlink_core::{Monitor, MonitorConfig};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::mocks::FakeCore;
use crate::common::{run_session, run_session_replies};

/// Startup puts the hardware in a known state: reset asserted, overflow
/// cleared, default boot vector latched; then banner and prompt.
#[test]
fn startup_state_and_banner() {
    let mut core = FakeCore::default();
    core.overflow = true;
    let transcript = run_session(&mut core, "");
    assert_eq!(
        transcript,
        "hostlink: base=0x43c00000\nhostlink: ready\n> \n"
    );
    assert_eq!(core.reset_trace, vec![true]);
    assert_eq!(core.overflow_clears, 1);
    assert!(!core.overflow);
    assert_eq!(core.boot_pc(), 0x10000);
    assert_eq!(core.boot_sp(), 0x3FF00);
}

/// A prompt precedes every read; each command line yields its reply in
/// place.
#[test]
fn full_transcript() {
    let mut core = FakeCore::default();
    let transcript = run_session(&mut core, "PING\nFOO\n");
    assert_eq!(
        transcript,
        "hostlink: base=0x43c00000\nhostlink: ready\n\
         > \nOK PONG\n\
         > \nERR unknown\n\
         > \n"
    );
}

/// Simple command/reply pairs, including the documented error replies.
#[rstest]
#[case("PING\n", "OK PONG\n")]
#[case("RESET 1\n", "OK RESET 1\n")]
#[case("RESET\n", "OK RESET 0\n")]
#[case("RESET 0\n", "OK RESET 0\n")]
#[case("BOOT 10000 3ff00\n", "OK BOOT pc=0x0000000000010000 sp=0x000000000003ff00\n")]
#[case("BOOT 10000\n", "ERR BOOT expects: BOOT <pc_hex> <sp_hex>\n")]
#[case("FOO\n", "ERR unknown\n")]
#[case("\n", "")]
fn command_replies(#[case] input: &str, #[case] expected: &str) {
    let mut core = FakeCore::default();
    assert_eq!(run_session_replies(&mut core, input), expected);
}

/// `RESET` with no argument deasserts the startup reset.
#[test]
fn reset_without_argument_deasserts() {
    let mut core = FakeCore::default();
    let _ = run_session(&mut core, "RESET\n");
    assert_eq!(core.reset_trace, vec![true, false]);
    assert!(!core.reset);
}

/// A malformed `BOOT` leaves the latched vector untouched.
#[test]
fn malformed_boot_has_no_effect() {
    let mut core = FakeCore::default();
    let _ = run_session(&mut core, "BOOT zz\n");
    assert_eq!(core.boot_pc(), 0x10000);
    assert_eq!(core.boot_sp(), 0x3FF00);
}

/// `STATUS` reports every observable in one line.
#[test]
fn status_reports_observables() {
    let mut core = FakeCore::default();
    core.exit_code = 0x2A;
    core.cycles = 12345;
    core.push_uart(b"abc");
    core.overflow = true;
    let replies = run_session_replies(&mut core, "STATUS\n");
    // Startup clears overflow before the command runs.
    assert_eq!(
        replies,
        "STATUS halted=0 exit=0x0000002a cycles=12345 uart_count=3 overflow=0\n"
    );
}

/// `STATUS` reflects a halted core, and an overflow raised after startup
/// stays visible: nothing outside `RUN` drains or clears it.
#[test]
fn status_halted_and_overflow() {
    let mut core = FakeCore::default();
    core.halted = true;
    core.overflow = true;
    let mut out: Vec<u8> = Vec::new();
    let mut monitor = Monitor::new(
        &mut core,
        MonitorConfig::default(),
        Cursor::new(Vec::new()),
        &mut out,
    );
    monitor.dispatch("STATUS").unwrap();
    drop(monitor);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "STATUS halted=1 exit=0x00000000 cycles=0 uart_count=0 overflow=1\n"
    );
    assert!(core.overflow);
}

/// `LOAD_MEMH` forces reset on, streams the image, and reports counters.
#[test]
fn load_session_end_to_end() {
    let mut core = FakeCore::default();
    core.reset = false;
    let replies = run_session_replies(&mut core, "LOAD_MEMH\n@1000\nDE AD BE EF\nEND\nPING\n");
    assert_eq!(replies, "OK LOAD_MEMH\nOK LOADED bytes=4 writes=1\nOK PONG\n");
    assert_eq!(core.writes, vec![(0x1000, 0x0000_0000_EFBE_ADDE, 0x0F)]);
    // Startup reset, then the forced reset before loading.
    assert_eq!(core.reset_trace, vec![true, true]);
    assert!(core.reset);
}

/// Input exhaustion inside a load session flushes the partial word and
/// still reports the counters.
#[test]
fn load_session_eof_flushes() {
    let mut core = FakeCore::default();
    let replies = run_session_replies(&mut core, "LOAD_MEMH\n@2000\nAA BB\n");
    assert_eq!(replies, "OK LOAD_MEMH\nOK LOADED bytes=2 writes=1\n");
    assert_eq!(core.writes, vec![(0x2000, 0x0000_0000_0000_BBAA, 0x03)]);
}

/// Overlong host lines are truncated at the configured capacity; the bytes
/// beyond it are dropped silently.
#[test]
fn overlong_line_truncated() {
    let mut core = FakeCore::default();
    let long_line = "aa ".repeat(200);
    let input = format!("LOAD_MEMH\n{long_line}\nEND\n");
    let replies = run_session_replies(&mut core, &input);
    // 256 bytes keep 85 full tokens; the 86th is cut mid-token and dropped.
    assert_eq!(replies, "OK LOAD_MEMH\nOK LOADED bytes=85 writes=11\n");
}

/// `RUN` supervises to halt: releases reset, relays console bytes, drains
/// once more after the halt flag, reports, and reasserts reset.
#[test]
fn run_to_halt() {
    let mut core = FakeCore::default();
    core.exit_code = 0x2A;
    core.cycles = 1000;
    core.halt_after_polls = Some(2);
    core.push_uart(b"hello\n");
    core.bytes_on_halt = b"late\n".to_vec();
    let replies = run_session_replies(&mut core, "RUN\n");
    assert_eq!(
        replies,
        "OK RUN\nhello\nlate\nHALT exit=0x0000002a cycles=1000\n"
    );
    assert_eq!(core.reset_trace, vec![true, false, true]);
    assert!(core.reset);
    assert!(core.uart.is_empty());
}

/// The poll step drains before checking the halt flag, one pass per call,
/// so drains interleave with polls under test control.
#[test]
fn run_poll_step_is_bounded() {
    let mut core = FakeCore::default();
    core.halt_after_polls = Some(1);
    core.push_uart(b"a");
    let mut out: Vec<u8> = Vec::new();
    let mut monitor = Monitor::new(
        &mut core,
        MonitorConfig::default(),
        Cursor::new(Vec::new()),
        &mut out,
    );

    assert!(!monitor.run_poll_step().unwrap());
    monitor.core_mut().bus_mut().push_uart(b"b");
    assert!(monitor.run_poll_step().unwrap());
    drop(monitor);

    assert_eq!(out, b"ab");
    assert!(core.uart.is_empty());
}

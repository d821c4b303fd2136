//! Host-side monitor for a memory-mapped hardware core.
//!
//! This crate implements the monitor that bridges a development host to a
//! hardware core exposed through a fixed register block. It provides:
//! 1. **Register bridge:** The [`RegisterBus`] seam and a `/dev/mem`-style
//!    mmap implementation for real hardware.
//! 2. **Control facade:** Typed reset, boot-vector, host-write, and status
//!    operations over the raw registers.
//! 3. **Image loader:** A streaming memh parser that coalesces arbitrary byte
//!    streams into aligned, strobe-qualified bus writes.
//! 4. **Monitor:** The ASCII command dispatcher and run controller serving
//!    the host-facing line protocol.

/// Production register bridge backed by an mmap'd MMIO window.
#[cfg(unix)]
pub mod bus;
/// Command classification and hex parsing primitives.
pub mod command;
/// Common leaf types (register map, bus trait, errors).
pub mod common;
/// Monitor configuration (register base, boot contract, line capacity).
pub mod config;
/// Hardware control facade over the register bridge.
pub mod control;
/// Streaming memory-image loader.
pub mod loader;
/// Command dispatcher, run controller, and session loop.
pub mod monitor;

/// Monitor configuration; use `MonitorConfig::default()` or deserialize from JSON.
pub use crate::config::MonitorConfig;
/// Typed operations over the register block; construct with `CoreControl::new`.
pub use crate::control::CoreControl;
/// Library error type for console and bus failures.
pub use crate::common::error::MonitorError;
/// Register bridge seam; implemented by `MmapBus` and by test fakes.
pub use crate::common::regs::RegisterBus;
/// The monitor session; construct with `Monitor::new` and drive with `serve`.
pub use crate::monitor::Monitor;

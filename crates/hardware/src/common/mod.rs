//! Common types shared across the monitor.
//!
//! This module provides the leaf building blocks the rest of the crate is
//! written against. It includes:
//! 1. **Register Map:** Byte offsets of the platform register block and the
//!    `RegisterBus` trait abstracting raw 32-bit access to it.
//! 2. **Error Handling:** The library-level error type for console and bus
//!    failures.

/// Library error types.
pub mod error;

/// Register block offsets and the raw bus trait.
pub mod regs;

pub use error::MonitorError;
pub use regs::RegisterBus;

//! Library error definitions.
//!
//! Protocol-level failures (bad operands, unknown commands) are replies on
//! the wire, not Rust errors; see the dispatcher. The errors here are the
//! ones that make a monitor session impossible to continue: the host console
//! transport failing, or the register window failing to map at startup.

use std::io;

use thiserror::Error;

/// Errors that abort a monitor session or prevent one from starting.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Reading host input or writing replies/console output failed.
    #[error("console I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The register window could not be mapped over the device file.
    #[error("cannot map register window at {base:#x} via {device}: {source}")]
    Bus {
        /// Device file the mapping was attempted through (e.g. `/dev/mem`).
        device: String,
        /// Physical base address of the register block.
        base: u64,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
}

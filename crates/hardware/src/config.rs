//! Configuration for the monitor.
//!
//! This module defines the configuration structure used to parameterize a
//! monitor session. It provides:
//! 1. **Defaults:** The platform boot contract (register base, boot vector)
//!    and the host line-buffer capacity.
//! 2. **Structure:** A flat config deserializable from JSON for the CLI's
//!    `--config` option, with every field individually defaultable.

use serde::Deserialize;

/// Default configuration constants for the monitor.
///
/// These values define the platform boot contract when not explicitly
/// overridden by a config file or CLI flags.
mod defaults {
    /// Physical base address of the platform register block.
    ///
    /// Matches the address the board integration scripts assign to the
    /// AXI-lite register file.
    pub const REG_BASE: u64 = 0x43C0_0000;

    /// Device file the register window is mapped through.
    pub const DEVICE: &str = "/dev/mem";

    /// Default boot program counter latched at startup.
    pub const BOOT_PC: u64 = 0x0001_0000;

    /// Default boot stack pointer latched at startup.
    pub const BOOT_SP: u64 = 0x0003_FF00;

    /// Host line-buffer capacity in bytes.
    ///
    /// Input beyond this length is dropped silently, mirroring the fixed
    /// line buffer of the platform firmware.
    pub const LINE_CAPACITY: usize = 256;
}

/// Monitor configuration.
///
/// Construct with [`MonitorConfig::default`] or deserialize from JSON:
///
/// ```
/// use hostlink_core::MonitorConfig;
///
/// let config: MonitorConfig =
///     serde_json::from_str(r#"{ "reg_base": 1077936128, "boot_pc": 65536 }"#).unwrap();
/// assert_eq!(config.reg_base, 0x4040_0000);
/// assert_eq!(config.boot_sp, 0x3ff00);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Physical base address of the register block.
    pub reg_base: u64,
    /// Device file to map the register window through.
    pub device: String,
    /// Boot program counter latched at session start.
    pub boot_pc: u64,
    /// Boot stack pointer latched at session start.
    pub boot_sp: u64,
    /// Host line-buffer capacity; longer lines are truncated silently.
    pub line_capacity: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            reg_base: defaults::REG_BASE,
            device: defaults::DEVICE.to_string(),
            boot_pc: defaults::BOOT_PC,
            boot_sp: defaults::BOOT_SP,
            line_capacity: defaults::LINE_CAPACITY,
        }
    }
}

//! Platform register block layout and raw bus access.
//!
//! This module pins down the byte offsets of the fixed control register block
//! exposed by the hardware core and defines the [`RegisterBus`] trait through
//! which every other component touches it. The offsets must match the RTL's
//! AXI-lite register file; all registers are 32 bits wide, little-endian.

/// Control register. Bit 0 asserts core reset.
pub const CTRL: u32 = 0x00;
/// Status register. Bit 0 reports the halted observable.
pub const STATUS: u32 = 0x04;
/// Boot program counter, low half.
pub const BOOT_PC_LO: u32 = 0x08;
/// Boot program counter, high half.
pub const BOOT_PC_HI: u32 = 0x0C;
/// Boot stack pointer, low half.
pub const BOOT_SP_LO: u32 = 0x10;
/// Boot stack pointer, high half.
pub const BOOT_SP_HI: u32 = 0x14;

/// Pending host write address, low half.
pub const HOST_ADDR_LO: u32 = 0x18;
/// Pending host write address, high half.
pub const HOST_ADDR_HI: u32 = 0x1C;
/// Pending host write data, low half.
pub const HOST_DATA_LO: u32 = 0x20;
/// Pending host write data, high half.
pub const HOST_DATA_HI: u32 = 0x24;
/// Pending host write byte strobe (low 8 bits).
pub const HOST_STRB: u32 = 0x28;
/// Host write command. Writing 1 commits the pending write as one transaction.
pub const HOST_CMD: u32 = 0x2C;

/// UART status. Bits 15:0 are the queued byte count, bit 16 the overflow
/// flag. Writing any value clears overflow.
pub const UART_STATUS: u32 = 0x30;
/// UART data. Reading pops one byte; low 8 bits are valid.
pub const UART_DATA: u32 = 0x34;

/// Latched exit code of the last run.
pub const EXIT_CODE: u32 = 0x38;
/// Cycle counter, low half.
pub const CYCLES_LO: u32 = 0x3C;
/// Cycle counter, high half.
pub const CYCLES_HI: u32 = 0x40;

/// Size in bytes of the register window.
pub const WINDOW_SIZE: usize = 0x44;

/// Raw 32-bit access to the register block.
///
/// This is the leaf primitive the monitor is built on: one aligned read or
/// write at a register offset, against a fixed base address. No retries and
/// no bus errors are modeled. Reads take `&mut self` because several
/// registers have read side effects (reading [`UART_DATA`] pops a byte).
pub trait RegisterBus {
    /// Reads the 32-bit register at `offset`.
    fn read32(&mut self, offset: u32) -> u32;
    /// Writes the 32-bit register at `offset`.
    fn write32(&mut self, offset: u32, value: u32);
}

impl<B: RegisterBus + ?Sized> RegisterBus for &mut B {
    fn read32(&mut self, offset: u32) -> u32 {
        (**self).read32(offset)
    }

    fn write32(&mut self, offset: u32, value: u32) {
        (**self).write32(offset, value);
    }
}

//! Hardware control facade.
//!
//! Typed operations over the raw register block: reset level, boot vector,
//! host write transactions, and the run observables (halted, exit code,
//! cycle count, UART queue). The facade is stateless besides the hardware's
//! own latched registers.
//!
//! The facade does not enforce the convention that host writes only happen
//! while reset is asserted; the command dispatcher sequences that.

use tracing::trace;

use crate::common::regs::{self, RegisterBus};

/// Typed access to the hardware core through a [`RegisterBus`].
#[derive(Debug)]
pub struct CoreControl<B: RegisterBus> {
    bus: B,
}

impl<B: RegisterBus> CoreControl<B> {
    /// Wraps a register bridge in the control facade.
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Returns a shared reference to the underlying bridge.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Returns a mutable reference to the underlying bridge.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Asserts (`true`) or deasserts (`false`) core reset.
    pub fn set_reset(&mut self, assert: bool) {
        self.bus.write32(regs::CTRL, u32::from(assert));
    }

    /// Latches the boot vector: program counter and stack pointer.
    pub fn set_boot(&mut self, pc: u64, sp: u64) {
        self.bus.write32(regs::BOOT_PC_LO, pc as u32);
        self.bus.write32(regs::BOOT_PC_HI, (pc >> 32) as u32);
        self.bus.write32(regs::BOOT_SP_LO, sp as u32);
        self.bus.write32(regs::BOOT_SP_HI, (sp >> 32) as u32);
    }

    /// Issues one aligned write transaction of up to 8 bytes.
    ///
    /// Stages address, data, and byte strobe, then pulses the command
    /// register to commit. Bit `i` of `strobe` selects byte lane `i` of
    /// `data`.
    pub fn host_write(&mut self, addr: u64, data: u64, strobe: u8) {
        trace!("host write: addr={addr:#x} strobe={strobe:#04x}");
        self.bus.write32(regs::HOST_ADDR_LO, addr as u32);
        self.bus.write32(regs::HOST_ADDR_HI, (addr >> 32) as u32);
        self.bus.write32(regs::HOST_DATA_LO, data as u32);
        self.bus.write32(regs::HOST_DATA_HI, (data >> 32) as u32);
        self.bus.write32(regs::HOST_STRB, u32::from(strobe));
        self.bus.write32(regs::HOST_CMD, 1);
    }

    /// Reports whether the core has halted.
    pub fn halted(&mut self) -> bool {
        self.bus.read32(regs::STATUS) & 1 != 0
    }

    /// Reads the latched exit code of the last run.
    pub fn exit_code(&mut self) -> u32 {
        self.bus.read32(regs::EXIT_CODE)
    }

    /// Reads the 64-bit cycle counter.
    pub fn cycles(&mut self) -> u64 {
        let lo = self.bus.read32(regs::CYCLES_LO);
        let hi = self.bus.read32(regs::CYCLES_HI);
        (u64::from(hi) << 32) | u64::from(lo)
    }

    /// Reads the raw UART status word: bits 15:0 queued count, bit 16 overflow.
    pub fn uart_status(&mut self) -> u32 {
        self.bus.read32(regs::UART_STATUS)
    }

    /// Pops one byte from the UART queue.
    pub fn pop_uart_byte(&mut self) -> u8 {
        (self.bus.read32(regs::UART_DATA) & 0xFF) as u8
    }

    /// Clears the UART overflow flag.
    pub fn clear_uart_overflow(&mut self) {
        self.bus.write32(regs::UART_STATUS, 1);
    }
}

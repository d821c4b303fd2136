//! Command dispatcher, run controller, and session loop.
//!
//! The monitor is one cooperative control loop: print a prompt, read one
//! host line, dispatch it, repeat. It owns the control facade, the host
//! input, and the console output exclusively, so no locking is needed. The
//! only blocking points are the host line read and the `RUN` halt poll;
//! neither has a timeout, so a core that never halts (or a load stream that
//! never ends) blocks the monitor. That is the platform contract, carried
//! here unchanged.
//!
//! Core console bytes are only drained while a `RUN` is in flight; if the
//! core emits output at any other time the hardware queue can overflow, and
//! the overflow flag is left for `STATUS` to report.

use std::io::{BufRead, Write};

use tracing::{debug, info};

use crate::command::Command;
use crate::common::error::MonitorError;
use crate::common::regs::RegisterBus;
use crate::config::MonitorConfig;
use crate::control::CoreControl;
use crate::loader::{LineOutcome, MemhLoader};

/// The monitor session: dispatcher state plus its exclusively-owned ends.
#[derive(Debug)]
pub struct Monitor<B: RegisterBus, R: BufRead, W: Write> {
    core: CoreControl<B>,
    config: MonitorConfig,
    input: R,
    output: W,
}

impl<B: RegisterBus, R: BufRead, W: Write> Monitor<B, R, W> {
    /// Builds a monitor over a register bridge, host input, and console output.
    pub fn new(bus: B, config: MonitorConfig, input: R, output: W) -> Self {
        Self {
            core: CoreControl::new(bus),
            config,
            input,
            output,
        }
    }

    /// Returns the control facade, for inspection after a session.
    pub fn core(&self) -> &CoreControl<B> {
        &self.core
    }

    /// Returns the control facade mutably.
    pub fn core_mut(&mut self) -> &mut CoreControl<B> {
        &mut self.core
    }

    /// Serves the command loop until the host input reaches end of stream.
    ///
    /// Startup puts the hardware in a known state first: reset asserted,
    /// UART overflow cleared, default boot vector latched.
    pub fn serve(&mut self) -> Result<(), MonitorError> {
        self.startup()?;
        let mut line = String::new();
        loop {
            // Newline-terminated prompt so host automation can match on it.
            writeln!(self.output, "> ")?;
            self.output.flush()?;
            if !self.read_host_line(&mut line)? {
                return Ok(());
            }
            self.dispatch(&line)?;
        }
    }

    /// Asserts reset, clears UART overflow, latches the default boot vector,
    /// and prints the banner.
    fn startup(&mut self) -> Result<(), MonitorError> {
        info!("monitor start: base={:#x}", self.config.reg_base);
        self.core.set_reset(true);
        self.core.clear_uart_overflow();
        self.core.set_boot(self.config.boot_pc, self.config.boot_sp);
        writeln!(self.output, "hostlink: base=0x{:08x}", self.config.reg_base)?;
        writeln!(self.output, "hostlink: ready")?;
        Ok(())
    }

    /// Dispatches one already-read host line.
    ///
    /// Empty lines are ignored. Every other line produces at least one reply
    /// line; malformed operands and unknown commands reply `ERR ...` and
    /// leave the hardware untouched.
    pub fn dispatch(&mut self, line: &str) -> Result<(), MonitorError> {
        let Some(cmd) = Command::parse(line) else {
            return Ok(());
        };
        debug!(?cmd, "dispatch");
        match cmd {
            Command::Ping => writeln!(self.output, "OK PONG")?,
            Command::SetReset(level) => {
                self.core.set_reset(level);
                writeln!(self.output, "OK RESET {}", u8::from(level))?;
            }
            Command::SetBoot { pc, sp } => {
                self.core.set_boot(pc, sp);
                writeln!(self.output, "OK BOOT pc=0x{pc:016x} sp=0x{sp:016x}")?;
            }
            Command::MalformedBoot => {
                writeln!(self.output, "ERR BOOT expects: BOOT <pc_hex> <sp_hex>")?;
            }
            Command::BeginLoad => self.cmd_load()?,
            Command::Status => self.cmd_status()?,
            Command::Run => self.cmd_run()?,
            Command::Unknown(_) => writeln!(self.output, "ERR unknown")?,
        }
        Ok(())
    }

    /// One run-controller poll step: drain queued console bytes, then check
    /// the halted observable.
    ///
    /// Exposed so the blocking poll can be stepped a bounded number of times
    /// under test. Returns `true` once the core reports halted.
    pub fn run_poll_step(&mut self) -> Result<bool, MonitorError> {
        self.drain_uart()?;
        Ok(self.core.halted())
    }

    /// `LOAD_MEMH`: streams the image into the core's address space.
    ///
    /// Reset is always forced on first so a load can never race a running
    /// core. The session ends on `END` or on host input exhaustion; either
    /// way the partial word is flushed and the counters reported.
    fn cmd_load(&mut self) -> Result<(), MonitorError> {
        self.core.set_reset(true);
        writeln!(self.output, "OK LOAD_MEMH")?;
        self.output.flush()?;

        let mut loader = MemhLoader::new();
        let mut line = String::new();
        loop {
            if !self.read_host_line(&mut line)? {
                break;
            }
            if loader.feed_line(&line, &mut self.core) == LineOutcome::End {
                break;
            }
        }
        let report = loader.finish(&mut self.core);
        writeln!(
            self.output,
            "OK LOADED bytes={} writes={}",
            report.bytes, report.writes
        )?;
        Ok(())
    }

    /// `STATUS`: reports halted, exit code, cycles, and UART observables.
    fn cmd_status(&mut self) -> Result<(), MonitorError> {
        let halted = u8::from(self.core.halted());
        let exit = self.core.exit_code();
        let cycles = self.core.cycles();
        let uart = self.core.uart_status();
        writeln!(
            self.output,
            "STATUS halted={halted} exit=0x{exit:08x} cycles={cycles} uart_count={} overflow={}",
            uart & 0xFFFF,
            (uart >> 16) & 1
        )?;
        Ok(())
    }

    /// `RUN`: releases reset, supervises to halt, reasserts reset.
    ///
    /// Console bytes are drained on every poll and once more after the halt
    /// flag is seen, to capture output that raced the halt. Reasserting
    /// reset afterward returns the core to a safe idle state; a subsequent
    /// run requires a fresh `BOOT`/`RESET` decision from the host.
    fn cmd_run(&mut self) -> Result<(), MonitorError> {
        writeln!(self.output, "OK RUN")?;
        self.output.flush()?;
        self.core.set_reset(false);
        while !self.run_poll_step()? {}
        self.drain_uart()?;

        let exit = self.core.exit_code();
        let cycles = self.core.cycles();
        writeln!(self.output, "HALT exit=0x{exit:08x} cycles={cycles}")?;
        self.core.set_reset(true);
        Ok(())
    }

    /// Pops and emits every currently queued console byte.
    fn drain_uart(&mut self) -> Result<(), MonitorError> {
        let mut drained = false;
        while self.core.uart_status() & 0xFFFF != 0 {
            let byte = self.core.pop_uart_byte();
            self.output.write_all(&[byte])?;
            drained = true;
        }
        if drained {
            self.output.flush()?;
        }
        Ok(())
    }

    /// Reads one host line into `line`, stripping terminators and carriage
    /// returns and truncating at the configured capacity.
    ///
    /// Returns `false` on end of input.
    fn read_host_line(&mut self, line: &mut String) -> Result<bool, MonitorError> {
        line.clear();
        if self.input.read_line(line)? == 0 {
            return Ok(false);
        }
        if line.ends_with('\n') {
            line.pop();
        }
        line.retain(|c| c != '\r');
        let cap = self.config.line_capacity;
        if line.len() > cap {
            let mut end = cap;
            while !line.is_char_boundary(end) {
                end -= 1;
            }
            line.truncate(end);
        }
        Ok(true)
    }
}

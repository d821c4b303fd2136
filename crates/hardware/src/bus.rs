//! Mmap-backed register bridge.
//!
//! Maps the platform register window over a device file (normally
//! `/dev/mem`) and performs volatile 32-bit accesses against it. This is the
//! production implementation of [`RegisterBus`]; tests substitute a fake
//! register file instead.

use std::ffi::CString;
use std::io;
use std::ptr;

use crate::common::error::MonitorError;
use crate::common::regs::{self, RegisterBus};

/// A register window mapped from a device file.
///
/// The mapping is page-aligned as `mmap` requires; `delta` carries the
/// register block's offset within the first mapped page.
#[derive(Debug)]
pub struct MmapBus {
    map: *mut u8,
    map_len: usize,
    delta: usize,
    fd: libc::c_int,
}

// The map is exclusively owned and only ever accessed through &mut self.
unsafe impl Send for MmapBus {}

impl MmapBus {
    /// Maps the register window at physical address `base` through `device`.
    ///
    /// # Arguments
    ///
    /// * `device` - Device file exposing physical memory (e.g. `/dev/mem`).
    /// * `base` - Physical base address of the register block.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Bus`] if the device cannot be opened or the
    /// window cannot be mapped.
    pub fn new(device: &str, base: u64) -> Result<Self, MonitorError> {
        let bus_err = |source: io::Error| MonitorError::Bus {
            device: device.to_string(),
            base,
            source,
        };

        let path = CString::new(device)
            .map_err(|_| bus_err(io::Error::from(io::ErrorKind::InvalidInput)))?;
        // SAFETY: `path` is a valid NUL-terminated string for the duration
        // of the call.
        let fd = unsafe { libc::open(path.as_ptr(), libc::O_RDWR | libc::O_SYNC) };
        if fd < 0 {
            return Err(bus_err(io::Error::last_os_error()));
        }

        // SAFETY: sysconf is always safe to call.
        let page = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        let page = if page > 0 { page as u64 } else { 4096 };
        let page_base = base & !(page - 1);
        let delta = (base - page_base) as usize;
        let map_len = delta + regs::WINDOW_SIZE;

        // SAFETY: we request a fresh shared mapping of `map_len` bytes at a
        // page-aligned file offset; the kernel validates the range.
        let map = unsafe {
            libc::mmap(
                ptr::null_mut(),
                map_len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                fd,
                page_base as libc::off_t,
            )
        };
        if map == libc::MAP_FAILED {
            let source = io::Error::last_os_error();
            // SAFETY: `fd` was opened above and is not used after this.
            unsafe { libc::close(fd) };
            return Err(bus_err(source));
        }

        Ok(Self {
            map: map.cast::<u8>(),
            map_len,
            delta,
            fd,
        })
    }

    fn reg_ptr(&self, offset: u32) -> *mut u32 {
        debug_assert!(offset as usize + 4 <= regs::WINDOW_SIZE);
        // SAFETY: `delta + offset` stays within the mapped window; the
        // register block is 4-byte aligned within the page.
        unsafe { self.map.add(self.delta + offset as usize).cast::<u32>() }
    }
}

impl RegisterBus for MmapBus {
    fn read32(&mut self, offset: u32) -> u32 {
        // SAFETY: the pointer is within the live mapping; volatile because
        // MMIO reads have side effects the compiler must not elide.
        unsafe { ptr::read_volatile(self.reg_ptr(offset)) }
    }

    fn write32(&mut self, offset: u32, value: u32) {
        // SAFETY: as for read32; volatile so every store reaches hardware.
        unsafe { ptr::write_volatile(self.reg_ptr(offset), value) };
    }
}

impl Drop for MmapBus {
    /// Unmaps the window and closes the device file.
    fn drop(&mut self) {
        // SAFETY: `map`/`map_len` describe the mapping created in `new`;
        // `fd` is still open.
        unsafe {
            libc::munmap(self.map.cast(), self.map_len);
            libc::close(self.fd);
        }
    }
}

//! Reboot mode notifier
//!
//! The bootloader reads the mode from SCRATCH7 of the ALIVE block, which
//! survives a warm reset. The register is split in a set, a reset and a
//! read port: bits written to RST are cleared, bits written to SET are set.

use std::{io, path::PathBuf};

use log::{error, info};
use thiserror::Error;

pub use crate::types::reboot::RebootMode;

/// Physical address of the ALIVE scratch block.
pub const ALIVE_BASE: u64 = 0xC001_0800;
pub const ALIVE_SIZE: usize = 0x100;

pub const SCRATCHRST7: usize = 0xF4;
pub const SCRATCHSET7: usize = 0xF8;
pub const SCRATCHREAD7: usize = 0xFC;

/// Position in the reboot notifier chain, higher runs first.
pub const PRIORITY: i32 = 128;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to map {len:#x} bytes at {base:#x}: {source}")]
    Map {
        base: u64,
        len: usize,
        #[source]
        source: nix::Error,
    },
    #[error("register offset {0:#x} outside of the mapped block")]
    OutOfRange(usize),
}

/// 32-bit register window.
pub trait ScratchRegisters {
    fn write(&mut self, offset: usize, value: u32) -> Result<(), Error>;

    fn read(&self, offset: usize) -> Result<u32, Error>;
}

/// Source of register windows, mapped on demand.
pub trait ScratchMap {
    type Regs: ScratchRegisters;

    fn map(&self) -> Result<Self::Regs, Error>;
}

/// Outcome of a notifier call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotifyResult {
    Done,
    Bad,
}

pub struct RebootNotifier<M> {
    map: M,
}

impl<M: ScratchMap> RebootNotifier<M> {
    pub fn new(map: M) -> Self {
        Self { map }
    }

    pub fn priority(&self) -> i32 {
        PRIORITY
    }

    /// Store the mode selected by `cmd`, returning it.
    pub fn write_mode(&self, cmd: Option<&str>) -> Result<RebootMode, Error> {
        let mut regs = self.map.map()?;
        let mode = RebootMode::from_command(cmd);

        // Clear every bit first, SET only ORs into the current value.
        regs.write(SCRATCHRST7, 0xffff_ffff)?;
        regs.write(SCRATCHSET7, mode.encode())?;

        info!("reboot mode set to {mode} ({:#010x})", mode.encode());

        Ok(mode)
    }

    /// Reboot notifier entry point.
    pub fn notify(&self, cmd: Option<&str>) -> NotifyResult {
        match self.write_mode(cmd) {
            Ok(_) => NotifyResult::Done,
            Err(e) => {
                error!("failed to store reboot mode: {e}");
                NotifyResult::Bad
            }
        }
    }

    /// Mode currently stored, `None` if the register holds something else.
    pub fn pending(&self) -> Result<Option<RebootMode>, Error> {
        let regs = self.map.map()?;

        Ok(RebootMode::decode(regs.read(SCRATCHREAD7)?))
    }
}

//! Physical register access through `/dev/mem`

use std::{
    ffi::c_void,
    fs::OpenOptions,
    num::NonZeroUsize,
    os::unix::fs::OpenOptionsExt,
    path::PathBuf,
    ptr::NonNull,
};

use log::{debug, warn};
use nix::{
    libc,
    sys::mman::{self, MapFlags, ProtFlags},
};

use crate::reboot::{self, ALIVE_BASE, ALIVE_SIZE, ScratchMap, ScratchRegisters};

const PAGE_SIZE: u64 = 4096;

/// Physical block mapped on demand from a memory device.
#[derive(Clone, Debug)]
pub struct DevMem {
    path: PathBuf,
    base: u64,
    len: usize,
}

impl DevMem {
    pub fn new(path: impl Into<PathBuf>, base: u64, len: usize) -> Self {
        Self { path: path.into(), base, len }
    }

    /// ALIVE scratch block.
    pub fn alive(path: impl Into<PathBuf>) -> Self {
        Self::new(path, ALIVE_BASE, ALIVE_SIZE)
    }
}

impl ScratchMap for DevMem {
    type Regs = MappedBlock;

    fn map(&self) -> Result<MappedBlock, reboot::Error> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open(&self.path)
            .map_err(|source| reboot::Error::Open { path: self.path.clone(), source })?;

        let page = self.base & !(PAGE_SIZE - 1);
        let offset = (self.base - page) as usize;
        let map_err = |source| reboot::Error::Map { base: self.base, len: self.len, source };

        let map_len = NonZeroUsize::new(offset + self.len).ok_or(map_err(nix::Error::EINVAL))?;
        let page = libc::off_t::try_from(page).map_err(|_| map_err(nix::Error::EOVERFLOW))?;

        // SAFETY: fresh shared mapping, only touched through volatile
        // accesses bounds checked against `len`.
        let ptr = unsafe {
            mman::mmap(
                None,
                map_len,
                ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
                MapFlags::MAP_SHARED,
                &file,
                page,
            )
        }
        .map_err(map_err)?;

        debug!("mapped {:#x} bytes at {:#x}", self.len, self.base);

        Ok(MappedBlock { ptr, map_len: map_len.get(), offset, len: self.len })
    }
}

/// Live mapping, unmapped on drop.
#[derive(Debug)]
pub struct MappedBlock {
    ptr: NonNull<c_void>,
    map_len: usize,
    offset: usize,
    len: usize,
}

impl MappedBlock {
    fn register(&self, offset: usize) -> Result<*mut u32, reboot::Error> {
        if offset % 4 != 0 || offset + 4 > self.len {
            return Err(reboot::Error::OutOfRange(offset));
        }

        // SAFETY: offset checked to lie within the mapping.
        Ok(unsafe { self.ptr.as_ptr().cast::<u8>().add(self.offset + offset).cast::<u32>() })
    }
}

impl ScratchRegisters for MappedBlock {
    fn write(&mut self, offset: usize, value: u32) -> Result<(), reboot::Error> {
        let reg = self.register(offset)?;

        // SAFETY: aligned, in bounds, mapping alive for the borrow.
        unsafe { reg.write_volatile(value) };

        Ok(())
    }

    fn read(&self, offset: usize) -> Result<u32, reboot::Error> {
        let reg = self.register(offset)?;

        // SAFETY: see write.
        Ok(unsafe { reg.read_volatile() })
    }
}

impl Drop for MappedBlock {
    fn drop(&mut self) {
        // SAFETY: ptr/map_len come from the mmap call that created self.
        if let Err(e) = unsafe { mman::munmap(self.ptr, self.map_len) } {
            warn!("munmap failed: {e}");
        }
    }
}

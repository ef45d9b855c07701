//! Board resources consumed by panel drivers: reset line, supply rails and
//! a delay source.

use std::{thread, time::Duration};

use thiserror::Error;

use crate::sysfs;

#[derive(Error, Debug)]
pub enum HwError {
    #[error(transparent)]
    SysFs(#[from] sysfs::attribute::Error),
    #[error("supply '{0}' is not available")]
    SupplyUnavailable(String),
}

/// Active-high reset line of the panel controller.
pub trait ResetLine {
    /// Configure the line as an output, driven to `high`.
    fn direction_output(&mut self, high: bool) -> Result<(), HwError>;

    fn set(&mut self, high: bool) -> Result<(), HwError>;
}

/// Group of regulators switched together.
pub trait Supplies {
    fn enable(&mut self) -> Result<(), HwError>;

    fn disable(&mut self) -> Result<(), HwError>;
}

/// Rails-less boards use `()`.
impl Supplies for () {
    fn enable(&mut self) -> Result<(), HwError> {
        Ok(())
    }

    fn disable(&mut self) -> Result<(), HwError> {
        Ok(())
    }
}

pub trait Delay {
    fn delay_ms(&mut self, ms: u32);
}

/// Blocking delay on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadDelay;

impl Delay for ThreadDelay {
    fn delay_ms(&mut self, ms: u32) {
        if ms > 0 {
            thread::sleep(Duration::from_millis(ms.into()));
        }
    }
}

impl<T: ResetLine + ?Sized> ResetLine for Box<T> {
    fn direction_output(&mut self, high: bool) -> Result<(), HwError> {
        (**self).direction_output(high)
    }

    fn set(&mut self, high: bool) -> Result<(), HwError> {
        (**self).set(high)
    }
}

impl<T: Supplies + ?Sized> Supplies for Box<T> {
    fn enable(&mut self) -> Result<(), HwError> {
        (**self).enable()
    }

    fn disable(&mut self) -> Result<(), HwError> {
        (**self).disable()
    }
}

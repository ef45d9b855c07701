//! Legacy sysfs GPIO interface

use std::path::{Path, PathBuf};

use log::debug;

use crate::{
    hw::{HwError, ResetLine},
    sysfs::attribute::{AttributeBase, Boolean, Generic, TypedWrite, WU32, WriteOnly},
};

/// Output line exported through `/sys/class/gpio`.
#[derive(Debug)]
pub struct SysfsGpio {
    number: u32,
    export: WU32,
    direction: WriteOnly<Generic<String>>,
    value: Boolean,
}

impl SysfsGpio {
    const SYSFS_PATH_BASE: &str = "/sys/class/gpio";

    pub fn new(number: u32) -> Self {
        Self::with_base(Self::SYSFS_PATH_BASE, number)
    }

    pub fn with_base(base: impl AsRef<Path>, number: u32) -> Self {
        let base = base.as_ref();
        let line = base.join(format!("gpio{number}"));

        Self {
            number,
            export: Generic::new(base.join("export")).into(),
            direction: Generic::new(line.join("direction")).into(),
            value: Boolean::new(line.join("value")),
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    fn line_dir(&self) -> PathBuf {
        self.value.path().parent().map(Path::to_path_buf).unwrap_or_default()
    }

    /// Export the line unless userspace already owns it.
    pub fn request(self) -> Result<Self, HwError> {
        if !self.line_dir().exists() {
            debug!("exporting gpio{}", self.number);
            self.export.write(self.number)?;
        }

        Ok(self)
    }
}

impl ResetLine for SysfsGpio {
    fn direction_output(&mut self, high: bool) -> Result<(), HwError> {
        // "high"/"low" switch to output with a glitch-free initial level.
        let dir = if high { "high" } else { "low" };
        self.direction.write(dir.to_string())?;

        Ok(())
    }

    fn set(&mut self, high: bool) -> Result<(), HwError> {
        self.value.write(high)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::testing::ScratchDir;

    #[test]
    fn exports_missing_line() -> Result<(), HwError> {
        let dir = ScratchDir::new("gpio-export");
        let export = dir.file("export", "");

        let gpio = SysfsGpio::with_base(dir.path(), 73).request()?;

        assert_eq!(gpio.number(), 73);
        assert_eq!(fs::read_to_string(export).unwrap(), "73");

        Ok(())
    }

    #[test]
    fn drives_line() -> Result<(), HwError> {
        let dir = ScratchDir::new("gpio-drive");
        let export = dir.file("export", "");
        let direction = dir.file("gpio12/direction", "in\n");
        let value = dir.file("gpio12/value", "0\n");

        let mut gpio = SysfsGpio::with_base(dir.path(), 12).request()?;
        assert_eq!(fs::read_to_string(export).unwrap(), "");

        gpio.direction_output(true)?;
        assert_eq!(fs::read_to_string(&direction).unwrap(), "high");

        gpio.set(false)?;
        assert_eq!(fs::read_to_string(&value).unwrap(), "0");
        gpio.set(true)?;
        assert_eq!(fs::read_to_string(&value).unwrap(), "1");

        Ok(())
    }
}

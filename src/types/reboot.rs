//! Reboot mode codes understood by the ARTIK bootloader

use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Mode requested from the bootloader on the next boot.
#[derive(TryFromPrimitive, IntoPrimitive, Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum RebootMode {
    None = 0,
    Download = 1,
    Recovery = 2,
    Fota = 3,
}

impl RebootMode {
    /// Marks the scratch value as written by us.
    pub const PREFIX: u32 = 0x1234_5670;
    const PREFIX_MASK: u32 = 0xffff_fff0;

    /// Select a mode from the reboot command string.
    ///
    /// Matching is done on the command prefix, so `"recovery-wipe"` still
    /// selects [RebootMode::Recovery]. Anything unrecognised is
    /// [RebootMode::None].
    pub fn from_command(cmd: Option<&str>) -> Self {
        match cmd {
            Some(c) if c.starts_with("download") => Self::Download,
            Some(c) if c.starts_with("recovery") => Self::Recovery,
            Some(c) if c.starts_with("fota") => Self::Fota,
            _ => Self::None,
        }
    }

    /// Value stored in the scratch register.
    pub fn encode(self) -> u32 {
        Self::PREFIX | u32::from(self)
    }

    /// Decode a scratch register value, `None` if it was not written by a
    /// reboot notifier.
    pub fn decode(value: u32) -> Option<Self> {
        if value & Self::PREFIX_MASK != Self::PREFIX {
            return None;
        }

        Self::try_from_primitive(value & !Self::PREFIX_MASK).ok()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Download => "download",
            Self::Recovery => "recovery",
            Self::Fota => "fota",
        }
    }
}

impl fmt::Display for RebootMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

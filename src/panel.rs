//! HX8394D panel drivers

pub mod desc;
pub mod hx8394d;
pub mod sequence;

use std::fmt;

use thiserror::Error;

use crate::{dsi::TransportError, hw::HwError, of};

pub use hx8394d::{Hx8394d, Resources};

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Hw(#[from] HwError),
    #[error(transparent)]
    Of(#[from] of::Error),
    #[error("panel is not powered")]
    NotPowered,
    #[error("panel is not prepared")]
    NotPrepared,
    #[error("panel has no backlight")]
    NoBacklight,
    #[error("module id {index}: expected {expected:#04x}, read {found:#04x}")]
    ModuleIdMismatch { index: usize, expected: u8, found: u8 },
    #[error("no panel driver for {0:?}")]
    UnknownCompatible(Vec<String>),
}

/// Position in the panel lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum PanelState {
    Off,
    PoweredOn,
    Prepared,
    Enabled,
}

impl PanelState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::PoweredOn => "powered-on",
            Self::Prepared => "prepared",
            Self::Enabled => "enabled",
        }
    }
}

impl fmt::Display for PanelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

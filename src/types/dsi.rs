//! Type safe representation of MIPI-DSI link parameters

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Pixel format on the DSI link.
#[derive(TryFromPrimitive, IntoPrimitive, Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum PixelFormat {
    Rgb888 = 0,
    Rgb666 = 1,
    Rgb666Packed = 2,
    Rgb565 = 3,
}

bitflags::bitflags! {
    /// DSI peripheral mode flags, bit compatible with the kernel's
    /// `MIPI_DSI_MODE_*` definitions.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ModeFlags: u32 {
        const VIDEO                = 1 << 0;
        const VIDEO_BURST          = 1 << 1;
        const VIDEO_SYNC_PULSE     = 1 << 2;
        const VIDEO_AUTO_VERT      = 1 << 3;
        const VIDEO_HSE            = 1 << 4;
        const VIDEO_HFP            = 1 << 5;
        const VIDEO_HBP            = 1 << 6;
        const VIDEO_HSA            = 1 << 7;
        const VSYNC_FLUSH          = 1 << 8;
        const EOT_PACKET           = 1 << 9;
        const CLOCK_NON_CONTINUOUS = 1 << 10;
        const LPM                  = 1 << 11;
    }
}

/// Link configuration applied when a panel attaches to its DSI host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DsiConfig {
    pub lanes: u8,
    pub format: PixelFormat,
    pub mode_flags: ModeFlags,
}

impl DsiConfig {
    pub const fn new(lanes: u8, format: PixelFormat, mode_flags: ModeFlags) -> Self {
        Self { lanes, format, mode_flags }
    }
}

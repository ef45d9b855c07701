//! Display mode descriptors

use serde::Serialize;
use zbus::zvariant::{Type, Value};

bitflags::bitflags! {
    /// Mode type flags, bit compatible with `DRM_MODE_TYPE_*`.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ModeType: u32 {
        const PREFERRED = 1 << 3;
        const DRIVER    = 1 << 6;
    }
}

/// Timing of one scan axis, in pixels (horizontal) or lines (vertical).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timings {
    pub active: u32,
    pub back_porch: u32,
    pub front_porch: u32,
    pub sync_len: u32,
}

impl Timings {
    pub const fn new(active: u32, back_porch: u32, front_porch: u32, sync_len: u32) -> Self {
        Self { active, back_porch, front_porch, sync_len }
    }

    // The panels expect the back porch ahead of the sync pulse.
    const fn sync_start(&self) -> u32 {
        self.active + self.back_porch
    }

    const fn sync_end(&self) -> u32 {
        self.sync_start() + self.sync_len
    }

    const fn total(&self) -> u32 {
        self.sync_end() + self.front_porch
    }
}

/// Fixed video mode of a panel, as exposed to the display pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Type, Value)]
pub struct DisplayMode {
    /// Pixel clock, in kHz
    pub clock: u32,
    pub hdisplay: u32,
    pub hsync_start: u32,
    pub hsync_end: u32,
    pub htotal: u32,
    pub vdisplay: u32,
    pub vsync_start: u32,
    pub vsync_end: u32,
    pub vtotal: u32,
    /// Refresh rate, in Hz
    pub vrefresh: u32,
    pub width_mm: u32,
    pub height_mm: u32,
    pub mode_type: u32,
    pub name: String,
}

impl DisplayMode {
    pub const fn from_timings(
        h: Timings,
        v: Timings,
        vrefresh: u32,
        width_mm: u32,
        height_mm: u32,
    ) -> ModeTemplate {
        ModeTemplate { h, v, vrefresh, width_mm, height_mm }
    }

    pub fn mode_type(&self) -> ModeType {
        ModeType::from_bits_retain(self.mode_type)
    }
}

/// Compile-time description of a mode, turned into a [DisplayMode] on
/// request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeTemplate {
    pub h: Timings,
    pub v: Timings,
    pub vrefresh: u32,
    pub width_mm: u32,
    pub height_mm: u32,
}

impl ModeTemplate {
    /// Pixel clock in kHz, rounded down.
    pub const fn clock(&self) -> u32 {
        let pixels = self.h.total() as u64 * self.v.total() as u64 * self.vrefresh as u64;
        (pixels / 1000) as u32
    }

    pub fn name(&self) -> String {
        format!("{}x{}", self.h.active, self.v.active)
    }

    pub fn instantiate(&self, mode_type: ModeType) -> DisplayMode {
        DisplayMode {
            clock: self.clock(),
            hdisplay: self.h.active,
            hsync_start: self.h.sync_start(),
            hsync_end: self.h.sync_end(),
            htotal: self.h.total(),
            vdisplay: self.v.active,
            vsync_start: self.v.sync_start(),
            vsync_end: self.v.sync_end(),
            vtotal: self.v.total(),
            vrefresh: self.vrefresh,
            width_mm: self.width_mm,
            height_mm: self.height_mm,
            mode_type: mode_type.bits(),
            name: self.name(),
        }
    }
}

/// Physical properties reported alongside the mode list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DisplayInfo {
    pub width_mm: u32,
    pub height_mm: u32,
    pub bpc: Option<u32>,
}

/// D-Bus form `(width_mm, height_mm, bpc)`, an unknown depth is 0.
impl From<DisplayInfo> for (u32, u32, u32) {
    fn from(info: DisplayInfo) -> Self {
        (info.width_mm, info.height_mm, info.bpc.unwrap_or(0))
    }
}

/// Result of a mode query: the probed modes and connector information.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModeList {
    pub modes: Vec<DisplayMode>,
    pub info: DisplayInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: ModeTemplate = DisplayMode::from_timings(
        Timings::new(800, 130, 110, 8),
        Timings::new(1280, 7, 12, 3),
        60,
        107,
        172,
    );

    #[test]
    fn derived_timings() {
        let mode = TEMPLATE.instantiate(ModeType::DRIVER | ModeType::PREFERRED);

        assert_eq!(mode.hsync_start, 930);
        assert_eq!(mode.hsync_end, 938);
        assert_eq!(mode.htotal, 1048);
        assert_eq!(mode.vsync_start, 1287);
        assert_eq!(mode.vsync_end, 1290);
        assert_eq!(mode.vtotal, 1302);
        assert_eq!(mode.clock, 81869);
        assert_eq!(mode.name, "800x1280");
    }

    #[test]
    fn type_flags() {
        let mode = TEMPLATE.instantiate(ModeType::DRIVER | ModeType::PREFERRED);

        assert_eq!(mode.mode_type, 0x48);
        assert!(mode.mode_type().contains(ModeType::PREFERRED));
        assert_eq!(mode.mode_type(), ModeType::DRIVER | ModeType::PREFERRED);
    }

    #[test]
    fn display_info_wire_form() {
        let info = DisplayInfo { width_mm: 107, height_mm: 172, bpc: None };
        assert_eq!(<(u32, u32, u32)>::from(info), (107, 172, 0));

        let info = DisplayInfo { bpc: Some(8), ..info };
        assert_eq!(<(u32, u32, u32)>::from(info), (107, 172, 8));
    }
}

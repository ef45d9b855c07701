//! Board descriptors for HX8394D based panels

use crate::{
    backlight::BacklightDesc,
    types::{
        dsi::{DsiConfig, ModeFlags, PixelFormat},
        mode::{DisplayMode, ModeTemplate, Timings},
    },
};

use super::sequence::{self, CommandTable, Script};

/// Delays around the reset pulse, in milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PowerTimings {
    /// Supplies up to reset assertion
    pub power_on_delay: u32,
    /// Reset pulse width
    pub reset_delay: u32,
    /// Reset release to first command
    pub init_delay: u32,
}

/// Where a board takes its power timings from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimingSource {
    /// `power-on-delay`, `reset-delay` and `init-delay` device-tree
    /// properties, missing ones read as 0.
    DeviceTree,
    Fixed(PowerTimings),
}

/// What powering the panel off actually does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerOffPolicy {
    /// Leave rails and reset untouched; the panel stays powered.
    Retain,
    /// Hold the controller in reset.
    AssertReset,
    /// Hold reset, then cut the supplies.
    Full,
}

#[derive(Debug)]
pub struct PanelDesc {
    pub name: &'static str,
    pub compatible: &'static str,
    pub dsi: DsiConfig,
    pub mode: ModeTemplate,
    pub bpc: Option<u32>,
    pub supplies: &'static [&'static str],
    pub timings: TimingSource,
    pub power_off: PowerOffPolicy,
    pub table: CommandTable,
    pub init: Script,
    pub enable: Script,
    pub disable: Script,
    pub backlight: Option<BacklightDesc>,
}

const HX8394D_DSI: DsiConfig = DsiConfig::new(
    4,
    PixelFormat::Rgb888,
    ModeFlags::VIDEO
        .union(ModeFlags::VIDEO_HFP)
        .union(ModeFlags::VIDEO_HBP)
        .union(ModeFlags::VIDEO_HSA)
        .union(ModeFlags::VSYNC_FLUSH),
);

pub(crate) const NEXELL: PanelDesc = PanelDesc {
    name: "panel-hx8394d",
    compatible: "hx8394d",
    dsi: HX8394D_DSI,
    mode: DisplayMode::from_timings(
        Timings::new(800, 30 + 100, 10 + 100, 8),
        Timings::new(1280, 2 + 5, 2 + 10, 2 + 1),
        60,
        107,
        172,
    ),
    bpc: None,
    supplies: &["vci", "vdd3"],
    timings: TimingSource::DeviceTree,
    power_off: PowerOffPolicy::Retain,
    table: sequence::NEXELL_TABLE,
    init: sequence::NEXELL_INIT,
    enable: sequence::NEXELL_ENABLE,
    disable: sequence::NEXELL_DISABLE,
    backlight: Some(BacklightDesc {
        name: "hx8394d_bl",
        min: 80,
        max: 175,
        default: 100,
        inverted: true,
    }),
};

/// HX8394D panel on the Nexell reference board.
pub static NEXELL_HX8394D: PanelDesc = NEXELL;

/// Shenzhen AVD-TT80WX-CN-039-A module.
pub static AVD_TT80WX_CN039A: PanelDesc = PanelDesc {
    name: "panel-hx8394d-dsi",
    compatible: "shenzhen,avdtt80wxcn039a",
    dsi: HX8394D_DSI,
    mode: DisplayMode::from_timings(
        Timings::new(800, 30, 10, 8),
        Timings::new(1280, 2, 2, 2),
        60,
        107,
        172,
    ),
    bpc: Some(8),
    supplies: &[],
    timings: TimingSource::Fixed(PowerTimings {
        power_on_delay: 10,
        reset_delay: 20,
        // The controller needs 120ms to recover from reset
        init_delay: 120,
    }),
    power_off: PowerOffPolicy::AssertReset,
    table: sequence::AVD_TABLE,
    init: sequence::AVD_INIT,
    enable: sequence::AVD_ENABLE,
    disable: sequence::AVD_DISABLE,
    backlight: None,
};

pub static PANELS: [&PanelDesc; 2] = [&NEXELL_HX8394D, &AVD_TT80WX_CN039A];

/// Find the descriptor matching one of a node's compatible strings, in the
/// node's order of preference.
pub fn of_match<S: AsRef<str>>(compatible: &[S]) -> Option<&'static PanelDesc> {
    compatible.iter().find_map(|c| {
        PANELS.iter().copied().find(|d| d.compatible == c.as_ref())
    })
}

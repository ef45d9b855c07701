//! Brightness control through the panel's DCS brightness register.

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Backlight power state, numbered after the framebuffer blank levels.
#[derive(TryFromPrimitive, IntoPrimitive, Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum BlankPower {
    Unblank = 0,
    Powerdown = 4,
}

/// Static brightness range of a panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BacklightDesc {
    pub name: &'static str,
    pub min: u32,
    pub max: u32,
    pub default: u32,
    /// Register value decreases as brightness increases.
    pub inverted: bool,
}

impl BacklightDesc {
    pub fn clamp(&self, brightness: u32) -> u32 {
        brightness.clamp(self.min, self.max)
    }

    /// Register value for a brightness, clamped to the panel range first.
    pub fn level(&self, brightness: u32) -> u8 {
        let brightness = self.clamp(brightness);
        let level = if self.inverted {
            (self.max - brightness) + self.min
        } else {
            brightness
        };

        level.min(u8::MAX.into()) as u8
    }
}

/// Runtime properties, as seen by the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BacklightProps {
    /// Last requested brightness
    pub brightness: u32,
    pub max_brightness: u32,
    pub power: BlankPower,
}

/// Backlight device bound to a panel.
#[derive(Clone, Debug)]
pub struct Backlight {
    desc: BacklightDesc,
    pub props: BacklightProps,
    /// Brightness last written to the panel, after clamping.
    actual: Option<u32>,
}

impl Backlight {
    pub fn new(desc: BacklightDesc) -> Self {
        Self {
            desc,
            props: BacklightProps {
                brightness: desc.default,
                max_brightness: desc.max,
                power: BlankPower::Powerdown,
            },
            actual: None,
        }
    }

    pub fn desc(&self) -> &BacklightDesc {
        &self.desc
    }

    pub fn get_brightness(&self) -> u32 {
        self.props.brightness
    }

    pub fn actual_brightness(&self) -> Option<u32> {
        self.actual
    }

    /// Compute the clamped brightness and the packet pushing it to the
    /// panel. The caller commits it with [Backlight::commit] once written.
    pub fn packet(&self) -> (u32, [u8; 2]) {
        let brightness = self.desc.clamp(self.props.brightness);

        (brightness, [crate::panel::sequence::dcs::WRDISBV, self.desc.level(brightness)])
    }

    pub fn commit(&mut self, brightness: u32) {
        self.actual = Some(brightness);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESC: BacklightDesc = BacklightDesc {
        name: "test_bl",
        min: 80,
        max: 175,
        default: 100,
        inverted: true,
    };

    #[test]
    fn defaults() {
        let bl = Backlight::new(DESC);

        assert_eq!(bl.get_brightness(), 100);
        assert_eq!(bl.props.max_brightness, 175);
        assert_eq!(bl.props.power, BlankPower::Powerdown);
        assert_eq!(bl.actual_brightness(), None);
    }

    #[test]
    fn inverted_levels() {
        assert_eq!(DESC.level(80), 175);
        assert_eq!(DESC.level(175), 80);
        assert_eq!(DESC.level(100), 155);
    }

    #[test]
    fn out_of_range_levels() {
        assert_eq!(DESC.level(1000), 80);
        assert_eq!(DESC.level(0), 175);
        assert_eq!(DESC.level(u32::MAX), 80);
    }

    #[test]
    fn clamped_packet() {
        let mut bl = Backlight::new(DESC);

        bl.props.brightness = 10;
        assert_eq!(bl.packet(), (80, [0x51, 175]));

        bl.props.brightness = 255;
        assert_eq!(bl.packet(), (175, [0x51, 80]));

        // The requested value is kept as is.
        assert_eq!(bl.get_brightness(), 255);
    }

    #[test]
    fn straight_levels() {
        let desc = BacklightDesc { inverted: false, min: 0, max: 255, ..DESC };

        assert_eq!(desc.level(0), 0);
        assert_eq!(desc.level(200), 200);
    }

    #[test]
    fn blank_power_values() {
        assert_eq!(u32::from(BlankPower::Powerdown), 4);
        assert_eq!(BlankPower::try_from_primitive(0), Ok(BlankPower::Unblank));
        assert!(BlankPower::try_from_primitive(1).is_err());
    }
}

use artik_display_service::backlight::BlankPower;
use tokio::sync::mpsc;
use zbus::{fdo, interface};

use crate::{dbus, display};

pub struct Backlight1 {
    tx: display::CommandSender,
    name: &'static str,
}

impl Backlight1 {
    pub const PATH: &str = "/org/artik/Backlight";

    pub fn new(tx: mpsc::Sender<display::Command>, name: &'static str) -> Self {
        Self { tx: tx.into(), name }
    }

    async fn status(&self) -> fdo::Result<display::BacklightStatus> {
        self.tx
            .request(display::Backlight::Status)
            .await
            .map_err(dbus::operation_failed)
    }
}

/// DBus interface to the panel driven backlight.
///
/// Brightness is requested in the panel's native range and clamped before
/// it is written. Writing while the panel is unpowered records the value
/// but fails.
///
/// | Power | Meaning   |
/// |-------|-----------|
/// | 0     | unblank   |
/// | 4     | powerdown |
#[interface(name = "org.artik.Backlight1")]
impl Backlight1 {
    #[zbus(property)]
    async fn name(&self) -> String {
        self.name.into()
    }

    #[zbus(property)]
    async fn brightness(&self) -> fdo::Result<u32> {
        Ok(self.status().await?.brightness)
    }

    #[zbus(property)]
    async fn set_brightness(&self, brightness: u32) -> Result<(), zbus::Error> {
        self.tx
            .request(|r| display::Backlight::SetBrightness(brightness, r))
            .await
            .map_err(dbus::operation_failed)?;

        Ok(())
    }

    /// Last value written to the panel, 0 before the first write.
    #[zbus(property)]
    async fn actual_brightness(&self) -> fdo::Result<u32> {
        Ok(self.status().await?.actual_brightness.unwrap_or(0))
    }

    #[zbus(property)]
    async fn max_brightness(&self) -> fdo::Result<u32> {
        Ok(self.status().await?.max_brightness)
    }

    #[zbus(property)]
    async fn power(&self) -> fdo::Result<u32> {
        Ok(self.status().await?.power.into())
    }

    #[zbus(property)]
    async fn set_power(&self, power: u32) -> Result<(), zbus::Error> {
        let power = BlankPower::try_from(power)
            .map_err(|_| fdo::Error::InvalidArgs(format!("Unsupported power state {power}")))?;

        self.tx
            .request(|r| display::Backlight::SetPower(power, r))
            .await
            .map_err(dbus::operation_failed)?;

        Ok(())
    }
}

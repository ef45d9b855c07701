use tokio::sync::mpsc;
use zbus::{fdo, interface};

use crate::{dbus, display};

pub struct Reboot1 {
    tx: display::CommandSender,
}

impl Reboot1 {
    pub const PATH: &str = "/org/artik/Reboot";

    pub fn new(tx: mpsc::Sender<display::Command>) -> Self {
        Self { tx: tx.into() }
    }
}

/// DBus interface storing the mode the bootloader picks on next boot.
///
/// `Notify` takes the reboot command (`download`, `recovery`, `fota`, or
/// anything else for a normal boot) and returns the selected mode.
#[interface(name = "org.artik.Reboot1")]
impl Reboot1 {
    async fn notify(&self, cmd: String) -> fdo::Result<String> {
        let cmd = (!cmd.is_empty()).then_some(cmd);

        let mode = self.tx
            .request(|r| display::Reboot::Notify(cmd, r))
            .await
            .map_err(dbus::operation_failed)?;

        Ok(mode.to_string())
    }

    /// Stored mode, empty when the register was not written by us.
    #[zbus(property)]
    async fn pending_mode(&self) -> fdo::Result<String> {
        let mode = self.tx
            .request(display::Reboot::Pending)
            .await
            .map_err(dbus::operation_failed)?;

        Ok(mode.map(|m| m.to_string()).unwrap_or_default())
    }
}

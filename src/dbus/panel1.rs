use artik_display_service::types::mode::DisplayMode;
use tokio::sync::{mpsc, oneshot};
use zbus::{fdo, interface, object_server::SignalEmitter};

use crate::{dbus, display};

pub struct Panel1 {
    tx: display::CommandSender,
    compatible: &'static str,
}

impl Panel1 {
    pub const PATH: &str = "/org/artik/Panel";

    pub fn new(tx: mpsc::Sender<display::Command>, compatible: &'static str) -> Self {
        Self { tx: tx.into(), compatible }
    }

    async fn run(
        &self,
        op: fn(display::Reply<()>) -> display::Panel,
    ) -> fdo::Result<()> {
        self.tx.request(op).await.map_err(dbus::operation_failed)
    }
}

/// DBus interface driving the panel lifecycle.
///
/// The panel moves through `off`, `powered-on`, `prepared` and `enabled`.
/// Every method is idempotent, `Enable` fails until the panel is prepared.
#[interface(name = "org.artik.Panel1")]
impl Panel1 {
    /// Power the panel and send its initialization sequence.
    async fn prepare(
        &self,
        #[zbus(signal_emitter)] emitter: SignalEmitter<'_>,
    ) -> fdo::Result<()> {
        let res = self.run(display::Panel::Prepare).await;
        self.state_changed(&emitter).await?;
        res
    }

    async fn unprepare(
        &self,
        #[zbus(signal_emitter)] emitter: SignalEmitter<'_>,
    ) -> fdo::Result<()> {
        let res = self.run(display::Panel::Unprepare).await;
        self.state_changed(&emitter).await?;
        res
    }

    async fn enable(
        &self,
        #[zbus(signal_emitter)] emitter: SignalEmitter<'_>,
    ) -> fdo::Result<()> {
        let res = self.run(display::Panel::Enable).await;
        self.state_changed(&emitter).await?;
        res
    }

    async fn disable(
        &self,
        #[zbus(signal_emitter)] emitter: SignalEmitter<'_>,
    ) -> fdo::Result<()> {
        let res = self.run(display::Panel::Disable).await;
        self.state_changed(&emitter).await?;
        res
    }

    /// Read back the controller ID, fails on mismatch.
    async fn check_module_id(&self) -> fdo::Result<()> {
        self.run(display::Panel::CheckModuleId).await
    }

    #[zbus(property)]
    async fn state(&self) -> fdo::Result<String> {
        let (tx, rx) = oneshot::channel();

        let state = self.tx
            .with_reply(display::Panel::State(tx), rx)
            .await
            .map_err(dbus::internal_error)?;

        Ok(state.to_string())
    }

    #[zbus(property)]
    async fn compatible(&self) -> String {
        self.compatible.into()
    }

    #[zbus(property)]
    async fn modes(&self) -> fdo::Result<Vec<DisplayMode>> {
        let (tx, rx) = oneshot::channel();

        let list = self.tx
            .with_reply(display::Panel::Modes(tx), rx)
            .await
            .map_err(dbus::internal_error)?;

        Ok(list.modes)
    }

    /// Physical size in millimetres and bits per color, 0 when unknown.
    #[zbus(property)]
    async fn display_info(&self) -> fdo::Result<(u32, u32, u32)> {
        let (tx, rx) = oneshot::channel();

        let list = self.tx
            .with_reply(display::Panel::Modes(tx), rx)
            .await
            .map_err(dbus::internal_error)?;

        Ok(list.info.into())
    }
}

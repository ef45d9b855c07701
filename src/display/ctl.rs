use anyhow::{Context, Result, anyhow};
use artik_display_service::{
    board,
    drivers::devmem::DevMem,
    panel,
    reboot::RebootNotifier,
};
use log::{debug, error, info};
use tokio::{sync::mpsc, task};

use super::{Backlight, BacklightStatus, Command, CommandStr, Panel, Reboot, Reply};

/// Single owner of the display hardware.
pub struct Ctl {
    panel: board::Panel,
    reboot: RebootNotifier<DevMem>,
}

fn reply<T>(tx: Reply<T>, res: Result<T>) -> Result<()> {
    tx.send(res).map_err(|_| anyhow!("Failed to send response"))
}

impl Ctl {
    pub fn new(panel: board::Panel, reboot: RebootNotifier<DevMem>) -> Self {
        Self { panel, reboot }
    }

    /// Run a panel operation off the async worker, it sleeps between
    /// packets.
    fn panel_op(
        &mut self,
        ctx: &'static str,
        op: impl FnOnce(&mut board::Panel) -> Result<(), panel::Error>,
    ) -> Result<()> {
        let panel = &mut self.panel;

        task::block_in_place(|| op(panel)).with_context(|| format!("Panel::{ctx} failed"))
    }

    fn backlight_status(&self) -> Result<BacklightStatus> {
        let bl = self.panel.backlight().ok_or(panel::Error::NoBacklight)?;

        Ok(BacklightStatus {
            brightness: bl.get_brightness(),
            actual_brightness: bl.actual_brightness(),
            max_brightness: bl.props.max_brightness,
            power: bl.props.power,
        })
    }

    fn dispatch_panel(&mut self, cmd: Panel) -> Result<()> {
        use self::Panel::*;

        match cmd {
            Prepare(tx) => {
                let res = self.panel_op("prepare", |p| p.prepare());
                reply(tx, res)?;
            }
            Unprepare(tx) => {
                let res = self.panel_op("unprepare", |p| p.unprepare());
                reply(tx, res)?;
            }
            Enable(tx) => {
                let res = self.panel_op("enable", |p| p.enable());
                reply(tx, res)?;
            }
            Disable(tx) => {
                let res = self.panel_op("disable", |p| p.disable());
                reply(tx, res)?;
            }
            CheckModuleId(tx) => {
                let res = self.panel_op("check_module_id", |p| p.check_module_id());
                reply(tx, res)?;
            }
            State(tx) => {
                tx.send(self.panel.state())
                    .map_err(|_| anyhow!("Failed to send back panel state"))?;
            }
            Modes(tx) => {
                tx.send(self.panel.get_modes()).map_err(|_| anyhow!("Failed to send back modes"))?;
            }
        }

        Ok(())
    }

    fn dispatch_backlight(&mut self, cmd: Backlight) -> Result<()> {
        match cmd {
            Backlight::Status(tx) => {
                let res = self.backlight_status();
                reply(tx, res)?;
            }
            Backlight::SetBrightness(brightness, tx) => {
                let res = self.panel_op("set_brightness", |p| p.set_brightness(brightness));
                reply(tx, res)?;
            }
            Backlight::SetPower(power, tx) => {
                let res = self.panel_op("set_backlight_power", |p| p.set_backlight_power(power));
                reply(tx, res)?;
            }
        }

        Ok(())
    }

    fn dispatch_reboot(&mut self, cmd: Reboot) -> Result<()> {
        match cmd {
            Reboot::Notify(cmd, tx) => {
                let res = self.reboot.write_mode(cmd.as_deref())
                    .context("Failed to store reboot mode");
                reply(tx, res)?;
            }
            Reboot::Pending(tx) => {
                let res = self.reboot.pending()
                    .context("Failed to read reboot mode");
                reply(tx, res)?;
            }
        }

        Ok(())
    }

    fn dispatch(&mut self, cmd: Command) -> Result<()> {
        match cmd {
            Command::Panel(p) => self.dispatch_panel(p)?,
            Command::Backlight(b) => self.dispatch_backlight(b)?,
            Command::Reboot(r) => self.dispatch_reboot(r)?,
            Command::Shutdown(tx) => {
                let res = self.panel_op("shutdown", |p| p.shutdown());
                tx.send(()).map_err(|_| anyhow!("Failed to acknowledge shutdown"))?;
                res?;
            }
        };

        Ok(())
    }

    pub async fn serve(&mut self, mut rx: mpsc::Receiver<Command>) {
        while let Some(cmd) = rx.recv().await {
            let ctx = cmd.get_command_str();
            let last = matches!(cmd, Command::Shutdown(_));

            debug!("{ctx}");

            if let Err(e) = self.dispatch(cmd)
                .with_context(|| format!("While handling {ctx}"))
            {
                error!("{e:?}")
            }

            if last {
                info!("display control stopped");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use artik_display_service::{
        backlight::BlankPower,
        config::{Config, TransportKind},
        panel::PanelState,
        reboot::RebootMode,
        types::mode::DisplayInfo,
    };
    use tokio::sync::oneshot;

    use super::*;
    use crate::display::CommandSender;

    struct Board(PathBuf);

    impl Board {
        fn new(name: &str, compatible: &[u8]) -> Self {
            let root = std::env::temp_dir()
                .join(format!("artik-ctl-{}-{name}", std::process::id()));
            let write = |rel: &str, content: &[u8]| {
                let path = root.join(rel);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(path, content).unwrap();
            };

            write("panel/compatible", compatible);
            write("gpio/export", b"");
            write("gpio/gpio3/direction", b"in\n");
            write("gpio/gpio3/value", b"0\n");
            write("mem", &[0u8; 4096]);

            Self(root)
        }

        fn spawn(&self) -> (CommandSender, task::JoinHandle<()>) {
            let config = Config {
                of_node: self.0.join("panel"),
                compatible: None,
                reset_gpio: 3,
                gpio_sysfs: self.0.join("gpio"),
                supplies: Default::default(),
                transport: TransportKind::Trace,
                verify_module_id: false,
                reboot_devmem: self.0.join("mem"),
            };

            let panel = board::open_panel(&config).unwrap();
            let reboot = RebootNotifier::new(DevMem::new(&config.reboot_devmem, 0x800, 0x100));
            let mut ctl = Ctl::new(panel, reboot);

            let (tx, rx) = mpsc::channel(8);
            let handle = tokio::spawn(async move { ctl.serve(rx).await });

            (tx.into(), handle)
        }
    }

    impl Drop for Board {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    async fn state(tx: &CommandSender) -> PanelState {
        let (stx, srx) = oneshot::channel();
        tx.with_reply(Panel::State(stx), srx).await.unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn panel_lifecycle() {
        let board = Board::new("lifecycle", b"hx8394d\0");
        let (tx, handle) = board.spawn();

        assert_eq!(state(&tx).await, PanelState::Off);
        assert!(tx.request(Panel::Enable).await.is_err());

        tx.request(Panel::Prepare).await.unwrap();
        tx.request(Panel::Enable).await.unwrap();
        assert_eq!(state(&tx).await, PanelState::Enabled);

        let status = tx.request(Backlight::Status).await.unwrap();
        assert_eq!(status.power, BlankPower::Unblank);
        assert_eq!(status.actual_brightness, Some(100));
        assert_eq!(status.max_brightness, 175);

        tx.request(|r| Backlight::SetBrightness(150, r)).await.unwrap();
        let status = tx.request(Backlight::Status).await.unwrap();
        assert_eq!((status.brightness, status.actual_brightness), (150, Some(150)));

        let modes = {
            let (mtx, mrx) = oneshot::channel();
            tx.with_reply(Panel::Modes(mtx), mrx).await.unwrap()
        };
        assert_eq!(modes.modes[0].clock, 81869);
        assert_eq!(modes.info, DisplayInfo { width_mm: 107, height_mm: 172, bpc: None });

        // Reads are not available on the trace transport.
        assert!(tx.request(Panel::CheckModuleId).await.is_err());

        let (stx, srx) = oneshot::channel();
        tx.with_reply(Command::Shutdown(stx), srx).await.unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn reboot_mode() {
        let board = Board::new("reboot", b"shenzhen,avdtt80wxcn039a\0");
        let (tx, _handle) = board.spawn();

        assert_eq!(tx.request(Reboot::Pending).await.unwrap(), None);

        let mode = tx.request(|r| Reboot::Notify(Some("recovery".into()), r)).await.unwrap();
        assert_eq!(mode, RebootMode::Recovery);

        let raw = fs::read(board.0.join("mem")).unwrap();
        let set7 = 0x800 + 0xf8;
        assert_eq!(u32::from_ne_bytes(raw[set7..set7 + 4].try_into().unwrap()), 0x1234_5672);

        // No backlight on this board.
        assert!(tx.request(Backlight::Status).await.is_err());

        let modes = {
            let (mtx, mrx) = oneshot::channel();
            tx.with_reply(Panel::Modes(mtx), mrx).await.unwrap()
        };
        assert_eq!(modes.modes[0].clock, 65431);
        assert_eq!(modes.info, DisplayInfo { width_mm: 107, height_mm: 172, bpc: Some(8) });
    }
}

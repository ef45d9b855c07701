use anyhow::Context;
use artik_display_service::{
    backlight::BlankPower,
    panel::PanelState,
    reboot::RebootMode,
    types::mode::ModeList,
};
use tokio::sync::{mpsc, oneshot};

/// Reply channel for operations that can fail on the hardware side.
pub type Reply<T> = oneshot::Sender<anyhow::Result<T>>;

pub enum Command {
    Backlight(Backlight),
    Panel(Panel),
    Reboot(Reboot),
    /// Power the panel off and stop serving.
    Shutdown(oneshot::Sender<()>),
}

pub enum Panel {
    Prepare(Reply<()>),
    Unprepare(Reply<()>),
    Enable(Reply<()>),
    Disable(Reply<()>),
    CheckModuleId(Reply<()>),
    State(oneshot::Sender<PanelState>),
    Modes(oneshot::Sender<ModeList>),
}

/// Snapshot of the backlight properties.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BacklightStatus {
    pub brightness: u32,
    pub actual_brightness: Option<u32>,
    pub max_brightness: u32,
    pub power: BlankPower,
}

pub enum Backlight {
    Status(Reply<BacklightStatus>),
    SetBrightness(u32, Reply<()>),
    SetPower(BlankPower, Reply<()>),
}

pub enum Reboot {
    Notify(Option<String>, Reply<RebootMode>),
    Pending(Reply<Option<RebootMode>>),
}

pub trait CommandStr {
    fn get_command_str(&self) -> String;
}

impl CommandStr for Command {
    fn get_command_str(&self) -> String {
        use self::Command::*;

        match self {
            Backlight(b) => format!("Backlight::{}", b.get_command_str()),
            Panel(p) => format!("Panel::{}", p.get_command_str()),
            Reboot(r) => format!("Reboot::{}", r.get_command_str()),
            Shutdown(_) => "Shutdown".into(),
        }
    }
}

impl CommandStr for Panel {
    fn get_command_str(&self) -> String {
        use self::Panel::*;

        match self {
            Prepare(_) => "Prepare".into(),
            Unprepare(_) => "Unprepare".into(),
            Enable(_) => "Enable".into(),
            Disable(_) => "Disable".into(),
            CheckModuleId(_) => "CheckModuleId".into(),
            State(_) => "State::Get".into(),
            Modes(_) => "Modes::Get".into(),
        }
    }
}

impl CommandStr for Backlight {
    fn get_command_str(&self) -> String {
        match self {
            Self::Status(_) => "Status::Get".into(),
            Self::SetBrightness(b, _) => format!("Brightness::Set({b})"),
            Self::SetPower(p, _) => format!("Power::Set({p:?})"),
        }
    }
}

impl CommandStr for Reboot {
    fn get_command_str(&self) -> String {
        match self {
            Self::Notify(cmd, _) => format!("Notify({cmd:?})"),
            Self::Pending(_) => "Pending::Get".into(),
        }
    }
}

impl From<Backlight> for Command {
    fn from(value: Backlight) -> Self {
        Self::Backlight(value)
    }
}

impl From<Panel> for Command {
    fn from(value: Panel) -> Self {
        Self::Panel(value)
    }
}

impl From<Reboot> for Command {
    fn from(value: Reboot) -> Self {
        Self::Reboot(value)
    }
}

#[derive(Clone)]
pub struct CommandSender(mpsc::Sender<Command>);

impl CommandSender {
    async fn do_send(&self, cmd: Command, ctx: &String) -> anyhow::Result<()> {
        self.0
            .send(cmd)
            .await
            .with_context(|| format!("Failed to send {ctx}"))
    }

    pub async fn with_reply<T>(
        &self,
        cmd: impl Into<Command>,
        reply: oneshot::Receiver<T>,
    ) -> anyhow::Result<T> {
        let cmd = cmd.into();
        let ctx_str = cmd.get_command_str();

        self.do_send(cmd, &ctx_str).await?;
        reply
            .await
            .with_context(|| format!("Failed to get reply from {ctx_str}"))
    }

    /// Send a fallible request and flatten both failure layers.
    pub async fn request<T, C>(&self, make: impl FnOnce(Reply<T>) -> C) -> anyhow::Result<T>
    where
        C: Into<Command>,
    {
        let (tx, rx) = oneshot::channel();

        self.with_reply(make(tx), rx).await?
    }
}

impl From<mpsc::Sender<Command>> for CommandSender {
    fn from(value: mpsc::Sender<Command>) -> Self {
        Self(value)
    }
}

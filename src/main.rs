use anyhow::{Context, Result};
use artik_display_service::{
    board,
    config::Config,
    drivers::devmem::DevMem,
    reboot::RebootNotifier,
};
use log::{error, info};
use tokio::{
    signal::{self, unix::SignalKind},
    sync::{mpsc, oneshot},
};
use zbus::connection;

mod dbus;
mod display;

async fn wait_for_termination() {
    let mut term = match signal::unix::signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            error!("Unable to listen for SIGTERM: {e}");
            if let Err(e) = signal::ctrl_c().await {
                error!("Unable to listen for shutdown signal: {e}");
            }
            return;
        }
    };

    tokio::select! {
        res = signal::ctrl_c() => {
            if let Err(e) = res {
                error!("Unable to listen for shutdown signal: {e}");
            }
        }
        _ = term.recv() => {}
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().context("Invalid configuration")?;
    let panel = board::open_panel(&config).context("Failed to probe panel")?;
    let desc = panel.desc();
    let backlight = panel.backlight().map(|bl| bl.desc().name);
    let reboot = RebootNotifier::new(DevMem::alive(&config.reboot_devmem));
    info!("reboot mode notifier ready, priority {}", reboot.priority());

    let (tx, rx) = mpsc::channel(100);
    let mut ctl = display::Ctl::new(panel, reboot);

    let ctl_task = tokio::spawn(async move { ctl.serve(rx).await; });

    let mut builder = connection::Builder::system()?
        .name(dbus::SERVICE_NAME)?
        .serve_at(dbus::Panel1::PATH, dbus::Panel1::new(tx.clone(), desc.compatible))?
        .serve_at(dbus::Reboot1::PATH, dbus::Reboot1::new(tx.clone()))?;

    if let Some(name) = backlight {
        let iface = dbus::Backlight1::new(tx.clone(), name);
        builder = builder.serve_at(dbus::Backlight1::PATH, iface)?;
    }

    let _zbus_connection = builder.build().await.context("Failed to set up D-Bus service")?;
    info!("{} serving {}", dbus::SERVICE_NAME, desc.name);

    wait_for_termination().await;
    info!("shutting down");

    let (done_tx, done_rx) = oneshot::channel();
    display::CommandSender::from(tx)
        .with_reply(display::Command::Shutdown(done_tx), done_rx)
        .await?;

    ctl_task.await.context("Control task failed")?;

    Ok(())
}

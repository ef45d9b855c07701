use log::error;
use zbus::fdo;

pub mod backlight1;
pub use backlight1::Backlight1;

pub mod panel1;
pub use panel1::Panel1;

pub mod reboot1;
pub use reboot1::Reboot1;

pub const SERVICE_NAME: &str = "org.artik.DisplayService";

/// Failure in the service itself (control task gone, channel closed).
pub fn internal_error(e: anyhow::Error) -> fdo::Error {
    error!("{e:?}");
    fdo::Error::Failed("Internal error".into())
}

/// Failure reported by the hardware, passed on to the caller.
pub fn operation_failed(e: anyhow::Error) -> fdo::Error {
    fdo::Error::Failed(format!("{e:#}"))
}

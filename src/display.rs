//! Control task owning the panel and the reboot scratch register.

mod command;
mod ctl;

pub use command::*;
pub use ctl::Ctl;

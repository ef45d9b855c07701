//! Regulators exposed through the `reg-userspace-consumer` driver

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::{
    hw::{HwError, Supplies},
    sysfs::attribute::{Generic, RString, TypedRead, TypedWrite},
};

/// One `reg-userspace-consumer` device.
#[derive(Debug)]
pub struct UserspaceConsumer {
    supply: String,
    name: RString,
    state: Generic<String>,
}

impl UserspaceConsumer {
    pub fn new(supply: impl Into<String>, device: impl AsRef<Path>) -> Self {
        let device = device.as_ref();

        Self {
            supply: supply.into(),
            name: Generic::new(device.join("name")).into(),
            state: Generic::new(device.join("state")),
        }
    }

    pub fn supply(&self) -> &str {
        &self.supply
    }

    /// Name of the consumer device, checks the device is present.
    pub fn name(&self) -> Result<String, HwError> {
        Ok(self.name.read()?)
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<(), HwError> {
        let state = if enabled { "enabled" } else { "disabled" };
        self.state.write(state.to_string())?;

        Ok(())
    }
}

/// Rails switched together, enabled in order and disabled in reverse.
#[derive(Debug, Default)]
pub struct SupplyBank {
    consumers: Vec<UserspaceConsumer>,
}

impl SupplyBank {
    /// Look up every named supply.
    ///
    /// A missing supply is not fatal: the bank comes back empty and the panel
    /// runs on whatever powers it at boot.
    pub fn acquire<F>(names: &[&str], lookup: F) -> Self
    where
        F: Fn(&str) -> Option<PathBuf>,
    {
        let mut consumers = Vec::with_capacity(names.len());

        for supply in names {
            let Some(device) = lookup(supply) else {
                warn!("failed to get regulator '{supply}', continuing without supplies");
                return Self::default();
            };

            let consumer = UserspaceConsumer::new(*supply, device);
            match consumer.name() {
                Ok(name) => info!("supply {supply} -> {name}"),
                Err(e) => {
                    warn!("failed to get regulator '{supply}': {e}, continuing without supplies");
                    return Self::default();
                }
            }

            consumers.push(consumer);
        }

        Self { consumers }
    }

    pub fn len(&self) -> usize {
        self.consumers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumers.is_empty()
    }
}

impl Supplies for SupplyBank {
    fn enable(&mut self) -> Result<(), HwError> {
        for (i, consumer) in self.consumers.iter().enumerate() {
            if let Err(e) = consumer.set_enabled(true) {
                // Leave the rails the way we found them.
                for prev in self.consumers[..i].iter().rev() {
                    if let Err(e) = prev.set_enabled(false) {
                        warn!("failed to disable supply '{}' after error: {e}", prev.supply());
                    }
                }
                return Err(e);
            }
        }

        Ok(())
    }

    fn disable(&mut self) -> Result<(), HwError> {
        for consumer in self.consumers.iter().rev() {
            consumer.set_enabled(false)?;
        }

        Ok(())
    }
}

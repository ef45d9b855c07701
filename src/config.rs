//! Service configuration, taken from the environment.

use std::{
    collections::BTreeMap,
    path::PathBuf,
};

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{var}: invalid value '{value}'")]
    Invalid { var: String, value: String },
}

/// How DCS packets leave the service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportKind {
    CharDev(PathBuf),
    /// Log packets instead of sending them.
    Trace,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Device-tree node of the panel
    pub of_node: PathBuf,
    /// Replaces the node's `compatible` when set
    pub compatible: Option<Vec<String>>,
    pub reset_gpio: u32,
    /// Root of the sysfs GPIO class
    pub gpio_sysfs: PathBuf,
    /// Userspace-consumer device per supply name
    pub supplies: BTreeMap<String, PathBuf>,
    pub transport: TransportKind,
    pub verify_module_id: bool,
    pub reboot_devmem: PathBuf,
}

impl Config {
    const PREFIX: &str = "ARTIK_";
    const SUPPLY_PREFIX: &str = "ARTIK_PANEL_SUPPLY_";

    const OF_NODE: &str = "ARTIK_PANEL_OF_NODE";
    const COMPATIBLE: &str = "ARTIK_PANEL_COMPATIBLE";
    const RESET_GPIO: &str = "ARTIK_PANEL_RESET_GPIO";
    const GPIO_SYSFS: &str = "ARTIK_PANEL_GPIO_SYSFS";
    const DSI_DEV: &str = "ARTIK_PANEL_DSI_DEV";
    const DRY_RUN: &str = "ARTIK_PANEL_DRY_RUN";
    const VERIFY_ID: &str = "ARTIK_PANEL_VERIFY_ID";
    const REBOOT_DEVMEM: &str = "ARTIK_REBOOT_DEVMEM";

    const DEFAULT_OF_NODE: &str = "/proc/device-tree/panel";
    const DEFAULT_GPIO_SYSFS: &str = "/sys/class/gpio";
    const DEFAULT_DEVMEM: &str = "/dev/mem";

    pub fn from_env() -> Result<Self, Error> {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: BTreeMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| k.starts_with(Self::PREFIX))
            .collect();
        let get = |var: &str| vars.get(var).filter(|v| !v.is_empty());

        let reset_gpio = get(Self::RESET_GPIO).ok_or(Error::Missing(Self::RESET_GPIO))?;
        let reset_gpio: u32 = reset_gpio.parse().map_err(|_| Error::Invalid {
            var: Self::RESET_GPIO.into(),
            value: reset_gpio.clone(),
        })?;

        let dry_run = get(Self::DRY_RUN).map(|v| parse_bool(Self::DRY_RUN, v)).transpose()?;
        let transport = match (dry_run, get(Self::DSI_DEV)) {
            (Some(true), _) => TransportKind::Trace,
            (_, Some(dev)) => TransportKind::CharDev(dev.into()),
            (_, None) => return Err(Error::Missing(Self::DSI_DEV)),
        };

        let verify_module_id = get(Self::VERIFY_ID)
            .map(|v| parse_bool(Self::VERIFY_ID, v))
            .transpose()?
            .unwrap_or(false);

        // Compatible strings carry vendor prefixes with commas, so the list
        // is separated by whitespace or ';'.
        let compatible = get(Self::COMPATIBLE).map(|v| {
            v.split(|c: char| c.is_whitespace() || c == ';')
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        });

        let supplies = vars
            .iter()
            .filter_map(|(k, v)| {
                let name = k.strip_prefix(Self::SUPPLY_PREFIX)?;
                (!name.is_empty() && !v.is_empty()).then(|| (name.to_lowercase(), PathBuf::from(v)))
            })
            .collect();

        Ok(Self {
            of_node: get(Self::OF_NODE).map_or(Self::DEFAULT_OF_NODE.into(), PathBuf::from),
            compatible,
            reset_gpio,
            gpio_sysfs: get(Self::GPIO_SYSFS)
                .map_or(Self::DEFAULT_GPIO_SYSFS.into(), PathBuf::from),
            supplies,
            transport,
            verify_module_id,
            reboot_devmem: get(Self::REBOOT_DEVMEM)
                .map_or(Self::DEFAULT_DEVMEM.into(), PathBuf::from),
        })
    }
}

fn parse_bool(var: &str, value: &str) -> Result<bool, Error> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "y" | "yes" | "true" | "on" => Ok(true),
        "0" | "n" | "no" | "false" | "off" => Ok(false),
        _ => Err(Error::Invalid { var: var.into(), value: value.into() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::from_vars([
            ("ARTIK_PANEL_RESET_GPIO", "73"),
            ("ARTIK_PANEL_DSI_DEV", "/dev/dsi0"),
            ("HOME", "/root"),
        ])
        .unwrap();

        assert_eq!(config, Config {
            of_node: "/proc/device-tree/panel".into(),
            compatible: None,
            reset_gpio: 73,
            gpio_sysfs: "/sys/class/gpio".into(),
            supplies: BTreeMap::new(),
            transport: TransportKind::CharDev("/dev/dsi0".into()),
            verify_module_id: false,
            reboot_devmem: "/dev/mem".into(),
        });
    }

    #[test]
    fn overrides() {
        let config = Config::from_vars([
            ("ARTIK_PANEL_OF_NODE", "/tmp/panel"),
            ("ARTIK_PANEL_COMPATIBLE", "shenzhen,avdtt80wxcn039a; hx8394d"),
            ("ARTIK_PANEL_RESET_GPIO", "12"),
            ("ARTIK_PANEL_SUPPLY_VCI", "/sys/devices/platform/vci-consumer"),
            ("ARTIK_PANEL_SUPPLY_VDD3", "/sys/devices/platform/vdd3-consumer"),
            ("ARTIK_PANEL_DSI_DEV", "/dev/dsi0"),
            ("ARTIK_PANEL_DRY_RUN", "yes"),
            ("ARTIK_PANEL_VERIFY_ID", "1"),
            ("ARTIK_REBOOT_DEVMEM", "/tmp/mem"),
        ])
        .unwrap();

        assert_eq!(config.of_node, PathBuf::from("/tmp/panel"));
        assert_eq!(
            config.compatible,
            Some(vec!["shenzhen,avdtt80wxcn039a".to_string(), "hx8394d".to_string()])
        );
        assert_eq!(config.supplies.len(), 2);
        assert_eq!(config.supplies["vdd3"], PathBuf::from("/sys/devices/platform/vdd3-consumer"));
        assert_eq!(config.transport, TransportKind::Trace);
        assert!(config.verify_module_id);
        assert_eq!(config.reboot_devmem, PathBuf::from("/tmp/mem"));
    }

    #[test]
    fn vendor_prefixed_compatible_kept_whole() {
        let config = Config::from_vars([
            ("ARTIK_PANEL_COMPATIBLE", "shenzhen,avdtt80wxcn039a"),
            ("ARTIK_PANEL_RESET_GPIO", "12"),
            ("ARTIK_PANEL_DRY_RUN", "1"),
        ])
        .unwrap();

        let compatible = config.compatible.unwrap();
        assert_eq!(compatible, vec!["shenzhen,avdtt80wxcn039a".to_string()]);
        assert_eq!(
            crate::panel::desc::of_match(&compatible).map(|d| d.name),
            Some("panel-hx8394d-dsi")
        );

        let config = Config::from_vars([
            ("ARTIK_PANEL_COMPATIBLE", "shenzhen,avdtt80wxcn039a hx8394d"),
            ("ARTIK_PANEL_RESET_GPIO", "12"),
            ("ARTIK_PANEL_DRY_RUN", "1"),
        ])
        .unwrap();

        let compatible = config.compatible.unwrap();
        assert_eq!(compatible.len(), 2);
        assert_eq!(
            crate::panel::desc::of_match(&compatible).map(|d| d.name),
            Some("panel-hx8394d-dsi")
        );
    }

    #[test]
    fn required_and_invalid() {
        assert_eq!(
            Config::from_vars([("ARTIK_PANEL_DSI_DEV", "/dev/dsi0")]),
            Err(Error::Missing("ARTIK_PANEL_RESET_GPIO"))
        );
        assert_eq!(
            Config::from_vars([("ARTIK_PANEL_RESET_GPIO", "12")]),
            Err(Error::Missing("ARTIK_PANEL_DSI_DEV"))
        );
        assert!(matches!(
            Config::from_vars([("ARTIK_PANEL_RESET_GPIO", "gpio12"), ("ARTIK_PANEL_DRY_RUN", "1")]),
            Err(Error::Invalid { .. })
        ));
        assert!(matches!(
            Config::from_vars([("ARTIK_PANEL_RESET_GPIO", "12"), ("ARTIK_PANEL_DRY_RUN", "maybe")]),
            Err(Error::Invalid { .. })
        ));
    }
}

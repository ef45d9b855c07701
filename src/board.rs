//! Assemble a panel from configuration and its device-tree node.

use log::{info, warn};

use crate::{
    config::{Config, TransportKind},
    drivers::{
        dsi::{chardev::CharDevTransport, trace::TraceTransport},
        gpio::SysfsGpio,
        regulator::SupplyBank,
    },
    dsi::DcsTransport,
    hw::ThreadDelay,
    of::OfNode,
    panel::{
        self, Hx8394d, Resources,
        desc::{self, TimingSource},
    },
};

pub type BoxedTransport = Box<dyn DcsTransport + Send>;

/// Panel as driven by the service.
pub type Panel = Hx8394d<BoxedTransport, SysfsGpio, SupplyBank, ThreadDelay>;

/// Node property requesting the module ID check.
const CHECK_MODULE_ID: &str = "check-module-id";

pub fn open_transport(kind: &TransportKind) -> BoxedTransport {
    match kind {
        TransportKind::CharDev(path) => Box::new(CharDevTransport::new(path)),
        TransportKind::Trace => Box::new(TraceTransport::new()),
    }
}

pub fn open_panel(config: &Config) -> Result<Panel, panel::Error> {
    let node = OfNode::new(&config.of_node);

    let compatible = match &config.compatible {
        Some(c) => c.clone(),
        None => node.compatible()?,
    };
    let desc = desc::of_match(&compatible).ok_or(panel::Error::UnknownCompatible(compatible))?;
    info!("{}: matched {}", node.path().display(), desc.compatible);

    let timings = match desc.timings {
        TimingSource::DeviceTree => node.power_timings()?,
        TimingSource::Fixed(t) => t,
    };

    let reset = SysfsGpio::with_base(&config.gpio_sysfs, config.reset_gpio).request()?;
    let supplies = SupplyBank::acquire(desc.supplies, |s| config.supplies.get(s).cloned());
    if supplies.len() != desc.supplies.len() {
        warn!("{}: running without supplies", desc.name);
    }

    let verify = config.verify_module_id || node.read_bool(CHECK_MODULE_ID)?;

    let res = Resources {
        transport: open_transport(&config.transport),
        reset,
        supplies,
        delay: ThreadDelay,
    };

    Ok(Hx8394d::probe(desc, res, timings)?.with_module_id_check(verify))
}

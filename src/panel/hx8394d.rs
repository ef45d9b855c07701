//! HX8394D panel state machine
//!
//! The panel moves through off → powered on → prepared → enabled. Every
//! transition is idempotent: asking for the current state again is a no-op.

use log::{error, info, warn};

use crate::{
    backlight::{Backlight, BlankPower},
    dsi::DcsTransport,
    hw::{Delay, ResetLine, Supplies},
    types::mode::{DisplayInfo, ModeList, ModeType},
};

use super::{
    desc::{PanelDesc, PowerOffPolicy, PowerTimings},
    sequence::{self, dcs},
    Error, PanelState,
};

/// Expected replies to the GETID1..3 reads.
const MODULE_ID: [(u8, u8); 3] = [
    (dcs::GETID1, 0x83),
    (dcs::GETID2, 0x94),
    (dcs::GETID3, 0x0d),
];

/// Reset hold time before cutting the rails on a full power off.
const RESET_TO_SUPPLY_OFF_MS: u32 = 5;

/// Hardware handed to the driver at probe time.
pub struct Resources<T, R, S, D> {
    pub transport: T,
    pub reset: R,
    pub supplies: S,
    pub delay: D,
}

pub struct Hx8394d<T, R, S, D> {
    desc: &'static PanelDesc,
    transport: T,
    reset: R,
    supplies: S,
    delay: D,
    timings: PowerTimings,
    verify_module_id: bool,
    backlight: Option<Backlight>,
    power_on: bool,
    prepared: bool,
    enabled: bool,
}

impl<T, R, S, D> Hx8394d<T, R, S, D>
where
    T: DcsTransport,
    R: ResetLine,
    S: Supplies,
    D: Delay,
{
    /// Bind a panel to its hardware and attach it to the DSI host.
    pub fn probe(
        desc: &'static PanelDesc,
        res: Resources<T, R, S, D>,
        timings: PowerTimings,
    ) -> Result<Self, Error> {
        let Resources { mut transport, reset, supplies, delay } = res;

        transport.attach(&desc.dsi).inspect_err(|e| {
            error!("{}: failed to attach to DSI host: {e}", desc.name);
        })?;

        info!(
            "{}: attached, {} lanes, {:?}, timings {}/{}/{} ms",
            desc.name, desc.dsi.lanes, desc.dsi.format,
            timings.power_on_delay, timings.reset_delay, timings.init_delay,
        );

        Ok(Self {
            desc,
            transport,
            reset,
            supplies,
            delay,
            timings,
            verify_module_id: false,
            backlight: desc.backlight.map(Backlight::new),
            power_on: false,
            prepared: false,
            enabled: false,
        })
    }

    /// Check the controller identity after each init sequence.
    pub fn with_module_id_check(mut self, verify: bool) -> Self {
        self.verify_module_id = verify;
        self
    }

    pub fn desc(&self) -> &'static PanelDesc {
        self.desc
    }

    pub fn state(&self) -> PanelState {
        if self.enabled {
            PanelState::Enabled
        } else if self.prepared {
            PanelState::Prepared
        } else if self.power_on {
            PanelState::PoweredOn
        } else {
            PanelState::Off
        }
    }

    pub fn backlight(&self) -> Option<&Backlight> {
        self.backlight.as_ref()
    }

    fn power_on(&mut self) -> Result<(), Error> {
        if self.power_on {
            return Ok(());
        }

        let PowerTimings { power_on_delay, reset_delay, init_delay } = self.timings;

        self.reset.direction_output(true)?;
        self.supplies.enable()?;

        self.delay.delay_ms(power_on_delay);
        self.reset.set(false)?;
        self.delay.delay_ms(reset_delay);
        self.reset.set(true)?;
        self.delay.delay_ms(init_delay);

        self.power_on = true;
        info!("{}: powered on", self.desc.name);

        Ok(())
    }

    fn power_off(&mut self) -> Result<(), Error> {
        if !self.power_on {
            return Ok(());
        }

        match self.desc.power_off {
            PowerOffPolicy::Retain => return Ok(()),
            PowerOffPolicy::AssertReset => {
                self.reset.set(false)?;
            }
            PowerOffPolicy::Full => {
                self.reset.set(false)?;
                self.delay.delay_ms(RESET_TO_SUPPLY_OFF_MS);
                self.supplies.disable()?;
            }
        }

        // The controller loses its register state with reset asserted.
        self.power_on = false;
        self.prepared = false;
        self.enabled = false;
        info!("{}: powered off", self.desc.name);

        Ok(())
    }

    /// Power the panel and send its initialization sequence.
    pub fn prepare(&mut self) -> Result<(), Error> {
        if self.prepared {
            return Ok(());
        }

        self.power_on().inspect_err(|e| {
            error!("{}: failed to power on: {e}", self.desc.name);
        })?;

        let desc = self.desc;
        sequence::run_script(desc.init, &desc.table, &mut self.transport, &mut self.delay)
            .inspect_err(|_| error!("{}: failed to set sequence", self.desc.name))?;

        if self.verify_module_id {
            self.check_module_id()?;
        }

        self.prepared = true;
        info!("{}: prepared", self.desc.name);

        Ok(())
    }

    pub fn unprepare(&mut self) -> Result<(), Error> {
        if !self.prepared {
            return Ok(());
        }

        if self.enabled {
            self.disable()?;
        }

        let res = self.power_off();
        self.prepared = false;
        info!("{}: unprepared", self.desc.name);

        res
    }

    pub fn enable(&mut self) -> Result<(), Error> {
        if !self.prepared {
            return Err(Error::NotPrepared);
        }
        if self.enabled {
            return Ok(());
        }

        self.push_backlight_power(BlankPower::Unblank);

        let desc = self.desc;
        sequence::run_script(desc.enable, &desc.table, &mut self.transport, &mut self.delay)?;

        self.enabled = true;
        info!("{}: enabled", self.desc.name);

        Ok(())
    }

    pub fn disable(&mut self) -> Result<(), Error> {
        if !self.enabled {
            return Ok(());
        }

        self.push_backlight_power(BlankPower::Powerdown);

        let desc = self.desc;
        sequence::run_script(desc.disable, &desc.table, &mut self.transport, &mut self.delay)?;

        self.enabled = false;
        info!("{}: disabled", self.desc.name);

        Ok(())
    }

    /// System shutdown hook.
    pub fn shutdown(&mut self) -> Result<(), Error> {
        self.power_off()
    }

    /// Detach from the DSI host and power off.
    pub fn remove(mut self) -> Result<(), Error> {
        self.transport.detach();
        self.power_off()
    }

    pub fn get_modes(&self) -> ModeList {
        let mode = self.desc.mode.instantiate(ModeType::DRIVER | ModeType::PREFERRED);
        let info = DisplayInfo {
            width_mm: mode.width_mm,
            height_mm: mode.height_mm,
            bpc: self.desc.bpc,
        };

        ModeList { modes: vec![mode], info }
    }

    /// Read back the controller ID bytes.
    pub fn check_module_id(&mut self) -> Result<(), Error> {
        if !self.power_on {
            return Err(Error::NotPowered);
        }

        for (index, (command, expected)) in MODULE_ID.iter().copied().enumerate() {
            let mut val = [0u8; 1];

            self.transport.read(command, &mut val).inspect_err(|e| {
                error!("{}: error {e} reading dcs seq({command:#x})", self.desc.name);
            })?;

            if val[0] != expected {
                warn!("{}: unexpected module id {:#04x} at {command:#x}", self.desc.name, val[0]);
                return Err(Error::ModuleIdMismatch { index, expected, found: val[0] });
            }
        }

        Ok(())
    }

    /// Request a new brightness and push it to the panel.
    pub fn set_brightness(&mut self, brightness: u32) -> Result<(), Error> {
        self.backlight.as_mut().ok_or(Error::NoBacklight)?.props.brightness = brightness;
        self.update_backlight()
    }

    pub fn set_backlight_power(&mut self, power: BlankPower) -> Result<(), Error> {
        self.backlight.as_mut().ok_or(Error::NoBacklight)?.props.power = power;
        self.update_backlight()
    }

    fn push_backlight_power(&mut self, power: BlankPower) {
        if self.backlight.is_none() {
            return;
        }

        if let Err(e) = self.set_backlight_power(power) {
            warn!("{}: backlight update failed: {e}", self.desc.name);
        }
    }

    fn update_backlight(&mut self) -> Result<(), Error> {
        let bl = self.backlight.as_mut().ok_or(Error::NoBacklight)?;

        if !self.power_on {
            return Err(Error::NotPowered);
        }

        let (brightness, packet) = bl.packet();
        sequence::write_packet(&mut self.transport, &packet)?;
        bl.commit(brightness);

        Ok(())
    }
}

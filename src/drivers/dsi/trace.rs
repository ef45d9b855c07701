//! Transport that only logs, for dry runs on boards without a DSI host.

use log::info;

use crate::{
    dsi::{self, DcsTransport, TransportError},
    types::dsi::DsiConfig,
};

#[derive(Debug, Default)]
pub struct TraceTransport {
    attached: bool,
    packets: usize,
}

impl TraceTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DcsTransport for TraceTransport {
    fn attach(&mut self, config: &DsiConfig) -> Result<(), TransportError> {
        info!(
            "trace: attach {} lanes, {:?}, flags {:#x}",
            config.lanes, config.format, config.mode_flags.bits(),
        );
        self.attached = true;

        Ok(())
    }

    fn detach(&mut self) {
        info!("trace: detach after {} packets", self.packets);
        self.attached = false;
    }

    fn write_buffer(&mut self, data: &[u8]) -> Result<(), TransportError> {
        if !self.attached {
            return Err(TransportError::Detached);
        }
        if data.is_empty() {
            return Err(TransportError::Empty);
        }

        info!("trace: {}", dsi::hex(data));
        self.packets += 1;

        Ok(())
    }

    fn read(&mut self, _command: u8, _buf: &mut [u8]) -> Result<usize, TransportError> {
        Err(TransportError::ReadUnsupported)
    }
}

//! Display command transport

use std::io;

use thiserror::Error;

use crate::types::dsi::DsiConfig;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("short write: {written} of {len} bytes")]
    ShortWrite { written: usize, len: usize },
    #[error("empty packet")]
    Empty,
    #[error("transport is not attached")]
    Detached,
    #[error("reads are not supported by this transport")]
    ReadUnsupported,
}

/// Raw DCS access to a panel on a DSI link.
pub trait DcsTransport {
    /// Bind the peripheral to its host with the given link configuration.
    fn attach(&mut self, config: &DsiConfig) -> Result<(), TransportError>;

    fn detach(&mut self);

    /// Send `data` as a single DCS packet, `data[0]` being the command.
    fn write_buffer(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Issue a DCS read of `command`, filling `buf`. Returns the number of
    /// bytes received.
    fn read(&mut self, command: u8, buf: &mut [u8]) -> Result<usize, TransportError>;
}

impl<T: DcsTransport + ?Sized> DcsTransport for Box<T> {
    fn attach(&mut self, config: &DsiConfig) -> Result<(), TransportError> {
        (**self).attach(config)
    }

    fn detach(&mut self) {
        (**self).detach()
    }

    fn write_buffer(&mut self, data: &[u8]) -> Result<(), TransportError> {
        (**self).write_buffer(data)
    }

    fn read(&mut self, command: u8, buf: &mut [u8]) -> Result<usize, TransportError> {
        (**self).read(command, buf)
    }
}

/// Format a packet the way it appears in logs: `b9 ff 83 94`.
pub fn hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

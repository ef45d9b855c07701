//! DCS transport over a DSI host character device
//!
//! Each packet is handed to the host in one `write(2)`. A read writes the
//! opcode, then the host returns the peripheral's reply on the next
//! `read(2)`.

use std::{
    fs::{File, OpenOptions},
    io::{Read, Write},
    path::{Path, PathBuf},
};

use log::{debug, info};

use crate::{
    dsi::{DcsTransport, TransportError},
    types::dsi::DsiConfig,
};

#[derive(Debug)]
pub struct CharDevTransport {
    path: PathBuf,
    file: Option<File>,
}

impl CharDevTransport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), file: None }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file(&mut self) -> Result<&mut File, TransportError> {
        self.file.as_mut().ok_or(TransportError::Detached)
    }
}

impl DcsTransport for CharDevTransport {
    fn attach(&mut self, config: &DsiConfig) -> Result<(), TransportError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)?;

        info!(
            "{}: attached, {} lanes, {:?}, flags {:#x}",
            self.path.display(), config.lanes, config.format, config.mode_flags.bits(),
        );
        self.file = Some(file);

        Ok(())
    }

    fn detach(&mut self) {
        if self.file.take().is_some() {
            debug!("{}: detached", self.path.display());
        }
    }

    fn write_buffer(&mut self, data: &[u8]) -> Result<(), TransportError> {
        if data.is_empty() {
            return Err(TransportError::Empty);
        }

        let written = self.file()?.write(data)?;
        if written != data.len() {
            return Err(TransportError::ShortWrite { written, len: data.len() });
        }

        Ok(())
    }

    fn read(&mut self, command: u8, buf: &mut [u8]) -> Result<usize, TransportError> {
        let file = self.file()?;

        if file.write(&[command])? != 1 {
            return Err(TransportError::ShortWrite { written: 0, len: 1 });
        }

        Ok(file.read(buf)?)
    }
}

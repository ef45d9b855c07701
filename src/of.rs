//! Device-tree node properties, as exported under `/proc/device-tree`.
//!
//! Each property is a file holding the raw property value: cells are
//! big-endian u32, string lists are NUL separated.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::panel::desc::PowerTimings;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path}: malformed property ({len} bytes)")]
    Malformed { path: PathBuf, len: usize },
}

#[derive(Clone, Debug)]
pub struct OfNode {
    path: PathBuf,
}

impl OfNode {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw property value, `None` if the node lacks it.
    pub fn property(&self, name: &str) -> Result<Option<Vec<u8>>, Error> {
        let path = self.path.join(name);

        match fs::read(&path) {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(Error::Io { path, source }),
        }
    }

    pub fn read_bool(&self, name: &str) -> Result<bool, Error> {
        Ok(self.property(name)?.is_some())
    }

    pub fn read_u32(&self, name: &str) -> Result<Option<u32>, Error> {
        let Some(raw) = self.property(name)? else { return Ok(None) };

        let cell: [u8; 4] = raw.get(..4)
            .and_then(|c| c.try_into().ok())
            .ok_or_else(|| Error::Malformed { path: self.path.join(name), len: raw.len() })?;

        Ok(Some(u32::from_be_bytes(cell)))
    }

    pub fn read_string_list(&self, name: &str) -> Result<Vec<String>, Error> {
        let Some(raw) = self.property(name)? else { return Ok(Vec::new()) };

        Ok(raw
            .split(|b| *b == 0)
            .filter(|s| !s.is_empty())
            .map(|s| String::from_utf8_lossy(s).into_owned())
            .collect())
    }

    pub fn compatible(&self) -> Result<Vec<String>, Error> {
        self.read_string_list("compatible")
    }

    /// Panel power timings; absent properties count as zero.
    pub fn power_timings(&self) -> Result<PowerTimings, Error> {
        Ok(PowerTimings {
            power_on_delay: self.read_u32("power-on-delay")?.unwrap_or(0),
            reset_delay: self.read_u32("reset-delay")?.unwrap_or(0),
            init_delay: self.read_u32("init-delay")?.unwrap_or(0),
        })
    }
}

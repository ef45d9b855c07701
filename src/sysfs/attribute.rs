//! Typed sysfs attributes
//!
//! Attribute files are opened per access. Writes are issued as a single
//! `write(2)` since most kernel store handlers reject partial input.

use std::{
    fs::OpenOptions,
    io::{self, Read, Write},
    marker::PhantomData,
    path::{Path, PathBuf},
    str::FromStr,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path}: unexpected value '{value}'")]
    Conv { path: PathBuf, value: String },
}

impl Error {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io { path: path.to_path_buf(), source }
    }
}

/// Base trait for attributes
pub trait AttributeBase {
    fn path(&self) -> &Path;
}

/// Read the raw value of an attribute file, trailing newline removed.
pub trait RawRead: AttributeBase {
    fn read_raw(&self) -> Result<String, Error> {
        let path = self.path();
        let mut value = String::new();

        OpenOptions::new()
            .read(true)
            .open(path)
            .and_then(|mut f| f.read_to_string(&mut value))
            .map_err(|e| Error::io(path, e))?;

        Ok(value.trim_end().to_string())
    }
}

/// Read from an attribute file, and perform conversion
pub trait TypedRead: RawRead {
    type Repr;

    fn read(&self) -> Result<Self::Repr, Error>;
}

/// Write a raw string to an attribute file
pub trait RawWrite: AttributeBase {
    fn write_raw(&self, value: &str) -> Result<(), Error> {
        let path = self.path();

        OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(path)
            .and_then(|mut f| f.write_all(value.as_bytes()))
            .map_err(|e| Error::io(path, e))
    }
}

/// Perform Repr to String conversion, and write to the attribute file.
pub trait TypedWrite: RawWrite {
    type Repr;

    fn write(&self, value: Self::Repr) -> Result<(), Error>;
}

/// Wrapper type to prevent an attribute from using any of the write* functions.
#[derive(Debug)]
pub struct ReadOnly<T> where T: RawRead {
    attribute: T
}

impl<T: RawRead> AttributeBase for ReadOnly<T> {
    fn path(&self) -> &Path { self.attribute.path() }
}

impl<T: RawRead> RawRead for ReadOnly<T> {
    fn read_raw(&self) -> Result<String, Error> {
        self.attribute.read_raw()
    }
}

impl<T: TypedRead> TypedRead for ReadOnly<T> {
    type Repr = T::Repr;

    fn read(&self) -> Result<Self::Repr, Error> {
        self.attribute.read()
    }
}

impl<T: RawRead> From<T> for ReadOnly<T> {
    fn from(attribute: T) -> Self {
        Self { attribute }
    }
}

/// Wrapper restricting an attribute from using any of the read* functions.
#[derive(Debug)]
pub struct WriteOnly<T> where T: RawWrite {
    attribute: T,
}

impl<T: RawWrite> AttributeBase for WriteOnly<T> {
    fn path(&self) -> &Path { self.attribute.path() }
}

impl<T: RawWrite> RawWrite for WriteOnly<T> {
    fn write_raw(&self, value: &str) -> Result<(), Error> {
        self.attribute.write_raw(value)
    }
}

impl<T: TypedWrite> TypedWrite for WriteOnly<T> {
    type Repr = T::Repr;

    fn write(&self, value: Self::Repr) -> Result<(), Error> {
        self.attribute.write(value)
    }
}

impl<T: RawWrite> From<T> for WriteOnly<T> {
    fn from(attribute: T) -> Self {
        Self { attribute }
    }
}

/// Boolean attribute
///
/// The kernel may report booleans either as "Y/N" or "0/1", they are
/// always written back as "0/1".
#[derive(Debug)]
pub struct Boolean {
    path: PathBuf
}

impl Boolean {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AttributeBase for Boolean {
    fn path(&self) -> &Path {
        &self.path
    }
}

impl RawRead for Boolean {}
impl RawWrite for Boolean {}

impl TypedRead for Boolean {
    type Repr = bool;

    fn read(&self) -> Result<Self::Repr, Error> {
        let repr = self.read_raw()?;

        match repr.as_str() {
            "Y" | "1" => Ok(true),
            "N" | "0" => Ok(false),
            _ => Err(Error::Conv { path: self.path.clone(), value: repr })
        }
    }
}

impl TypedWrite for Boolean {
    type Repr = bool;

    fn write(&self, value: Self::Repr) -> Result<(), Error> {
        self.write_raw(if value { "1" } else { "0" })
    }
}

/// Attribute converted through `FromStr`/`ToString`
#[derive(Debug)]
pub struct Generic<T> {
    path: PathBuf,
    _phantom: PhantomData<T>
}

impl<T> Generic<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), _phantom: PhantomData }
    }
}

impl<T> AttributeBase for Generic<T> {
    fn path(&self) -> &Path {
        &self.path
    }
}

impl<T> RawRead for Generic<T> {}
impl<T> RawWrite for Generic<T> {}

impl<T> TypedRead for Generic<T>
where T: FromStr {
    type Repr = T;

    fn read(&self) -> Result<Self::Repr, Error> {
        let raw = self.read_raw()?;

        raw.parse().map_err(|_| Error::Conv { path: self.path.clone(), value: raw })
    }
}

impl<T> TypedWrite for Generic<T>
where T: ToString {
    type Repr = T;

    fn write(&self, value: Self::Repr) -> Result<(), Error> {
        self.write_raw(&value.to_string())
    }
}

pub type RString = ReadOnly<Generic<String>>;
pub type WU32 = WriteOnly<Generic<u32>>;

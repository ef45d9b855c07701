//! Test doubles shared by the unit tests.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicUsize, Ordering},
    },
};

use crate::{
    dsi::{DcsTransport, TransportError},
    hw::{Delay, HwError, ResetLine, Supplies},
    panel::{
        Error, Hx8394d, Resources,
        desc::{PanelDesc, PowerTimings},
    },
    types::dsi::DsiConfig,
};

/// Everything the mocks saw, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Attach(DsiConfig),
    Detach,
    Write(Vec<u8>),
    Read(u8),
    ResetOutput(bool),
    Reset(bool),
    SuppliesOn,
    SuppliesOff,
    Delay(u32),
}

#[derive(Default)]
struct Inner {
    events: Vec<Event>,
    writes_issued: usize,
    fail_write_at: Option<usize>,
    fail_attach: bool,
    fail_supplies: bool,
    replies: HashMap<u8, u8>,
}

/// Shared event log behind the mock transport, reset line, supplies and
/// delay.
#[derive(Clone, Default)]
pub struct Harness(Arc<Mutex<Inner>>);

pub type MockPanel = Hx8394d<MockTransport, MockReset, MockSupplies, MockDelay>;

impl Harness {
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.0.lock().unwrap()
    }

    fn push(&self, event: Event) {
        self.inner().events.push(event);
    }

    pub fn transport(&self) -> MockTransport {
        MockTransport(self.clone())
    }

    pub fn delay(&self) -> MockDelay {
        MockDelay(self.clone())
    }

    pub fn probe(
        &self,
        desc: &'static PanelDesc,
        timings: PowerTimings,
    ) -> Result<MockPanel, Error> {
        let res = Resources {
            transport: self.transport(),
            reset: MockReset(self.clone()),
            supplies: MockSupplies(self.clone()),
            delay: self.delay(),
        };

        Hx8394d::probe(desc, res, timings)
    }

    pub fn events(&self) -> Vec<Event> {
        self.inner().events.clone()
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.inner()
            .events
            .iter()
            .filter_map(|e| match e {
                Event::Write(data) => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.inner().events.clear();
    }

    /// Fail the n-th write issued from now on, counting from 0.
    pub fn fail_write_at(&self, n: usize) {
        let mut inner = self.inner();
        inner.fail_write_at = Some(inner.writes_issued + n);
    }

    pub fn fail_attach(&self) {
        self.inner().fail_attach = true;
    }

    pub fn fail_supplies(&self) {
        self.inner().fail_supplies = true;
    }

    pub fn set_read_reply(&self, command: u8, value: u8) {
        self.inner().replies.insert(command, value);
    }
}

pub struct MockTransport(Harness);

impl DcsTransport for MockTransport {
    fn attach(&mut self, config: &DsiConfig) -> Result<(), TransportError> {
        if self.0.inner().fail_attach {
            return Err(TransportError::Detached);
        }

        self.0.push(Event::Attach(*config));
        Ok(())
    }

    fn detach(&mut self) {
        self.0.push(Event::Detach);
    }

    fn write_buffer(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let mut inner = self.0.inner();
        let index = inner.writes_issued;
        inner.writes_issued += 1;

        if inner.fail_write_at == Some(index) {
            return Err(TransportError::ShortWrite { written: 0, len: data.len() });
        }

        inner.events.push(Event::Write(data.to_vec()));
        Ok(())
    }

    fn read(&mut self, command: u8, buf: &mut [u8]) -> Result<usize, TransportError> {
        let mut inner = self.0.inner();
        inner.events.push(Event::Read(command));

        let reply = inner.replies.get(&command).copied().unwrap_or(0);
        buf.fill(reply);

        Ok(buf.len())
    }
}

pub struct MockReset(Harness);

impl ResetLine for MockReset {
    fn direction_output(&mut self, high: bool) -> Result<(), HwError> {
        self.0.push(Event::ResetOutput(high));
        Ok(())
    }

    fn set(&mut self, high: bool) -> Result<(), HwError> {
        self.0.push(Event::Reset(high));
        Ok(())
    }
}

pub struct MockSupplies(Harness);

impl Supplies for MockSupplies {
    fn enable(&mut self) -> Result<(), HwError> {
        if self.0.inner().fail_supplies {
            return Err(HwError::SupplyUnavailable("vci".into()));
        }

        self.0.push(Event::SuppliesOn);
        Ok(())
    }

    fn disable(&mut self) -> Result<(), HwError> {
        self.0.push(Event::SuppliesOff);
        Ok(())
    }
}

pub struct MockDelay(Harness);

impl Delay for MockDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.0.push(Event::Delay(ms));
    }
}

/// Directory under the system temp dir, removed on drop.
pub struct ScratchDir(PathBuf);

impl ScratchDir {
    pub fn new(name: &str) -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);

        let path = std::env::temp_dir().join(format!(
            "artik-display-{}-{}-{name}",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::Relaxed),
        ));
        fs::create_dir_all(&path).unwrap();

        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn file(&self, name: &str, content: &str) -> PathBuf {
        self.file_bytes(name, content.as_bytes())
    }

    pub fn file_bytes(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.0.join(name);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();

        path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

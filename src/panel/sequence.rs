//! HX8394D initialization tables and command scripts
//!
//! Tables are opaque datasheet byte strings (HX8394-D_DS_v02_150127), sent
//! verbatim one entry per DCS packet.

use log::{debug, error};

use crate::{
    dsi::{self, DcsTransport, TransportError},
    hw::Delay,
};

/// DCS opcodes the drivers issue outside of the tables.
pub mod dcs {
    pub const SLPIN: u8 = 0x10;
    pub const SLPOUT: u8 = 0x11;
    pub const DISPOFF: u8 = 0x28;
    pub const DISPON: u8 = 0x29;
    pub const WRDISBV: u8 = 0x51;
    pub const GETID1: u8 = 0xda;
    pub const GETID2: u8 = 0xdb;
    pub const GETID3: u8 = 0xdc;
}

/// Largest packet a table entry may hold.
pub const MAX_ENTRY_LEN: usize = 64;

/// Ordered list of register writes. Each entry is one packet: opcode first,
/// then payload.
#[derive(Clone, Copy, Debug)]
pub struct CommandTable {
    head: &'static [&'static [u8]],
    tail: &'static [&'static [u8]],
}

impl CommandTable {
    pub const fn new(entries: &'static [&'static [u8]]) -> Self {
        Self { head: entries, tail: &[] }
    }

    /// Append board specific entries after the shared ones.
    pub const fn with_tail(self, tail: &'static [&'static [u8]]) -> Self {
        Self { head: self.head, tail }
    }

    pub fn len(&self) -> usize {
        self.head.len() + self.tail.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn entries(&self) -> impl Iterator<Item = &'static [u8]> + '_ {
        self.head.iter().chain(self.tail.iter()).copied()
    }
}

/// One step of a panel command script.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Single packet
    Dcs(&'static [u8]),
    /// Sleep, in milliseconds
    Delay(u32),
    /// The board's full [CommandTable]
    Table,
}

pub type Script = &'static [Step];

/// Sends one packet, logging the failure with its content.
pub(crate) fn write_packet<T: DcsTransport + ?Sized>(
    transport: &mut T,
    data: &[u8],
) -> Result<(), TransportError> {
    if data.is_empty() {
        return Err(TransportError::Empty);
    }

    debug!("dcs write: {}", dsi::hex(data));

    transport.write_buffer(data).inspect_err(|e| {
        error!("error {e} writing dcs seq: {}", dsi::hex(data));
    })
}

/// Run a script, stopping at the first failed write.
pub(crate) fn run_script<T, D>(
    script: Script,
    table: &CommandTable,
    transport: &mut T,
    delay: &mut D,
) -> Result<(), TransportError>
where
    T: DcsTransport + ?Sized,
    D: Delay + ?Sized,
{
    for step in script {
        match step {
            Step::Dcs(data) => write_packet(transport, data)?,
            Step::Delay(ms) => delay.delay_ms(*ms),
            Step::Table => {
                for entry in table.entries() {
                    write_packet(transport, entry)?;
                }
            }
        }
    }

    Ok(())
}

const HX8394D_BASE: [&[u8]; 24] = [
    // SETEXTC: Set extension command
    &[0xb9, 0xff, 0x83, 0x94],
    // SETMIPI: Set MIPI control
    &[0xba, 0x73, 0x83],
    // SETPOWER: Set power related register
    &[
        0xb1, 0x6c, 0x12, 0x12, 0x24, 0xe4, 0x11, 0xf1, 0x80, 0xe4, 0xd7, 0x23, 0x80, 0xc0,
        0xd2, 0x58,
    ],
    // SETDISP: Set display related register
    &[0xb2, 0x00, 0x64, 0x10, 0x07, 0x80, 0x1c, 0x08, 0x08, 0x1c, 0x4d, 0x00],
    // SETCYC: Set display waveform cycles
    &[0xb4, 0x00, 0xff, 0x03, 0x5a, 0x03, 0x5a, 0x03, 0x5a, 0x01, 0x6a, 0x01, 0x6a],
    // SETGIP_0: Set GIP option 0
    &[
        0xd3, 0x00, 0x06, 0x00, 0x40, 0x1a, 0x08, 0x00, 0x32, 0x10, 0x07, 0x00, 0x07, 0x54,
        0x15, 0x0f, 0x05, 0x04, 0x02, 0x12, 0x10, 0x05, 0x07, 0x33, 0x33, 0x0b, 0x0b, 0x37,
        0x10, 0x07, 0x07,
    ],
    // SETGIP_1
    &[
        0xd5, 0x19, 0x19, 0x18, 0x18, 0x1a, 0x1a, 0x1b, 0x1b, 0x04, 0x05, 0x06, 0x07, 0x00,
        0x01, 0x02, 0x03, 0x20, 0x21, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18,
        0x18, 0x18, 0x18, 0x22, 0x23, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18,
        0x18, 0x18, 0x18,
    ],
    // SETGIP_2
    &[
        0xd6, 0x18, 0x18, 0x19, 0x19, 0x1a, 0x1a, 0x1b, 0x1b, 0x03, 0x02, 0x01, 0x00, 0x07,
        0x06, 0x05, 0x04, 0x23, 0x22, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18,
        0x18, 0x18, 0x18, 0x21, 0x20, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18,
        0x18, 0x18, 0x18,
    ],
    // SETGAMMA: Set gamma curve related setting
    &[
        0xe0, 0x00, 0x02, 0x06, 0x21, 0x25, 0x3f, 0x17, 0x3d, 0x06, 0x09, 0x0c, 0x17, 0x0e,
        0x12, 0x14, 0x12, 0x13, 0x08, 0x13, 0x16, 0x18, 0x00, 0x02, 0x06, 0x21, 0x25, 0x3f,
        0x17, 0x3d, 0x06, 0x09, 0x0c, 0x17, 0x0e, 0x12, 0x14, 0x12, 0x13, 0x08, 0x13, 0x16,
        0x18,
    ],
    // SET_BANK 0
    &[0xbd, 0x00],
    // SETDGCLUT
    &[
        0xc1, 0x01, 0x00, 0x03, 0x07, 0x0e, 0x18, 0x22, 0x2c, 0x35, 0x3d, 0x44, 0x4b, 0x54,
        0x5c, 0x64, 0x6c, 0x73, 0x7c, 0x83, 0x8b, 0x93, 0x9a, 0xa1, 0xa9, 0xb0, 0xb9, 0xbf,
        0xc9, 0xd1, 0xd8, 0xe0, 0xe6, 0xef, 0xf7, 0x16, 0x8b, 0xb4, 0x57, 0x10, 0xfb, 0x34,
        0xad,
    ],
    // SET_BANK 1
    &[0xbd, 0x01],
    // SETDGCLUT
    &[
        0xc1, 0x00, 0x03, 0x06, 0x0d, 0x16, 0x1e, 0x28, 0x32, 0x3a, 0x41, 0x48, 0x4e, 0x57,
        0x5f, 0x66, 0x6d, 0x75, 0x7c, 0x83, 0x8a, 0x91, 0x99, 0xa1, 0xa8, 0xaf, 0xb5, 0xbc,
        0xc5, 0xcd, 0xd4, 0xda, 0xe3, 0xe8, 0x1f, 0x9a, 0x51, 0x06, 0x26, 0xf0, 0x3d, 0x5e,
        0xc0,
    ],
    // SET_BANK 2
    &[0xbd, 0x02],
    // SETDGCLUT
    &[
        0xc1, 0x00, 0x03, 0x07, 0x0e, 0x18, 0x20, 0x2b, 0x34, 0x3c, 0x43, 0x4a, 0x52, 0x5a,
        0x62, 0x69, 0x71, 0x79, 0x80, 0x88, 0x90, 0x98, 0x9f, 0xa6, 0xad, 0xb5, 0xbc, 0xc4,
        0xcc, 0xd4, 0xda, 0xe2, 0xea, 0xf2, 0x14, 0x72, 0x59, 0x5e, 0x60, 0x16, 0x6a, 0x7e,
        0x40,
    ],
    // SETVCOM: Set VCOM voltage
    &[0xb6, 0x3a, 0x3a],
    // SETPANEL
    &[0xcc, 0x09],
    // SETOFFSET
    &[0xd2, 0x55],
    // SETSTBA: Set source option
    &[0xc0, 0x30, 0x14],
    // SETVDC: Set internal digital voltage
    &[0xbc, 0x07],
    // SETPTBA: Set power option
    &[0xbf, 0x41, 0x0e, 0x01],
    // SETTCONOPT: Set TCON option
    &[0xc7, 0x00, 0xc0, 0x40, 0xc0],
    // SETCEMODE: Set color enhancement mode
    &[0xe4, 0x02, 0x01],
    &[0xdf, 0x8e],
];

const CABC_TAIL: [&[u8]; 3] = [
    // WRCABC: content adaptive brightness control
    &[0x55, 0x10],
    // WRCTRLD: write control display
    &[0x53, 0x2c],
    // WRCABCMB: CABC minimum brightness
    &[0x5e, 0x00],
];

/// Nexell reference board: shared table followed by CABC setup.
pub const NEXELL_TABLE: CommandTable = CommandTable::new(&HX8394D_BASE).with_tail(&CABC_TAIL);

/// AVD-TT80WX-CN-039-A module.
pub const AVD_TABLE: CommandTable = CommandTable::new(&HX8394D_BASE);

pub const NEXELL_INIT: Script = &[
    Step::Dcs(&[dcs::DISPOFF]),
    Step::Dcs(&[dcs::SLPIN]),
    Step::Delay(150),
    Step::Table,
    Step::Dcs(&[dcs::SLPOUT]),
    Step::Delay(150),
    Step::Dcs(&[dcs::DISPON]),
];

pub const NEXELL_ENABLE: Script = &[Step::Dcs(&[dcs::DISPON])];

pub const NEXELL_DISABLE: Script = &[Step::Dcs(&[dcs::DISPOFF])];

pub const AVD_INIT: Script = &[
    Step::Dcs(&[dcs::DISPOFF]),
    Step::Delay(150),
    Step::Dcs(&[dcs::SLPIN]),
    Step::Delay(150),
    Step::Table,
    Step::Dcs(&[dcs::SLPOUT]),
    Step::Delay(150),
    Step::Dcs(&[dcs::DISPON]),
    Step::Delay(150),
];

pub const AVD_ENABLE: Script = &[
    Step::Dcs(&[dcs::SLPOUT]),
    Step::Delay(150),
    Step::Dcs(&[dcs::DISPON]),
    Step::Delay(150),
];

pub const AVD_DISABLE: Script = &[
    Step::Dcs(&[dcs::DISPOFF]),
    Step::Delay(150),
    Step::Dcs(&[dcs::SLPIN]),
    Step::Delay(150),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Event, Harness};

    #[test]
    fn table_sizes() {
        assert_eq!(NEXELL_TABLE.len(), 27);
        assert_eq!(AVD_TABLE.len(), 24);
        assert!(!AVD_TABLE.is_empty());
    }

    #[test]
    fn entries_fit_a_packet() {
        for entry in NEXELL_TABLE.entries() {
            assert!(!entry.is_empty());
            assert!(entry.len() <= MAX_ENTRY_LEN, "entry {:#04x} too long", entry[0]);
        }
    }

    #[test]
    fn table_order_and_lengths() {
        let entries: Vec<_> = NEXELL_TABLE.entries().collect();

        assert_eq!(entries[0], &[0xb9, 0xff, 0x83, 0x94]);
        assert_eq!(entries[2].len(), 16);
        assert_eq!(entries[5].len(), 31);
        assert_eq!(entries[6].len(), 45);
        assert_eq!(entries[8].len(), 43);
        assert_eq!(entries[23], &[0xdf, 0x8e]);
        assert_eq!(entries[26], &[0x5e, 0x00]);

        let avd: Vec<_> = AVD_TABLE.entries().collect();
        assert_eq!(avd[..], entries[..24]);
    }

    #[test]
    fn script_expands_table() {
        let h = Harness::new();
        let (mut transport, mut delay) = (h.transport(), h.delay());

        run_script(AVD_INIT, &AVD_TABLE, &mut transport, &mut delay).unwrap();

        let events = h.events();
        assert_eq!(events.len(), 4 + 24 + 4);
        assert_eq!(events[0], Event::Write(vec![dcs::DISPOFF]));
        assert_eq!(events[1], Event::Delay(150));
        assert_eq!(events[4], Event::Write(vec![0xb9, 0xff, 0x83, 0x94]));
        assert_eq!(events[28], Event::Write(vec![dcs::SLPOUT]));
        assert_eq!(events[31], Event::Delay(150));
    }

    #[test]
    fn script_stops_at_first_failure() {
        let h = Harness::new();
        h.fail_write_at(3);
        let (mut transport, mut delay) = (h.transport(), h.delay());

        let res = run_script(NEXELL_INIT, &NEXELL_TABLE, &mut transport, &mut delay);

        assert!(res.is_err());
        // DISPOFF, SLPIN, delay, then only the first table entry went out.
        assert_eq!(h.writes().len(), 3);
        assert!(!h.events().contains(&Event::Write(vec![dcs::SLPOUT])));
    }

    #[test]
    fn empty_packet_rejected() {
        let h = Harness::new();
        let mut transport = h.transport();

        assert!(matches!(write_packet(&mut transport, &[]), Err(TransportError::Empty)));
        assert!(h.writes().is_empty());
    }
}

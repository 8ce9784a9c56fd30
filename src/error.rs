// Error taxonomy of the core. Cartridge and BIOS loading surface typed
// failures; at run time the only fatal condition is an illegal opcode, which
// carries a dump of the most recently executed program counters so the caller
// can see how execution got there.
use std::fmt::{self, Display, Formatter};
use std::io;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // The file ends before the 0100-014F information area.
    MissingHeader,
    HeaderChecksum { expect: u8, found: u8 },
    UnsupportedCartridgeType(u8),
    UnsupportedRomSize(u8),
    UnsupportedRamSize(u8),
    // The file is larger than the size its own header declares.
    RomSize,
    // A BIOS image must be exactly 256 bytes with an 8 bit XOR checksum of 0xf4.
    BadBios,
    Io(String),
    IllegalOpcode { opcode: u8, pc: u16, trace: Vec<u16> },
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingHeader => write!(f, "missing required information area at 0100-014f"),
            Error::HeaderChecksum { expect, found } => {
                write!(f, "header checksum is incorrect: expect 0x{:02x}, found 0x{:02x}", expect, found)
            }
            Error::UnsupportedCartridgeType(n) => write!(f, "unsupported cartridge type: 0x{:02x}", n),
            Error::UnsupportedRomSize(n) => write!(f, "unsupported rom size: 0x{:02x}", n),
            Error::UnsupportedRamSize(n) => write!(f, "unsupported ram size: 0x{:02x}", n),
            Error::RomSize => write!(f, "rom is larger than its header declares"),
            Error::BadBios => write!(f, "bios image is not 256 bytes or fails its checksum"),
            Error::Io(message) => write!(f, "{}", message),
            Error::IllegalOpcode { opcode, pc, .. } => {
                write!(f, "illegal opcode 0x{:02x} at 0x{:04x}", opcode, pc)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

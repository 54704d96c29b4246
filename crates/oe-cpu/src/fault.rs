//! Guest-visible fault conditions

use thiserror::Error;

/// A condition the guest (or the embedding runtime) must handle.
///
/// Faults carry the guest program counter of the responsible instruction
/// so the runtime can deliver a precise exception.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    #[error("illegal instruction 0x{word:08x} at 0x{addr:08x}")]
    IllegalInstruction { addr: u32, word: u32 },

    #[error("unimplemented instruction {name} (0x{word:08x}) at 0x{addr:08x}")]
    Unimplemented {
        addr: u32,
        word: u32,
        name: &'static str,
    },

    #[error("instruction fetch fault at 0x{addr:08x}")]
    FetchAccess { addr: u32 },

    #[error("data access fault at ea 0x{ea:08x} from 0x{addr:08x} (write: {write})")]
    DataAccess { addr: u32, ea: u32, write: bool },

    #[error("trap taken at 0x{addr:08x}")]
    Trap { addr: u32 },

    #[error("unknown kernel call {id} at 0x{addr:08x}")]
    InvalidKernelCall { addr: u32, id: u32 },
}

impl Fault {
    /// Guest program counter the fault is attributed to
    pub fn address(&self) -> u32 {
        match *self {
            Fault::IllegalInstruction { addr, .. }
            | Fault::Unimplemented { addr, .. }
            | Fault::FetchAccess { addr }
            | Fault::DataAccess { addr, .. }
            | Fault::Trap { addr }
            | Fault::InvalidKernelCall { addr, .. } => addr,
        }
    }
}

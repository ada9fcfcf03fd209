//! Serialized machine images.
//!
//! A stateless image holds the regions produced by the assembler and boots cold.
//! A stateful image is a snapshot of a machine: its registers and the whole memory.

use crate::mem::{DATA, DATA_LEN, FLAG_ADDR, MEM_LEN, STACK, TEXT, TEXT_LEN};
use crate::reg::Reg;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Empty image")]
    Empty,

    #[error("Unknown image tag: 0x{0:02X}")]
    UnknownTag(u8),

    #[error("Invalid {kind} image: expected {expected} bytes but got {actual}")]
    BadLength {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Indexed by register id.
    pub regs: [u8; 4],
    pub memory: [u8; MEM_LEN],
}

impl Snapshot {
    pub fn get(&self, reg: Reg) -> u8 {
        self.regs[reg.id() as usize]
    }

    pub fn data(&self) -> &[u8] {
        &self.memory[DATA]
    }

    pub fn stack(&self) -> &[u8] {
        &self.memory[STACK]
    }

    pub fn flag(&self) -> u8 {
        self.memory[FLAG_ADDR]
    }

    pub fn text(&self) -> &[u8] {
        &self.memory[TEXT]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Image {
    Stateless {
        data: [u8; DATA_LEN],
        text: [u8; TEXT_LEN],
    },
    Stateful(Snapshot),
}

impl Image {
    pub const STATELESS: u8 = 0x01;
    pub const STATEFUL: u8 = 0x02;

    pub const STATELESS_LEN: usize = 1 + DATA_LEN + TEXT_LEN;
    pub const STATEFUL_LEN: usize = 1 + 4 + MEM_LEN;

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Image::Stateless { data, text } => {
                let mut bin = Vec::with_capacity(Self::STATELESS_LEN);
                bin.push(Self::STATELESS);
                bin.extend_from_slice(data);
                bin.extend_from_slice(text);
                bin
            }
            Image::Stateful(snapshot) => {
                let mut bin = Vec::with_capacity(Self::STATEFUL_LEN);
                bin.push(Self::STATEFUL);
                bin.extend_from_slice(&snapshot.regs);
                bin.extend_from_slice(&snapshot.memory);
                bin
            }
        }
    }

    pub fn from_bytes(bin: &[u8]) -> Result<Self, Error> {
        let (&tag, body) = bin.split_first().ok_or(Error::Empty)?;
        match tag {
            Self::STATELESS => {
                check_len("stateless", Self::STATELESS_LEN, bin.len())?;
                let mut data = [0; DATA_LEN];
                let mut text = [0; TEXT_LEN];
                data.copy_from_slice(&body[..DATA_LEN]);
                text.copy_from_slice(&body[DATA_LEN..]);
                Ok(Image::Stateless { data, text })
            }
            Self::STATEFUL => {
                check_len("stateful", Self::STATEFUL_LEN, bin.len())?;
                let (regs, memory) = body.split_at(4);
                let mut snapshot = Snapshot {
                    regs: [0; 4],
                    memory: [0; MEM_LEN],
                };
                snapshot.regs.copy_from_slice(regs);
                snapshot.memory.copy_from_slice(memory);
                Ok(Image::Stateful(snapshot))
            }
            _ => Err(Error::UnknownTag(tag)),
        }
    }
}

fn check_len(kind: &'static str, expected: usize, actual: usize) -> Result<(), Error> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::BadLength {
            kind,
            expected,
            actual,
        })
    }
}

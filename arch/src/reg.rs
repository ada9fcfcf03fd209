use num_enum::{FromPrimitive, IntoPrimitive};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    Default,
    FromPrimitive,
    IntoPrimitive,
    EnumString,
    Display,
    Eq,
)]
#[repr(u8)]
pub enum Reg {
    #[default]
    R0,
    R1,
    SP,
    PC,
}

impl Reg {
    pub const ALL: [Reg; 4] = [Reg::R0, Reg::R1, Reg::SP, Reg::PC];

    /// Register names are case sensitive, as the lexer only accepts `R0`, `R1`, `SP` and `PC`.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.parse::<Self>() {
            Ok(a) => Ok(a),
            Err(_) => Err(format!("Unknown reg name: {s}")),
        }
    }

    /// Register selected by the low two bits of an instruction field.
    pub fn from_bits(bits: u8) -> Self {
        Reg::from(bits & 0b11)
    }

    pub fn id(self) -> u8 {
        self.into()
    }
}

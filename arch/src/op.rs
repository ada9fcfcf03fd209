use crate::reg::Reg;
use color_print::cformat;
use num_enum::{FromPrimitive, IntoPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Default,
    FromPrimitive,
    IntoPrimitive,
    EnumString,
    Display,
)]
#[repr(u8)]
pub enum OpKind {
    #[default]
    MOV = 0x0,
    CMP = 0x1,
    SHL = 0x2,
    SHR = 0x3,
    ADD = 0x4,
    SUB = 0x5,
    AND = 0x6,
    ORR = 0x7,
    NOT = 0x8,
    PSH = 0x9,
    POP = 0xA,
    SYS = 0xB,
    JMP = 0xC,
    LDI = 0xD,
    LDA = 0xE,
    STA = 0xF,
}

/// Instruction shape, selected by the top two bits of the first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    RegReg,
    Reg,
    RegValue,
    Jump,
}

impl OpKind {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.parse::<Self>() {
            Ok(a) => Ok(a),
            Err(_) => Err(format!("Undefined Op: {s}")),
        }
    }

    pub fn opcode(self) -> u8 {
        self.into()
    }

    pub fn from_opcode(opcode: u8) -> Self {
        OpKind::from(opcode & 0xF)
    }

    pub fn class(self) -> Class {
        match self.opcode() >> 2 {
            0b00 | 0b01 => Class::RegReg,
            0b10 => Class::Reg,
            _ if self == OpKind::JMP => Class::Jump,
            _ => Class::RegValue,
        }
    }

    /// Encoded size in bytes.
    pub fn size(self) -> usize {
        match self.class() {
            Class::RegReg | Class::Reg => 1,
            Class::RegValue | Class::Jump => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    MOV(Reg, Reg),
    CMP(Reg, Reg),
    SHL(Reg, Reg),
    SHR(Reg, Reg),
    ADD(Reg, Reg),
    SUB(Reg, Reg),
    AND(Reg, Reg),
    ORR(Reg, Reg),
    NOT(Reg),
    PSH(Reg),
    POP(Reg),
    SYS(Reg),
    /// Jump to the address if `flag & mask != 0`.
    JMP(u8, u8),
    /// Assembled from an immediate or a data label; at run time the operand is an address,
    /// loaded from like `LDA`.
    LDI(Reg, u8),
    LDA(Reg, u8),
    STA(Reg, u8),
}

impl Op {
    pub fn reg_reg(kind: OpKind, a: Reg, b: Reg) -> Option<Op> {
        Some(match kind {
            OpKind::MOV => Op::MOV(a, b),
            OpKind::CMP => Op::CMP(a, b),
            OpKind::SHL => Op::SHL(a, b),
            OpKind::SHR => Op::SHR(a, b),
            OpKind::ADD => Op::ADD(a, b),
            OpKind::SUB => Op::SUB(a, b),
            OpKind::AND => Op::AND(a, b),
            OpKind::ORR => Op::ORR(a, b),
            _ => return None,
        })
    }

    pub fn reg(kind: OpKind, r: Reg) -> Option<Op> {
        Some(match kind {
            OpKind::NOT => Op::NOT(r),
            OpKind::PSH => Op::PSH(r),
            OpKind::POP => Op::POP(r),
            OpKind::SYS => Op::SYS(r),
            _ => return None,
        })
    }

    pub fn reg_value(kind: OpKind, r: Reg, value: u8) -> Option<Op> {
        Some(match kind {
            OpKind::LDI => Op::LDI(r, value),
            OpKind::LDA => Op::LDA(r, value),
            OpKind::STA => Op::STA(r, value),
            _ => return None,
        })
    }

    pub fn kind(&self) -> OpKind {
        match self {
            Op::MOV(..) => OpKind::MOV,
            Op::CMP(..) => OpKind::CMP,
            Op::SHL(..) => OpKind::SHL,
            Op::SHR(..) => OpKind::SHR,
            Op::ADD(..) => OpKind::ADD,
            Op::SUB(..) => OpKind::SUB,
            Op::AND(..) => OpKind::AND,
            Op::ORR(..) => OpKind::ORR,
            Op::NOT(..) => OpKind::NOT,
            Op::PSH(..) => OpKind::PSH,
            Op::POP(..) => OpKind::POP,
            Op::SYS(..) => OpKind::SYS,
            Op::JMP(..) => OpKind::JMP,
            Op::LDI(..) => OpKind::LDI,
            Op::LDA(..) => OpKind::LDA,
            Op::STA(..) => OpKind::STA,
        }
    }

    pub fn size(&self) -> usize {
        self.kind().size()
    }
}

// ----------------------------------------------------------------------------

fn enc_format(opcode: u8, a: u8, b: u8) -> u8 {
    (opcode << 4) | ((a & 0b11) << 2) | (b & 0b11)
}

fn dec_format(bin: u8) -> (u8, u8, u8) {
    let opcode = (bin >> 4) & 0xF;
    let a = (bin >> 2) & 0b11;
    let b = bin & 0b11;
    (opcode, a, b)
}

impl Op {
    /// Encoded bytes, one or two depending on the class.
    pub fn to_bin(&self) -> Vec<u8> {
        let op = self.kind().opcode();
        match *self {
            Op::MOV(a, b)
            | Op::CMP(a, b)
            | Op::SHL(a, b)
            | Op::SHR(a, b)
            | Op::ADD(a, b)
            | Op::SUB(a, b)
            | Op::AND(a, b)
            | Op::ORR(a, b) => vec![enc_format(op, a.id(), b.id())],
            Op::NOT(r) | Op::PSH(r) | Op::POP(r) | Op::SYS(r) => vec![enc_format(op, 0, r.id())],
            Op::LDI(r, v) | Op::LDA(r, v) | Op::STA(r, v) => vec![enc_format(op, r.id(), 0), v],
            Op::JMP(mask, target) => vec![(op << 4) | (mask & 0b111), target],
        }
    }

    /// Decodes an instruction from its first byte and, for two-byte classes, its second byte.
    /// `second` is ignored by one-byte classes.
    pub fn decode(first: u8, second: u8) -> Op {
        let (opcode, a, b) = dec_format(first);
        let (ra, rb) = (Reg::from_bits(a), Reg::from_bits(b));
        match OpKind::from_opcode(opcode) {
            OpKind::MOV => Op::MOV(ra, rb),
            OpKind::CMP => Op::CMP(ra, rb),
            OpKind::SHL => Op::SHL(ra, rb),
            OpKind::SHR => Op::SHR(ra, rb),
            OpKind::ADD => Op::ADD(ra, rb),
            OpKind::SUB => Op::SUB(ra, rb),
            OpKind::AND => Op::AND(ra, rb),
            OpKind::ORR => Op::ORR(ra, rb),
            OpKind::NOT => Op::NOT(rb),
            OpKind::PSH => Op::PSH(rb),
            OpKind::POP => Op::POP(rb),
            OpKind::SYS => Op::SYS(rb),
            OpKind::JMP => Op::JMP(first & 0b111, second),
            OpKind::LDI => Op::LDI(ra, second),
            OpKind::LDA => Op::LDA(ra, second),
            OpKind::STA => Op::STA(ra, second),
        }
    }

    /// Decodes the instruction at the start of `bin`, or `None` if it is truncated.
    pub fn from_bin(bin: &[u8]) -> Option<Op> {
        let first = *bin.first()?;
        match OpKind::from_opcode(first >> 4).size() {
            1 => Some(Op::decode(first, 0)),
            _ => Some(Op::decode(first, *bin.get(1)?)),
        }
    }
}

// ----------------------------------------------------------------------------

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.kind();
        match *self {
            Op::MOV(a, b)
            | Op::CMP(a, b)
            | Op::SHL(a, b)
            | Op::SHR(a, b)
            | Op::ADD(a, b)
            | Op::SUB(a, b)
            | Op::AND(a, b)
            | Op::ORR(a, b) => write!(f, "{name} {a}, {b}"),
            Op::NOT(r) | Op::PSH(r) | Op::POP(r) | Op::SYS(r) => write!(f, "{name} {r}"),
            Op::LDI(r, v) | Op::LDA(r, v) | Op::STA(r, v) => write!(f, "{name} {r}, 0x{v:02X}"),
            Op::JMP(mask, target) => write!(f, "{name} {mask:03b}, 0x{target:02X}"),
        }
    }
}

impl Op {
    pub fn cformat(&self) -> String {
        macro_rules! rr {
            ($name:expr, $a:expr, $b:expr) => {
                cformat!("<r>{:<4}</><b>{}, {}</>", $name, $a, $b)
            };
        }

        macro_rules! rv {
            ($name:expr, $a:expr, $v:expr) => {
                cformat!("<r>{:<4}</><b>{}, <y>0x{:02X}</></>", $name, $a, $v)
            };
        }

        let name = self.kind().to_string();
        match *self {
            Op::MOV(a, b)
            | Op::CMP(a, b)
            | Op::SHL(a, b)
            | Op::SHR(a, b)
            | Op::ADD(a, b)
            | Op::SUB(a, b)
            | Op::AND(a, b)
            | Op::ORR(a, b) => rr!(name, a, b),
            Op::NOT(r) | Op::PSH(r) | Op::POP(r) | Op::SYS(r) => cformat!("<r>{:<4}</><b>{}</>", name, r),
            Op::LDI(r, v) | Op::LDA(r, v) | Op::STA(r, v) => rv!(name, r, v),
            Op::JMP(mask, target) => rv!(name, format!("{mask:03b}"), target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_op {
        ($name:ident, $op:expr, $bin:expr) => {
            #[test]
            fn $name() {
                let op = $op;
                let bin: Vec<u8> = $bin;
                assert_eq!(op.to_bin(), bin);
                assert_eq!(op.size(), bin.len());
                assert_eq!(Op::from_bin(&bin), Some(op));
            }
        };
    }

    test_op!(mov, Op::MOV(Reg::R1, Reg::PC), vec![0x07]);
    test_op!(cmp, Op::CMP(Reg::R0, Reg::R1), vec![0x11]);
    test_op!(shl, Op::SHL(Reg::SP, Reg::R0), vec![0x28]);
    test_op!(shr, Op::SHR(Reg::R1, Reg::R1), vec![0x35]);
    test_op!(add, Op::ADD(Reg::R0, Reg::R1), vec![0x41]);
    test_op!(sub, Op::SUB(Reg::PC, Reg::SP), vec![0x5E]);
    test_op!(and, Op::AND(Reg::R1, Reg::R0), vec![0x64]);
    test_op!(orr, Op::ORR(Reg::PC, Reg::PC), vec![0x7F]);
    test_op!(not, Op::NOT(Reg::R1), vec![0x81]);
    test_op!(psh, Op::PSH(Reg::SP), vec![0x92]);
    test_op!(pop, Op::POP(Reg::PC), vec![0xA3]);
    test_op!(sys, Op::SYS(Reg::R0), vec![0xB0]);
    test_op!(jmp, Op::JMP(0b101, 0x51), vec![0xC5, 0x51]);
    test_op!(ldi, Op::LDI(Reg::R0, 0x00), vec![0xD0, 0x00]);
    test_op!(lda, Op::LDA(Reg::R1, 0x0F), vec![0xE4, 0x0F]);
    test_op!(sta, Op::STA(Reg::SP, 0x10), vec![0xF8, 0x10]);

    #[test]
    fn classes() {
        for opcode in 0..=0xF {
            let kind = OpKind::from_opcode(opcode);
            assert_eq!(kind.opcode(), opcode);
            let expected = match opcode >> 2 {
                0 | 1 => Class::RegReg,
                2 => Class::Reg,
                _ if opcode == 0xC => Class::Jump,
                _ => Class::RegValue,
            };
            assert_eq!(kind.class(), expected);
        }
    }

    #[test]
    fn every_first_byte_decodes_to_its_opcode() {
        for first in 0..=u8::MAX {
            let op = Op::decode(first, 0x42);
            assert_eq!(op.kind().opcode(), first >> 4);
            assert_eq!(op.to_bin()[0] >> 4, first >> 4);
        }
    }

    #[test]
    fn truncated() {
        assert_eq!(Op::from_bin(&[]), None);
        assert_eq!(Op::from_bin(&[0xE0]), None);
        assert_eq!(Op::from_bin(&[0xB1]), Some(Op::SYS(Reg::R1)));
    }

    #[test]
    fn constructors_check_class() {
        assert_eq!(Op::reg_reg(OpKind::ADD, Reg::R0, Reg::R1), Some(Op::ADD(Reg::R0, Reg::R1)));
        assert_eq!(Op::reg_reg(OpKind::NOT, Reg::R0, Reg::R1), None);
        assert_eq!(Op::reg(OpKind::POP, Reg::R1), Some(Op::POP(Reg::R1)));
        assert_eq!(Op::reg(OpKind::LDA, Reg::R1), None);
        assert_eq!(Op::reg_value(OpKind::STA, Reg::R0, 3), Some(Op::STA(Reg::R0, 3)));
        assert_eq!(Op::reg_value(OpKind::JMP, Reg::R0, 3), None);
    }

    #[test]
    fn display() {
        assert_eq!(Op::LDI(Reg::R0, 5).to_string(), "LDI R0, 0x05");
        assert_eq!(Op::JMP(0b010, 0x53).to_string(), "JMP 010, 0x53");
        assert_eq!(Op::MOV(Reg::R0, Reg::SP).to_string(), "MOV R0, SP");
        assert_eq!(OpKind::parse("ORR"), Ok(OpKind::ORR));
        assert!(OpKind::parse("XOR").is_err());
    }
}

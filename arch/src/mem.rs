//! Memory map of the 256-byte machine image.
//!
//! ```text
//! 0x00 ┌──────────┐
//!      │ data  16 │
//! 0x10 ├──────────┤
//!      │ stack 64 │
//! 0x50 ├──────────┤
//!      │ flag   1 │
//! 0x51 ├──────────┤
//!      │ text 175 │
//! 0xFF └──────────┘
//! ```

use std::ops::Range;

pub const DATA_START: usize = 0;
pub const DATA_LEN: usize = 16;

pub const STACK_START: usize = DATA_START + DATA_LEN;
pub const STACK_LEN: usize = 64;
pub const STACK_END: usize = STACK_START + STACK_LEN;

pub const FLAG_ADDR: usize = STACK_END;
pub const FLAG_LEN: usize = 1;

pub const TEXT_START: usize = FLAG_ADDR + FLAG_LEN;
pub const TEXT_LEN: usize = 175;

pub const MEM_LEN: usize = TEXT_START + TEXT_LEN;

pub const DATA: Range<usize> = DATA_START..DATA_START + DATA_LEN;
pub const STACK: Range<usize> = STACK_START..STACK_END;
pub const TEXT: Range<usize> = TEXT_START..MEM_LEN;

// Every address must fit in a single register.
const _: () = assert!(MEM_LEN == u8::MAX as usize + 1);

/// Bit patterns of the flag byte.
pub struct Flag;

impl Flag {
    pub const GREATER: u8 = 0b001;
    pub const EQUAL: u8 = 0b010;
    pub const LESS: u8 = 0b100;
    pub const HALT: u8 = 0x80;
}

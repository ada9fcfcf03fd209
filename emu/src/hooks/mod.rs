//! Observers run alongside the interpreter loop.

pub mod dump;
pub mod trace;

use crate::Machine;
use tvm_arch::op::Op;

pub trait Hook {
    /// Called once before the first instruction.
    fn init(&mut self, _machine: &Machine) {}

    /// Called after `op`, fetched from `pc`, has executed.
    fn exec(&mut self, step: u64, pc: u8, op: Op, machine: &Machine);
}

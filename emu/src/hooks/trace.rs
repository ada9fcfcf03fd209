use super::Hook;
use crate::Machine;
use log::trace;
use tvm_arch::op::Op;
use tvm_arch::reg::Reg;

/// Logs every executed instruction at trace level.
#[derive(Debug, Default)]
pub struct Trace;

impl Hook for Trace {
    fn exec(&mut self, step: u64, pc: u8, op: Op, machine: &Machine) {
        trace!(
            "[{step:0>4}] {pc:02X}: {:<16} R0={:02X} R1={:02X} SP={:02X} FLAG={:03b}",
            op.to_string(),
            machine.get(Reg::R0),
            machine.get(Reg::R1),
            machine.get(Reg::SP),
            machine.flag() & 0b111,
        );
    }
}

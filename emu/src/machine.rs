use crate::hooks::Hook;
use log::debug;
use std::cmp::Ordering;
use thiserror::Error;
use tvm_arch::image::{Image, Snapshot};
use tvm_arch::mem::{
    Flag, DATA, DATA_LEN, FLAG_ADDR, MEM_LEN, STACK, STACK_END, STACK_START, TEXT, TEXT_LEN,
    TEXT_START,
};
use tvm_arch::op::Op;
use tvm_arch::reg::Reg;

/// Instructions executed by a run unless the caller asks otherwise.
pub const DEFAULT_BUDGET: u64 = 4096;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Stack overflow at PC=0x{pc:02X} (SP=0x{sp:02X})")]
    StackOverflow { pc: u8, sp: u8 },

    #[error("Stack underflow at PC=0x{pc:02X} (SP=0x{sp:02X})")]
    StackUnderflow { pc: u8, sp: u8 },

    #[error("Step budget of {0} instructions exhausted")]
    Runaway(u64),
}

impl Error {
    /// True for faults raised by an instruction, false for an exhausted budget.
    pub fn is_fault(&self) -> bool {
        !matches!(self, Error::Runaway(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine {
    regs: [u8; 4],
    mem: [u8; MEM_LEN],
    exit: Option<u8>,
}

// Register & memory access
impl Machine {
    pub fn get(&self, reg: Reg) -> u8 {
        self.regs[reg.id() as usize]
    }

    pub fn set(&mut self, reg: Reg, val: u8) {
        self.regs[reg.id() as usize] = val;
    }

    pub fn load(&self, addr: u8) -> u8 {
        self.mem[addr as usize]
    }

    pub fn store(&mut self, addr: u8, val: u8) {
        self.mem[addr as usize] = val;
    }

    pub fn flag(&self) -> u8 {
        self.mem[FLAG_ADDR]
    }

    pub fn memory(&self) -> &[u8; MEM_LEN] {
        &self.mem
    }

    /// Stack cells from the base up to `SP`, clamped to the stack region.
    pub fn stack(&self) -> &[u8] {
        let top = (self.get(Reg::SP) as usize).clamp(STACK_START, STACK_END);
        &self.mem[STACK_START..top]
    }

    /// Exit code of the last `SYS`, if the machine has halted.
    pub fn exit_code(&self) -> Option<u8> {
        self.exit
    }
}

impl Machine {
    /// Fresh machine with zeroed registers and stack, `PC` at the text base and `SP` at the stack base.
    pub fn cold(data: &[u8; DATA_LEN], text: &[u8; TEXT_LEN]) -> Self {
        let mut machine = Machine {
            regs: [0; 4],
            mem: [0; MEM_LEN],
            exit: None,
        };
        machine.mem[DATA].copy_from_slice(data);
        machine.mem[TEXT].copy_from_slice(text);
        machine.set(Reg::PC, TEXT_START as u8);
        machine.set(Reg::SP, STACK_START as u8);
        machine
    }

    pub fn resume(snapshot: &Snapshot) -> Self {
        Machine {
            regs: snapshot.regs,
            mem: snapshot.memory,
            exit: None,
        }
    }

    pub fn from_image(image: &Image) -> Self {
        match image {
            Image::Stateless { data, text } => Machine::cold(data, text),
            Image::Stateful(snapshot) => Machine::resume(snapshot),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            regs: self.regs,
            memory: self.mem,
        }
    }
}

// ----------------------------------------------------------------------------
// Execution
// ----------------------------------------------------------------------------

impl Machine {
    pub fn run(&mut self, budget: u64) -> Result<u8, Error> {
        self.run_with(budget, &mut [])
    }

    /// Runs until `SYS`, a fault or `budget` executed instructions.
    /// Every hook sees the machine after each instruction.
    pub fn run_with(&mut self, budget: u64, hooks: &mut [Box<dyn Hook>]) -> Result<u8, Error> {
        self.exit = None;
        for hook in hooks.iter_mut() {
            hook.init(self);
        }
        for step in 0..budget {
            let (pc, op) = self.step()?;
            for hook in hooks.iter_mut() {
                hook.exec(step, pc, op, self);
            }
            if let Some(code) = self.exit {
                debug!("halted with exit code {code} after {} steps", step + 1);
                return Ok(code);
            }
        }
        debug!("budget of {budget} steps exhausted at PC=0x{:02X}", self.get(Reg::PC));
        Err(Error::Runaway(budget))
    }

    /// Executes one instruction and returns its address and decoded form.
    pub fn step(&mut self) -> Result<(u8, Op), Error> {
        let pc = self.get(Reg::PC);
        let first = self.fetch();
        let second = match Op::decode(first, 0).size() {
            1 => 0,
            _ => self.fetch(),
        };
        let op = Op::decode(first, second);
        self.exec(pc, op)?;
        Ok((pc, op))
    }

    fn fetch(&mut self) -> u8 {
        let pc = self.get(Reg::PC);
        self.set(Reg::PC, pc.wrapping_add(1));
        self.load(pc)
    }

    fn exec(&mut self, pc: u8, op: Op) -> Result<(), Error> {
        match op {
            Op::MOV(a, b) => self.set(a, self.get(b)),
            Op::CMP(a, b) => {
                let flag = match self.get(a).cmp(&self.get(b)) {
                    Ordering::Less => Flag::LESS,
                    Ordering::Equal => Flag::EQUAL,
                    Ordering::Greater => Flag::GREATER,
                };
                self.mem[FLAG_ADDR] = flag;
            }
            Op::SHL(a, b) => self.set(a, self.get(a).checked_shl(self.get(b) as u32).unwrap_or(0)),
            Op::SHR(a, b) => self.set(a, self.get(a).checked_shr(self.get(b) as u32).unwrap_or(0)),
            Op::ADD(a, b) => self.set(a, self.get(a).wrapping_add(self.get(b))),
            Op::SUB(a, b) => self.set(a, self.get(a).wrapping_sub(self.get(b))),
            Op::AND(a, b) => self.set(a, self.get(a) & self.get(b)),
            Op::ORR(a, b) => self.set(a, self.get(a) | self.get(b)),
            Op::NOT(r) => self.set(r, !self.get(r)),
            Op::PSH(r) => self.push(pc, self.get(r))?,
            Op::POP(r) => {
                let val = self.pop(pc)?;
                self.set(r, val);
            }
            Op::SYS(r) => {
                self.mem[FLAG_ADDR] |= Flag::HALT;
                self.exit = Some(self.get(r));
            }
            Op::LDI(r, addr) | Op::LDA(r, addr) => self.set(r, self.load(addr)),
            Op::STA(r, addr) => self.store(addr, self.get(r)),
            Op::JMP(mask, target) => {
                if self.flag() & mask != 0 {
                    self.set(Reg::PC, target);
                }
            }
        }
        Ok(())
    }

    fn push(&mut self, pc: u8, val: u8) -> Result<(), Error> {
        let sp = self.get(Reg::SP);
        if !STACK.contains(&(sp as usize)) {
            return Err(Error::StackOverflow { pc, sp });
        }
        self.store(sp, val);
        self.set(Reg::SP, sp + 1);
        Ok(())
    }

    fn pop(&mut self, pc: u8) -> Result<u8, Error> {
        let sp = self.get(Reg::SP);
        if sp as usize <= STACK_START || sp as usize > STACK_END {
            return Err(Error::StackUnderflow { pc, sp });
        }
        let sp = sp - 1;
        self.set(Reg::SP, sp);
        Ok(self.load(sp))
    }
}

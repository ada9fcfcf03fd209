use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use thiserror::Error;
use tvm_arch::mem::STACK_START;
use tvm_arch::op::Op;
use tvm_arch::reg::Reg;

use super::Hook;
use crate::Machine;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to open dump config: {0}")]
    Open(String, #[source] std::io::Error),

    #[error("Malformed dump config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Prints machine state after the instructions listed in a YAML config.
///
/// ```yaml
/// 0x53:          # after the instruction at 0x53
///   stack: true
///   data: [0x00, 0x01]
/// ```
#[derive(Debug)]
pub struct Dump {
    file: Option<String>,
    all: bool,
    list: List,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct List(HashMap<u8, Config>);

#[derive(Debug, Default, Serialize, Deserialize)]
struct Config {
    #[serde(default)]
    stack: bool,
    #[serde(default)]
    data: Vec<u8>,
}

impl Dump {
    pub fn arg(file: Option<String>, all: bool) -> Result<Self, ConfigError> {
        let list = match &file {
            Some(fname) => {
                let reader =
                    File::open(fname).map_err(|e| ConfigError::Open(fname.clone(), e))?;
                serde_yaml::from_reader(BufReader::new(reader))?
            }
            None => List::default(),
        };
        Ok(Self { file, all, list })
    }

    fn get(&self, pc: u8) -> Option<&Config> {
        self.list.0.get(&pc)
    }
}

impl Hook for Dump {
    fn init(&mut self, _machine: &Machine) {
        if self.all {
            println!(" * Dump all");
        }
        if let Some(fname) = &self.file {
            println!(" * Dump[{}] {:?}", self.list.0.len(), fname);
        }
    }

    fn exec(&mut self, _step: u64, pc: u8, _op: Op, machine: &Machine) {
        if let Some(cfg) = self.get(pc) {
            self.print_reg(machine);
            if cfg.stack {
                self.print_stack(machine);
            }
            self.print_data(machine, &cfg.data);
        } else if self.all {
            self.print_reg(machine);
        }
    }
}

impl Dump {
    fn print_reg(&self, machine: &Machine) {
        println!(" +---------+---------+---------+---------+-----------+");
        println!(
            " | R0: {:0>2X} | R1: {:0>2X} | SP: {:0>2X} | PC: {:0>2X} | FLAG: {:03b} |",
            machine.get(Reg::R0),
            machine.get(Reg::R1),
            machine.get(Reg::SP),
            machine.get(Reg::PC),
            machine.flag() & 0b111,
        );
        println!(" +---------+---------+---------+---------+-----------+");
    }

    fn print_stack(&self, machine: &Machine) {
        for (offset, val) in machine.stack().iter().enumerate().rev() {
            println!(" | {:0>2X} : {:0>2X}{:>42}", STACK_START + offset, val, "|");
        }
        println!(" +-------------------------------------------------+");
    }

    fn print_data(&self, machine: &Machine, addrs: &[u8]) {
        for addr in addrs {
            println!(" | {:0>2X} : {:0>2X}{:>42}", addr, machine.load(*addr), "|");
        }
        println!(" +-------------------------------------------------+");
    }
}

use crate::codegen::Program;
use color_print::cformat;
use tvm_arch::mem::{DATA_START, TEXT_START};
use tvm_arch::op::Op;

/// Prints the data cells and a disassembly of the emitted text.
pub fn print_dump(program: &Program) {
    println!("------+----------+------[data]-----------------------------");
    for (name, addr) in program.data_labels.iter() {
        let value = program.data[addr as usize - DATA_START];
        println!(
            "[{:02X}]  | {:02X}       | {}",
            addr,
            value,
            cformat!("<c>{}</> = <y>0x{:02X}</>", name, value)
        );
    }

    println!("------+----------+------[text]-----------------------------");
    let mut offset = 0;
    while offset < program.text_len {
        let addr = (TEXT_START + offset) as u8;
        for name in program.text_labels.names_at(addr) {
            println!("{:6}|{:10}| {}", "", "", cformat!("<g>{}:</>", name));
        }

        let Some(op) = Op::from_bin(&program.text[offset..program.text_len]) else {
            println!("[{:02X}]  | {}", addr, cformat!("<r,s>!! truncated</>"));
            break;
        };
        let bin = op.to_bin();
        let bin_str = bin
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(" ");
        println!("[{:02X}]  | {:<8} |   {}", addr, bin_str, op.cformat());
        offset += bin.len();
    }
    println!("------+----------+-----------------------------------------");
}

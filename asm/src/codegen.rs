use crate::error::Error;
use crate::grammar::tree::{NodeId, Tree};
use crate::label::Labels;
use log::debug;
use tvm_arch::image::Image;
use tvm_arch::mem::{DATA_LEN, DATA_START, TEXT_LEN, TEXT_START};
use tvm_arch::op::{Class, Op, OpKind};
use tvm_arch::reg::Reg;

/// Label that must exist in the text section.
pub const ENTRY: &str = "main";

/// Assembled regions and the label tables used to build them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub data: [u8; DATA_LEN],
    pub text: [u8; TEXT_LEN],
    pub data_labels: Labels,
    pub text_labels: Labels,
    /// Number of text bytes actually emitted.
    pub text_len: usize,
}

impl Program {
    pub fn image(&self) -> Image {
        Image::Stateless {
            data: self.data,
            text: self.text,
        }
    }
}

// ----------------------------------------------------------------------------
// Statement

#[derive(Debug, Clone)]
enum Stmt {
    Label(String, usize),
    Code(Code, usize),
}

#[derive(Debug, Clone)]
enum Code {
    /// Fully determined by the source.
    Op(Op),
    /// Register+value instruction addressing a data label.
    Data(OpKind, Reg, String),
    /// Conditional jump to a text label.
    Jump(u8, String),
}

impl Code {
    fn size(&self) -> usize {
        match self {
            Code::Op(op) => op.size(),
            Code::Data(..) | Code::Jump(..) => 2,
        }
    }

    fn resolve(&self, data: &Labels, text: &Labels, line: usize) -> Result<Op, Error> {
        Ok(match self {
            Code::Op(op) => *op,
            Code::Data(kind, reg, label) => {
                let addr = data.resolve(label, line)?;
                Op::reg_value(*kind, *reg, addr)
                    .ok_or_else(|| operand_error(*kind, "expected a register and a value", line))?
            }
            Code::Jump(mask, label) => Op::JMP(*mask, text.resolve(label, line)?),
        })
    }
}

fn operand_error(kind: OpKind, reason: &str, line: usize) -> Error {
    Error::InvalidOperand {
        op: kind.to_string(),
        reason: reason.to_string(),
        line,
    }
}

fn parse_immediate(text: &str, line: usize) -> Result<u8, Error> {
    let invalid = || Error::InvalidImmediate {
        text: text.to_string(),
        line,
    };
    let digits = text.strip_prefix("0x").ok_or_else(invalid)?;
    if digits.len() != 2 {
        return Err(invalid());
    }
    u8::from_str_radix(digits, 16).map_err(|_| invalid())
}

fn parse_mask(text: &str, line: usize) -> Result<u8, Error> {
    let invalid = || Error::InvalidMask {
        text: text.to_string(),
        line,
    };
    if text.len() != 3 {
        return Err(invalid());
    }
    u8::from_str_radix(text, 2).map_err(|_| invalid())
}

fn parse_register(text: &str, line: usize) -> Result<Reg, Error> {
    Reg::parse(text).map_err(|_| Error::InvalidRegister {
        text: text.to_string(),
        line,
    })
}

// ----------------------------------------------------------------------------
// Tree walking

fn malformed(what: &str) -> Error {
    Error::MalformedTree(what.to_string())
}

/// Items of `section`'s list, empty if the section or its list is absent.
fn section_items(tree: &Tree, program: NodeId, section: &str, list: &str) -> Vec<NodeId> {
    tree.find_child(program, section)
        .and_then(|section| tree.find_child(section, list))
        .map(|list| tree.children(list).to_vec())
        .unwrap_or_default()
}

fn parse_stmt(tree: &Tree, id: NodeId) -> Result<Stmt, Error> {
    let node = &tree[id];
    let line = node.line;
    if node.symbol.is_terminal() {
        return match node.symbol.name() {
            "identifier" => Ok(Stmt::Label(node.text.clone(), line)),
            other => Err(malformed(&format!("unexpected `{other}` in text section"))),
        };
    }

    let leaves: Vec<_> = node.children.iter().map(|child| &tree[*child]).collect();
    let (mnemonic, operands) = leaves
        .split_first()
        .ok_or_else(|| malformed(&format!("`{}` without mnemonic", node.symbol)))?;
    let kind = OpKind::parse(&mnemonic.text).map_err(|e| malformed(&e))?;
    let arity = |n: usize| {
        if operands.len() == n {
            Ok(())
        } else {
            let reason = format!("expected {n} operands, found {}", operands.len());
            Err(operand_error(kind, &reason, line))
        }
    };

    let code = match kind.class() {
        Class::RegReg => {
            arity(2)?;
            let a = parse_register(&operands[0].text, line)?;
            let b = parse_register(&operands[1].text, line)?;
            let op = Op::reg_reg(kind, a, b)
                .ok_or_else(|| operand_error(kind, "expected two registers", line))?;
            Code::Op(op)
        }
        Class::Reg => {
            arity(1)?;
            let r = parse_register(&operands[0].text, line)?;
            let op = Op::reg(kind, r)
                .ok_or_else(|| operand_error(kind, "expected one register", line))?;
            Code::Op(op)
        }
        Class::RegValue => {
            arity(2)?;
            let r = parse_register(&operands[0].text, line)?;
            let value = operands[1];
            match value.symbol.name() {
                "immediate" => {
                    let imm = parse_immediate(&value.text, line)?;
                    let op = Op::reg_value(kind, r, imm)
                        .ok_or_else(|| operand_error(kind, "expected a register and a value", line))?;
                    Code::Op(op)
                }
                "identifier" => Code::Data(kind, r, value.text.clone()),
                _ => {
                    let reason = "value must be an immediate or a data label";
                    return Err(operand_error(kind, reason, line));
                }
            }
        }
        Class::Jump => {
            arity(2)?;
            let mask = parse_mask(&operands[0].text, line)?;
            let target = operands[1];
            match target.symbol.name() {
                "identifier" => Code::Jump(mask, target.text.clone()),
                _ => return Err(operand_error(kind, "jump target must be a text label", line)),
            }
        }
    };
    Ok(Stmt::Code(code, line))
}

// ----------------------------------------------------------------------------
// Passes

fn data_pass(tree: &Tree, items: &[NodeId]) -> Result<([u8; DATA_LEN], Labels), Error> {
    let mut data = [0; DATA_LEN];
    let mut labels = Labels::new();
    for (idx, item) in items.iter().enumerate() {
        let node = &tree[*item];
        let name = tree.find_child(*item, "identifier");
        let value = tree.find_child(*item, "immediate");
        let (Some(name), Some(value)) = (name, value) else {
            return Err(malformed(&format!("`{}` is not a data item", node.symbol)));
        };
        if idx >= DATA_LEN {
            return Err(Error::DataOverflow {
                line: node.line,
                capacity: DATA_LEN,
            });
        }
        let addr = (DATA_START + idx) as u8;
        labels.insert(&tree[name].text, tree[name].line, addr)?;
        data[idx] = parse_immediate(&tree[value].text, tree[value].line)?;
    }
    Ok((data, labels))
}

fn label_pass(stmts: &[Stmt]) -> Result<(Labels, usize), Error> {
    let mut labels = Labels::new();
    let mut offset = 0;
    for stmt in stmts {
        match stmt {
            Stmt::Label(name, line) => {
                if offset >= TEXT_LEN {
                    return Err(Error::TextOverflow {
                        line: *line,
                        capacity: TEXT_LEN,
                    });
                }
                labels.insert(name, *line, (TEXT_START + offset) as u8)?;
            }
            Stmt::Code(code, line) => {
                offset += code.size();
                if offset > TEXT_LEN {
                    return Err(Error::TextOverflow {
                        line: *line,
                        capacity: TEXT_LEN,
                    });
                }
            }
        }
    }
    if labels.get(ENTRY).is_none() {
        return Err(Error::MissingMain);
    }
    Ok((labels, offset))
}

fn emit(
    stmts: &[Stmt],
    data_labels: &Labels,
    text_labels: &Labels,
) -> Result<[u8; TEXT_LEN], Error> {
    let mut text = [0; TEXT_LEN];
    let mut offset = 0;
    for stmt in stmts {
        if let Stmt::Code(code, line) = stmt {
            let bin = code.resolve(data_labels, text_labels, *line)?.to_bin();
            text[offset..offset + bin.len()].copy_from_slice(&bin);
            offset += bin.len();
        }
    }
    Ok(text)
}

/// Generates the data and text regions from a simplified syntax tree.
pub fn generate(tree: &Tree) -> Result<Program, Error> {
    let program = tree.root();
    if tree[program].symbol.name() != "program" {
        return Err(malformed(&format!("root is `{}`", tree[program].symbol)));
    }

    let data_items = section_items(tree, program, "data", "data_list");
    let (data, data_labels) = data_pass(tree, &data_items)?;
    debug!("data labels: {:?}", data_labels.iter().collect::<Vec<_>>());

    let stmts = section_items(tree, program, "text", "text_list")
        .into_iter()
        .map(|id| parse_stmt(tree, id))
        .collect::<Result<Vec<_>, _>>()?;
    let (text_labels, text_len) = label_pass(&stmts)?;
    debug!("text labels: {:?}", text_labels.iter().collect::<Vec<_>>());

    let text = emit(&stmts, &data_labels, &text_labels)?;
    debug!("emitted {} data items and {} text bytes", data_labels.len(), text_len);

    Ok(Program {
        data,
        text,
        data_labels,
        text_labels,
        text_len,
    })
}

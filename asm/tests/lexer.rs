use tvm_asm::grammar::lexer::LineLexer;
use tvm_asm::grammar::token::TokenKind;

fn assert(code: &str, expects: Vec<TokenKind>) {
    let tokens = LineLexer::new(code, 1).parse();

    println!(" {code}");
    for (idx, token) in tokens.iter().enumerate() {
        println!("{:>2}: {:?} `{}`", idx, token.kind, token.text);
    }

    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(kinds, expects);
}

macro_rules! case {
    ($name:ident, $code:expr, $expects:expr) => {
        #[test]
        fn $name() {
            use TokenKind::*;
            assert($code, $expects);
        }
    };
}

case!(section_data, ".data", vec![Section]);
case!(section_text, ".text", vec![Section]);
case!(data_item, "x = 0x05", vec![Identifier, Equals, Immediate]);
case!(data_item_tight, "x=0xFF", vec![Identifier, Equals, Immediate]);
case!(label, "loop:", vec![Identifier, Colon]);
case!(reg_reg, "MOV R0, SP", vec![CommandX, Register, Comma, Register]);
case!(reg, "PSH PC", vec![CommandY, Register]);
case!(reg_value, "STA R1, counter", vec![CommandZ, Register, Comma, Identifier]);
case!(reg_value_imm, "LDI R0, 0x0A", vec![CommandZ, Register, Comma, Immediate]);
case!(jump, "JMP 110, loop", vec![CommandZJ, Mask, Comma, Identifier]);
case!(comment_only, "   # nothing here", vec![]);
case!(trailing_comment, "SYS R0 # exit", vec![CommandY, Register]);
case!(unknown_char, "MOV R0; R1", vec![CommandX, Register, Unknown, Register]);
case!(lowercase_hex, "0x0a", vec![Unknown, Identifier, Unknown, Identifier]);
case!(lowercase_mnemonic, "mov", vec![Identifier]);

use tvm_asm::{Assembler, Error, ErrorKind, Program};

fn assemble(source: &str) -> Result<Program, Error> {
    let assembler = Assembler::new().unwrap();
    assembler.assemble_str("test.asm", source)
}

fn assert(source: &str, data: &[u8], text: &[u8]) {
    println!("{source}");
    let program = match assemble(source) {
        Ok(program) => program,
        Err(err) => panic!("{err}"),
    };
    assert_eq!(&program.data[..data.len()], data);
    assert!(program.data[data.len()..].iter().all(|b| *b == 0));
    assert_eq!(&program.text[..text.len()], text);
    assert!(program.text[text.len()..].iter().all(|b| *b == 0));
    assert_eq!(program.text_len, text.len());
}

macro_rules! case {
    ($name:ident, $source:expr, $data:expr, $text:expr) => {
        #[test]
        fn $name() {
            assert($source, &$data, &$text);
        }
    };
}

case!(
    round_trip,
    ".data\nx = 0x05\n.text\nmain:\nLDI R0, x\nSYS R0",
    [0x05],
    [0xD0, 0x00, 0xB0]
);

case!(
    every_mnemonic,
    "
.data
a = 0x01
.text
main:
MOV R0, R1
CMP R1, R0
SHL R0, R0
SHR R1, R1
ADD SP, R0
SUB R0, SP
AND PC, R1
ORR R1, PC
NOT R1
PSH R0
POP R1
LDI R1, 0x0F
LDA R0, a
STA R1, a
JMP 111, main
SYS R0
",
    [0x01],
    [
        0x01, 0x14, 0x20, 0x35, 0x48, 0x52, 0x6D, 0x77, 0x81, 0x90, 0xA1, 0xD4, 0x0F, 0xE0, 0x00,
        0xF4, 0x00, 0xC7, 0x51, 0xB0
    ]
);

case!(
    forward_jump,
    ".text\nmain:\nJMP 010, end\nNOT R0\nend:\nSYS R0",
    [],
    [0xC2, 0x54, 0x81, 0xB0]
);

case!(
    comments_and_blank_lines,
    "# counter\n\n.data   # vars\nn = 0x03 # three\n\n.text\nmain: # entry\n  LDA R1, n\n\n  SYS R1\n",
    [0x03],
    [0xE4, 0x00, 0xB1]
);

case!(text_only, ".text\nmain:\nSYS R0", [], [0xB0]);

case!(
    labels_named_like_categories,
    "
.data
immediate = 0x05
mask = 0x06
.text
main:
commandx:
LDA R0, immediate
LDA R1, mask
register:
JMP 001, commandx
SYS R0
",
    [0x05, 0x06],
    [0xE0, 0x00, 0xE4, 0x01, 0xC1, 0x51, 0xB0]
);

case!(
    data_addresses,
    ".data\na = 0x0A\nb = 0x0B\nc = 0x0C\n.text\nmain:\nLDA R0, c\nSTA R0, a",
    [0x0A, 0x0B, 0x0C],
    [0xE0, 0x02, 0xF0, 0x00]
);

#[test]
fn labels() {
    let program = assemble(".data\nx = 0x01\n.text\nmain:\nloop:\nNOT R0\nJMP 001, loop\nend:\nSYS R0").unwrap();
    assert_eq!(program.data_labels.get("x"), Some(0));
    assert_eq!(program.text_labels.get("main"), Some(81));
    assert_eq!(program.text_labels.get("loop"), Some(81));
    assert_eq!(program.text_labels.get("end"), Some(84));
    assert_eq!(program.text_labels.get("x"), None);
}

#[test]
fn deterministic() {
    let source = ".data\nx = 0x05\ny = 0x07\n.text\nmain:\nLDA R0, x\nLDA R1, y\nADD R0, R1\nJMP 000, main\nSYS R0";
    let assembler = Assembler::new().unwrap();
    let first = assembler.assemble_str("a.asm", source).unwrap();
    let second = assembler.assemble_str("a.asm", source).unwrap();
    let rebuilt = assemble(source).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, rebuilt);
}

#[test]
fn capacity_limits() {
    let items = |n: u8| -> String {
        (0..n).map(|i| format!("{} = 0x00\n", (b'a' + i) as char)).collect()
    };
    assert!(assemble(&format!(".data\n{}.text\nmain:\nSYS R0", items(16))).is_ok());
    let err = assemble(&format!(".data\n{}.text\nmain:\nSYS R0", items(17))).unwrap_err();
    assert!(matches!(err, Error::DataOverflow { line: 18, capacity: 16 }));

    let fill = "LDI R0, 0x00\n".repeat(87);
    assert!(assemble(&format!(".text\nmain:\n{fill}SYS R0")).is_ok());
    let err = assemble(&format!(".text\nmain:\n{fill}LDI R0, 0x00")).unwrap_err();
    assert!(matches!(err, Error::TextOverflow { line: 90, capacity: 175 }));
    let err = assemble(&format!(".text\nmain:\n{fill}SYS R0\nend:")).unwrap_err();
    assert!(matches!(err, Error::TextOverflow { line: 91, .. }));
}

#[test]
fn file_input() {
    let path = std::env::temp_dir().join(format!("tvm-asm-{}.asm", std::process::id()));
    std::fs::write(&path, ".text\nmain:\nSYS R1\n").unwrap();
    let program = tvm_asm::assemble(path.to_str().unwrap()).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(program.text[0], 0xB1);

    let err = tvm_asm::assemble("/nonexistent/main.asm").unwrap_err();
    assert!(matches!(err, Error::FileOpen(..)));
    assert_eq!(err.kind(), ErrorKind::Lex);
}

// ----------------------------------------------------------------------------
// Errors

fn assert_err(source: &str, kind: ErrorKind, line: Option<usize>) -> Error {
    let err = assemble(source).unwrap_err();
    println!("{err}");
    assert_eq!(err.kind(), kind);
    assert_eq!(err.line(), line);
    err
}

#[test]
fn missing_main() {
    let err = assert_err(".text\nstart:\nSYS R0", ErrorKind::Compile, None);
    assert!(matches!(err, Error::MissingMain));
    assert!(matches!(assemble(""), Err(Error::MissingMain)));
}

#[test]
fn undefined_labels() {
    for source in [
        ".text\nmain:\nLDA R0, nope",
        ".text\nmain:\nSTA R0, nope",
        ".text\nmain:\nJMP 001, nope",
    ] {
        let err = assert_err(source, ErrorKind::Compile, Some(3));
        assert!(matches!(err, Error::UndefinedLabel { ref name, .. } if name == "nope"));
    }
    // Data and text labels live in separate tables.
    let err = assert_err(".data\nx = 0x01\n.text\nmain:\nJMP 001, x", ErrorKind::Compile, Some(5));
    assert!(matches!(err, Error::UndefinedLabel { .. }));
    let err = assert_err(".text\nmain:\nLDA R0, main", ErrorKind::Compile, Some(3));
    assert!(matches!(err, Error::UndefinedLabel { .. }));
}

#[test]
fn redefined_labels() {
    let err = assert_err(".data\nx = 0x01\nx = 0x02\n.text\nmain:", ErrorKind::Compile, Some(3));
    assert!(matches!(err, Error::RedefinedLabel { first: 2, .. }));
    let err = assert_err(".text\nmain:\nNOT R0\nmain:", ErrorKind::Compile, Some(4));
    assert!(matches!(err, Error::RedefinedLabel { first: 2, .. }));
    assert!(assemble(".data\nx = 0x01\n.text\nmain:\nx:\nSYS R0").is_ok());
}

#[test]
fn invalid_operands() {
    let err = assert_err(".text\nmain:\nMOV R0, R5", ErrorKind::Compile, Some(3));
    assert!(matches!(err, Error::InvalidRegister { ref text, .. } if text == "R5"));
    let err = assert_err(".text\nmain:\nJMP 001, 0x51", ErrorKind::Compile, Some(3));
    assert!(matches!(err, Error::InvalidOperand { ref op, .. } if op == "JMP"));
}

#[test]
fn syntax_errors() {
    let err = assert_err(".text\nmain:\nMOV R0 R1", ErrorKind::Parse, Some(3));
    assert!(matches!(err, Error::UnexpectedToken { .. }));
    let err = assert_err(".text\nmain:\nSYS", ErrorKind::Parse, Some(3));
    assert!(matches!(err, Error::UnexpectedToken { ref found, .. } if found == "end of input"));
    let err = assert_err(".data\nx = 5\n.text\nmain:", ErrorKind::Parse, Some(2));
    assert!(matches!(err, Error::UnexpectedToken { .. }));
    let err = assert_err(".text\n.data\nx = 0x01", ErrorKind::Parse, Some(2));
    assert!(matches!(err, Error::NoRule { .. }));
}

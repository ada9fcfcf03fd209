use tvm_arch::image::Image;
use tvm_arch::reg::Reg;
use tvm_asm::Assembler;
use tvm_emu::{Error, Machine, DEFAULT_BUDGET};

fn boot(source: &str) -> Machine {
    let assembler = Assembler::new().unwrap();
    let program = match assembler.assemble_str("test.asm", source) {
        Ok(program) => program,
        Err(err) => panic!("{err}"),
    };
    let bin = program.image().to_bytes();
    Machine::from_image(&Image::from_bytes(&bin).unwrap())
}

fn assert(source: &str, expect: Result<u8, Error>) {
    println!("{source}");
    let mut machine = boot(source);
    assert_eq!(machine.run(DEFAULT_BUDGET), expect);
}

macro_rules! case {
    ($name:ident, $source:expr, $expect:expr) => {
        #[test]
        fn $name() {
            assert($source, $expect);
        }
    };
}

case!(
    round_trip,
    ".data\nx = 0x05\n.text\nmain:\nLDI R0, x\nSYS R0",
    Ok(5)
);

case!(
    add,
    "
.data
a = 0x03
b = 0x04
.text
main:
LDA R0, a
LDA R1, b
ADD R0, R1
SYS R0
",
    Ok(7)
);

case!(
    store_then_load,
    "
.data
a = 0x2A
b = 0x00
.text
main:
LDA R1, a
STA R1, b
LDA R0, b
SYS R0
",
    Ok(0x2A)
);

case!(
    push_pop_sum,
    "
.data
a = 0x02
b = 0x03
.text
main:
LDA R0, a
PSH R0
LDA R0, b
PSH R0
POP R0
POP R1
ADD R0, R1
SYS R0
",
    Ok(5)
);

case!(
    stack_overflow,
    "
.text
main:
CMP R0, R0
loop:
PSH R0
JMP 010, loop
",
    Err(Error::StackOverflow { pc: 82, sp: 80 })
);

case!(
    stack_underflow,
    ".text\nmain:\nPOP R0\nSYS R0",
    Err(Error::StackUnderflow { pc: 81, sp: 16 })
);

case!(
    runaway,
    ".text\nmain:\nCMP R0, R0\nloop:\nJMP 010, loop",
    Err(Error::Runaway(DEFAULT_BUDGET))
);

const COUNTDOWN: &str = "
.data
n = 0x05
one = 0x01
.text
main:
LDA R0, n
LDA R1, one
loop:
SUB R0, R1
CMP R0, R1
JMP 011, loop
SYS R0
";

#[test]
fn countdown() {
    // Two loads, five passes of three instructions, then SYS.
    let steps = 2 + 5 * 3 + 1;

    let mut machine = boot(COUNTDOWN);
    assert_eq!(machine.run(steps), Ok(0));
    assert_eq!(machine.exit_code(), Some(0));

    let mut machine = boot(COUNTDOWN);
    assert_eq!(machine.run(steps - 1), Err(Error::Runaway(steps - 1)));
    assert_eq!(machine.exit_code(), None);
}

#[test]
fn faults_are_distinct_from_runaway() {
    let mut machine = boot(".text\nmain:\nPOP R0\nSYS R0");
    assert!(machine.run(DEFAULT_BUDGET).unwrap_err().is_fault());

    let mut machine = boot(".text\nmain:\nCMP R0, R0\nloop:\nJMP 010, loop");
    assert!(!machine.run(DEFAULT_BUDGET).unwrap_err().is_fault());
}

#[test]
fn resume_from_snapshot() {
    let source = "
.data
one = 0x01
.text
main:
LDA R0, one
CMP R0, R0
loop:
ADD R1, R0
JMP 010, loop
";
    let mut machine = boot(source);
    assert_eq!(machine.run(22), Err(Error::Runaway(22)));
    assert_eq!(machine.get(Reg::R1), 10);

    let bin = Image::Stateful(machine.snapshot()).to_bytes();
    assert_eq!(bin.len(), Image::STATEFUL_LEN);
    let mut resumed = Machine::from_image(&Image::from_bytes(&bin).unwrap());
    assert_eq!(resumed, machine);

    assert_eq!(resumed.run(20), Err(Error::Runaway(20)));
    assert_eq!(machine.run(20), Err(Error::Runaway(20)));
    assert_eq!(resumed.get(Reg::R1), 20);
    assert_eq!(resumed, machine);
}

#[test]
fn deterministic() {
    let mut a = boot(COUNTDOWN);
    let mut b = boot(COUNTDOWN);
    assert_eq!(a.run(DEFAULT_BUDGET), b.run(DEFAULT_BUDGET));
    assert_eq!(a, b);
}

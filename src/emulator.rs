//! The accumulator machine: 100,000 signed decimal words, ten registers,
//! execution from location 100 until HALT or the first runtime error.

use crate::codegen::MachineWord;
use crate::diagnostics::ErrorLog;
use crate::error::{ErrorKind, QuackError, Result};
use crate::isa::{
    Address, ENTRY_POINT, MEMORY_SIZE, Opcode, REGISTER_COUNT, Register, WORD_MAX, WORD_MIN,
};
use crate::parser::is_integer;
use std::collections::VecDeque;
use std::fmt;
use std::io::{self, BufRead, Write};
use tracing::{debug, info, warn};

/// Longest accepted READ input, without and with a leading `-`.
const MAX_INPUT_DIGITS: usize = 8;
const MAX_NEGATIVE_INPUT_LEN: usize = 9;

/// Main memory. Every cell starts at zero.
#[derive(Clone, PartialEq, Eq)]
pub struct Memory {
    cells: Box<[i64]>,
}

impl Memory {
    pub fn new() -> Self {
        Self {
            cells: vec![0; MEMORY_SIZE].into_boxed_slice(),
        }
    }

    #[inline]
    pub fn read(&self, address: Address) -> i64 {
        self.cells[address.index()]
    }

    #[inline]
    pub fn write(&mut self, address: Address, word: i64) {
        self.cells[address.index()] = word;
    }

    /// Non-zero cells in address order.
    pub fn occupied(&self) -> impl Iterator<Item = (Address, i64)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, word)| **word != 0)
            .filter_map(|(i, word)| Some((Address::new(u32::try_from(i).ok()?)?, *word)))
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.occupied().map(|(a, w)| (a.value(), w)))
            .finish()
    }
}

/// The ten general registers, all zero at start.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Registers([i64; REGISTER_COUNT]);

impl Registers {
    #[inline]
    pub fn get(&self, register: Register) -> i64 {
        self.0[register.index()]
    }

    #[inline]
    pub fn set(&mut self, register: Register, value: i64) {
        self.0[register.index()] = value;
    }

    pub fn as_array(&self) -> &[i64; REGISTER_COUNT] {
        &self.0
    }
}

/// Where READ takes its input and WRITE sends its output.
pub trait IoPort {
    /// One line of user input, without its terminator.
    fn read_input(&mut self) -> io::Result<String>;

    fn write_output(&mut self, value: i64) -> io::Result<()>;
}

/// Interactive port: prompts with `? ` and prints one value per line.
#[derive(Debug)]
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl Console<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> IoPort for Console<R, W> {
    fn read_input(&mut self) -> io::Result<String> {
        write!(self.output, "? ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before READ completed",
            ));
        }
        Ok(line.trim().to_string())
    }

    fn write_output(&mut self, value: i64) -> io::Result<()> {
        writeln!(self.output, "{value}")
    }
}

/// Scripted port: answers READ from a queue and collects WRITE values.
#[derive(Debug, Default, Clone)]
pub struct BufferedPort {
    inputs: VecDeque<String>,
    outputs: Vec<i64>,
}

impl BufferedPort {
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            outputs: Vec::new(),
        }
    }

    pub fn outputs(&self) -> &[i64] {
        &self.outputs
    }
}

impl IoPort for BufferedPort {
    fn read_input(&mut self) -> io::Result<String> {
        self.inputs.pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted input left")
        })
    }

    fn write_output(&mut self, value: i64) -> io::Result<()> {
        self.outputs.push(value);
        Ok(())
    }
}

/// Limits for one run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Stop after this many executed instructions. `None` runs unbounded.
    pub max_steps: Option<u64>,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Halted,
    /// The log gained an entry; execution stopped after that instruction.
    RuntimeError,
    /// The pointer moved past the last address.
    RanOffEnd,
    StepLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Running,
    Halted,
    OffEnd,
}

/// Executes a loaded memory image.
#[derive(Debug, Clone)]
pub struct Emulator {
    memory: Memory,
    registers: Registers,
    pointer: Address,
    state: State,
    steps: u64,
}

impl Emulator {
    pub fn new(memory: Memory) -> Self {
        Self {
            memory,
            registers: Registers::default(),
            pointer: Address::new(ENTRY_POINT).unwrap_or(Address::ZERO),
            state: State::Running,
            steps: 0,
        }
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn register(&self, register: Register) -> i64 {
        self.registers.get(register)
    }

    /// Location of the next instruction.
    pub fn pointer(&self) -> Address {
        self.pointer
    }

    /// Instructions executed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Run until HALT, a recorded error, the end of memory or the step limit.
    ///
    /// Runtime diagnostics go to `log`; `Err` is reserved for port failures.
    pub fn run<P: IoPort>(
        &mut self,
        port: &mut P,
        log: &mut ErrorLog,
        options: &RunOptions,
    ) -> Result<Outcome> {
        info!(entry = %self.pointer, "emulation started");
        let outcome = loop {
            match self.state {
                State::Halted => break Outcome::Halted,
                State::OffEnd => break Outcome::RanOffEnd,
                State::Running => {}
            }
            if !log.is_empty() {
                break Outcome::RuntimeError;
            }
            if options.max_steps.is_some_and(|limit| self.steps >= limit) {
                warn!(steps = self.steps, "step limit reached");
                break Outcome::StepLimit;
            }
            self.step(port, log)?;
        };
        info!(?outcome, steps = self.steps, "emulation finished");
        Ok(outcome)
    }

    /// Execute the instruction under the pointer.
    ///
    /// Words whose opcode field is not 1-13 are skipped.
    pub fn step<P: IoPort>(&mut self, port: &mut P, log: &mut ErrorLog) -> Result<()> {
        if self.state != State::Running {
            return Ok(());
        }
        self.steps += 1;

        let word = self.memory.read(self.pointer);
        let Some(MachineWord {
            opcode,
            register,
            address,
        }) = MachineWord::decode(word)
        else {
            self.advance();
            return Ok(());
        };

        let operand = self.memory.read(address);
        let value = self.registers.get(register);
        let taken = match opcode {
            Opcode::Add => {
                self.arithmetic(register, value.checked_add(operand), ErrorKind::AddOverflow, log);
                false
            }
            Opcode::Sub => {
                self.arithmetic(register, value.checked_sub(operand), ErrorKind::SubOverflow, log);
                false
            }
            Opcode::Mult => {
                self.arithmetic(register, value.checked_mul(operand), ErrorKind::MultOverflow, log);
                false
            }
            Opcode::Div => {
                match value.checked_div(operand) {
                    Some(quotient) => self.registers.set(register, quotient),
                    None => log.record(ErrorKind::DivisionByZero, register_statement(register)),
                }
                false
            }
            Opcode::Load => {
                self.registers.set(register, operand);
                false
            }
            Opcode::Store => {
                self.memory.write(address, value);
                false
            }
            Opcode::Read => {
                let text = port.read_input().map_err(QuackError::Console)?;
                match parse_input(&text) {
                    Ok(input) => self.memory.write(address, input),
                    Err(kind) => log.record(kind, text),
                }
                false
            }
            Opcode::Write => {
                port.write_output(operand).map_err(QuackError::Console)?;
                false
            }
            Opcode::B => true,
            Opcode::Bm => value < 0,
            Opcode::Bz => value == 0,
            Opcode::Bp => value > 0,
            Opcode::Halt => {
                debug!(at = %self.pointer, "halt");
                self.state = State::Halted;
                return Ok(());
            }
        };

        if taken {
            debug!(from = %self.pointer, to = %address, "branch taken");
            self.pointer = address;
            return Ok(());
        }
        self.advance();
        Ok(())
    }

    fn arithmetic(
        &mut self,
        register: Register,
        result: Option<i64>,
        overflow: ErrorKind,
        log: &mut ErrorLog,
    ) {
        match result.filter(|v| (WORD_MIN..=WORD_MAX).contains(v)) {
            Some(value) => self.registers.set(register, value),
            None => log.record(overflow, register_statement(register)),
        }
    }

    fn advance(&mut self) {
        match self.pointer.next() {
            Some(next) => self.pointer = next,
            None => {
                warn!("execution ran past the last address");
                self.state = State::OffEnd;
            }
        }
    }
}

/// Statement text attached to register overflow and division diagnostics.
fn register_statement(register: Register) -> String {
    format!("REG# {register}")
}

/// Validate one line of READ input.
///
/// Digits are checked before length, so `12a` is non-integer regardless of size.
pub fn parse_input(text: &str) -> std::result::Result<i64, ErrorKind> {
    if !is_integer(text) {
        return Err(ErrorKind::NonIntegerInput);
    }
    let limit = if text.starts_with('-') {
        MAX_NEGATIVE_INPUT_LEN
    } else {
        MAX_INPUT_DIGITS
    };
    if text.len() > limit {
        return Err(ErrorKind::ConstantTooLarge);
    }
    text.parse().map_err(|_| ErrorKind::NonIntegerInput)
}

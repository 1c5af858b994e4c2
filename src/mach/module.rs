use super::Machine;
use crate::error;
use crate::mem::{Error, IntMemRef, Memory};

type Result<T> = std::result::Result<T, Error>;

/// ## Opcode argument
///
/// Arguments arrive already decoded by the bytecode layer.

#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Int(i32),
    IntRef(IntMemRef),
    Str(String),
}

impl Arg {
    /// Integer value of a constant or of the referenced memory.
    pub fn int(&self, memory: &Memory) -> Result<i32> {
        match self {
            Arg::Int(n) => Ok(*n),
            Arg::IntRef(mem_ref) => memory.int_value(mem_ref),
            Arg::Str(_) => Err(error!(TypeMismatch; "EXPECTED INTEGER")),
        }
    }

    pub fn int_ref(&self) -> Result<IntMemRef> {
        match self {
            Arg::IntRef(mem_ref) => Ok(*mem_ref),
            _ => Err(error!(TypeMismatch; "EXPECTED INTEGER REFERENCE")),
        }
    }

    pub fn str(&self) -> Result<&str> {
        match self {
            Arg::Str(s) => Ok(s.as_str()),
            _ => Err(error!(TypeMismatch; "EXPECTED STRING")),
        }
    }
}

/// ## Opcode module
///
/// A module owns a numbered group of opcodes. A returned value is
/// written to the store register by the machine.

pub trait Module {
    fn name(&self) -> &str;
    fn module_type(&self) -> u8;
    fn module_id(&self) -> u8;
    fn dispatch(
        &self,
        machine: &mut Machine,
        opcode: u16,
        overload: u8,
        args: &[Arg],
    ) -> Result<Option<i32>>;
}

/// Fails unless at least `min` arguments were supplied.
pub fn expect_args(args: &[Arg], min: usize) -> Result<()> {
    if args.len() < min {
        Err(error!(TypeMismatch; &format!("EXPECTED {} ARGUMENTS, GOT {}", min, args.len())))
    } else {
        Ok(())
    }
}

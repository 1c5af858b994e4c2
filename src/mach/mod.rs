/*!
## Rust Machine Module

This Rust module is the execution context of the virtual machine:
call stack, savepoints, opcode modules and the save file formats.

*/

mod config;
mod machine;
mod mem_module;
mod module;
mod savefile;
mod savepoint;
pub mod serialize;
mod stack;
mod state;

pub use config::{MachineConfig, SavepointPolicy, Trigger};
pub use machine::Machine;
pub use mem_module::MemModule;
pub use module::{expect_args, Arg, Module};
pub use savefile::SaveDirectory;
pub use savepoint::{Savepoint, SavepointManager};
pub use serialize::SaveHeader;
pub use stack::Stack;
pub use state::{ExecutionState, Frame};

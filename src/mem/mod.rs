/*!
## Rust Memory Module

This Rust module is the typed memory model of the virtual machine:
integer and string banks, sub-word addressing, the name table and
the kidoku (already read) table.

*/

pub type Address = usize;
pub type Scene = u32;

/// Words in each full sized integer bank and strings in each full sized
/// string bank.
pub const SIZE_OF_MEM_BANK: usize = 2000;
/// Words in bank L, used for passing parameters to subroutines.
pub const SIZE_OF_INT_PASSING_MEM: usize = 40;
/// Strings in bank K, used for passing parameters to subroutines.
pub const SIZE_OF_STRK_BANK: usize = 3;
/// Letter indices "A" through "ZZ".
pub const SIZE_OF_NAME_BANK: usize = 702;
/// Kidoku markers per scene.
pub const SIZE_OF_KIDOKU_TABLE: usize = 0x10000;

#[macro_use]
mod error;
mod bank;
mod intmemref;
mod kidoku;
mod memory;
mod names;
mod sparse;

pub use bank::{IntBank, Scope, StrBank};
pub use error::Error;
pub use error::ErrorCode;
pub use error::Location;
pub use intmemref::{BitWidth, IntMemRef};
pub use kidoku::KidokuTable;
pub use memory::{Banks, GlobalMemory, LocalMemory, Memory};
pub use names::{int_to_letter_index, letter_index_to_int, NameTable};
pub use sparse::{Slot, SparseStore};

//! # scenevm
//!
//! Memory, call stack and savepoints for a virtual machine running
//! scripted scenes.
//!
//! [`mem`] holds the typed memory: integer banks A to F, G, L and Z,
//! string banks K, M and S, sub-word addressing, the name table and the
//! kidoku table recording which text has been read. [`mach`] wraps it in
//! a [`mach::Machine`] with a call stack, savepoints, opcode modules and
//! the save file formats. [`term`] is a small console driving it all.
//!
//! ```
//! use scenevm::mach::{serialize, Machine};
//!
//! let mut machine = Machine::default();
//! machine.memory_mut().write_word('A', 0, 1).unwrap();
//! machine.mark_savepoint();
//! machine.memory_mut().write_word('A', 0, 2).unwrap();
//!
//! let mut bytes = vec![];
//! serialize::save_game(&mut bytes, &machine).unwrap();
//! serialize::load_game(&mut bytes.as_slice(), &mut machine).unwrap();
//! assert_eq!(machine.memory().read_word('A', 0).unwrap(), 1);
//! ```

pub mod mem;
pub mod mach;
pub mod term;

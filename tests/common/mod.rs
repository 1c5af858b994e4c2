#![allow(dead_code)]
use scenevm::mach::{serialize, Machine};
use scenevm::mem::{IntBank, IntMemRef};

pub fn int(bank: IntBank, index: usize) -> IntMemRef {
    IntMemRef::new(bank, index)
}

/// A machine with something in every global structure.
pub fn populated_global() -> Machine {
    let mut m = Machine::default();
    let memory = m.memory_mut();
    memory.write_word('G', 0, -5).unwrap();
    memory.write_word('G', 1999, 0x2628_2940).unwrap();
    memory.write_word('Z', 17, 42).unwrap();
    memory.write_string('M', 3, "carried over").unwrap();
    memory.names_mut().set_name(0, "Akane").unwrap();
    memory.names_mut().set_name(701, "Zed").unwrap();
    memory.names_mut().set_local_name(26, "Aa").unwrap();
    memory.record_kidoku(1, 0).unwrap();
    memory.record_kidoku(1, 65535).unwrap();
    memory.record_kidoku(9000, 12).unwrap();
    m
}

pub fn global_bytes(machine: &Machine) -> Vec<u8> {
    let mut bytes = vec![];
    serialize::save_global_memory(&mut bytes, machine).unwrap();
    bytes
}

pub fn game_bytes(machine: &Machine) -> Vec<u8> {
    let mut bytes = vec![];
    serialize::save_game(&mut bytes, machine).unwrap();
    bytes
}

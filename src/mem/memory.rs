use super::{
    BitWidth, Error, IntBank, IntMemRef, KidokuTable, NameTable, Scene, Scope, SparseStore,
    StrBank,
};
use crate::error;
use std::collections::BTreeMap;

type Result<T> = std::result::Result<T, Error>;

/// ## A set of integer and string banks

#[derive(Debug, Clone, PartialEq)]
pub struct Banks {
    ints: BTreeMap<IntBank, SparseStore<i32>>,
    strings: BTreeMap<StrBank, SparseStore<String>>,
}

impl Banks {
    pub fn new(int_banks: &[IntBank], str_banks: &[StrBank]) -> Banks {
        Banks {
            ints: int_banks
                .iter()
                .map(|&bank| (bank, SparseStore::new(bank.capacity())))
                .collect(),
            strings: str_banks
                .iter()
                .map(|&bank| (bank, SparseStore::new(bank.capacity())))
                .collect(),
        }
    }

    pub fn reset(&mut self) {
        self.ints.values_mut().for_each(SparseStore::reset);
        self.strings.values_mut().for_each(SparseStore::reset);
    }

    pub fn int(&self, bank: IntBank) -> Result<&SparseStore<i32>> {
        self.ints.get(&bank).ok_or_else(|| missing_bank(bank))
    }

    pub fn int_mut(&mut self, bank: IntBank) -> Result<&mut SparseStore<i32>> {
        self.ints.get_mut(&bank).ok_or_else(|| missing_bank(bank))
    }

    pub fn string(&self, bank: StrBank) -> Result<&SparseStore<String>> {
        self.strings.get(&bank).ok_or_else(|| missing_bank(bank))
    }

    pub fn string_mut(&mut self, bank: StrBank) -> Result<&mut SparseStore<String>> {
        self.strings.get_mut(&bank).ok_or_else(|| missing_bank(bank))
    }

    pub fn int_banks(&self) -> impl Iterator<Item = (IntBank, &SparseStore<i32>)> + '_ {
        self.ints.iter().map(|(bank, store)| (*bank, store))
    }

    pub fn str_banks(&self) -> impl Iterator<Item = (StrBank, &SparseStore<String>)> + '_ {
        self.strings.iter().map(|(bank, store)| (*bank, store))
    }
}

fn missing_bank<B: std::fmt::Display>(bank: B) -> Error {
    error!(InvalidBank; &format!("{} NOT IN THIS SCOPE", bank))
}

/// Banks that persist across playthroughs, plus the name and kidoku tables.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalMemory {
    pub banks: Banks,
    pub names: NameTable,
    pub kidoku: KidokuTable,
}

impl Default for GlobalMemory {
    fn default() -> GlobalMemory {
        GlobalMemory {
            banks: Banks::new(&IntBank::GLOBAL, &StrBank::GLOBAL),
            names: NameTable::default(),
            kidoku: KidokuTable::default(),
        }
    }
}

/// Scene scoped banks. These are what a savepoint captures.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalMemory {
    pub banks: Banks,
}

impl Default for LocalMemory {
    fn default() -> LocalMemory {
        LocalMemory {
            banks: Banks::new(&IntBank::LOCAL, &StrBank::LOCAL),
        }
    }
}

/// ## Machine memory
///
/// Reads and writes always go to the live banks. Which half a bank
/// lives in is decided by its scope.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Memory {
    global: GlobalMemory,
    local: LocalMemory,
}

impl Memory {
    pub fn new() -> Memory {
        Memory::default()
    }

    pub fn global(&self) -> &GlobalMemory {
        &self.global
    }

    pub fn local(&self) -> &LocalMemory {
        &self.local
    }

    pub fn replace_global(&mut self, global: GlobalMemory) {
        self.global = global;
    }

    pub fn replace_local(&mut self, local: LocalMemory) {
        self.local = local;
    }

    pub fn reset_local(&mut self) {
        self.local.banks.reset();
    }

    pub fn clear_global(&mut self) {
        self.global = GlobalMemory::default();
    }

    fn banks(&self, scope: Scope) -> &Banks {
        match scope {
            Scope::Global => &self.global.banks,
            Scope::Local => &self.local.banks,
        }
    }

    fn banks_mut(&mut self, scope: Scope) -> &mut Banks {
        match scope {
            Scope::Global => &mut self.global.banks,
            Scope::Local => &mut self.local.banks,
        }
    }

    pub fn int_value(&self, mem_ref: &IntMemRef) -> Result<i32> {
        let bank = mem_ref.bank();
        let word = *self.banks(bank.scope()).int(bank)?.get(mem_ref.slot())?;
        Ok(mem_ref.extract(word))
    }

    pub fn set_int_value(&mut self, mem_ref: &IntMemRef, value: i32) -> Result<()> {
        let bank = mem_ref.bank();
        let word = self
            .banks_mut(bank.scope())
            .int_mut(bank)?
            .get_mut(mem_ref.slot())?;
        *word = mem_ref.insert(*word, value);
        Ok(())
    }

    pub fn read_word(&self, bank: char, slot: usize) -> Result<i32> {
        self.int_value(&IntMemRef::from_letter(bank, slot)?)
    }

    pub fn write_word(&mut self, bank: char, slot: usize, value: i32) -> Result<()> {
        self.set_int_value(&IntMemRef::from_letter(bank, slot)?, value)
    }

    /// Byte `byte_pos` of the word at `slot`, counting 0 as the most
    /// significant byte.
    pub fn read_byte(&self, bank: char, slot: usize, byte_pos: usize) -> Result<i32> {
        self.int_value(&byte_ref(bank, slot, byte_pos)?)
    }

    pub fn write_byte(&mut self, bank: char, slot: usize, byte_pos: usize, value: i32) -> Result<()> {
        self.set_int_value(&byte_ref(bank, slot, byte_pos)?, value)
    }

    pub fn string_value(&self, bank: StrBank, index: usize) -> Result<&str> {
        Ok(self.banks(bank.scope()).string(bank)?.get(index)?.as_str())
    }

    pub fn set_string_value(&mut self, bank: StrBank, index: usize, value: &str) -> Result<()> {
        self.banks_mut(bank.scope())
            .string_mut(bank)?
            .set(index, value.to_string())
    }

    pub fn read_string(&self, bank: char, index: usize) -> Result<&str> {
        self.string_value(StrBank::from_letter(bank)?, index)
    }

    pub fn write_string(&mut self, bank: char, index: usize, value: &str) -> Result<()> {
        self.set_string_value(StrBank::from_letter(bank)?, index, value)
    }

    pub fn names(&self) -> &NameTable {
        &self.global.names
    }

    pub fn names_mut(&mut self) -> &mut NameTable {
        &mut self.global.names
    }

    pub fn record_kidoku(&mut self, scene: Scene, offset: usize) -> Result<()> {
        self.global.kidoku.record(scene, offset)
    }

    pub fn has_been_read(&self, scene: Scene, offset: usize) -> bool {
        self.global.kidoku.has_been_read(scene, offset)
    }
}

fn byte_ref(bank: char, slot: usize, byte_pos: usize) -> Result<IntMemRef> {
    if byte_pos > 3 {
        return Err(error!(IndexOutOfRange; &format!("BYTE POSITION {}", byte_pos)));
    }
    let bank = IntBank::from_letter(bank)?;
    let index = match slot.checked_mul(4) {
        Some(first) if slot < bank.capacity() => first + (3 - byte_pos),
        _ => return Err(error!(IndexOutOfRange; &format!("{} NOT BELOW {}", slot, bank.capacity()))),
    };
    Ok(IntMemRef::with_width(bank, BitWidth::Bits8, index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem::{ErrorCode, SIZE_OF_MEM_BANK};

    const BANKS: [char; 9] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'L', 'Z'];

    #[test]
    fn test_sub_fields_track_the_word() {
        let mut memory = Memory::new();
        let in8b = [38, 39, 40, 41];
        let base = (in8b[0] << 24) | (in8b[1] << 16) | (in8b[2] << 8) | in8b[3];
        for &letter in BANKS.iter() {
            let bank = IntBank::from_letter(letter).unwrap();
            let word = IntMemRef::new(bank, 0);
            memory.set_int_value(&word, base).unwrap();
            assert_eq!(memory.int_value(&word).unwrap(), base);
            for i in 0..4 {
                let field = IntMemRef::with_width(bank, BitWidth::Bits8, i);
                assert_eq!(memory.int_value(&field).unwrap(), in8b[3 - i]);
                memory.set_int_value(&field, 8).unwrap();
            }
            assert_eq!(memory.int_value(&word).unwrap(), 0x0808_0808);
        }
    }

    #[test]
    fn test_byte_positions_count_from_msb() {
        let mut memory = Memory::new();
        memory.write_word('A', 5, 0x2628_2940).unwrap();
        assert_eq!(memory.read_byte('A', 5, 0).unwrap(), 0x26);
        assert_eq!(memory.read_byte('A', 5, 3).unwrap(), 0x40);
        memory.write_byte('A', 5, 0, 8).unwrap();
        assert_eq!(memory.read_word('A', 5).unwrap(), 0x0828_2940);
        memory.write_byte('A', 5, 3, 1).unwrap();
        memory.write_byte('A', 5, 1, 2).unwrap();
        assert_eq!(memory.read_word('A', 5).unwrap(), 0x0802_2901);
        assert!(memory.read_byte('A', 5, 4).is_err());
    }

    #[test]
    fn test_byte_slot_beyond_bank() {
        let mut memory = Memory::new();
        for &slot in [SIZE_OF_MEM_BANK, usize::MAX / 4 + 1, usize::MAX].iter() {
            assert_eq!(
                memory.read_byte('A', slot, 0).unwrap_err().code(),
                ErrorCode::IndexOutOfRange
            );
            assert_eq!(
                memory.write_byte('L', slot, 3, 1).unwrap_err().code(),
                ErrorCode::IndexOutOfRange
            );
        }
        assert_eq!(
            memory.read_byte('L', 40, 0).unwrap_err().code(),
            ErrorCode::IndexOutOfRange
        );
    }

    #[test]
    fn test_integer_bounds() {
        let memory = Memory::new();
        assert!(memory.read_word('A', SIZE_OF_MEM_BANK - 1).is_ok());
        assert_eq!(
            memory.read_word('A', SIZE_OF_MEM_BANK).unwrap_err().code(),
            ErrorCode::IndexOutOfRange
        );
        assert_eq!(memory.read_word('Q', 0).unwrap_err().code(), ErrorCode::InvalidBank);
        let byte = IntMemRef::with_width(IntBank::A, BitWidth::Bits8, SIZE_OF_MEM_BANK * 4);
        assert!(memory.int_value(&byte).is_err());
    }

    #[test]
    fn test_string_banks() {
        let mut memory = Memory::new();
        for bank in StrBank::ALL.iter() {
            let text = format!("Stored at {}", bank.code());
            memory.set_string_value(*bank, 0, &text).unwrap();
            assert_eq!(memory.string_value(*bank, 0).unwrap(), text);
        }
        assert!(memory.write_string('K', 3, "Blah").is_err());
        assert!(memory.write_string('M', SIZE_OF_MEM_BANK, "Blah").is_err());
        assert!(memory.read_string('K', 3).is_err());
        assert_eq!(memory.read_string('S', 9).unwrap(), "");
    }

    #[test]
    fn test_reset_local_keeps_global() {
        let mut memory = Memory::new();
        memory.write_word('A', 1, 1).unwrap();
        memory.write_word('G', 1, 2).unwrap();
        memory.write_string('S', 1, "local").unwrap();
        memory.write_string('M', 1, "global").unwrap();
        memory.reset_local();
        assert_eq!(memory.read_word('A', 1).unwrap(), 0);
        assert_eq!(memory.read_word('G', 1).unwrap(), 2);
        assert_eq!(memory.read_string('S', 1).unwrap(), "");
        assert_eq!(memory.read_string('M', 1).unwrap(), "global");
    }
}

use super::{Error, IntBank};
use crate::error;
use serde::{Deserialize, Serialize};

type Result<T> = std::result::Result<T, Error>;

/// ## Sub-word field width
///
/// A 32-bit word holds `32 / width` fields. Field 0 is the least
/// significant one.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BitWidth {
    Bits1,
    Bits2,
    Bits4,
    Bits8,
    Bits16,
    Bits32,
}

impl BitWidth {
    /// Width part of a bytecode memory reference type byte.
    pub fn from_code(code: u8) -> Result<BitWidth> {
        use BitWidth::*;
        match code {
            0 => Ok(Bits32),
            1 => Ok(Bits1),
            2 => Ok(Bits2),
            3 => Ok(Bits4),
            4 => Ok(Bits8),
            5 => Ok(Bits16),
            _ => Err(error!(InvalidBank; &format!("NO BIT WIDTH AT CODE {}", code))),
        }
    }

    pub fn code(self) -> u8 {
        use BitWidth::*;
        match self {
            Bits32 => 0,
            Bits1 => 1,
            Bits2 => 2,
            Bits4 => 3,
            Bits8 => 4,
            Bits16 => 5,
        }
    }

    pub fn bits(self) -> u32 {
        use BitWidth::*;
        match self {
            Bits1 => 1,
            Bits2 => 2,
            Bits4 => 4,
            Bits8 => 8,
            Bits16 => 16,
            Bits32 => 32,
        }
    }

    pub fn per_word(self) -> usize {
        (32 / self.bits()) as usize
    }

    fn mask(self) -> u32 {
        match self {
            BitWidth::Bits32 => u32::max_value(),
            _ => (1 << self.bits()) - 1,
        }
    }
}

impl std::str::FromStr for BitWidth {
    type Err = Error;
    fn from_str(s: &str) -> Result<BitWidth> {
        use BitWidth::*;
        match s {
            "1b" => Ok(Bits1),
            "2b" => Ok(Bits2),
            "4b" => Ok(Bits4),
            "8b" => Ok(Bits8),
            "16b" => Ok(Bits16),
            "32b" | "" => Ok(Bits32),
            _ => Err(error!(InvalidBank; &format!("NO BIT WIDTH {}", s))),
        }
    }
}

/// ## Integer memory reference
///
/// Names one field of one integer bank. With `Bits32` the index is the
/// word slot itself; narrower widths pack several fields into each word.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntMemRef {
    bank: IntBank,
    width: BitWidth,
    index: usize,
}

impl IntMemRef {
    pub fn new(bank: IntBank, index: usize) -> IntMemRef {
        IntMemRef {
            bank,
            width: BitWidth::Bits32,
            index,
        }
    }

    pub fn with_width(bank: IntBank, width: BitWidth, index: usize) -> IntMemRef {
        IntMemRef { bank, width, index }
    }

    pub fn from_letter(letter: char, index: usize) -> Result<IntMemRef> {
        Ok(IntMemRef::new(IntBank::from_letter(letter)?, index))
    }

    /// Decodes the `type` byte found in bytecode: `type % 26` selects
    /// the bank and `type / 26` the width.
    pub fn from_type(type_byte: u8, index: usize) -> Result<IntMemRef> {
        let bank = IntBank::from_code(type_byte % 26)?;
        let width = BitWidth::from_code(type_byte / 26)?;
        Ok(IntMemRef::with_width(bank, width, index))
    }

    pub fn type_byte(&self) -> u8 {
        self.width.code() * 26 + self.bank.code()
    }

    pub fn bank(&self) -> IntBank {
        self.bank
    }

    pub fn width(&self) -> BitWidth {
        self.width
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Word slot holding this field.
    pub fn slot(&self) -> usize {
        self.index / self.width.per_word()
    }

    fn shift(&self) -> u32 {
        (self.index % self.width.per_word()) as u32 * self.width.bits()
    }

    /// Number of fields of this width the bank holds.
    pub fn fields_in_bank(&self) -> usize {
        self.bank.capacity() * self.width.per_word()
    }

    /// Same bank and width, `n` fields further on.
    pub fn offset(&self, n: isize) -> Result<IntMemRef> {
        match (self.index as isize).checked_add(n) {
            Some(index) if index >= 0 => Ok(IntMemRef {
                index: index as usize,
                ..*self
            }),
            _ => Err(error!(IndexOutOfRange; "MEMORY INDEX OUTSIDE BANK")),
        }
    }

    pub fn same_field_kind(&self, other: &IntMemRef) -> bool {
        self.bank == other.bank && self.width == other.width
    }

    /// Extracts this field from its parent word.
    pub fn extract(&self, word: i32) -> i32 {
        match self.width {
            BitWidth::Bits32 => word,
            _ => (((word as u32) >> self.shift()) & self.width.mask()) as i32,
        }
    }

    /// Replaces this field inside `word`, leaving every other bit alone.
    pub fn insert(&self, word: i32, value: i32) -> i32 {
        match self.width {
            BitWidth::Bits32 => value,
            _ => {
                let mask = self.width.mask() << self.shift();
                let field = ((value as u32) & self.width.mask()) << self.shift();
                (((word as u32) & !mask) | field) as i32
            }
        }
    }
}

impl std::fmt::Display for IntMemRef {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.width {
            BitWidth::Bits32 => write!(f, "{}[{}]", self.bank, self.index),
            width => write!(f, "{}{}b[{}]", self.bank, width.bits(), self.index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_byte() {
        let r = IntMemRef::from_type(4 * 26 + 6, 9).unwrap();
        assert_eq!(r.bank(), IntBank::G);
        assert_eq!(r.width(), BitWidth::Bits8);
        assert_eq!(r.slot(), 2);
        assert_eq!(r.type_byte(), 4 * 26 + 6);
        assert!(IntMemRef::from_type(10, 0).is_err());
        assert!(IntMemRef::from_type(6 * 26, 0).is_err());
    }

    #[test]
    fn test_eight_bit_fields_are_low_byte_first() {
        let word = 0x2627_2829;
        let fields: Vec<i32> = (0..4)
            .map(|i| IntMemRef::with_width(IntBank::A, BitWidth::Bits8, i).extract(word))
            .collect();
        assert_eq!(fields, vec![0x29, 0x28, 0x27, 0x26]);
    }

    #[test]
    fn test_insert_preserves_neighbours() {
        let r = IntMemRef::with_width(IntBank::A, BitWidth::Bits4, 3);
        let word = r.insert(-1, 0);
        assert_eq!(word as u32, 0xFFFF_0FFF);
        assert_eq!(r.extract(word), 0);
        assert_eq!(r.insert(0, 0x1F), 0xF000);
    }

    #[test]
    fn test_one_bit_fields() {
        let mut word = 0;
        for i in (0..32).step_by(2) {
            word = IntMemRef::with_width(IntBank::Z, BitWidth::Bits1, i).insert(word, 1);
        }
        assert_eq!(word as u32, 0x5555_5555);
        let top = IntMemRef::with_width(IntBank::Z, BitWidth::Bits1, 31);
        assert_eq!(top.extract(-1), 1);
    }

    #[test]
    fn test_width_strings() {
        assert_eq!("8b".parse::<BitWidth>().unwrap(), BitWidth::Bits8);
        assert_eq!("16b".parse::<BitWidth>().unwrap(), BitWidth::Bits16);
        assert!("3b".parse::<BitWidth>().is_err());
    }

    #[test]
    fn test_offset() {
        let r = IntMemRef::with_width(IntBank::B, BitWidth::Bits16, 1);
        assert_eq!(r.offset(3).unwrap().index(), 4);
        assert_eq!(r.offset(3).unwrap().slot(), 2);
        assert!(r.offset(-2).is_err());
    }
}

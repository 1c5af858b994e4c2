use super::{Error, SIZE_OF_INT_PASSING_MEM, SIZE_OF_MEM_BANK, SIZE_OF_STRK_BANK};
use crate::error;
use serde::{Deserialize, Serialize};

type Result<T> = std::result::Result<T, Error>;

/// Whether a bank survives only until the next savepoint restore
/// or persists across playthroughs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Local,
    Global,
}

/// ## Integer memory banks

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IntBank {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    Z,
    L,
}

impl IntBank {
    pub const ALL: [IntBank; 9] = [
        IntBank::A,
        IntBank::B,
        IntBank::C,
        IntBank::D,
        IntBank::E,
        IntBank::F,
        IntBank::G,
        IntBank::Z,
        IntBank::L,
    ];
    pub const GLOBAL: [IntBank; 2] = [IntBank::G, IntBank::Z];
    pub const LOCAL: [IntBank; 7] = [
        IntBank::A,
        IntBank::B,
        IntBank::C,
        IntBank::D,
        IntBank::E,
        IntBank::F,
        IntBank::L,
    ];

    pub fn from_letter(letter: char) -> Result<IntBank> {
        use IntBank::*;
        match letter.to_ascii_uppercase() {
            'A' => Ok(A),
            'B' => Ok(B),
            'C' => Ok(C),
            'D' => Ok(D),
            'E' => Ok(E),
            'F' => Ok(F),
            'G' => Ok(G),
            'Z' => Ok(Z),
            'L' => Ok(L),
            _ => Err(error!(InvalidBank; &format!("NO INTEGER BANK {}", letter))),
        }
    }

    /// Bank part of a bytecode memory reference.
    pub fn from_code(code: u8) -> Result<IntBank> {
        use IntBank::*;
        match code {
            0 => Ok(A),
            1 => Ok(B),
            2 => Ok(C),
            3 => Ok(D),
            4 => Ok(E),
            5 => Ok(F),
            6 => Ok(G),
            11 => Ok(L),
            25 => Ok(Z),
            _ => Err(error!(InvalidBank; &format!("NO INTEGER BANK AT CODE {}", code))),
        }
    }

    pub fn code(self) -> u8 {
        use IntBank::*;
        match self {
            A => 0,
            B => 1,
            C => 2,
            D => 3,
            E => 4,
            F => 5,
            G => 6,
            L => 11,
            Z => 25,
        }
    }

    pub fn letter(self) -> char {
        use IntBank::*;
        match self {
            A => 'A',
            B => 'B',
            C => 'C',
            D => 'D',
            E => 'E',
            F => 'F',
            G => 'G',
            Z => 'Z',
            L => 'L',
        }
    }

    pub fn scope(self) -> Scope {
        match self {
            IntBank::G | IntBank::Z => Scope::Global,
            _ => Scope::Local,
        }
    }

    /// Number of 32-bit words in the bank.
    pub fn capacity(self) -> usize {
        match self {
            IntBank::L => SIZE_OF_INT_PASSING_MEM,
            _ => SIZE_OF_MEM_BANK,
        }
    }
}

impl std::fmt::Display for IntBank {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "int{}", self.letter())
    }
}

/// ## String memory banks

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StrBank {
    K,
    M,
    S,
}

impl StrBank {
    pub const ALL: [StrBank; 3] = [StrBank::K, StrBank::M, StrBank::S];
    pub const GLOBAL: [StrBank; 1] = [StrBank::M];
    pub const LOCAL: [StrBank; 2] = [StrBank::K, StrBank::S];

    pub fn from_letter(letter: char) -> Result<StrBank> {
        match letter.to_ascii_uppercase() {
            'K' => Ok(StrBank::K),
            'M' => Ok(StrBank::M),
            'S' => Ok(StrBank::S),
            _ => Err(error!(InvalidBank; &format!("NO STRING BANK {}", letter))),
        }
    }

    pub fn from_code(code: u8) -> Result<StrBank> {
        match code {
            0x0A => Ok(StrBank::K),
            0x0C => Ok(StrBank::M),
            0x12 => Ok(StrBank::S),
            _ => Err(error!(InvalidBank; &format!("NO STRING BANK AT CODE {}", code))),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            StrBank::K => 0x0A,
            StrBank::M => 0x0C,
            StrBank::S => 0x12,
        }
    }

    pub fn letter(self) -> char {
        match self {
            StrBank::K => 'K',
            StrBank::M => 'M',
            StrBank::S => 'S',
        }
    }

    pub fn scope(self) -> Scope {
        match self {
            StrBank::M => Scope::Global,
            _ => Scope::Local,
        }
    }

    pub fn capacity(self) -> usize {
        match self {
            StrBank::K => SIZE_OF_STRK_BANK,
            _ => SIZE_OF_MEM_BANK,
        }
    }
}

impl std::fmt::Display for StrBank {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "str{}", self.letter())
    }
}

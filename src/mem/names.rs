use super::{Error, SparseStore, SIZE_OF_NAME_BANK};
use crate::error;

type Result<T> = std::result::Result<T, Error>;

/// Converts a letter index ("A", "Z", "AA", "ZZ") to its position in
/// the name table. "A".."Z" are 0..25 and "AA" follows "Z".
pub fn letter_index_to_int(index: &str) -> Result<usize> {
    if index.is_empty() {
        return Err(error!(MalformedIndex; "EMPTY LETTER INDEX"));
    }
    let mut value: usize = 0;
    for ch in index.chars() {
        if !ch.is_ascii_uppercase() {
            return Err(error!(MalformedIndex; &format!("BAD LETTER INDEX {}", index)));
        }
        let digit = (ch as usize) - ('A' as usize) + 1;
        value = match value.checked_mul(26).and_then(|v| v.checked_add(digit)) {
            Some(v) => v,
            None => return Err(error!(MalformedIndex; "LETTER INDEX TOO LONG")),
        };
    }
    Ok(value - 1)
}

/// Inverse of [`letter_index_to_int`].
pub fn int_to_letter_index(mut value: usize) -> String {
    let mut letters = vec![];
    loop {
        letters.push((b'A' + (value % 26) as u8) as char);
        if value < 26 {
            break;
        }
        value = value / 26 - 1;
    }
    letters.iter().rev().collect()
}

/// ## Character names
///
/// Global names persist across playthroughs; local names belong to the
/// scene that set them. Unset entries read as the empty string.

#[derive(Debug, Clone, PartialEq)]
pub struct NameTable {
    names: SparseStore<String>,
    local_names: SparseStore<String>,
}

impl Default for NameTable {
    fn default() -> NameTable {
        NameTable {
            names: SparseStore::new(SIZE_OF_NAME_BANK),
            local_names: SparseStore::new(SIZE_OF_NAME_BANK),
        }
    }
}

impl NameTable {
    pub fn new() -> NameTable {
        NameTable::default()
    }

    pub fn clear(&mut self) {
        self.names.reset();
        self.local_names.reset();
    }

    pub fn name(&self, index: usize) -> Result<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn set_name(&mut self, index: usize, name: &str) -> Result<()> {
        self.names.set(index, name.to_string())
    }

    pub fn local_name(&self, index: usize) -> Result<&str> {
        self.local_names.get(index).map(String::as_str)
    }

    pub fn set_local_name(&mut self, index: usize, name: &str) -> Result<()> {
        self.local_names.set(index, name.to_string())
    }

    pub fn names(&self) -> &SparseStore<String> {
        &self.names
    }

    pub fn local_names(&self) -> &SparseStore<String> {
        &self.local_names
    }

    pub fn from_stores(
        names: SparseStore<String>,
        local_names: SparseStore<String>,
    ) -> NameTable {
        NameTable { names, local_names }
    }
}

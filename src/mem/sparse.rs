use super::Error;
use crate::error;

type Result<T> = std::result::Result<T, Error>;

/// ## Lazily allocated fixed size container
///
/// Every position starts out unallocated and reads as the default value.
/// Backing storage is only created on the first write; after that a
/// bitmap records which positions have been written. A position never
/// becomes unallocated again except through `reset`.

#[derive(Debug, Clone, PartialEq)]
pub struct SparseStore<T> {
    size: usize,
    default: T,
    cells: Vec<T>,
    allocated: Vec<u64>,
    count: usize,
}

/// One position as seen by [`SparseStore::full`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot<'a, T> {
    pub index: usize,
    pub allocated: bool,
    pub value: &'a T,
}

impl<T: Clone + Default> SparseStore<T> {
    pub fn new(size: usize) -> SparseStore<T> {
        SparseStore {
            size,
            default: T::default(),
            cells: vec![],
            allocated: vec![],
            count: 0,
        }
    }

    /// Builds a store from `(index, value)` pairs, rejecting any index
    /// outside the capacity.
    pub fn from_cells<I>(size: usize, cells: I) -> Result<SparseStore<T>>
    where
        I: IntoIterator<Item = (usize, T)>,
    {
        let mut store = SparseStore::new(size);
        for (index, value) in cells {
            store.set(index, value)?;
        }
        Ok(store)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn allocated_len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_allocated(&self, index: usize) -> bool {
        match self.allocated.get(index / 64) {
            Some(bits) => bits & (1 << (index % 64)) != 0,
            None => false,
        }
    }

    pub fn get(&self, index: usize) -> Result<&T> {
        self.range_check(index)?;
        if self.is_allocated(index) {
            Ok(&self.cells[index])
        } else {
            Ok(&self.default)
        }
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        self.range_check(index)?;
        if self.cells.is_empty() {
            self.cells = vec![T::default(); self.size];
            self.allocated = vec![0; (self.size + 63) / 64];
        }
        let bit = 1 << (index % 64);
        let word = &mut self.allocated[index / 64];
        if *word & bit == 0 {
            *word |= bit;
            self.count += 1;
        }
        Ok(&mut self.cells[index])
    }

    pub fn set(&mut self, index: usize, value: T) -> Result<()> {
        *self.get_mut(index)? = value;
        Ok(())
    }

    /// Drops all allocation. Capacity is unchanged.
    pub fn reset(&mut self) {
        self.cells = vec![];
        self.allocated = vec![];
        self.count = 0;
    }

    /// Every position in index order, allocated or not.
    pub fn full(&self) -> impl Iterator<Item = Slot<'_, T>> + '_ {
        (0..self.size).map(move |index| {
            let allocated = self.is_allocated(index);
            Slot {
                index,
                allocated,
                value: if allocated {
                    &self.cells[index]
                } else {
                    &self.default
                },
            }
        })
    }

    /// Allocated positions only, in strictly increasing index order.
    pub fn allocated(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.allocated
            .iter()
            .enumerate()
            .flat_map(|(word, &bits)| SetBits(bits).map(move |bit| word * 64 + bit))
            .map(move |index| (index, &self.cells[index]))
    }

    fn range_check(&self, index: usize) -> Result<()> {
        if index < self.size {
            Ok(())
        } else {
            Err(error!(IndexOutOfRange; &format!("{} NOT BELOW {}", index, self.size)))
        }
    }
}

struct SetBits(u64);

impl Iterator for SetBits {
    type Item = usize;
    fn next(&mut self) -> Option<usize> {
        if self.0 == 0 {
            None
        } else {
            let bit = self.0.trailing_zeros() as usize;
            self.0 &= self.0 - 1;
            Some(bit)
        }
    }
}

use crate::error;
use crate::mem::Error;

type Result<T> = std::result::Result<T, Error>;

/// ## Stack enforced and size limited vector

#[derive(Clone, PartialEq)]
pub struct Stack<T> {
    max_len: usize,
    vec: Vec<T>,
}

impl<T: std::fmt::Debug> std::fmt::Debug for Stack<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.vec)
    }
}

impl<T> Stack<T> {
    pub fn new(max_len: usize) -> Stack<T> {
        Stack {
            max_len,
            vec: vec![],
        }
    }
    fn overflow_check(&self) -> Result<()> {
        if self.vec.len() > self.max_len {
            Err(error!(CallStackOverflow; &format!("DEPTH {}", self.vec.len())))
        } else {
            Ok(())
        }
    }
    pub fn clear(&mut self) {
        self.vec.clear()
    }
    pub fn len(&self) -> usize {
        self.vec.len()
    }
    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }
    pub fn last(&self) -> Option<&T> {
        self.vec.last()
    }
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.vec.iter()
    }
    pub fn as_slice(&self) -> &[T] {
        &self.vec
    }
    pub fn push(&mut self, val: T) -> Result<()> {
        self.vec.push(val);
        if let Err(e) = self.overflow_check() {
            self.vec.pop();
            return Err(e);
        }
        Ok(())
    }
    /// Removes the top value only when `matches` accepts it.
    pub fn pop_if<F>(&mut self, matches: F) -> Option<T>
    where
        F: FnOnce(&T) -> bool,
    {
        match self.vec.last() {
            Some(top) if matches(top) => self.vec.pop(),
            _ => None,
        }
    }
    /// Replaces the contents, enforcing the size limit.
    pub fn replace(&mut self, vec: Vec<T>) -> Result<()> {
        if vec.len() > self.max_len {
            return Err(error!(CallStackOverflow; &format!("DEPTH {}", vec.len())));
        }
        self.vec = vec;
        Ok(())
    }
}

impl<T: Clone> Stack<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.vec.clone()
    }
}

//! Growable vector storage shared by handle.

use crate::value::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Element cells of a vector value. Cloning the storage clones the
/// handle; element mutation is visible through every handle.
#[derive(Clone, Default)]
pub struct VectorStorage(Rc<RefCell<Vec<Value>>>);

impl VectorStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: Vec<Value>) -> Self {
        VectorStorage(Rc::new(RefCell::new(values)))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().get(index).cloned()
    }

    pub fn set(&self, index: usize, value: Value) -> bool {
        match self.0.borrow_mut().get_mut(index) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    pub fn push(&self, value: Value) {
        self.0.borrow_mut().push(value);
    }

    /// Copy of the element list.
    pub fn values(&self) -> Vec<Value> {
        self.0.borrow().clone()
    }

    /// Copy of the half-open element range `[from, to)`.
    pub fn slice(&self, from: usize, to: usize) -> Option<VectorStorage> {
        let elements = self.0.borrow();
        if from > to || to > elements.len() {
            return None;
        }
        Some(VectorStorage::from_values(elements[from..to].to_vec()))
    }

    pub fn ptr_eq(a: &VectorStorage, b: &VectorStorage) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}

impl fmt::Display for VectorStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (index, value) in self.0.borrow().iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, ")")
    }
}

impl fmt::Debug for VectorStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

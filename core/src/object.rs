//! Slot-bearing objects and their reference-counted handles.

use crate::code::Code;
use crate::slot::Slot;
use crate::value::Value;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Slot 0 name of every block method; rebound to the captured lexical
/// activation each time the block runs.
pub const BLOCK_PARENT_SLOT: &str = "(parent)";

/// Handle to a slot-bearing record. Handles are reference counted;
/// parent cycles are legal and tolerated by lookup, so they may keep
/// object graphs alive past their last external reference.
#[derive(Clone)]
pub struct Object(Rc<RefCell<ObjectData>>);

struct ObjectData {
    /// Ordered, uniquely-named slot list. Order is observable in
    /// printing and in activation argument indexing.
    slots: IndexMap<String, Slot>,
    /// Code nodes for methods; empty for plain objects. Shared between
    /// a method and its activation clones.
    code: Rc<Vec<Code>>,
}

impl Object {
    pub fn new() -> Self {
        Object(Rc::new(RefCell::new(ObjectData {
            slots: IndexMap::new(),
            code: Rc::new(Vec::new()),
        })))
    }

    /// Insert or replace a slot. Replacement keeps the slot's position.
    pub fn define_slot(&self, name: &str, slot: Slot) {
        self.0.borrow_mut().slots.insert(name.to_string(), slot);
    }

    /// Insert a data slot together with its companion `name:` mutator
    /// constant, upholding the mutator invariant.
    pub fn define_data_slot(&self, name: &str, slot: Slot) {
        let mutator = Slot::constant(Value::Mutator(Rc::from(name)));
        self.define_slot(name, slot);
        self.define_slot(&format!("{}:", name), mutator);
    }

    pub fn has_slot(&self, name: &str) -> bool {
        self.0.borrow().slots.contains_key(name)
    }

    pub fn slot(&self, name: &str) -> Option<Slot> {
        self.0.borrow().slots.get(name).cloned()
    }

    pub fn slot_value(&self, name: &str) -> Option<Value> {
        self.0.borrow().slots.get(name).map(|slot| slot.value.clone())
    }

    /// Overwrite the value of an existing slot; false when absent.
    pub fn set_slot_value(&self, name: &str, value: Value) -> bool {
        match self.0.borrow_mut().slots.get_mut(name) {
            Some(slot) => {
                slot.value = value;
                true
            }
            None => false,
        }
    }

    pub fn slot_count(&self) -> usize {
        self.0.borrow().slots.len()
    }

    pub fn slot_name_at(&self, index: usize) -> Option<String> {
        self.0
            .borrow()
            .slots
            .get_index(index)
            .map(|(name, _)| name.clone())
    }

    pub fn slot_at(&self, index: usize) -> Option<Slot> {
        self.0
            .borrow()
            .slots
            .get_index(index)
            .map(|(_, slot)| slot.clone())
    }

    pub fn slot_value_at(&self, index: usize) -> Option<Value> {
        self.0
            .borrow()
            .slots
            .get_index(index)
            .map(|(_, slot)| slot.value.clone())
    }

    pub fn set_slot_value_at(&self, index: usize, value: Value) -> bool {
        match self.0.borrow_mut().slots.get_index_mut(index) {
            Some((_, slot)) => {
                slot.value = value;
                true
            }
            None => false,
        }
    }

    /// Snapshot of the slot list in order.
    pub fn slots(&self) -> Vec<(String, Slot)> {
        self.0
            .borrow()
            .slots
            .iter()
            .map(|(name, slot)| (name.clone(), slot.clone()))
            .collect()
    }

    /// Values of the parent-flagged slots, in slot order.
    pub fn parent_values(&self) -> Vec<Value> {
        self.0
            .borrow()
            .slots
            .values()
            .filter(|slot| slot.is_parent())
            .map(|slot| slot.value.clone())
            .collect()
    }

    /// Splice argument slots in at `at`, shifting later slots. Used by
    /// the parser to give an inline-parameter method its parameters
    /// right after the `self` slot.
    pub fn insert_argument_slots(&self, at: usize, names: &[String], fill: Value) {
        let mut data = self.0.borrow_mut();
        let mut entries: Vec<(String, Slot)> = data.slots.drain(..).collect();
        for (offset, name) in names.iter().enumerate() {
            entries.insert(at + offset, (name.clone(), Slot::argument(fill.clone())));
        }
        data.slots = entries.into_iter().collect();
    }

    /// Per-slot copy sharing the code list. Mutable (data and argument)
    /// slots become independent cells; constant slot values are shared
    /// by handle, which is safe because they are immutable by contract.
    pub fn clone_object(&self) -> Object {
        let data = self.0.borrow();
        Object(Rc::new(RefCell::new(ObjectData {
            slots: data.slots.clone(),
            code: Rc::clone(&data.code),
        })))
    }

    pub fn code(&self) -> Rc<Vec<Code>> {
        Rc::clone(&self.0.borrow().code)
    }

    pub fn set_code(&self, code: Vec<Code>) {
        self.0.borrow_mut().code = Rc::new(code);
    }

    pub fn has_code(&self) -> bool {
        !self.0.borrow().code.is_empty()
    }

    /// True for methods compiled from block bodies.
    pub fn is_block_method(&self) -> bool {
        matches!(
            self.0.borrow().slots.get_index(0),
            Some((name, _)) if name == BLOCK_PARENT_SLOT
        )
    }

    /// Drop every slot and the code list; used when an interpreter
    /// instance is re-initialized in place.
    pub fn clear_slots(&self) {
        let mut data = self.0.borrow_mut();
        data.slots.clear();
        data.code = Rc::new(Vec::new());
    }

    pub fn ptr_eq(a: &Object, b: &Object) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    /// Stable address for identity sets.
    pub fn address(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl Default for Object {
    fn default() -> Self {
        Object::new()
    }
}

/// Printed form: `(| slot1. slot2 |)`, or `(| slots | codes )` for a
/// method. Slot values are never printed, so printing stays total on
/// cyclic parent graphs.
impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        write!(f, "(|")?;
        for (index, (name, slot)) in data.slots.iter().enumerate() {
            if index > 0 {
                write!(f, ".")?;
            }
            write!(f, " ")?;
            slot.write_printed(name, f)?;
        }
        write!(f, " |")?;
        if !data.code.is_empty() {
            for (index, code) in data.code.iter().enumerate() {
                if index > 0 {
                    write!(f, ".")?;
                }
                write!(f, " {}", code)?;
            }
            write!(f, " ")?;
        }
        write!(f, ")")
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::SlotKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn data_slot_emits_mutator() {
        let object = Object::new();
        object.define_data_slot("a", Slot::data(Value::Integer(0)));

        let mutator = object.slot("a:").expect("companion slot");
        assert_eq!(mutator.kind, SlotKind::Constant);
        match mutator.value {
            Value::Mutator(ref name) => assert_eq!(&**name, "a"),
            ref other => panic!("expected mutator value, got {}", other),
        }
    }

    #[test]
    fn clone_is_independent() {
        let object = Object::new();
        object.define_data_slot("x", Slot::data(Value::Integer(1)));

        let copy = object.clone_object();
        copy.set_slot_value("x", Value::Integer(99));

        assert_eq!(object.slot_value("x"), Some(Value::Integer(1)));
        assert_eq!(copy.slot_value("x"), Some(Value::Integer(99)));
    }

    #[test]
    fn printed_form_keeps_markers() {
        let object = Object::new();
        object.define_slot("p", Slot::constant(Value::Object(Object::new())).parent());
        object.define_data_slot("a", Slot::data(Value::Integer(0)));
        object.define_slot("arg", Slot::argument(Value::Integer(0)));

        assert_eq!(object.to_string(), "(| p*. a<-. a:. :arg |)");
    }
}

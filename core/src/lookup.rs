//! Slot lookup: the walk from a receiver through its parent graph.

use crate::error::Error;
use crate::interpreter::Interpreter;
use crate::object::Object;
use crate::slot::Slot;
use crate::value::Value;
use fnv::FnvHashSet;

/// A slot found by lookup, paired with the object that holds it. The
/// holder is what mutator assignment and slot extension write through.
#[derive(Clone)]
pub struct Binding {
    pub holder: Object,
    pub slot: Slot,
}

/// Find the unique slot named `name` reachable from `value`.
///
/// Lookup starts at the value's own slot list; numbers, strings and
/// vectors have none, so they borrow the slot list of their shared
/// trait object. A local match always shadows inherited ones; matches
/// reached through two distinct parent recursions with no closer
/// shadowing are an error.
pub fn find_slot(interpreter: &Interpreter, value: &Value, name: &str) -> Result<Binding, Error> {
    let root = match value {
        Value::Object(object) | Value::Method(object) => object.clone(),
        Value::Integer(_) | Value::Float(_) => interpreter.traits_number.clone(),
        Value::String(_) => interpreter.traits_string.clone(),
        Value::Vector(_) => interpreter.traits_vector.clone(),
        Value::Mutator(_) => return Err(Error::UnknownMessageSend(name.to_string())),
    };
    let mut visited = FnvHashSet::default();
    resolve(&root, name, &mut visited)?
        .ok_or_else(|| Error::UnknownMessageSend(name.to_string()))
}

/// One step of the cycle-safe walk. The visited set spans the whole
/// call, so a diamond in the parent graph yields its shared ancestor's
/// slot once rather than an ambiguity.
fn resolve(
    object: &Object,
    name: &str,
    visited: &mut FnvHashSet<usize>,
) -> Result<Option<Binding>, Error> {
    if !visited.insert(object.address()) {
        return Ok(None);
    }
    if let Some(slot) = object.slot(name) {
        return Ok(Some(Binding {
            holder: object.clone(),
            slot,
        }));
    }
    let mut found = None;
    for parent in object.parent_values() {
        // A parent slot holding a non-object contributes no slots.
        if let Value::Object(parent_object) = parent {
            if let Some(binding) = resolve(&parent_object, name, visited)? {
                if found.is_some() {
                    return Err(Error::AmbiguousMessageSend(name.to_string()));
                }
                found = Some(binding);
            }
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::Slot;

    fn interpreter() -> Interpreter {
        Interpreter::new().expect("bootstrap")
    }

    #[test]
    fn local_slot_shadows_inherited() {
        let interpreter = interpreter();
        let parent = Object::new();
        parent.define_slot("a", Slot::constant(Value::Integer(1)));
        let child = Object::new();
        child.define_slot("p", Slot::constant(Value::Object(parent)).parent());
        child.define_slot("a", Slot::constant(Value::Integer(2)));

        let binding = find_slot(&interpreter, &Value::Object(child.clone()), "a").expect("found");
        assert!(Object::ptr_eq(&binding.holder, &child));
        assert_eq!(binding.slot.value, Value::Integer(2));
    }

    #[test]
    fn disjoint_parents_are_ambiguous() {
        let interpreter = interpreter();
        let left = Object::new();
        left.define_slot("a", Slot::constant(Value::Integer(1)));
        let right = Object::new();
        right.define_slot("a", Slot::constant(Value::Integer(2)));
        let child = Object::new();
        child.define_slot("l", Slot::constant(Value::Object(left)).parent());
        child.define_slot("r", Slot::constant(Value::Object(right)).parent());

        match find_slot(&interpreter, &Value::Object(child), "a") {
            Err(Error::AmbiguousMessageSend(name)) => assert_eq!(name, "a"),
            other => panic!("expected ambiguity, got {:?}", other.map(|b| b.slot.value)),
        }
    }

    #[test]
    fn diamond_parents_are_not_ambiguous() {
        let interpreter = interpreter();
        let shared = Object::new();
        shared.define_slot("a", Slot::constant(Value::Integer(7)));
        let left = Object::new();
        left.define_slot("p", Slot::constant(Value::Object(shared.clone())).parent());
        let right = Object::new();
        right.define_slot("p", Slot::constant(Value::Object(shared)).parent());
        let child = Object::new();
        child.define_slot("l", Slot::constant(Value::Object(left)).parent());
        child.define_slot("r", Slot::constant(Value::Object(right)).parent());

        let binding = find_slot(&interpreter, &Value::Object(child), "a").expect("found");
        assert_eq!(binding.slot.value, Value::Integer(7));
    }

    #[test]
    fn cyclic_parents_terminate() {
        let interpreter = interpreter();
        let first = Object::new();
        let second = Object::new();
        first.define_slot("p", Slot::constant(Value::Object(second.clone())).parent());
        second.define_slot("p", Slot::constant(Value::Object(first.clone())).parent());
        second.define_slot("a", Slot::constant(Value::Integer(3)));

        let binding = find_slot(&interpreter, &Value::Object(first.clone()), "a").expect("found");
        assert_eq!(binding.slot.value, Value::Integer(3));

        match find_slot(&interpreter, &Value::Object(first), "missing") {
            Err(Error::UnknownMessageSend(name)) => assert_eq!(name, "missing"),
            other => panic!("expected unknown send, got {:?}", other.map(|b| b.slot.value)),
        }
    }

    #[test]
    fn numbers_borrow_the_number_traits() {
        let interpreter = interpreter();
        let binding = find_slot(&interpreter, &Value::Integer(3), "+").expect("found");
        assert!(Object::ptr_eq(&binding.holder, &interpreter.traits_number));
    }
}

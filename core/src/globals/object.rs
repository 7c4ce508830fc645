//! Object primitives: cloning, universal equality, slot extension.

use crate::error::Error;
use crate::interpreter::Interpreter;
use crate::slot::{Slot, SlotKind};
use crate::value::Value;
use crate::vector::VectorStorage;
use std::rc::Rc;

/// `_Clone`. Immutable values and the bootstrap singletons answer
/// themselves; objects get a per-slot copy. A method clones to a plain
/// object sharing the code list.
pub fn clone(interpreter: &mut Interpreter, args: &[Value]) -> Result<Value, Error> {
    match args.first() {
        Some(Value::Object(object)) => {
            if interpreter.is_singleton(object) {
                Ok(Value::Object(object.clone()))
            } else {
                Ok(Value::Object(object.clone_object()))
            }
        }
        Some(Value::Method(method)) => Ok(Value::Object(method.clone_object())),
        Some(Value::Vector(storage)) => {
            Ok(Value::Vector(VectorStorage::from_values(storage.values())))
        }
        Some(value) => Ok(value.clone()),
        None => Err(Error::InvalidPrimitiveArgument("_Clone".to_string())),
    }
}

/// `_Equal:`: numeric across integer/float, content for strings,
/// handle identity for everything slot-bearing.
pub fn equal(interpreter: &mut Interpreter, args: &[Value]) -> Result<Value, Error> {
    match (args.first(), args.get(1)) {
        (Some(a), Some(b)) => Ok(interpreter.boolean(a == b)),
        _ => Err(Error::InvalidPrimitiveArgument("_Equal:".to_string())),
    }
}

/// `_AddSlotsIfAbsent:`: copy each slot of the argument object onto the
/// receiver unless a slot of that name already exists, restoring the
/// mutator invariant for any data slot that arrives alone.
pub fn add_slots_if_absent(_interpreter: &mut Interpreter, args: &[Value]) -> Result<Value, Error> {
    let receiver_value = args
        .first()
        .cloned()
        .ok_or_else(|| Error::InvalidPrimitiveArgument("_AddSlotsIfAbsent:".to_string()))?;
    let receiver = receiver_value
        .as_object()
        .cloned()
        .ok_or_else(|| Error::InvalidPrimitiveArgument("_AddSlotsIfAbsent:".to_string()))?;
    let additions = match args.get(1) {
        Some(Value::Object(object)) | Some(Value::Method(object)) => object.slots(),
        _ => return Err(Error::InvalidPrimitiveArgument("_AddSlotsIfAbsent:".to_string())),
    };

    let mut added_data = Vec::new();
    for (name, slot) in additions {
        if receiver.has_slot(&name) {
            continue;
        }
        if slot.kind == SlotKind::Data {
            added_data.push(name.clone());
        }
        receiver.define_slot(&name, slot);
    }
    for name in added_data {
        let mutator_name = format!("{}:", name);
        if !receiver.has_slot(&mutator_name) {
            receiver.define_slot(
                &mutator_name,
                Slot::constant(Value::Mutator(Rc::from(name.as_str()))),
            );
        }
    }
    Ok(receiver_value)
}

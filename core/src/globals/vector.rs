//! Vector primitives.

use crate::error::Error;
use crate::interpreter::Interpreter;
use crate::value::Value;
use crate::vector::VectorStorage;

fn vector<'v>(name: &str, value: Option<&'v Value>) -> Result<&'v VectorStorage, Error> {
    match value {
        Some(Value::Vector(storage)) => Ok(storage),
        _ => Err(Error::InvalidPrimitiveArgument(name.to_string())),
    }
}

fn index(name: &str, value: Option<&Value>) -> Result<usize, Error> {
    match value {
        Some(Value::Integer(n)) if *n >= 0 => Ok(*n as usize),
        _ => Err(Error::InvalidPrimitiveArgument(name.to_string())),
    }
}

/// Copy the receiver's elements (none when the receiver is not a
/// vector, e.g. `traitsVector` minting a fresh one) and pad with `nil`
/// up to the requested length.
pub fn clone_with(interpreter: &mut Interpreter, args: &[Value]) -> Result<Value, Error> {
    let length = index("_VectorClone:", args.get(1))?;
    let mut values = match args.first() {
        Some(Value::Vector(storage)) => storage.values(),
        _ => Vec::new(),
    };
    while values.len() < length {
        values.push(interpreter.nil_value());
    }
    Ok(Value::Vector(VectorStorage::from_values(values)))
}

pub fn size(_interpreter: &mut Interpreter, args: &[Value]) -> Result<Value, Error> {
    let receiver = vector("_VectorSize", args.first())?;
    Ok(Value::Integer(receiver.len() as i64))
}

/// Append and answer the receiver, so adds chain.
pub fn add(interpreter: &mut Interpreter, args: &[Value]) -> Result<Value, Error> {
    let receiver = vector("_VectorAdd:", args.first())?;
    let value = args
        .get(1)
        .cloned()
        .unwrap_or_else(|| interpreter.nil_value());
    receiver.push(value);
    Ok(Value::Vector(receiver.clone()))
}

pub fn at(_interpreter: &mut Interpreter, args: &[Value]) -> Result<Value, Error> {
    let receiver = vector("_VectorAt:", args.first())?;
    let at = index("_VectorAt:", args.get(1))?;
    receiver
        .get(at)
        .ok_or_else(|| Error::InvalidPrimitiveArgument("_VectorAt:".to_string()))
}

pub fn at_put(interpreter: &mut Interpreter, args: &[Value]) -> Result<Value, Error> {
    let receiver = vector("_VectorAt:Put:", args.first())?;
    let at = index("_VectorAt:Put:", args.get(1))?;
    let value = args
        .get(2)
        .cloned()
        .unwrap_or_else(|| interpreter.nil_value());
    if !receiver.set(at, value.clone()) {
        return Err(Error::InvalidPrimitiveArgument("_VectorAt:Put:".to_string()));
    }
    Ok(value)
}

pub fn from_to(_interpreter: &mut Interpreter, args: &[Value]) -> Result<Value, Error> {
    let receiver = vector("_VectorFrom:To:", args.first())?;
    let from = index("_VectorFrom:To:", args.get(1))?;
    let to = index("_VectorFrom:To:", args.get(2))?;
    receiver
        .slice(from, to)
        .map(Value::Vector)
        .ok_or_else(|| Error::InvalidPrimitiveArgument("_VectorFrom:To:".to_string()))
}

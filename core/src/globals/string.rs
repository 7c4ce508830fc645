//! String primitives. Indices are zero-based character offsets; ranges
//! are half-open.

use crate::error::Error;
use crate::interpreter::Interpreter;
use crate::value::Value;

fn text<'v>(name: &str, value: Option<&'v Value>) -> Result<&'v str, Error> {
    match value {
        Some(Value::String(s)) => Ok(s),
        _ => Err(Error::InvalidPrimitiveArgument(name.to_string())),
    }
}

fn index(name: &str, value: Option<&Value>) -> Result<usize, Error> {
    match value {
        Some(Value::Integer(n)) if *n >= 0 => Ok(*n as usize),
        _ => Err(Error::InvalidPrimitiveArgument(name.to_string())),
    }
}

pub fn size(_interpreter: &mut Interpreter, args: &[Value]) -> Result<Value, Error> {
    let receiver = text("_StringSize", args.first())?;
    Ok(Value::Integer(receiver.chars().count() as i64))
}

pub fn at(_interpreter: &mut Interpreter, args: &[Value]) -> Result<Value, Error> {
    let receiver = text("_StringAt:", args.first())?;
    let at = index("_StringAt:", args.get(1))?;
    receiver
        .chars()
        .nth(at)
        .map(|c| Value::string(c.to_string()))
        .ok_or_else(|| Error::InvalidPrimitiveArgument("_StringAt:".to_string()))
}

pub fn concat(_interpreter: &mut Interpreter, args: &[Value]) -> Result<Value, Error> {
    let receiver = text("_StringConcat:", args.first())?;
    let suffix = text("_StringConcat:", args.get(1))?;
    let mut result = String::with_capacity(receiver.len() + suffix.len());
    result.push_str(receiver);
    result.push_str(suffix);
    Ok(Value::string(result))
}

pub fn from_to(_interpreter: &mut Interpreter, args: &[Value]) -> Result<Value, Error> {
    let receiver = text("_StringFrom:To:", args.first())?;
    let from = index("_StringFrom:To:", args.get(1))?;
    let to = index("_StringFrom:To:", args.get(2))?;
    let chars: Vec<char> = receiver.chars().collect();
    if from > to || to > chars.len() {
        return Err(Error::InvalidPrimitiveArgument("_StringFrom:To:".to_string()));
    }
    Ok(Value::string(chars[from..to].iter().collect::<String>()))
}

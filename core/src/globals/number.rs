//! Numeric primitives.

use crate::error::Error;
use crate::interpreter::Interpreter;
use crate::value::Value;

/// Either number representation, for uniform promotion rules: two
/// integers stay integral, anything else is computed in floats.
#[derive(Clone, Copy)]
enum Numeric {
    Integer(i64),
    Float(f64),
}

impl Numeric {
    fn as_f64(self) -> f64 {
        match self {
            Numeric::Integer(n) => n as f64,
            Numeric::Float(x) => x,
        }
    }
}

fn number(name: &str, value: Option<&Value>) -> Result<Numeric, Error> {
    match value {
        Some(Value::Integer(n)) => Ok(Numeric::Integer(*n)),
        Some(Value::Float(x)) => Ok(Numeric::Float(*x)),
        _ => Err(Error::InvalidPrimitiveArgument(name.to_string())),
    }
}

fn pair(name: &str, args: &[Value]) -> Result<(Numeric, Numeric), Error> {
    Ok((number(name, args.first())?, number(name, args.get(1))?))
}

pub fn add(_interpreter: &mut Interpreter, args: &[Value]) -> Result<Value, Error> {
    match pair("_NumAdd:", args)? {
        (Numeric::Integer(a), Numeric::Integer(b)) => Ok(Value::Integer(a.wrapping_add(b))),
        (a, b) => Ok(Value::Float(a.as_f64() + b.as_f64())),
    }
}

pub fn subtract(_interpreter: &mut Interpreter, args: &[Value]) -> Result<Value, Error> {
    match pair("_NumSub:", args)? {
        (Numeric::Integer(a), Numeric::Integer(b)) => Ok(Value::Integer(a.wrapping_sub(b))),
        (a, b) => Ok(Value::Float(a.as_f64() - b.as_f64())),
    }
}

pub fn multiply(_interpreter: &mut Interpreter, args: &[Value]) -> Result<Value, Error> {
    match pair("_NumMul:", args)? {
        (Numeric::Integer(a), Numeric::Integer(b)) => Ok(Value::Integer(a.wrapping_mul(b))),
        (a, b) => Ok(Value::Float(a.as_f64() * b.as_f64())),
    }
}

/// Division always answers a float.
pub fn divide(_interpreter: &mut Interpreter, args: &[Value]) -> Result<Value, Error> {
    let (a, b) = pair("_NumDiv:", args)?;
    Ok(Value::Float(a.as_f64() / b.as_f64()))
}

pub fn modulo(_interpreter: &mut Interpreter, args: &[Value]) -> Result<Value, Error> {
    match pair("_NumMod:", args)? {
        (Numeric::Integer(a), Numeric::Integer(b)) => a
            .checked_rem(b)
            .map(Value::Integer)
            .ok_or_else(|| Error::InvalidPrimitiveArgument("_NumMod:".to_string())),
        (a, b) => Ok(Value::Float(a.as_f64() % b.as_f64())),
    }
}

pub fn less_than(interpreter: &mut Interpreter, args: &[Value]) -> Result<Value, Error> {
    let result = match pair("_NumLt:", args)? {
        (Numeric::Integer(a), Numeric::Integer(b)) => a < b,
        (a, b) => a.as_f64() < b.as_f64(),
    };
    Ok(interpreter.boolean(result))
}

pub fn to_string(_interpreter: &mut Interpreter, args: &[Value]) -> Result<Value, Error> {
    match number("_NumToString", args.first())? {
        Numeric::Integer(n) => Ok(Value::string(n.to_string())),
        Numeric::Float(x) => Ok(Value::string(x.to_string())),
    }
}

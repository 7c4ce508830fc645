//! The evaluator: code-node interpretation inside method activations.

use crate::code::Code;
use crate::error::Error;
use crate::interpreter::Interpreter;
use crate::lookup;
use crate::object::Object;
use crate::value::Value;
use smallvec::SmallVec;

/// Evaluated argument lists on the send path; most selectors carry at
/// most a couple of arguments.
type Arguments = SmallVec<[Value; 4]>;

/// One in-flight call: a method clone whose argument slots have been
/// populated, plus the interpreter it runs against.
pub struct Activation<'a> {
    interpreter: &'a mut Interpreter,
    this: Object,
}

/// Activate `method` with `args`, where `args[0]` is the value bound to
/// slot 0 (`self` for regular methods, the block object for block
/// methods) and the rest fill the argument slots in order.
pub(crate) fn run_method(
    interpreter: &mut Interpreter,
    method: &Object,
    args: &[Value],
) -> Result<Value, Error> {
    let activation_object = method.clone_object();
    let slot_count = activation_object.slot_count();
    for (index, value) in args.iter().enumerate().take(slot_count) {
        activation_object.set_slot_value_at(index, value.clone());
    }

    if activation_object.is_block_method() {
        // Rebind slot 0 from the block object's captured activation so
        // lookups inside the block reach the defining method's slots.
        let lexical = match args.first() {
            Some(Value::Object(block)) => block.slot_value("lexicalParent"),
            _ => None,
        };
        let lexical = lexical.ok_or_else(|| Error::UnknownMessageSend("lexicalParent".into()))?;
        activation_object.set_slot_value_at(0, lexical);
    }

    let codes = method.code();
    let mut result = interpreter.nil_value();
    let mut activation = Activation {
        interpreter,
        this: activation_object.clone(),
    };
    for code in codes.iter() {
        match activation.eval(code) {
            Ok(value) => result = value,
            Err(Error::NonLocalReturn { target, value })
                if Object::ptr_eq(&target, &activation_object) =>
            {
                return Ok(value);
            }
            Err(error) => return Err(error),
        }
    }
    Ok(result)
}

/// The shared tail of a message send, used both by the evaluator and by
/// the interpreter's public `send`: primitive dispatch, slot lookup,
/// mutator redirection, method activation. `method_self` is what a
/// found method receives as its `self` argument: the receiver for
/// explicit sends, the enclosing instance for implicit ones.
pub(crate) fn dispatch(
    interpreter: &mut Interpreter,
    receiver: &Value,
    selector: &str,
    args: &[Value],
    method_self: &Value,
) -> Result<Value, Error> {
    if selector.starts_with('_') {
        let function = interpreter
            .primitive(selector)
            .ok_or_else(|| Error::UnknownPrimitive(selector.to_string()))?;
        let mut call_args = Arguments::with_capacity(args.len() + 1);
        call_args.push(receiver.clone());
        call_args.extend(args.iter().cloned());
        return function(interpreter, &call_args);
    }

    let binding = lookup::find_slot(interpreter, receiver, selector)?;
    match binding.slot.value {
        Value::Mutator(ref data_name) => {
            let data_binding = match lookup::find_slot(interpreter, receiver, data_name) {
                Ok(binding) => binding,
                Err(Error::UnknownMessageSend(_)) => {
                    return Err(Error::MutatorWithoutDataSlot(selector.to_string()));
                }
                Err(error) => return Err(error),
            };
            let value = args
                .first()
                .cloned()
                .unwrap_or_else(|| interpreter.nil_value());
            data_binding.holder.set_slot_value(data_name, value.clone());
            Ok(value)
        }
        Value::Method(ref method) => {
            log::trace!("activating {} on {}", selector, receiver.type_name());
            let mut call_args = Arguments::with_capacity(args.len() + 1);
            call_args.push(method_self.clone());
            call_args.extend(args.iter().cloned());
            run_method(interpreter, method, &call_args)
        }
        ref value => Ok(value.clone()),
    }
}

impl<'a> Activation<'a> {
    fn eval(&mut self, code: &Code) -> Result<Value, Error> {
        match code {
            Code::Literal(value) => Ok(value.clone()),

            // A parenthesized expression: its code list runs inline in
            // the current activation rather than in a fresh one.
            Code::MethodLiteral(method) => {
                let codes = method.code();
                let mut result = self.interpreter.nil_value();
                for code in codes.iter() {
                    result = self.eval(code)?;
                }
                Ok(result)
            }

            Code::BlockLiteral(prototype) => {
                let block = prototype.clone_object();
                block.set_slot_value("lexicalParent", Value::Object(self.this.clone()));
                Ok(Value::Object(block))
            }

            Code::Message {
                receiver,
                selector,
                args,
            } => {
                let (receiver_value, method_self) = match receiver {
                    Some(code) => {
                        let value = self.eval(code)?;
                        (value.clone(), value)
                    }
                    None => {
                        // Implicit self: the receiver is the activation
                        // itself, but a found method's `self` is the
                        // enclosing instance the activation inherits.
                        let receiver_value = Value::Object(self.this.clone());
                        let method_self =
                            lookup::find_slot(self.interpreter, &receiver_value, "self")?
                                .slot
                                .value;
                        (receiver_value, method_self)
                    }
                };
                let mut evaluated = Arguments::with_capacity(args.len());
                for arg in args {
                    evaluated.push(self.eval(arg)?);
                }
                dispatch(
                    self.interpreter,
                    &receiver_value,
                    selector,
                    &evaluated,
                    &method_self,
                )
            }

            Code::Return(expression) => {
                let value = self.eval(expression)?;
                let target = self.return_target();
                Err(Error::NonLocalReturn { target, value })
            }
        }
    }

    /// The innermost enclosing regular method: follow slot 0 while the
    /// current activation belongs to a block method.
    fn return_target(&self) -> Object {
        let mut current = self.this.clone();
        loop {
            if !current.is_block_method() {
                return current;
            }
            match current.slot_value_at(0) {
                Some(Value::Object(parent)) => current = parent,
                _ => return current,
            }
        }
    }
}

//! Code nodes: the tree the evaluator walks.

use crate::object::Object;
use crate::value::Value;
use std::fmt;

/// One node of a compiled method body.
#[derive(Clone)]
pub enum Code {
    /// A value that evaluates to itself.
    Literal(Value),
    /// A parenthesized expression compiled to a method: its code list is
    /// evaluated inline in the current activation. This is what makes a
    /// literal `(3 + 4)` grouping rather than a callable stored method.
    MethodLiteral(Object),
    /// A block prototype: evaluation clones it and captures the current
    /// activation in the clone's `lexicalParent` slot.
    BlockLiteral(Object),
    /// A message send. A missing receiver is the implicit-self
    /// convention: the receiver becomes the current activation.
    Message {
        receiver: Option<Box<Code>>,
        selector: String,
        args: Vec<Code>,
    },
    /// `^ expr`: evaluate, then unwind to the innermost enclosing
    /// regular method of the activation chain.
    Return(Box<Code>),
}

/// Messages print in the tagged-list form `{selector receiver args…}`;
/// the receiver is omitted for implicit sends.
impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Code::Literal(value) => write!(f, "{}", value),
            Code::MethodLiteral(method) => write!(f, "{}", method),
            Code::BlockLiteral(block) => write!(f, "{}", block),
            Code::Message {
                receiver,
                selector,
                args,
            } => {
                write!(f, "{{{}", selector)?;
                if let Some(receiver) = receiver {
                    write!(f, " {}", receiver)?;
                }
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                write!(f, "}}")
            }
            Code::Return(expression) => write!(f, "^ {}", expression),
        }
    }
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

//! Error types raised by the interpreter core.

use crate::object::Object;
use crate::value::Value;
use thiserror::Error;

/// Every way a parse, lookup or evaluation can fail.
///
/// `NonLocalReturn` is not a user-visible failure: it is the unwinding
/// carrier for `^` expressions and is caught, by activation identity, in
/// the activation it targets. It only surfaces from `execute`/`send` when
/// a block performs `^` after its home method has already returned.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("unknown message send: {0}")]
    UnknownMessageSend(String),

    #[error("ambiguous message send: {0}")]
    AmbiguousMessageSend(String),

    #[error("unknown primitive: {0}")]
    UnknownPrimitive(String),

    #[error("mutator without data slot: {0}")]
    MutatorWithoutDataSlot(String),

    #[error("invalid arguments for primitive {0}")]
    InvalidPrimitiveArgument(String),

    #[error("SyntaxError: {message} at {position}")]
    Syntax { message: String, position: usize },

    #[error("non-local return escaped its home method")]
    NonLocalReturn { target: Object, value: Value },
}

impl Error {
    /// Build a parser failure at a zero-based character offset.
    pub fn syntax(message: impl Into<String>, position: usize) -> Self {
        Error::Syntax {
            message: message.into(),
            position,
        }
    }
}

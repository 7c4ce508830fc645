//! The interpreter instance: bootstrap state and the public API.

use crate::activation;
use crate::error::Error;
use crate::globals;
use crate::lookup::{self, Binding};
use crate::object::Object;
use crate::parser::Parser;
use crate::slot::Slot;
use crate::value::Value;
use fnv::FnvHashMap;

/// Host function behind a `_Selector`. `args[0]` is the receiver.
/// Primitives never perform slot lookup and never activate methods.
pub type NativeFunction = fn(&mut Interpreter, &[Value]) -> Result<Value, Error>;

/// One independent interpreter: the singleton objects, the trait
/// objects primitive values borrow behavior from, the lobby, and the
/// primitive registry. Instances share no state and are single
/// threaded.
pub struct Interpreter {
    pub nil: Object,
    pub true_object: Object,
    pub false_object: Object,
    pub traits_number: Object,
    pub traits_string: Object,
    pub traits_vector: Object,
    pub traits_block: Object,
    pub lobby: Object,
    primitives: FnvHashMap<String, NativeFunction>,
}

impl Interpreter {
    /// Build and bootstrap a fresh instance.
    pub fn new() -> Result<Self, Error> {
        let mut interpreter = Interpreter {
            nil: Object::new(),
            true_object: Object::new(),
            false_object: Object::new(),
            traits_number: Object::new(),
            traits_string: Object::new(),
            traits_vector: Object::new(),
            traits_block: Object::new(),
            lobby: Object::new(),
            primitives: FnvHashMap::default(),
        };
        interpreter.initialize()?;
        Ok(interpreter)
    }

    /// Reset the instance in place: clear every bootstrap object's
    /// slots, repopulate the primitive registry, and re-run the
    /// bootstrap source. Handles held by callers stay valid; they see
    /// the refreshed slot lists.
    pub fn initialize(&mut self) -> Result<(), Error> {
        let bootstrap_objects = [
            self.nil.clone(),
            self.true_object.clone(),
            self.false_object.clone(),
            self.traits_number.clone(),
            self.traits_string.clone(),
            self.traits_vector.clone(),
            self.traits_block.clone(),
            self.lobby.clone(),
        ];
        for object in &bootstrap_objects {
            object.clear_slots();
        }
        self.primitives.clear();
        globals::register_primitives(&mut self.primitives);
        self.install_lobby_bindings();
        self.execute(globals::BOOTSTRAP)?;
        log::debug!("interpreter initialized");
        Ok(())
    }

    /// Parse `source` as a top-level program and run it with the lobby
    /// as `self`.
    pub fn execute(&mut self, source: &str) -> Result<Value, Error> {
        let program = Parser::parse_program(source, self)?;
        let lobby = Value::Object(self.lobby.clone());
        activation::run_method(self, &program, &[lobby])
    }

    /// Send `selector` to `args[0]` with the remaining values as
    /// arguments: primitives dispatch to the registry, methods are
    /// activated, data slots answer their value.
    pub fn send(&mut self, selector: &str, args: &[Value]) -> Result<Value, Error> {
        let receiver = args.first().cloned().unwrap_or_else(|| self.nil_value());
        let rest = if args.is_empty() { &[][..] } else { &args[1..] };
        activation::dispatch(self, &receiver, selector, rest, &receiver)
    }

    /// Expose slot lookup on any value.
    pub fn find_slot(&self, value: &Value, name: &str) -> Result<Binding, Error> {
        lookup::find_slot(self, value, name)
    }

    pub fn nil_value(&self) -> Value {
        Value::Object(self.nil.clone())
    }

    pub fn boolean(&self, value: bool) -> Value {
        if value {
            Value::Object(self.true_object.clone())
        } else {
            Value::Object(self.false_object.clone())
        }
    }

    pub(crate) fn primitive(&self, name: &str) -> Option<NativeFunction> {
        self.primitives.get(name).copied()
    }

    /// The singletons `_Clone` answers unchanged.
    pub(crate) fn is_singleton(&self, object: &Object) -> bool {
        Object::ptr_eq(object, &self.nil)
            || Object::ptr_eq(object, &self.true_object)
            || Object::ptr_eq(object, &self.false_object)
    }

    /// Constant slots every top-level program can see. Installed
    /// natively so the bootstrap source itself can refer to them.
    fn install_lobby_bindings(&mut self) {
        let bindings = [
            ("lobby", self.lobby.clone()),
            ("nil", self.nil.clone()),
            ("true", self.true_object.clone()),
            ("false", self.false_object.clone()),
            ("traitsNumber", self.traits_number.clone()),
            ("traitsString", self.traits_string.clone()),
            ("traitsVector", self.traits_vector.clone()),
            ("traitsBlock", self.traits_block.clone()),
        ];
        for (name, object) in &bindings {
            self.lobby
                .define_slot(name, Slot::constant(Value::Object(object.clone())));
        }
    }
}

#[cfg(test)]
mod tests;

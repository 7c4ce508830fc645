//! Recursive-descent parser: source text to code trees and static
//! objects.
//!
//! Slot initializers are resolved while parsing: literal and method
//! right-hand sides become slot values directly, anything else is
//! executed immediately with the lobby as `self`. The parser therefore
//! drives the evaluator and needs mutable access to the interpreter.

use crate::activation;
use crate::code::Code;
use crate::error::Error;
use crate::interpreter::Interpreter;
use crate::lexer::{self, Token, TokenKind};
use crate::object::{Object, BLOCK_PARENT_SLOT};
use crate::slot::{Slot, SlotKind};
use crate::value::Value;

pub struct Parser<'a> {
    interpreter: &'a mut Interpreter,
    tokens: Vec<Token>,
    position: usize,
}

/// A parsed slot declaration, with its initializer already resolved to
/// a value.
struct SlotSpec {
    name: String,
    kind: SlotKind,
    parent: bool,
    value: Value,
    position: usize,
}

impl<'a> Parser<'a> {
    /// Parse `source` as a top-level program and wrap it in a synthetic
    /// method whose single parent-argument `self` will be bound to the
    /// lobby on execution.
    pub fn parse_program(source: &str, interpreter: &'a mut Interpreter) -> Result<Object, Error> {
        let tokens = lexer::tokenize(source)?;
        let mut parser = Parser {
            interpreter,
            tokens,
            position: 0,
        };
        parser.program()
    }

    fn program(&mut self) -> Result<Object, Error> {
        let codes = self.body(&TokenKind::End, false)?;
        self.expect(&TokenKind::End, "expected end of program")?;
        let method = Object::new();
        method.define_slot(
            "self",
            Slot::argument(self.interpreter.nil_value()).parent(),
        );
        method.set_code(codes);
        Ok(method)
    }

    /// `{ message "." } [ "^" message [ "." ] ]` up to (not consuming)
    /// `closer`. `^` is only legal as the last statement of a block.
    fn body(&mut self, closer: &TokenKind, allow_return: bool) -> Result<Vec<Code>, Error> {
        let mut codes = Vec::new();
        loop {
            if self.peek() == closer {
                break;
            }
            if closer != &TokenKind::End && matches!(self.peek(), TokenKind::End) {
                return Err(self.syntax_here("unexpected end of input"));
            }
            if matches!(self.peek(), TokenKind::Caret) {
                let position = self.peek_position();
                if !allow_return {
                    return Err(Error::syntax("non-local return outside a block", position));
                }
                self.advance();
                let value = self.message()?;
                codes.push(Code::Return(Box::new(value)));
                self.eat(&TokenKind::Dot);
                if self.peek() != closer {
                    return Err(self.syntax_here("expected ] after non-local return"));
                }
                break;
            }
            codes.push(self.message()?);
            if self.eat(&TokenKind::Dot) {
                continue;
            }
            if self.peek() != closer {
                return Err(self.syntax_here("expected . between statements"));
            }
        }
        Ok(codes)
    }

    /// `binary { kw1 binary { kw2 binary } }`, with the implicit-self
    /// form when a statement starts with a keyword part.
    fn message(&mut self) -> Result<Code, Error> {
        if self.peek_first_keyword() {
            return self.keyword_message(None);
        }
        let receiver = self.binary()?;
        if self.peek_first_keyword() {
            self.keyword_message(Some(receiver))
        } else {
            Ok(receiver)
        }
    }

    fn keyword_message(&mut self, receiver: Option<Code>) -> Result<Code, Error> {
        let mut selector = String::new();
        let mut args = Vec::new();
        while let TokenKind::Keyword(part) = self.peek().clone() {
            if !selector.is_empty() && !lexer::is_subsequent_keyword(&part) {
                break;
            }
            self.advance();
            selector.push_str(&part);
            args.push(self.binary()?);
        }
        Ok(Code::Message {
            receiver: receiver.map(Box::new),
            selector,
            args,
        })
    }

    fn binary(&mut self) -> Result<Code, Error> {
        let mut node = self.unary()?;
        while let TokenKind::Operator(selector) = self.peek().clone() {
            // A single bar is the slot-list delimiter, never a selector.
            if selector == "|" {
                break;
            }
            self.advance();
            let argument = self.unary()?;
            node = Code::Message {
                receiver: Some(Box::new(node)),
                selector,
                args: vec![argument],
            };
        }
        Ok(node)
    }

    fn unary(&mut self) -> Result<Code, Error> {
        let mut node = match self.peek().clone() {
            // A bare name is an implicit send to the current activation;
            // local, instance and global access are all this.
            TokenKind::Name(selector) => {
                self.advance();
                Code::Message {
                    receiver: None,
                    selector,
                    args: Vec::new(),
                }
            }
            _ => self.primary()?,
        };
        while let TokenKind::Name(selector) = self.peek().clone() {
            self.advance();
            node = Code::Message {
                receiver: Some(Box::new(node)),
                selector,
                args: Vec::new(),
            };
        }
        Ok(node)
    }

    fn primary(&mut self) -> Result<Code, Error> {
        let position = self.peek_position();
        match self.peek().clone() {
            TokenKind::Integer(value) => {
                self.advance();
                Ok(Code::Literal(Value::Integer(value)))
            }
            TokenKind::Float(value) => {
                self.advance();
                Ok(Code::Literal(Value::Float(value)))
            }
            TokenKind::String(text) => {
                self.advance();
                Ok(Code::Literal(Value::string(&text)))
            }
            TokenKind::LParen => {
                self.advance();
                self.object_literal()
            }
            TokenKind::LBracket => {
                self.advance();
                self.block_literal()
            }
            TokenKind::Caret => Err(Error::syntax("non-local return outside a block", position)),
            _ => Err(Error::syntax("expected an expression", position)),
        }
    }

    /// The inside of `( … )`. Slots only: a literal object. Any body: a
    /// method, wrapped so that standalone use evaluates it inline.
    fn object_literal(&mut self) -> Result<Code, Error> {
        let position = self.peek_position();
        let specs = if self.peek_slot_list() {
            self.slot_list()?
        } else {
            Vec::new()
        };
        let codes = self.body(&TokenKind::RParen, false)?;
        self.expect(&TokenKind::RParen, "unterminated object literal")?;
        if codes.is_empty() {
            let object = self.build_plain_object(&specs)?;
            Ok(Code::Literal(Value::Object(object)))
        } else {
            let method = self.build_method(&[], specs, codes, position)?;
            Ok(Code::MethodLiteral(method))
        }
    }

    /// The inside of `[ … ]`: compiles the body to a block method and
    /// wraps it in a block prototype carrying `traitsBlock`, the
    /// `lexicalParent` cell, and the arity-encoding `value…` slot.
    fn block_literal(&mut self) -> Result<Code, Error> {
        let specs = if self.peek_slot_list() {
            self.slot_list()?
        } else {
            Vec::new()
        };
        let mut codes = self.body(&TokenKind::RBracket, true)?;
        self.expect(&TokenKind::RBracket, "unterminated block")?;
        if codes.is_empty() {
            codes.push(Code::Literal(self.interpreter.nil_value()));
        }
        let argument_count = specs
            .iter()
            .filter(|spec| spec.kind == SlotKind::Argument)
            .count();
        let method = self.build_block_method(specs, codes)?;

        let block = Object::new();
        block.define_slot(
            "parent",
            Slot::constant(Value::Object(self.interpreter.traits_block.clone())).parent(),
        );
        block.define_slot("lexicalParent", Slot::argument(self.interpreter.nil_value()));
        block.define_slot(
            &value_selector(argument_count),
            Slot::constant(Value::Method(method)),
        );
        Ok(Code::BlockLiteral(block))
    }

    fn peek_slot_list(&self) -> bool {
        self.peek_operator("|") || self.peek_operator("||")
    }

    /// `"|" slot { "." slot } [ "." ] "|"`. A lone `||` token is an
    /// empty list (the two bars lex as one operator run).
    fn slot_list(&mut self) -> Result<Vec<SlotSpec>, Error> {
        if self.eat_operator("||") {
            return Ok(Vec::new());
        }
        self.expect_operator("|", "expected | to open a slot list")?;
        let mut specs = Vec::new();
        loop {
            if self.eat_operator("|") {
                break;
            }
            specs.push(self.slot()?);
            if self.eat(&TokenKind::Dot) {
                continue;
            }
            if self.eat_operator("|") {
                break;
            }
            return Err(self.syntax_here("expected . or | in slot list"));
        }
        Ok(specs)
    }

    /// `[":"] selector ["*"] [ ("=" message) | ("<-" message) ]`.
    fn slot(&mut self) -> Result<SlotSpec, Error> {
        let position = self.peek_position();

        if self.eat(&TokenKind::Colon) {
            let name = match self.peek().clone() {
                TokenKind::Name(name) => {
                    self.advance();
                    name
                }
                _ => return Err(self.syntax_here("expected argument name after :")),
            };
            let parent = self.eat_operator("*");
            if self.peek_operator("<-") {
                return Err(self.syntax_here("argument slot cannot be a data slot"));
            }
            let value = if self.eat_operator("=") {
                let code = self.message()?;
                self.constant_slot_value(code)?
            } else {
                self.interpreter.nil_value()
            };
            return Ok(SlotSpec {
                name,
                kind: SlotKind::Argument,
                parent,
                value,
                position,
            });
        }

        let (name, params) = self.slot_selector()?;
        let parent = self.eat_operator("*");

        if self.eat_operator("=") {
            let code = self.message()?;
            let value = if params.is_empty() {
                self.constant_slot_value(code)?
            } else {
                // An inline-parameter selector demands a method; wrap
                // other right-hand sides and splice the parameters in
                // right after the `self` slot.
                let method = match code {
                    Code::MethodLiteral(method) => {
                        method.insert_argument_slots(1, &params, self.interpreter.nil_value());
                        method
                    }
                    other => self.build_method(&params, Vec::new(), vec![other], position)?,
                };
                Value::Method(method)
            };
            Ok(SlotSpec {
                name,
                kind: SlotKind::Constant,
                parent,
                value,
                position,
            })
        } else if self.eat_operator("<-") {
            if !params.is_empty() {
                return Err(Error::syntax("data slot cannot declare parameters", position));
            }
            let code = self.message()?;
            let value = self.evaluate_static(code)?;
            Ok(SlotSpec {
                name,
                kind: SlotKind::Data,
                parent,
                value,
                position,
            })
        } else {
            if !params.is_empty() {
                return Err(Error::syntax(
                    "slot with parameters needs an initializer",
                    position,
                ));
            }
            Ok(SlotSpec {
                name,
                kind: SlotKind::Data,
                parent,
                value: self.interpreter.nil_value(),
                position,
            })
        }
    }

    /// A slot selector with its inline parameter names: a plain name, an
    /// operator with an optional parameter, or keyword parts whose
    /// parameters must be all present or all absent.
    fn slot_selector(&mut self) -> Result<(String, Vec<String>), Error> {
        match self.peek().clone() {
            TokenKind::Name(name) => {
                self.advance();
                Ok((name, Vec::new()))
            }
            TokenKind::Operator(op) => {
                self.advance();
                let mut params = Vec::new();
                if let TokenKind::Name(param) = self.peek().clone() {
                    self.advance();
                    params.push(param);
                }
                Ok((op, params))
            }
            TokenKind::Keyword(first) => {
                if lexer::is_subsequent_keyword(&first) {
                    return Err(self.syntax_here("keyword selector must start lowercase"));
                }
                self.advance();
                let mut selector = first;
                let mut params = Vec::new();
                let inline = if let TokenKind::Name(param) = self.peek().clone() {
                    self.advance();
                    params.push(param);
                    true
                } else {
                    false
                };
                while let TokenKind::Keyword(part) = self.peek().clone() {
                    if !lexer::is_subsequent_keyword(&part) {
                        break;
                    }
                    self.advance();
                    selector.push_str(&part);
                    match self.peek().clone() {
                        TokenKind::Name(param) if inline => {
                            self.advance();
                            params.push(param);
                        }
                        TokenKind::Name(_) => {
                            return Err(self.syntax_here("inconsistent slot parameters"));
                        }
                        _ if inline => {
                            return Err(self.syntax_here("inconsistent slot parameters"));
                        }
                        _ => {}
                    }
                }
                if params.len() != params.iter().collect::<std::collections::HashSet<_>>().len() {
                    return Err(self.syntax_here("duplicate slot parameter"));
                }
                Ok((selector, params))
            }
            _ => Err(self.syntax_here("expected a slot")),
        }
    }

    /// Constant-slot rule: literals and methods are stored as they are;
    /// any other right-hand side runs now, in the lobby.
    fn constant_slot_value(&mut self, code: Code) -> Result<Value, Error> {
        match code {
            Code::Literal(value) => Ok(value),
            Code::MethodLiteral(method) => Ok(Value::Method(method)),
            other => self.evaluate_static(other),
        }
    }

    /// Execute a compiled initializer immediately, with the lobby as
    /// `self`.
    fn evaluate_static(&mut self, code: Code) -> Result<Value, Error> {
        if let Code::Literal(value) = code {
            return Ok(value);
        }
        let method = Object::new();
        method.define_slot(
            "self",
            Slot::argument(self.interpreter.nil_value()).parent(),
        );
        method.set_code(vec![code]);
        let lobby = Value::Object(self.interpreter.lobby.clone());
        activation::run_method(self.interpreter, &method, &[lobby])
    }

    fn build_plain_object(&self, specs: &[SlotSpec]) -> Result<Object, Error> {
        let object = Object::new();
        for spec in specs {
            self.install_spec(&object, spec)?;
        }
        Ok(object)
    }

    /// A regular method: `self` parent-argument first, then the inline
    /// parameters, then declared arguments, then the other slots.
    fn build_method(
        &self,
        inline_params: &[String],
        specs: Vec<SlotSpec>,
        codes: Vec<Code>,
        position: usize,
    ) -> Result<Object, Error> {
        let method = Object::new();
        method.define_slot(
            "self",
            Slot::argument(self.interpreter.nil_value()).parent(),
        );
        self.install_method_slots(&method, inline_params, &specs, position)?;
        method.set_code(codes);
        Ok(method)
    }

    /// A block method: `(parent)` parent-argument first; rebound to the
    /// captured activation on every run.
    fn build_block_method(&self, specs: Vec<SlotSpec>, codes: Vec<Code>) -> Result<Object, Error> {
        let method = Object::new();
        method.define_slot(
            BLOCK_PARENT_SLOT,
            Slot::argument(self.interpreter.nil_value()).parent(),
        );
        self.install_method_slots(&method, &[], &specs, 0)?;
        method.set_code(codes);
        Ok(method)
    }

    fn install_method_slots(
        &self,
        method: &Object,
        inline_params: &[String],
        specs: &[SlotSpec],
        position: usize,
    ) -> Result<(), Error> {
        for name in inline_params {
            if method.has_slot(name) {
                return Err(Error::syntax(
                    format!("duplicate slot name {}", name),
                    position,
                ));
            }
            method.define_slot(name, Slot::argument(self.interpreter.nil_value()));
        }
        for spec in specs.iter().filter(|spec| spec.kind == SlotKind::Argument) {
            self.install_spec(method, spec)?;
        }
        for spec in specs.iter().filter(|spec| spec.kind != SlotKind::Argument) {
            self.install_spec(method, spec)?;
        }
        Ok(())
    }

    fn install_spec(&self, object: &Object, spec: &SlotSpec) -> Result<(), Error> {
        if object.has_slot(&spec.name) {
            return Err(Error::syntax(
                format!("duplicate slot name {}", spec.name),
                spec.position,
            ));
        }
        let mut slot = match spec.kind {
            SlotKind::Constant => Slot::constant(spec.value.clone()),
            SlotKind::Data => Slot::data(spec.value.clone()),
            SlotKind::Argument => Slot::argument(spec.value.clone()),
        };
        if spec.parent {
            slot = slot.parent();
        }
        if spec.kind == SlotKind::Data {
            let mutator_name = format!("{}:", spec.name);
            if object.has_slot(&mutator_name) {
                return Err(Error::syntax(
                    format!("duplicate slot name {}", mutator_name),
                    spec.position,
                ));
            }
            object.define_data_slot(&spec.name, slot);
        } else {
            object.define_slot(&spec.name, slot);
        }
        Ok(())
    }

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.position.min(self.tokens.len() - 1)].kind
    }

    fn peek_position(&self) -> usize {
        self.tokens[self.position.min(self.tokens.len() - 1)].position
    }

    fn peek_first_keyword(&self) -> bool {
        matches!(self.peek(), TokenKind::Keyword(part) if !lexer::is_subsequent_keyword(part))
    }

    fn peek_operator(&self, op: &str) -> bool {
        matches!(self.peek(), TokenKind::Operator(text) if text == op)
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_operator(&mut self, op: &str) -> bool {
        if self.peek_operator(op) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, message: &str) -> Result<(), Error> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.syntax_here(message))
        }
    }

    fn expect_operator(&mut self, op: &str, message: &str) -> Result<(), Error> {
        if self.eat_operator(op) {
            Ok(())
        } else {
            Err(self.syntax_here(message))
        }
    }

    fn syntax_here(&self, message: impl Into<String>) -> Error {
        Error::syntax(message, self.peek_position())
    }
}

/// The constant-slot name a block answers its method from: one `value`
/// part, then one `With:` per argument past the first.
fn value_selector(argument_count: usize) -> String {
    match argument_count {
        0 => "value".to_string(),
        n => {
            let mut selector = String::from("value:");
            for _ in 1..n {
                selector.push_str("With:");
            }
            selector
        }
    }
}

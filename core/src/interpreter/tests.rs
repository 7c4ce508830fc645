//! End-to-end interpreter tests: the boundary scenarios, laws and
//! invariants of the language core.

use super::*;
use crate::object::Object;
use crate::slot::{Slot, SlotKind};
use crate::value::Value;
use approx::assert_relative_eq;
use pretty_assertions::assert_eq;
use std::rc::Rc;

fn interpreter() -> Interpreter {
    let _ = env_logger::builder().is_test(true).try_init();
    Interpreter::new().expect("bootstrap")
}

fn run(source: &str) -> Value {
    interpreter().execute(source).expect("executed")
}

#[test]
fn integer_addition() {
    assert_eq!(run("3 + 4"), Value::Integer(7));
}

#[test]
fn binary_sends_evaluate_left_to_right() {
    assert_eq!(run("1 + 2 * 3"), Value::Integer(9));
}

#[test]
fn parenthesized_groups() {
    assert_eq!(run("(1 + 2) * (3 - 4)"), Value::Integer(-3));
}

#[test]
fn division_answers_a_float() {
    match run("7 / 2") {
        Value::Float(x) => assert_relative_eq!(x, 3.5),
        other => panic!("expected float, got {}", other),
    }
}

#[test]
fn arithmetic_family() {
    assert_eq!(run("7 % 3"), Value::Integer(1));
    assert_eq!(run("2 * 3 - 10"), Value::Integer(-4));
    assert_eq!(run("3-4"), Value::Integer(-1));
    assert_eq!(run("2 - -3"), Value::Integer(5));
    assert_eq!(run("2.5 printString"), Value::string("2.5"));
}

#[test]
fn comparisons_and_booleans() {
    let mut interpreter = interpreter();
    let yes = Value::Object(interpreter.true_object.clone());
    let no = Value::Object(interpreter.false_object.clone());
    assert_eq!(interpreter.execute("2 < 3").expect("run"), yes);
    assert_eq!(interpreter.execute("3 <= 3").expect("run"), yes);
    assert_eq!(interpreter.execute("3 = 3").expect("run"), yes);
    assert_eq!(interpreter.execute("3 != 3").expect("run"), no);
    assert_eq!(interpreter.execute("true && [false]").expect("run"), no);
    assert_eq!(interpreter.execute("false || [true]").expect("run"), yes);
    assert_eq!(interpreter.execute("true not").expect("run"), no);
}

#[test]
fn string_substring() {
    assert_eq!(run("'abc' from: 1 To: 2"), Value::string("b"));
}

#[test]
fn string_protocol() {
    assert_eq!(run("'hello' size"), Value::Integer(5));
    assert_eq!(run("'hello' at: 1"), Value::string("e"));
    assert_eq!(run("'ab' , 'cd'"), Value::string("abcd"));
    assert_eq!(run("'ab' concat: 'cd'"), Value::string("abcd"));
}

#[test]
fn string_escapes_reach_the_runtime() {
    assert_eq!(run(r"'a\nb' size"), Value::Integer(3));
    assert_eq!(run(r"'A\q'"), Value::string("Aq"));
    assert_eq!(run("'\\u0041'"), Value::string("A"));
}

#[test]
fn conditional_picks_the_true_arm() {
    assert_eq!(run("true ifTrue: [5] False: [6]"), Value::Integer(5));
    assert_eq!(run("false ifTrue: [5] False: [6]"), Value::Integer(6));
}

#[test]
fn while_loop_counts_to_three() {
    let source = "(| x <- 0. m = ([x = 3] whileFalse: [x: x + 1]. x) |) m";
    assert_eq!(run(source), Value::Integer(3));
}

#[test]
fn non_local_return_unwinds_to_the_defining_method() {
    assert_eq!(run("(| m = ([^42] value. 1) |) m"), Value::Integer(42));
}

#[test]
fn escaped_non_local_return_surfaces_as_an_error() {
    let mut interpreter = interpreter();
    match interpreter.execute("(| m = ([^9]) |) m value") {
        Err(Error::NonLocalReturn { value, .. }) => assert_eq!(value, Value::Integer(9)),
        other => panic!("expected escaped return, got {:?}", other),
    }
}

#[test]
fn vectors_build_and_print() {
    let source = "(| m = (1 & 2 & 3 & 4) |) m printString";
    assert_eq!(run(source), Value::string("(1, 2, 3, 4)"));
}

#[test]
fn vector_protocol() {
    assert_eq!(run("(1 & 2 & 3) size"), Value::Integer(3));
    assert_eq!(run("(1 & 2 & 3) at: 1"), Value::Integer(2));
    assert_eq!(run("(1 & 2 & 3) first"), Value::Integer(1));
    assert_eq!(run("(1 & 2 & 3) last"), Value::Integer(3));
    assert_eq!(
        run("((1 & 2 & 3) from: 1 To: 3) printString"),
        Value::string("(2, 3)")
    );
    assert_eq!(
        run("((1 & 2 & 3) collect: [| :e | e * 2]) printString"),
        Value::string("(2, 4, 6)")
    );
    assert_eq!(
        run("((1 & 2 & 3 & 4) select: [| :e | 2 < e]) printString"),
        Value::string("(3, 4)")
    );
    assert_eq!(run("(1 & 2) join: '-'"), Value::string("1-2"));
}

#[test]
fn to_do_iterates_inclusively() {
    let source = "(| s <- 0. m = (1 to: 4 Do: [| :i | s: s + i]. s) |) m";
    assert_eq!(run(source), Value::Integer(10));
}

#[test]
fn factorial_through_send() {
    let mut interpreter = interpreter();
    interpreter
        .execute(
            "traitsNumber _AddSlotsIfAbsent: (| factorial = \
             (self < 2 ifTrue: [1] False: [self * ((self - 1) factorial)]) |)",
        )
        .expect("defined");
    assert_eq!(
        interpreter
            .send("factorial", &[Value::Integer(6)])
            .expect("sent"),
        Value::Integer(720)
    );
}

#[test]
fn fibonacci_through_send() {
    let mut interpreter = interpreter();
    interpreter
        .execute(
            "traitsNumber _AddSlotsIfAbsent: (| fibonacci = \
             (self < 2 ifTrue: [self] False: \
             [((self - 1) fibonacci) + ((self - 2) fibonacci)]) |)",
        )
        .expect("defined");
    assert_eq!(
        interpreter
            .send("fibonacci", &[Value::Integer(25)])
            .expect("sent"),
        Value::Integer(75025)
    );
}

#[test]
fn literal_object_slots_uphold_the_mutator_invariant() {
    let mut interpreter = interpreter();
    let value = interpreter.execute("(| a |)").expect("run");
    let object = match value {
        Value::Object(ref object) => object.clone(),
        ref other => panic!("expected object, got {}", other),
    };
    let slots = object.slots();
    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0].0, "a");
    assert_eq!(slots[0].1.kind, SlotKind::Data);
    assert_eq!(slots[0].1.value, interpreter.nil_value());
    assert_eq!(slots[1].0, "a:");
    match &slots[1].1.value {
        Value::Mutator(name) => assert_eq!(&**name, "a"),
        other => panic!("expected mutator, got {}", other),
    }
}

#[test]
fn sibling_parents_with_the_same_slot_are_ambiguous() {
    let mut interpreter = interpreter();
    match interpreter.execute("(| p1* = (| a = 1 |). p2* = (| a = 2 |) |) a") {
        Err(Error::AmbiguousMessageSend(name)) => assert_eq!(name, "a"),
        other => panic!("expected ambiguity, got {:?}", other),
    }
}

#[test]
fn local_slots_shadow_parents() {
    assert_eq!(run("(| p* = (| a = 1 |). a = 2 |) a"), Value::Integer(2));
}

#[test]
fn missing_selector_is_unknown() {
    let mut interpreter = interpreter();
    match interpreter.execute("frobnicate") {
        Err(Error::UnknownMessageSend(name)) => assert_eq!(name, "frobnicate"),
        other => panic!("expected unknown send, got {:?}", other),
    }
}

#[test]
fn missing_primitive_is_unknown() {
    let mut interpreter = interpreter();
    match interpreter.execute("3 _Qux") {
        Err(Error::UnknownPrimitive(name)) => assert_eq!(name, "_Qux"),
        other => panic!("expected unknown primitive, got {:?}", other),
    }
}

#[test]
fn empty_program_and_empty_block_answer_nil() {
    let mut interpreter = interpreter();
    let nil = interpreter.nil_value();
    assert_eq!(interpreter.execute("").expect("run"), nil);
    assert_eq!(interpreter.execute("[] value").expect("run"), nil);
}

#[test]
fn constant_slot_equals_the_expression() {
    let mut interpreter = interpreter();
    let through_slot = interpreter.execute("(| x = 2 + 9 |) x").expect("run");
    let direct = interpreter.execute("2 + 9").expect("run");
    assert_eq!(through_slot, direct);
}

#[test]
fn clone_laws_for_immutable_values() {
    let mut interpreter = interpreter();
    assert_eq!(
        interpreter.execute("3 clone").expect("run"),
        Value::Integer(3)
    );
    assert_eq!(
        interpreter.execute("'abc' clone").expect("run"),
        Value::string("abc")
    );
    let nil = interpreter.nil_value();
    assert_eq!(interpreter.execute("nil clone").expect("run"), nil);
    let yes = Value::Object(interpreter.true_object.clone());
    assert_eq!(interpreter.execute("true clone").expect("run"), yes);
}

#[test]
fn cloned_objects_have_independent_data_slots() {
    let mut interpreter = interpreter();
    let original = match interpreter.execute("(| x <- 1 |)").expect("run") {
        Value::Object(object) => object,
        other => panic!("expected object, got {}", other),
    };
    let copy = interpreter
        .send("_Clone", &[Value::Object(original.clone())])
        .expect("cloned");
    interpreter
        .send("x:", &[copy.clone(), Value::Integer(99)])
        .expect("assigned");
    assert_eq!(interpreter.send("x", &[copy]).expect("read"), Value::Integer(99));
    assert_eq!(
        interpreter
            .send("x", &[Value::Object(original)])
            .expect("read"),
        Value::Integer(1)
    );
}

#[test]
fn blocks_read_enclosing_slots_through_the_captured_activation() {
    assert_eq!(run("(| x = 13. m = ([x] value) |) m"), Value::Integer(13));
}

#[test]
fn block_arguments_flow_through_value_with() {
    assert_eq!(
        run("[| :a. :b | a + b] value: 3 With: 4"),
        Value::Integer(7)
    );
}

#[test]
fn mutator_without_data_slot_is_detected() {
    let mut interpreter = interpreter();
    let object = Object::new();
    object.define_slot("x:", Slot::constant(Value::Mutator(Rc::from("x"))));
    match interpreter.send("x:", &[Value::Object(object), Value::Integer(1)]) {
        Err(Error::MutatorWithoutDataSlot(name)) => assert_eq!(name, "x:"),
        other => panic!("expected mutator failure, got {:?}", other),
    }
}

#[test]
fn singleton_print_strings() {
    assert_eq!(run("nil printString"), Value::string("nil"));
    assert_eq!(run("true printString"), Value::string("true"));
    assert_eq!(run("(| p* = lobby |) printString"), Value::string("an object"));
}

#[test]
fn is_nil_distinguishes_nil() {
    let mut interpreter = interpreter();
    let yes = Value::Object(interpreter.true_object.clone());
    let no = Value::Object(interpreter.false_object.clone());
    assert_eq!(interpreter.execute("nil isNil").expect("run"), yes);
    assert_eq!(interpreter.execute("3 isNil").expect("run"), no);
    assert_eq!(interpreter.execute("'a' notNil").expect("run"), yes);
}

#[test]
fn find_slot_routes_primitive_values_to_their_traits() {
    let interpreter = interpreter();
    let binding = interpreter
        .find_slot(&Value::Integer(3), "+")
        .expect("found");
    assert!(Object::ptr_eq(&binding.holder, &interpreter.traits_number));
    let binding = interpreter
        .find_slot(&Value::string("x"), "size")
        .expect("found");
    assert!(Object::ptr_eq(&binding.holder, &interpreter.traits_string));
}

#[test]
fn send_answers_plain_slot_values_without_activation() {
    let mut interpreter = interpreter();
    let object = match interpreter.execute("(| x <- 5 |)").expect("run") {
        Value::Object(object) => object,
        other => panic!("expected object, got {}", other),
    };
    assert_eq!(
        interpreter.send("x", &[Value::Object(object)]).expect("read"),
        Value::Integer(5)
    );
}

#[test]
fn reinitialize_clears_user_growth() {
    let mut interpreter = interpreter();
    interpreter
        .execute("lobby _AddSlotsIfAbsent: (| answer = 42 |)")
        .expect("grown");
    assert_eq!(
        interpreter.execute("answer").expect("run"),
        Value::Integer(42)
    );

    interpreter.initialize().expect("reinitialized");
    match interpreter.execute("answer") {
        Err(Error::UnknownMessageSend(name)) => assert_eq!(name, "answer"),
        other => panic!("expected unknown send, got {:?}", other),
    }
    assert_eq!(
        interpreter.execute("3 + 4").expect("run"),
        Value::Integer(7)
    );
}

#[test]
fn instances_are_independent() {
    let mut first = interpreter();
    let mut second = interpreter();
    first
        .execute("lobby _AddSlotsIfAbsent: (| answer = 1 |)")
        .expect("grown");
    match second.execute("answer") {
        Err(Error::UnknownMessageSend(_)) => {}
        other => panic!("expected unknown send, got {:?}", other),
    }
}

#[test]
fn deep_slot_assignment_reaches_the_instance() {
    let source = "(| total <- 0. \
                  bump = (1 to: 3 Do: [| :i | total: total + i]. total) |) bump";
    assert_eq!(run(source), Value::Integer(6));
}

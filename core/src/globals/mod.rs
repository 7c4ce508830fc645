//! The fixed primitive registry and the bootstrap source that grows
//! the trait objects on top of it.

pub mod number;
pub mod object;
pub mod string;
pub mod vector;

use crate::interpreter::NativeFunction;
use fnv::FnvHashMap;

pub(crate) fn register_primitives(registry: &mut FnvHashMap<String, NativeFunction>) {
    let entries: [(&str, NativeFunction); 20] = [
        ("_NumAdd:", number::add),
        ("_NumSub:", number::subtract),
        ("_NumMul:", number::multiply),
        ("_NumDiv:", number::divide),
        ("_NumMod:", number::modulo),
        ("_NumLt:", number::less_than),
        ("_NumToString", number::to_string),
        ("_Equal:", object::equal),
        ("_StringSize", string::size),
        ("_StringAt:", string::at),
        ("_StringConcat:", string::concat),
        ("_StringFrom:To:", string::from_to),
        ("_VectorClone:", vector::clone_with),
        ("_VectorSize", vector::size),
        ("_VectorAdd:", vector::add),
        ("_VectorAt:", vector::at),
        ("_VectorAt:Put:", vector::at_put),
        ("_VectorFrom:To:", vector::from_to),
        ("_Clone", object::clone),
        ("_AddSlotsIfAbsent:", object::add_slots_if_absent),
    ];
    for (name, function) in entries.iter() {
        registry.insert((*name).to_string(), *function);
    }
}

/// Self source evaluated after the primitives are installed. Everything
/// here goes through `_AddSlotsIfAbsent:` so re-initialization is a
/// clean rebuild. Methods found from primitive receivers can only send
/// to `self`, their arguments and their locals, which is why the
/// lobby's `&` reaches `traitsVector` through the receiver's own
/// inheritance chain.
pub(crate) const BOOTSTRAP: &str = r#"
lobby _AddSlotsIfAbsent: (|
    isNil = false.
    notNil = true.
    clone = (self _Clone).
    = x = (self _Equal: x).
    != x = ((self _Equal: x) not).
    printString = 'an object'.
    & x = (((self traitsVector clone) add: self) add: x)
|).

nil _AddSlotsIfAbsent: (|
    parent* = lobby.
    isNil = true.
    notNil = false.
    not = (true).
    ifTrue: b = (nil).
    ifFalse: b = (b value).
    ifTrue: tb False: fb = (fb value).
    ifFalse: fb True: tb = (fb value).
    && b = (false).
    || b = (b value).
    printString = 'nil'
|).

true _AddSlotsIfAbsent: (|
    parent* = lobby.
    not = (false).
    ifTrue: b = (b value).
    ifFalse: b = (nil).
    ifTrue: tb False: fb = (tb value).
    ifFalse: fb True: tb = (tb value).
    && b = (b value).
    || b = (true).
    printString = 'true'
|).

false _AddSlotsIfAbsent: (|
    parent* = lobby.
    not = (true).
    ifTrue: b = (nil).
    ifFalse: b = (b value).
    ifTrue: tb False: fb = (fb value).
    ifFalse: fb True: tb = (fb value).
    && b = (false).
    || b = (b value).
    printString = 'false'
|).

traitsNumber _AddSlotsIfAbsent: (|
    parent* = lobby.
    + x = (self _NumAdd: x).
    - x = (self _NumSub: x).
    * x = (self _NumMul: x).
    / x = (self _NumDiv: x).
    % x = (self _NumMod: x).
    < x = (self _NumLt: x).
    > x = (x _NumLt: self).
    <= x = ((x _NumLt: self) not).
    >= x = ((self _NumLt: x) not).
    = x = (self _Equal: x).
    != x = ((self _Equal: x) not).
    printString = (self _NumToString).
    to: end Do: body = (self to: end By: 1 Do: body).
    to: end By: step Do: body = (| i |
        i: self.
        [i <= end] whileTrue: [body value: i. i: i + step].
        self)
|).

traitsBlock _AddSlotsIfAbsent: (|
    parent* = lobby.
    whileTrue: body = (self value ifTrue: [body value. self whileTrue: body] False: [nil]).
    whileFalse: body = ([self value not] whileTrue: body)
|).

traitsString _AddSlotsIfAbsent: (|
    parent* = lobby.
    size = (self _StringSize).
    isEmpty = (self _StringSize = 0).
    at: i = (self _StringAt: i).
    from: f To: t = (self _StringFrom: f To: t).
    concat: x = (self _StringConcat: x).
    , x = (self _StringConcat: x printString).
    = x = (self _Equal: x).
    != x = ((self _Equal: x) not).
    printString = (self)
|).

traitsVector _AddSlotsIfAbsent: (|
    parent* = lobby.
    clone = (self _VectorClone: 0).
    clone: n = (self _VectorClone: n).
    size = (self _VectorSize).
    isEmpty = (self _VectorSize = 0).
    add: x = (self _VectorAdd: x).
    at: i = (self _VectorAt: i).
    at: i Put: x = (self _VectorAt: i Put: x).
    from: f To: t = (self _VectorFrom: f To: t).
    first = (self at: 0).
    last = (self at: self size - 1).
    do: body = (| i |
        i: 0.
        [i < self size] whileTrue: [body value: (self at: i). i: i + 1].
        self).
    select: body = (| kept |
        kept: (self _VectorFrom: 0 To: 0).
        self do: [| :each | (body value: each) ifTrue: [kept add: each]].
        kept).
    collect: body = (| mapped |
        mapped: (self _VectorFrom: 0 To: 0).
        self do: [| :each | mapped add: (body value: each)].
        mapped).
    join: sep = (| acc. i |
        self isEmpty ifTrue: ['']
            False: [
                acc: (self at: 0) printString.
                i: 1.
                [i < self size] whileTrue: [
                    acc: (acc , sep) , (self at: i) printString.
                    i: i + 1].
                acc]).
    & x = (self _VectorAdd: x).
    printString = ('(' , (self join: ', ') , ')')
|).
"#;

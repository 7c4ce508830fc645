//! Slots: the named cells objects are made of.

use crate::value::Value;
use std::fmt;

bitflags::bitflags! {
    /// Flags orthogonal to a slot's kind.
    pub struct SlotAttributes: u8 {
        /// The slot participates in inheritance: lookup recurses into its
        /// value when the slot's own object has no match.
        const PARENT = 1 << 0;
    }
}

/// What a slot is, independent of the parent flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// Immutable binding; may be shared between an object and its clones.
    Constant,
    /// Mutable cell with a companion `name:` mutator slot.
    Data,
    /// Mutable cell written only by the runtime during activation.
    Argument,
}

/// A named cell inside an object. The name itself is the key of the
/// owning object's slot table.
#[derive(Debug, Clone)]
pub struct Slot {
    pub kind: SlotKind,
    pub attributes: SlotAttributes,
    pub value: Value,
}

impl Slot {
    pub fn constant(value: Value) -> Self {
        Slot {
            kind: SlotKind::Constant,
            attributes: SlotAttributes::empty(),
            value,
        }
    }

    pub fn data(value: Value) -> Self {
        Slot {
            kind: SlotKind::Data,
            attributes: SlotAttributes::empty(),
            value,
        }
    }

    pub fn argument(value: Value) -> Self {
        Slot {
            kind: SlotKind::Argument,
            attributes: SlotAttributes::empty(),
            value,
        }
    }

    /// Mark the slot as a parent; returns the slot for chaining.
    pub fn parent(mut self) -> Self {
        self.attributes |= SlotAttributes::PARENT;
        self
    }

    pub fn is_parent(&self) -> bool {
        self.attributes.contains(SlotAttributes::PARENT)
    }

    /// Write the printed form of this slot: the `:` argument prefix, the
    /// name, the `*` parent suffix and the `<-` data marker.
    pub fn write_printed(&self, name: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == SlotKind::Argument {
            write!(f, ":")?;
        }
        write!(f, "{}", name)?;
        if self.is_parent() {
            write!(f, "*")?;
        }
        if self.kind == SlotKind::Data {
            write!(f, "<-")?;
        }
        Ok(())
    }
}

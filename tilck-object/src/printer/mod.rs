//! Display values and type-specific printers.
//!
//! A dump turns kernel memory into a tree of labelled [`Value`]s. How the
//! tree is laid out as text belongs to the host; what appears in it, in
//! which order, is decided here. Most structs are dumped field by field
//! from their layout, but types whose raw fields would be misread (a union
//! selected by a tag, a counted array) register a [`PrettyPrinter`] instead.

use alloc::{boxed::Box, string::String, vec::Vec};
use hashbrown::HashMap;

use crate::object::StructView;
use crate::{InspectResult, VirtAddr};

pub use self::dump::Dumper;

mod dump;

/// One displayable value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Ptr(VirtAddr),
    /// An enum value; `name` is `None` when the raw value has no name.
    Enum { name: Option<String>, raw: i64 },
    Text(String),
    Composite(Composite),
}

impl Value {
    pub fn as_composite(&self) -> Option<&Composite> {
        match self {
            Value::Composite(c) => Some(c),
            _ => None,
        }
    }
}

/// How the children of a composite are meant to be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayHint {
    /// `label = value` pairs.
    Struct,
    /// Values only; the labels are the indices.
    Array,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composite {
    pub header: Option<String>,
    pub hint: DisplayHint,
    pub children: Vec<Field>,
}

impl Composite {
    pub fn structure(children: Vec<Field>) -> Self {
        Composite {
            header: None,
            hint: DisplayHint::Struct,
            children,
        }
    }

    pub fn array(children: Vec<Field>) -> Self {
        Composite {
            header: None,
            hint: DisplayHint::Array,
            children,
        }
    }

    /// The first child labelled `label`.
    pub fn get(&self, label: &str) -> Option<&Value> {
        self.children
            .iter()
            .find(|f| f.label == label)
            .map(|f| &f.value)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.children.iter().map(|f| f.label.as_str()).collect()
    }
}

/// A labelled child of a composite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub label: String,
    pub value: Value,
}

impl Field {
    pub fn new(label: impl Into<String>, value: Value) -> Self {
        Field {
            label: label.into(),
            value,
        }
    }
}

/// Replaces the field-by-field dump of one struct type.
pub trait PrettyPrinter {
    /// The struct type this printer handles, matched exactly.
    fn type_name(&self) -> &'static str;

    fn display_hint(&self) -> DisplayHint {
        DisplayHint::Struct
    }

    /// Text shown before the children.
    fn header(&self, _view: &StructView<'_>) -> Option<String> {
        None
    }

    fn children(&self, dumper: &Dumper<'_>, view: &StructView<'_>) -> InspectResult<Vec<Field>>;
}

/// Printers by type name.
#[derive(Default)]
pub struct Printers {
    map: HashMap<&'static str, Box<dyn PrettyPrinter>>,
}

impl Printers {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the Tilck wait-object printers.
    pub fn tilck() -> Self {
        let mut printers = Self::new();
        crate::sync::register_printers(&mut printers);
        printers
    }

    /// Register `printer`, replacing any printer for the same type.
    pub fn register(&mut self, printer: impl PrettyPrinter + 'static) {
        debug!("register printer for struct {}", printer.type_name());
        self.map.insert(printer.type_name(), Box::new(printer));
    }

    pub fn get(&self, type_name: &str) -> Option<&dyn PrettyPrinter> {
        self.map.get(type_name).map(|p| p.as_ref())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync;

    #[test]
    fn tilck_printers() {
        let printers = Printers::tilck();
        assert_eq!(printers.len(), 3);
        for ty in [sync::WAIT_OBJ, sync::MULTI_OBJ_WAITER, sync::MWOBJ_ELEM] {
            assert_eq!(printers.get(ty).map(|p| p.type_name()), Some(ty));
        }
        assert!(printers.get("task").is_none());
        assert_eq!(
            printers.get(sync::MULTI_OBJ_WAITER).unwrap().display_hint(),
            DisplayHint::Array
        );
    }

    #[test]
    fn composite_lookup() {
        let c = Composite::structure(vec![
            Field::new("type", Value::Int(3)),
            Field::new("extra", Value::UInt(0)),
        ]);
        assert_eq!(c.labels(), vec!["type", "extra"]);
        assert_eq!(c.get("extra"), Some(&Value::UInt(0)));
        assert_eq!(c.get("ptr"), None);
    }
}

//! Accessors - how a plot reads one attribute from a record.

use std::rc::Rc;

use super::{Datum, Metadata, Value};

/// Uniform callable an [`Accessor`] resolves to.
pub type AppliedAccessor = Rc<dyn Fn(&Datum, usize, &Metadata) -> Value>;

/// A constant, a field name, or a function of (record, index, metadata).
#[derive(Clone)]
pub enum Accessor {
    Constant(Value),
    Field(String),
    Function(AppliedAccessor),
}

impl std::fmt::Debug for Accessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Accessor::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
            Accessor::Field(name) => f.debug_tuple("Field").field(name).finish(),
            Accessor::Function(_) => f.write_str("Function(..)"),
        }
    }
}

impl Accessor {
    pub fn constant(value: impl Into<Value>) -> Self {
        Accessor::Constant(value.into())
    }

    pub fn field(name: impl Into<String>) -> Self {
        Accessor::Field(name.into())
    }

    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&Datum, usize, &Metadata) -> Value + 'static,
    {
        Accessor::Function(Rc::new(f))
    }

    /// Resolve once into a callable. Missing fields read as [`Value::Missing`].
    pub fn resolve(self) -> AppliedAccessor {
        match self {
            Accessor::Constant(value) => Rc::new(move |_: &Datum, _: usize, _: &Metadata| value.clone()),
            Accessor::Field(name) => Rc::new(move |datum: &Datum, _: usize, _: &Metadata| {
                datum.get(&name).cloned().unwrap_or(Value::Missing)
            }),
            Accessor::Function(f) => f,
        }
    }
}

impl From<&str> for Accessor {
    fn from(name: &str) -> Self {
        Accessor::field(name)
    }
}

impl From<Value> for Accessor {
    fn from(value: Value) -> Self {
        Accessor::Constant(value)
    }
}

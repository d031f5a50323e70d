//! Data sources, accessors and perspectives.
//!
//! A [`Perspective`] is one (dataset, accessor, attribute) combination. It
//! computes the dataset's extent through its accessor, contributes it to a
//! scale, and keeps it current when the dataset broadcasts a change.
//!
//! # Example
//!
//! ```ignore
//! let dataset = Dataset::new(rows, Metadata::new());
//! let x = Rc::new(QuantitativeScale::linear());
//! let perspective = Perspective::new("line-1", "x", dataset.clone(), Accessor::field("time"));
//! perspective.project_onto(&x)?;
//! dataset.set_data(more_rows)?; // x's registry and domain follow
//! ```

pub mod accessor;
pub mod dataset;
pub mod perspective;

pub use accessor::{Accessor, AppliedAccessor};
pub use dataset::Dataset;
pub use perspective::Perspective;

use indexmap::IndexMap;

/// One cell of a record.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Missing,
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

/// A record: named fields in insertion order.
pub type Datum = IndexMap<String, Value>;

/// Dataset-wide values available to accessors.
pub type Metadata = IndexMap<String, Value>;

/// Build a [`Datum`] from `(field, value)` pairs.
pub fn datum<I, K, V>(fields: I) -> Datum
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

/// What a dataset occupies along one accessor.
#[derive(Debug, Clone, PartialEq)]
pub enum DataExtent {
    /// No usable values.
    Empty,
    /// `[min, max]` over the numeric values.
    Numeric([f64; 2]),
    /// Unique categories in order of first appearance.
    Categories(Vec<String>),
}

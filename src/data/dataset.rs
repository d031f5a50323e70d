//! Dataset - Ordered records plus metadata, with change notification.

use std::cell::RefCell;
use std::rc::Rc;

use super::{AppliedAccessor, DataExtent, Datum, Metadata, Value};
use crate::broadcast::{Broadcaster, Listenable};
use crate::error::PlotResult;

pub struct Dataset {
    data: RefCell<Vec<Datum>>,
    metadata: RefCell<Metadata>,
    broadcaster: Broadcaster<Dataset>,
}

impl std::fmt::Debug for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dataset")
            .field("len", &self.data.borrow().len())
            .field("metadata", &self.metadata.borrow())
            .finish()
    }
}

impl Dataset {
    pub fn new(data: Vec<Datum>, metadata: Metadata) -> Rc<Self> {
        Rc::new(Self {
            data: RefCell::new(data),
            metadata: RefCell::new(metadata),
            broadcaster: Broadcaster::new(),
        })
    }

    pub fn data(&self) -> Vec<Datum> {
        self.data.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.data.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.borrow().is_empty()
    }

    /// Replace the records and notify listeners.
    pub fn set_data(&self, data: Vec<Datum>) -> PlotResult<()> {
        *self.data.borrow_mut() = data;
        self.broadcaster.broadcast(self, &())
    }

    pub fn metadata(&self) -> Metadata {
        self.metadata.borrow().clone()
    }

    pub fn set_metadata(&self, metadata: Metadata) -> PlotResult<()> {
        *self.metadata.borrow_mut() = metadata;
        self.broadcaster.broadcast(self, &())
    }

    /// Apply `accessor` to every record.
    pub fn values(&self, accessor: &AppliedAccessor) -> Vec<Value> {
        let data = self.data.borrow();
        let metadata = self.metadata.borrow();
        data.iter()
            .enumerate()
            .map(|(i, d)| accessor(d, i, &metadata))
            .collect()
    }

    /// Extent along `accessor`. The first present value decides the kind:
    /// numbers give `[min, max]` (NaN ignored), text gives unique categories.
    pub fn extent(&self, accessor: &AppliedAccessor) -> DataExtent {
        let values = self.values(accessor);
        match values.iter().find(|v| **v != Value::Missing) {
            None => DataExtent::Empty,
            Some(Value::Number(_)) => {
                let mut extent: Option<[f64; 2]> = None;
                for n in values.iter().filter_map(Value::as_number).filter(|n| !n.is_nan()) {
                    extent = Some(match extent {
                        Some([lo, hi]) => [lo.min(n), hi.max(n)],
                        None => [n, n],
                    });
                }
                extent.map_or(DataExtent::Empty, DataExtent::Numeric)
            }
            Some(_) => {
                let mut unique: Vec<String> = Vec::new();
                for text in values.iter().filter_map(Value::as_text) {
                    if !unique.iter().any(|u| u == text) {
                        unique.push(text.to_string());
                    }
                }
                DataExtent::Categories(unique)
            }
        }
    }
}

impl Listenable for Dataset {
    type Args = ();

    fn broadcaster(&self) -> &Broadcaster<Self> {
        &self.broadcaster
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{datum, Accessor};
    use std::cell::Cell;

    fn rows() -> Vec<Datum> {
        vec![
            datum([("x", Value::from(3.0)), ("kind", Value::from("b"))]),
            datum([("x", Value::from(f64::NAN)), ("kind", Value::from("a"))]),
            datum([("x", Value::from(-1.0)), ("kind", Value::from("b"))]),
        ]
    }

    #[test]
    fn test_numeric_extent() {
        let ds = Dataset::new(rows(), Metadata::new());
        assert_eq!(
            ds.extent(&Accessor::field("x").resolve()),
            DataExtent::Numeric([-1.0, 3.0])
        );
    }

    #[test]
    fn test_category_extent() {
        let ds = Dataset::new(rows(), Metadata::new());
        assert_eq!(
            ds.extent(&Accessor::field("kind").resolve()),
            DataExtent::Categories(vec!["b".into(), "a".into()])
        );
    }

    #[test]
    fn test_empty_extent() {
        let ds = Dataset::new(Vec::new(), Metadata::new());
        assert_eq!(ds.extent(&Accessor::field("x").resolve()), DataExtent::Empty);
        let ds = Dataset::new(rows(), Metadata::new());
        assert_eq!(ds.extent(&Accessor::field("nope").resolve()), DataExtent::Empty);
    }

    #[test]
    fn test_set_data_broadcasts() {
        let ds = Dataset::new(Vec::new(), Metadata::new());
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        ds.broadcaster().register_listener("probe", move |ds: &Dataset, _| {
            c.set(c.get() + ds.len());
            Ok(())
        });
        ds.set_data(rows()).unwrap();
        assert_eq!(count.get(), 3);
    }
}

//! Perspective - One (dataset, accessor, attribute) contribution to scales.
//!
//! A projection lasts until it is withdrawn or the perspective is dropped;
//! either way the dataset listener goes and the scale loses the extent.

use std::cell::RefCell;
use std::rc::Rc;

use super::{Accessor, AppliedAccessor, DataExtent, Dataset};
use crate::broadcast::{Listenable, ListenerKey};
use crate::error::PlotResult;
use crate::scale::Scale;

pub struct Perspective {
    key: String,
    attribute: String,
    dataset: Rc<Dataset>,
    accessor: AppliedAccessor,
    projections: RefCell<Vec<Projection>>,
}

/// A live projection onto one scale.
struct Projection {
    listener: ListenerKey,
    withdraw: Box<dyn Fn() -> PlotResult<()>>,
}

impl Perspective {
    /// `key` identifies the consumer (usually its plot), `attribute` what it projects.
    pub fn new(
        key: impl Into<String>,
        attribute: impl Into<String>,
        dataset: Rc<Dataset>,
        accessor: impl Into<Accessor>,
    ) -> Self {
        Self {
            key: key.into(),
            attribute: attribute.into(),
            dataset,
            accessor: accessor.into().resolve(),
            projections: RefCell::new(Vec::new()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn dataset(&self) -> &Rc<Dataset> {
        &self.dataset
    }

    pub fn extent(&self) -> DataExtent {
        self.dataset.extent(&self.accessor)
    }

    fn listener_key<S>(&self, scale: &Rc<S>) -> ListenerKey {
        ListenerKey::Name(format!(
            "{}/{}@{:p}",
            self.key,
            self.attribute,
            Rc::as_ptr(scale)
        ))
    }

    /// Contribute the current extent and follow dataset changes.
    pub fn project_onto<S: Scale>(&self, scale: &Rc<S>) -> PlotResult<()> {
        contribute(&**scale, &self.key, &self.attribute, self.extent())?;

        let weak = Rc::downgrade(scale);
        let key = self.key.clone();
        let attribute = self.attribute.clone();
        let accessor = self.accessor.clone();
        let listener = self.listener_key(scale);
        self.dataset
            .broadcaster()
            .register_listener(listener.clone(), move |dataset: &Dataset, _| {
                match weak.upgrade() {
                    Some(scale) => contribute(&*scale, &key, &attribute, dataset.extent(&accessor)),
                    None => Ok(()),
                }
            });

        let weak = Rc::downgrade(scale);
        let key = self.key.clone();
        let attribute = self.attribute.clone();
        let withdraw = Box::new(move || match weak.upgrade() {
            Some(scale) => {
                scale.remove_extent(&key, &attribute);
                scale.auto_domain_if_automatic()
            }
            None => Ok(()),
        });
        let mut projections = self.projections.borrow_mut();
        projections.retain(|p| p.listener != listener);
        projections.push(Projection { listener, withdraw });
        Ok(())
    }

    /// Stop following the dataset and take the extent back out.
    pub fn withdraw_from<S: Scale>(&self, scale: &Rc<S>) -> PlotResult<()> {
        let listener = self.listener_key(scale);
        self.dataset.broadcaster().deregister_listener(&listener);
        self.projections
            .borrow_mut()
            .retain(|p| p.listener != listener);
        scale.remove_extent(&self.key, &self.attribute);
        scale.auto_domain_if_automatic()
    }
}

impl Drop for Perspective {
    fn drop(&mut self) {
        for projection in std::mem::take(self.projections.get_mut()) {
            self.dataset
                .broadcaster()
                .deregister_listener(&projection.listener);
            if let Err(err) = (projection.withdraw)() {
                tracing::warn!(key = %self.key, attribute = %self.attribute, %err, "withdraw on drop failed");
            }
        }
    }
}

fn contribute<S: Scale>(scale: &S, key: &str, attribute: &str, extent: DataExtent) -> PlotResult<()> {
    match S::convert_extent(extent)? {
        Some(extent) => scale.update_extent(key, attribute, extent),
        None => scale.remove_extent(key, attribute),
    }
    scale.auto_domain_if_automatic()
}

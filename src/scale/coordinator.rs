//! ScaleDomainCoordinator - Keeps several scales on one domain.
//!
//! Listens to each scale; when one changes, the others receive its domain.
//! A guard flag stops the echo broadcasts from recursing.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use super::Scale;
use crate::broadcast::{Listenable, ListenerKey};

pub struct ScaleDomainCoordinator<S: Scale> {
    scales: Vec<Rc<S>>,
    key: ListenerKey,
}

impl<S: Scale> ScaleDomainCoordinator<S> {
    /// Start coordinating. Dropping the coordinator stops it.
    pub fn new(scales: Vec<Rc<S>>) -> Self {
        let in_progress = Rc::new(Cell::new(false));
        let key = ListenerKey::identity(&in_progress);
        let weak: Vec<Weak<S>> = scales.iter().map(Rc::downgrade).collect();

        for scale in &scales {
            let weak = weak.clone();
            let in_progress = in_progress.clone();
            scale.broadcaster().register_listener(key.clone(), move |source: &S, _| {
                if in_progress.get() {
                    return Ok(());
                }
                in_progress.set(true);
                let domain = source.domain();
                let result = weak
                    .iter()
                    .filter_map(Weak::upgrade)
                    .filter(|other| !std::ptr::eq(Rc::as_ptr(other), source))
                    .try_for_each(|other| other.set_domain(domain.clone()));
                in_progress.set(false);
                result
            });
        }

        Self { scales, key }
    }

    pub fn scales(&self) -> &[Rc<S>] {
        &self.scales
    }
}

impl<S: Scale> Drop for ScaleDomainCoordinator<S> {
    fn drop(&mut self) {
        for scale in &self.scales {
            scale.broadcaster().deregister_listener(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::QuantitativeScale;

    #[test]
    fn test_domains_follow_each_other() {
        let a = Rc::new(QuantitativeScale::linear());
        let b = Rc::new(QuantitativeScale::linear());
        let coordinator = ScaleDomainCoordinator::new(vec![a.clone(), b.clone()]);

        a.set_domain([0.0, 10.0]).unwrap();
        assert_eq!(b.domain(), [0.0, 10.0]);

        b.set_domain([-1.0, 1.0]).unwrap();
        assert_eq!(a.domain(), [-1.0, 1.0]);

        drop(coordinator);
        a.set_domain([5.0, 6.0]).unwrap();
        assert_eq!(b.domain(), [-1.0, 1.0]);
        assert!(a.broadcaster().is_empty());
    }

    #[test]
    fn test_source_keeps_auto_mode() {
        let a = Rc::new(QuantitativeScale::linear());
        let b = Rc::new(QuantitativeScale::linear());
        let _coordinator = ScaleDomainCoordinator::new(vec![a.clone(), b.clone()]);

        a.update_extent("p", "x", [0.0, 50.0]);
        a.auto_domain().unwrap();
        assert!(a.is_auto_domain());
        assert!(!b.is_auto_domain());
        assert_eq!(a.domain(), b.domain());
    }
}

//! Continuous scales: linear, log and modified log.

use std::cell::{Cell, RefCell};

use super::domainer::{DomainSource, Domainer};
use super::extent::{ExtentKey, ExtentRegistry};
use super::transform::{ScaleTransform, DEFAULT_TICK_COUNT};
use super::{Extent, Scale};
use crate::broadcast::{Broadcaster, Listenable};
use crate::data::DataExtent;
use crate::error::{PlotError, PlotResult};

#[derive(Debug, Clone)]
struct QuantitativeState {
    domain: Extent,
    range: Extent,
    auto_domain: bool,
    clamp: bool,
    extents: ExtentRegistry<Extent>,
    domainer: Domainer,
}

/// Maps numbers to pixels through a [`ScaleTransform`].
pub struct QuantitativeScale {
    transform: ScaleTransform,
    default_extent: Cell<Option<Extent>>,
    state: RefCell<QuantitativeState>,
    broadcaster: Broadcaster<QuantitativeScale>,
}

impl std::fmt::Debug for QuantitativeScale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("QuantitativeScale")
            .field("transform", &self.transform)
            .field("domain", &state.domain)
            .field("range", &state.range)
            .field("auto_domain", &state.auto_domain)
            .finish()
    }
}

impl QuantitativeScale {
    fn with_transform(transform: ScaleTransform) -> Self {
        let default = transform.default_extent();
        Self {
            transform,
            default_extent: Cell::new(Some(default)),
            state: RefCell::new(QuantitativeState {
                domain: default,
                range: [0.0, 1.0],
                auto_domain: true,
                clamp: false,
                extents: ExtentRegistry::default(),
                domainer: Domainer::new(),
            }),
            broadcaster: Broadcaster::new(),
        }
    }

    pub fn linear() -> Self {
        Self::with_transform(ScaleTransform::Linear)
    }

    /// Base-10 log scale.
    pub fn log() -> Self {
        Self::with_transform(ScaleTransform::Log { base: 10.0 })
    }

    pub fn log_base(base: f64) -> PlotResult<Self> {
        check_base(base)?;
        Ok(Self::with_transform(ScaleTransform::Log { base }))
    }

    /// Symmetric log that accepts zero and negatives. Base must exceed 1.
    pub fn modified_log(base: f64) -> PlotResult<Self> {
        check_base(base)?;
        Ok(Self::with_transform(ScaleTransform::ModifiedLog { base }))
    }

    pub fn transform(&self) -> ScaleTransform {
        self.transform
    }

    /// Same transform, domain, range, registry and domainer; no listeners.
    pub fn copy(&self) -> Self {
        Self {
            transform: self.transform,
            default_extent: Cell::new(self.default_extent.get()),
            state: RefCell::new(self.state.borrow().clone()),
            broadcaster: Broadcaster::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Mapping
    // -------------------------------------------------------------------------

    /// Domain value to range value.
    pub fn scale(&self, value: f64) -> f64 {
        let state = self.state.borrow();
        let [d0, d1] = state.domain.map(|v| self.transform.forward(v));
        let [r0, r1] = state.range;
        let mut fraction = if d1 == d0 {
            0.5
        } else {
            (self.transform.forward(value) - d0) / (d1 - d0)
        };
        if state.clamp {
            fraction = fraction.clamp(0.0, 1.0);
        }
        r0 + fraction * (r1 - r0)
    }

    /// Range value back to a domain value.
    pub fn invert(&self, pixel: f64) -> f64 {
        let state = self.state.borrow();
        let [d0, d1] = state.domain.map(|v| self.transform.forward(v));
        let [r0, r1] = state.range;
        let fraction = if r1 == r0 { 0.5 } else { (pixel - r0) / (r1 - r0) };
        self.transform.inverse(d0 + fraction * (d1 - d0))
    }

    pub fn range(&self) -> Extent {
        self.state.borrow().range
    }

    pub fn set_range(&self, range: Extent) -> PlotResult<()> {
        if !range.iter().all(|v| v.is_finite()) {
            return Err(PlotError::InvalidConfig(format!("range {range:?} is not finite")));
        }
        self.state.borrow_mut().range = range;
        Ok(())
    }

    /// Clamp mapped values to the range ends.
    pub fn set_clamp(&self, clamp: bool) {
        self.state.borrow_mut().clamp = clamp;
    }

    /// Tick values for the current domain.
    pub fn ticks(&self, count: Option<usize>) -> Vec<f64> {
        let domain = self.state.borrow().domain;
        self.transform.ticks(domain, count.unwrap_or(DEFAULT_TICK_COUNT))
    }

    // -------------------------------------------------------------------------
    // Domain policy
    // -------------------------------------------------------------------------

    pub fn domainer(&self) -> Domainer {
        self.state.borrow().domainer.clone()
    }

    /// Replace the domainer and recompute if in automatic mode.
    pub fn set_domainer(&self, domainer: Domainer) -> PlotResult<()> {
        self.state.borrow_mut().domainer = domainer;
        self.auto_domain_if_automatic()
    }

    /// `None` makes an empty registry a [`PlotError::NoExtent`].
    pub fn set_default_extent(&self, extent: Option<Extent>) {
        self.default_extent.set(extent);
    }

    pub fn extent_count(&self) -> usize {
        self.state.borrow().extents.len()
    }

    fn assign_domain(&self, domain: Extent, automatic: bool) -> PlotResult<()> {
        {
            let mut state = self.state.borrow_mut();
            state.domain = domain;
            state.auto_domain = automatic;
        }
        tracing::trace!(?domain, automatic, "scale domain assigned");
        self.broadcaster.broadcast(self, &())
    }
}

fn check_base(base: f64) -> PlotResult<()> {
    if base.is_finite() && base > 1.0 {
        Ok(())
    } else {
        Err(PlotError::InvalidConfig(format!("log base {base} must be > 1")))
    }
}

impl DomainSource for QuantitativeScale {
    fn transform(&self) -> ScaleTransform {
        self.transform
    }

    fn default_extent(&self) -> Option<Extent> {
        self.default_extent.get()
    }
}

impl Listenable for QuantitativeScale {
    type Args = ();

    fn broadcaster(&self) -> &Broadcaster<Self> {
        &self.broadcaster
    }
}

impl Scale for QuantitativeScale {
    type Domain = Extent;
    type Extent = Extent;

    fn domain(&self) -> Extent {
        self.state.borrow().domain
    }

    fn set_domain(&self, domain: Extent) -> PlotResult<()> {
        if !domain.iter().all(|v| self.transform.accepts(*v)) {
            return Err(PlotError::InvalidDomain(format!(
                "{domain:?} is not valid for {:?}",
                self.transform
            )));
        }
        self.assign_domain(domain, false)
    }

    fn update_extent(&self, perspective: &str, attribute: &str, extent: Extent) {
        self.state
            .borrow_mut()
            .extents
            .update(ExtentKey::new(perspective, attribute), extent);
    }

    fn remove_extent(&self, perspective: &str, attribute: &str) {
        self.state
            .borrow_mut()
            .extents
            .remove(&ExtentKey::new(perspective, attribute));
    }

    fn auto_domain(&self) -> PlotResult<()> {
        let domain = {
            let state = self.state.borrow();
            state.domainer.compute_domain(&state.extents.extents(), self)?
        };
        self.assign_domain(domain, true)
    }

    fn is_auto_domain(&self) -> bool {
        self.state.borrow().auto_domain
    }

    fn convert_extent(extent: DataExtent) -> PlotResult<Option<Extent>> {
        match extent {
            DataExtent::Empty => Ok(None),
            DataExtent::Numeric(extent) => Ok(Some(extent)),
            DataExtent::Categories(values) => Err(PlotError::ExtentMismatch(format!(
                "{} categories on a quantitative scale",
                values.len()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "expected {expected}, got {actual}");
    }

    fn unpadded(scale: &QuantitativeScale) {
        let mut d = Domainer::new();
        d.pad(0.0).unwrap();
        scale.set_domainer(d).unwrap();
    }

    #[test]
    fn test_linear_mapping() {
        let scale = QuantitativeScale::linear();
        scale.set_domain([0.0, 10.0]).unwrap();
        scale.set_range([0.0, 100.0]).unwrap();
        assert_close(scale.scale(2.5), 25.0);
        assert_close(scale.invert(75.0), 7.5);
        assert_close(scale.scale(20.0), 200.0);

        scale.set_clamp(true);
        assert_close(scale.scale(20.0), 100.0);
    }

    #[test]
    fn test_log_mapping() {
        let scale = QuantitativeScale::log();
        scale.set_domain([1.0, 1000.0]).unwrap();
        scale.set_range([0.0, 300.0]).unwrap();
        assert_close(scale.scale(10.0), 100.0);
        assert_close(scale.invert(200.0), 100.0);
        assert!(scale.set_domain([0.0, 10.0]).is_err());
    }

    #[test]
    fn test_auto_domain_toggling() {
        let scale = QuantitativeScale::linear();
        unpadded(&scale);
        assert!(scale.is_auto_domain());

        scale.set_domain([3.0, 4.0]).unwrap();
        assert!(!scale.is_auto_domain());

        scale.update_extent("p1", "x", [0.0, 50.0]);
        scale.auto_domain_if_automatic().unwrap();
        assert_eq!(scale.domain(), [3.0, 4.0]);

        scale.auto_domain().unwrap();
        assert!(scale.is_auto_domain());
        assert_eq!(scale.domain(), [0.0, 50.0]);
    }

    #[test]
    fn test_update_extent_does_not_recompute() {
        let scale = QuantitativeScale::linear();
        unpadded(&scale);
        scale.update_extent("p1", "x", [0.0, 50.0]);
        assert_eq!(scale.domain(), [0.0, 1.0]);

        scale.auto_domain().unwrap();
        scale.remove_extent("p1", "x");
        assert_eq!(scale.domain(), [0.0, 50.0]);
        scale.auto_domain().unwrap();
        assert_eq!(scale.domain(), [0.0, 1.0]);
    }

    #[test]
    fn test_broadcasts_on_domain_change() {
        let scale = QuantitativeScale::linear();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        scale.broadcaster().register_listener("probe", move |scale: &QuantitativeScale, _| {
            s.borrow_mut().push(scale.domain());
            Ok(())
        });

        scale.set_domain([0.0, 2.0]).unwrap();
        scale.update_extent("p", "y", [5.0, 6.0]);
        assert_eq!(seen.borrow().len(), 1);
        scale.auto_domain().unwrap();
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(seen.borrow()[0], [0.0, 2.0]);
    }

    #[test]
    fn test_domain_error_without_default() {
        let scale = QuantitativeScale::linear();
        scale.set_default_extent(None);
        assert!(matches!(scale.auto_domain(), Err(PlotError::NoExtent)));
        scale.update_extent("p", "x", [1.0, 2.0]);
        assert!(scale.auto_domain().is_ok());
    }

    #[test]
    fn test_copy_has_no_listeners() {
        let scale = QuantitativeScale::linear();
        scale.set_domain([0.0, 5.0]).unwrap();
        scale.broadcaster().register_listener("probe", |_, _| Ok(()));
        let copy = scale.copy();
        assert_eq!(copy.domain(), [0.0, 5.0]);
        assert!(copy.broadcaster().is_empty());
        assert!(!copy.is_auto_domain());
    }

    #[test]
    fn test_ticks_follow_domain() {
        let scale = QuantitativeScale::linear();
        scale.set_domain([0.0, 1.0]).unwrap();
        assert_eq!(scale.ticks(Some(5)), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
    }

    #[test]
    fn test_modified_log_accepts_zero() {
        let scale = QuantitativeScale::modified_log(10.0).unwrap();
        scale.set_domain([-100.0, 100.0]).unwrap();
        scale.set_range([0.0, 2.0]).unwrap();
        assert_close(scale.scale(0.0), 1.0);
        assert!(QuantitativeScale::modified_log(1.0).is_err());
    }

    #[test]
    fn test_convert_extent() {
        assert_eq!(
            QuantitativeScale::convert_extent(DataExtent::Numeric([1.0, 2.0])).unwrap(),
            Some([1.0, 2.0])
        );
        assert!(QuantitativeScale::convert_extent(DataExtent::Categories(vec!["a".into()])).is_err());
    }
}

//! Domainer - Reduces contributed extents to one effective domain.
//!
//! # Pipeline
//!
//! ```text
//! extents → combine → include values → pad → padding exceptions → nice
//! ```
//!
//! Padding happens in the scale's transformed space, so a log scale pads
//! multiplicatively. With proportion `p` and transformed span `s`, each side
//! grows by `s * p / (1 - 2p)`, which makes the original data occupy
//! `1 - 2p` of the padded domain. An endpoint equal to a padding exception
//! is never moved.

use std::rc::Rc;

use indexmap::IndexMap;

use super::transform::{ScaleTransform, DEFAULT_TICK_COUNT};
use super::Extent;
use crate::error::{PlotError, PlotResult};

/// Default padding proportion: 5% of the data span on each side.
pub const DEFAULT_PAD_PROPORTION: f64 = 1.0 / 22.0;

/// Transformed-space padding applied around a zero-width domain.
pub const PADDING_FOR_IDENTICAL_DOMAIN: f64 = 1.0;

/// Merges valid extents into one. `None` means "no opinion".
pub type CombineExtents = Rc<dyn Fn(&[Extent]) -> Option<Extent>>;

/// Values keyed by caller name, plus anonymous ones.
#[derive(Debug, Clone, Default)]
struct ValueSet {
    keyed: IndexMap<String, f64>,
    unkeyed: Vec<f64>,
}

impl ValueSet {
    fn add(&mut self, value: f64, key: Option<&str>) {
        match key {
            Some(key) => {
                self.keyed.insert(key.to_string(), value);
            }
            None if !self.unkeyed.contains(&value) => self.unkeyed.push(value),
            None => {}
        }
    }

    fn remove_key(&mut self, key: &str) {
        self.keyed.shift_remove(key);
    }

    fn remove_value(&mut self, value: f64) {
        self.unkeyed.retain(|v| *v != value);
    }

    fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.keyed.values().copied().chain(self.unkeyed.iter().copied())
    }

    fn contains(&self, value: f64) -> bool {
        self.values().any(|v| v == value)
    }
}

/// Where a [`Domainer`] gets scale-specific behavior from.
pub trait DomainSource {
    fn transform(&self) -> ScaleTransform;

    /// Fallback when nothing valid was contributed.
    fn default_extent(&self) -> Option<Extent>;
}

#[derive(Clone)]
pub struct Domainer {
    combine: Option<CombineExtents>,
    pad_proportion: f64,
    padding_exceptions: ValueSet,
    included_values: ValueSet,
    nice_count: Option<usize>,
}

impl std::fmt::Debug for Domainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Domainer")
            .field("custom_combine", &self.combine.is_some())
            .field("pad_proportion", &self.pad_proportion)
            .field("padding_exceptions", &self.padding_exceptions)
            .field("included_values", &self.included_values)
            .field("nice_count", &self.nice_count)
            .finish()
    }
}

impl Default for Domainer {
    fn default() -> Self {
        Self::new()
    }
}

impl Domainer {
    /// Default min/max combine, default padding, no nicing.
    pub fn new() -> Self {
        Self {
            combine: None,
            pad_proportion: DEFAULT_PAD_PROPORTION,
            padding_exceptions: ValueSet::default(),
            included_values: ValueSet::default(),
            nice_count: None,
        }
    }

    /// Replace the min-of-lows / max-of-highs merge.
    pub fn with_combine<F>(mut self, combine: F) -> Self
    where
        F: Fn(&[Extent]) -> Option<Extent> + 'static,
    {
        self.combine = Some(Rc::new(combine));
        self
    }

    /// Set the padding proportion. Must lie in [0, 0.5).
    pub fn pad(&mut self, proportion: f64) -> PlotResult<&mut Self> {
        if !(0.0..0.5).contains(&proportion) {
            return Err(PlotError::InvalidProportion {
                what: "pad proportion",
                value: proportion,
            });
        }
        self.pad_proportion = proportion;
        Ok(self)
    }

    pub fn pad_proportion(&self) -> f64 {
        self.pad_proportion
    }

    pub fn add_padding_exception(&mut self, value: f64, key: Option<&str>) -> &mut Self {
        self.padding_exceptions.add(value, key);
        self
    }

    pub fn remove_padding_exception(&mut self, value: f64) -> &mut Self {
        self.padding_exceptions.remove_value(value);
        self
    }

    pub fn remove_padding_exception_key(&mut self, key: &str) -> &mut Self {
        self.padding_exceptions.remove_key(key);
        self
    }

    pub fn add_included_value(&mut self, value: f64, key: Option<&str>) -> &mut Self {
        self.included_values.add(value, key);
        self
    }

    pub fn remove_included_value(&mut self, value: f64) -> &mut Self {
        self.included_values.remove_value(value);
        self
    }

    pub fn remove_included_value_key(&mut self, key: &str) -> &mut Self {
        self.included_values.remove_key(key);
        self
    }

    /// Round the final domain outward for about `count` ticks
    /// ([`DEFAULT_TICK_COUNT`] when `None`).
    pub fn nice(&mut self, count: Option<usize>) -> &mut Self {
        self.nice_count = Some(count.unwrap_or(DEFAULT_TICK_COUNT));
        self
    }

    pub fn no_nice(&mut self) -> &mut Self {
        self.nice_count = None;
        self
    }

    /// Run the full pipeline over `extents`.
    ///
    /// Extents with non-finite bounds or values the transform rejects are
    /// ignored. Fails with [`PlotError::NoExtent`] when none remain and the
    /// source has no default.
    pub fn compute_domain(&self, extents: &[Extent], source: &dyn DomainSource) -> PlotResult<Extent> {
        let transform = source.transform();
        let valid: Vec<Extent> = extents
            .iter()
            .filter(|e| transform.accepts(e[0]) && transform.accepts(e[1]))
            .map(|&[a, b]| if a <= b { [a, b] } else { [b, a] })
            .collect();

        let merged = match &self.combine {
            Some(combine) => combine(&valid),
            None if valid.is_empty() => None,
            None => Some(min_max(&valid)),
        };
        let merged = match merged {
            Some(extent) => extent,
            None => source.default_extent().ok_or(PlotError::NoExtent)?,
        };

        let included = self.include_values(merged, transform);
        let padded = self.pad_domain(included, transform);
        let domain = match self.nice_count {
            Some(count) => transform.nice(padded, count),
            None => padded,
        };

        if domain.iter().all(|v| transform.accepts(*v)) {
            Ok(domain)
        } else {
            Err(PlotError::InvalidDomain(format!(
                "computed {domain:?} is not valid for {transform:?}"
            )))
        }
    }

    fn include_values(&self, [mut lo, mut hi]: Extent, transform: ScaleTransform) -> Extent {
        for v in self.included_values.values().filter(|v| transform.accepts(*v)) {
            lo = lo.min(v);
            hi = hi.max(v);
        }
        [lo, hi]
    }

    fn pad_domain(&self, [lo, hi]: Extent, transform: ScaleTransform) -> Extent {
        let p = self.pad_proportion;
        if p == 0.0 {
            return [lo, hi];
        }
        let (t_lo, t_hi) = (transform.forward(lo), transform.forward(hi));

        if lo == hi {
            // Zero span; an excepted value becomes the low end.
            let t = t_lo;
            if self.padding_exceptions.contains(lo) {
                return [lo, transform.inverse(t + PADDING_FOR_IDENTICAL_DOMAIN)];
            }
            return [
                transform.inverse(t - PADDING_FOR_IDENTICAL_DOMAIN),
                transform.inverse(t + PADDING_FOR_IDENTICAL_DOMAIN),
            ];
        }

        let extra = (t_hi - t_lo) * p / (1.0 - 2.0 * p);
        let new_lo = if self.padding_exceptions.contains(lo) {
            lo
        } else {
            transform.inverse(t_lo - extra)
        };
        let new_hi = if self.padding_exceptions.contains(hi) {
            hi
        } else {
            transform.inverse(t_hi + extra)
        };
        [new_lo, new_hi]
    }
}

fn min_max(extents: &[Extent]) -> Extent {
    extents.iter().fold([f64::INFINITY, f64::NEG_INFINITY], |[lo, hi], e| {
        [lo.min(e[0]), hi.max(e[1])]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Source(ScaleTransform, Option<Extent>);

    impl DomainSource for Source {
        fn transform(&self) -> ScaleTransform {
            self.0
        }
        fn default_extent(&self) -> Option<Extent> {
            self.1
        }
    }

    fn linear() -> Source {
        Source(ScaleTransform::Linear, Some([0.0, 1.0]))
    }

    fn assert_domain(actual: Extent, expected: Extent) {
        assert!(
            (actual[0] - expected[0]).abs() < 1e-9 && (actual[1] - expected[1]).abs() < 1e-9,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn test_padding_formula() {
        let mut d = Domainer::new();
        d.pad(0.25).unwrap();
        let domain = d.compute_domain(&[[10.0, 20.0]], &linear()).unwrap();
        assert_domain(domain, [5.0, 25.0]);
    }

    #[test]
    fn test_default_padding_is_five_percent() {
        let d = Domainer::new();
        let domain = d.compute_domain(&[[0.0, 100.0]], &linear()).unwrap();
        assert_domain(domain, [-5.0, 105.0]);
    }

    #[test]
    fn test_padding_exception_keeps_side() {
        let mut d = Domainer::new();
        d.add_padding_exception(0.0, None);
        let domain = d.compute_domain(&[[0.0, 100.0]], &linear()).unwrap();
        assert_domain(domain, [0.0, 105.0]);

        d.remove_padding_exception(0.0);
        let domain = d.compute_domain(&[[0.0, 100.0]], &linear()).unwrap();
        assert_domain(domain, [-5.0, 105.0]);
    }

    #[test]
    fn test_keyed_exception() {
        let mut d = Domainer::new();
        d.add_padding_exception(100.0, Some("bars"));
        let domain = d.compute_domain(&[[0.0, 100.0]], &linear()).unwrap();
        assert_domain(domain, [-5.0, 100.0]);

        d.remove_padding_exception_key("bars");
        let domain = d.compute_domain(&[[0.0, 100.0]], &linear()).unwrap();
        assert_domain(domain, [-5.0, 105.0]);
    }

    #[test]
    fn test_merges_extents() {
        let mut d = Domainer::new();
        d.pad(0.0).unwrap();
        let domain = d
            .compute_domain(&[[3.0, 7.0], [-2.0, 4.0], [f64::NAN, 9.0]], &linear())
            .unwrap();
        assert_domain(domain, [-2.0, 7.0]);
    }

    #[test]
    fn test_included_values_expand() {
        let mut d = Domainer::new();
        d.pad(0.0).unwrap();
        d.add_included_value(0.0, Some("baseline"));
        let domain = d.compute_domain(&[[10.0, 20.0]], &linear()).unwrap();
        assert_domain(domain, [0.0, 20.0]);

        d.remove_included_value_key("baseline");
        let domain = d.compute_domain(&[[10.0, 20.0]], &linear()).unwrap();
        assert_domain(domain, [10.0, 20.0]);
    }

    #[test]
    fn test_empty_uses_default_extent() {
        let mut d = Domainer::new();
        d.pad(0.0).unwrap();
        assert_domain(d.compute_domain(&[], &linear()).unwrap(), [0.0, 1.0]);
    }

    #[test]
    fn test_no_extent_without_default() {
        let d = Domainer::new();
        let source = Source(ScaleTransform::Linear, None);
        assert!(matches!(
            d.compute_domain(&[], &source),
            Err(PlotError::NoExtent)
        ));
        assert!(matches!(
            d.compute_domain(&[[f64::NAN, f64::NAN]], &source),
            Err(PlotError::NoExtent)
        ));
    }

    #[test]
    fn test_log_pads_multiplicatively() {
        let mut d = Domainer::new();
        d.pad(1.0 / 3.0).unwrap();
        let source = Source(ScaleTransform::Log { base: 10.0 }, Some([1.0, 10.0]));
        let domain = d.compute_domain(&[[10.0, 100.0]], &source).unwrap();
        assert_domain(domain, [1.0, 1000.0]);
        // More room gained above than below in domain units.
        assert!(domain[1] - 100.0 > 10.0 - domain[0]);
    }

    #[test]
    fn test_log_ignores_non_positive() {
        let mut d = Domainer::new();
        d.pad(0.0).unwrap();
        let source = Source(ScaleTransform::Log { base: 10.0 }, Some([1.0, 10.0]));
        let domain = d.compute_domain(&[[-5.0, 100.0], [2.0, 50.0]], &source).unwrap();
        assert_domain(domain, [2.0, 50.0]);
    }

    #[test]
    fn test_identical_domain() {
        let d = Domainer::new();
        assert_domain(d.compute_domain(&[[4.0, 4.0]], &linear()).unwrap(), [3.0, 5.0]);

        let mut d = Domainer::new();
        d.add_padding_exception(0.0, None);
        assert_domain(d.compute_domain(&[[0.0, 0.0]], &linear()).unwrap(), [0.0, 1.0]);
    }

    #[test]
    fn test_nice_after_padding() {
        let mut d = Domainer::new();
        d.nice(Some(5));
        let domain = d.compute_domain(&[[12.0, 87.0]], &linear()).unwrap();
        assert_domain(domain, [0.0, 100.0]);
    }

    #[test]
    fn test_custom_combine() {
        let mut d = Domainer::new().with_combine(|extents| extents.first().copied());
        d.pad(0.0).unwrap();
        let domain = d.compute_domain(&[[1.0, 2.0], [0.0, 50.0]], &linear()).unwrap();
        assert_domain(domain, [1.0, 2.0]);
    }

    #[test]
    fn test_pad_bounds() {
        let mut d = Domainer::new();
        assert!(d.pad(0.5).is_err());
        assert!(d.pad(-0.1).is_err());
        assert!(d.pad(0.49).is_ok());
    }
}

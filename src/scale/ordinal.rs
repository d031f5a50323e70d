//! Discrete scales - categories spread as points or bands across a range.
//!
//! The domain is the union of contributed category lists in order of first
//! appearance. Positions follow the usual point / band conventions:
//!
//! ```text
//! points: step = span / (n - 1 + 2·outer)      first = start + step·outer
//! bands:  step = span / (n - inner + 2·outer)  first = start + step·outer
//!         band = step · (1 - inner)
//! ```

use std::cell::RefCell;

use super::extent::{ExtentKey, ExtentRegistry};
use super::{Extent, Scale};
use crate::broadcast::{Broadcaster, Listenable};
use crate::data::DataExtent;
use crate::error::{check_padding, PlotError, PlotResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeType {
    Points { outer_padding: f64 },
    Bands { inner_padding: f64, outer_padding: f64 },
}

impl Default for RangeType {
    fn default() -> Self {
        RangeType::Bands {
            inner_padding: 0.3,
            outer_padding: 0.5,
        }
    }
}

#[derive(Debug, Clone)]
struct OrdinalState {
    domain: Vec<String>,
    range: Extent,
    range_type: RangeType,
    auto_domain: bool,
    extents: ExtentRegistry<Vec<String>>,
}

/// Where the first category sits, the distance between categories, band width.
struct Spacing {
    first: f64,
    step: f64,
    band: f64,
    reversed: bool,
}

#[derive(Debug)]
pub struct OrdinalScale {
    state: RefCell<OrdinalState>,
    broadcaster: Broadcaster<OrdinalScale>,
}

impl Default for OrdinalScale {
    fn default() -> Self {
        Self::new()
    }
}

impl OrdinalScale {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(OrdinalState {
                domain: Vec::new(),
                range: [0.0, 1.0],
                range_type: RangeType::default(),
                auto_domain: true,
                extents: ExtentRegistry::default(),
            }),
            broadcaster: Broadcaster::new(),
        }
    }

    /// Same state, no listeners.
    pub fn copy(&self) -> Self {
        Self {
            state: RefCell::new(self.state.borrow().clone()),
            broadcaster: Broadcaster::new(),
        }
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

    pub fn range_type(&self) -> RangeType {
        self.state.borrow().range_type
    }

    pub fn range_points(&self, outer_padding: f64) -> PlotResult<()> {
        check_padding(outer_padding)?;
        self.state.borrow_mut().range_type = RangeType::Points { outer_padding };
        Ok(())
    }

    /// `inner_padding` is the share of each step left empty, in [0, 1).
    pub fn range_bands(&self, inner_padding: f64, outer_padding: f64) -> PlotResult<()> {
        if !(0.0..1.0).contains(&inner_padding) {
            return Err(PlotError::InvalidProportion {
                what: "inner padding",
                value: inner_padding,
            });
        }
        check_padding(outer_padding)?;
        self.state.borrow_mut().range_type = RangeType::Bands {
            inner_padding,
            outer_padding,
        };
        Ok(())
    }

    fn spacing(&self) -> Spacing {
        let state = self.state.borrow();
        let n = state.domain.len() as f64;
        let [r0, r1] = state.range;
        match state.range_type {
            RangeType::Points { outer_padding } => {
                if n < 2.0 {
                    Spacing {
                        first: (r0 + r1) / 2.0,
                        step: 0.0,
                        band: 0.0,
                        reversed: false,
                    }
                } else {
                    let step = (r1 - r0) / (n - 1.0 + 2.0 * outer_padding);
                    Spacing {
                        first: r0 + step * outer_padding,
                        step,
                        band: 0.0,
                        reversed: false,
                    }
                }
            }
            RangeType::Bands {
                inner_padding,
                outer_padding,
            } => {
                let reversed = r1 < r0;
                let (start, stop) = if reversed { (r1, r0) } else { (r0, r1) };
                let step = (stop - start) / (n - inner_padding + 2.0 * outer_padding).max(1.0);
                Spacing {
                    first: start + step * outer_padding,
                    step,
                    band: step * (1.0 - inner_padding),
                    reversed,
                }
            }
        }
    }

    /// Position of `value` (band start for bands), `None` if not in the domain.
    pub fn scale(&self, value: &str) -> Option<f64> {
        let (index, len) = {
            let state = self.state.borrow();
            (state.domain.iter().position(|v| v == value)?, state.domain.len())
        };
        let spacing = self.spacing();
        let slot = if spacing.reversed { len - 1 - index } else { index };
        Some(spacing.first + spacing.step * slot as f64)
    }

    /// Distance between neighbouring categories.
    pub fn step(&self) -> f64 {
        self.spacing().step.abs()
    }

    /// Band width; zero for points.
    pub fn range_band(&self) -> f64 {
        self.spacing().band
    }

    /// Band start and width including half the inner gap on each side.
    pub fn full_band_start_and_width(&self, value: &str) -> Option<(f64, f64)> {
        let start = self.scale(value)?;
        let spacing = self.spacing();
        let gap = if self.state.borrow().domain.len() < 2 {
            0.0
        } else {
            spacing.step.abs() - spacing.band
        };
        Some((start - gap / 2.0, spacing.band + gap))
    }

    fn assign_domain(&self, domain: Vec<String>, automatic: bool) -> PlotResult<()> {
        {
            let mut state = self.state.borrow_mut();
            state.domain = domain;
            state.auto_domain = automatic;
        }
        self.broadcaster.broadcast(self, &())
    }
}

impl Listenable for OrdinalScale {
    type Args = ();

    fn broadcaster(&self) -> &Broadcaster<Self> {
        &self.broadcaster
    }
}

impl Scale for OrdinalScale {
    type Domain = Vec<String>;
    type Extent = Vec<String>;

    fn domain(&self) -> Vec<String> {
        self.state.borrow().domain.clone()
    }

    fn set_domain(&self, domain: Vec<String>) -> PlotResult<()> {
        for (i, value) in domain.iter().enumerate() {
            if domain[..i].contains(value) {
                return Err(PlotError::InvalidDomain(format!("duplicate category {value:?}")));
            }
        }
        self.assign_domain(domain, false)
    }

    fn update_extent(&self, perspective: &str, attribute: &str, extent: Vec<String>) {
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
        let mut union: Vec<String> = Vec::new();
        for extent in self.state.borrow().extents.extents() {
            for value in extent {
                if !union.contains(&value) {
                    union.push(value);
                }
            }
        }
        self.assign_domain(union, true)
    }

    fn is_auto_domain(&self) -> bool {
        self.state.borrow().auto_domain
    }

    fn convert_extent(extent: DataExtent) -> PlotResult<Option<Vec<String>>> {
        match extent {
            DataExtent::Empty => Ok(None),
            DataExtent::Categories(values) => Ok(Some(values)),
            DataExtent::Numeric(extent) => Err(PlotError::ExtentMismatch(format!(
                "numeric extent {extent:?} on an ordinal scale"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "expected {expected}, got {actual}");
    }

    #[test]
    fn test_auto_domain_is_ordered_union() {
        let scale = OrdinalScale::new();
        scale.update_extent("p1", "x", strings(&["b", "a"]));
        scale.update_extent("p2", "x", strings(&["a", "c"]));
        assert!(scale.domain().is_empty());

        scale.auto_domain().unwrap();
        assert_eq!(scale.domain(), strings(&["b", "a", "c"]));

        scale.remove_extent("p1", "x");
        scale.auto_domain().unwrap();
        assert_eq!(scale.domain(), strings(&["a", "c"]));
    }

    #[test]
    fn test_points() {
        let scale = OrdinalScale::new();
        scale.range_points(0.0).unwrap();
        scale.set_range([0.0, 100.0]).unwrap();
        scale.set_domain(strings(&["a", "b", "c"])).unwrap();
        assert_close(scale.scale("a").unwrap(), 0.0);
        assert_close(scale.scale("b").unwrap(), 50.0);
        assert_close(scale.scale("c").unwrap(), 100.0);
        assert_eq!(scale.scale("zzz"), None);
        assert_eq!(scale.range_band(), 0.0);
    }

    #[test]
    fn test_bands() {
        let scale = OrdinalScale::new();
        scale.range_bands(0.0, 0.0).unwrap();
        scale.set_range([0.0, 90.0]).unwrap();
        scale.set_domain(strings(&["a", "b", "c"])).unwrap();
        assert_close(scale.step(), 30.0);
        assert_close(scale.range_band(), 30.0);
        assert_close(scale.scale("b").unwrap(), 30.0);

        scale.range_bands(0.5, 0.0).unwrap();
        // step = 90 / (3 - 0.5)
        assert_close(scale.step(), 36.0);
        assert_close(scale.range_band(), 18.0);
        let (start, width) = scale.full_band_start_and_width("a").unwrap();
        assert_close(start, -9.0);
        assert_close(width, 36.0);
    }

    #[test]
    fn test_reversed_bands() {
        let scale = OrdinalScale::new();
        scale.range_bands(0.0, 0.0).unwrap();
        scale.set_range([90.0, 0.0]).unwrap();
        scale.set_domain(strings(&["a", "b", "c"])).unwrap();
        assert_close(scale.scale("a").unwrap(), 60.0);
        assert_close(scale.scale("c").unwrap(), 0.0);
    }

    #[test]
    fn test_explicit_domain_disables_auto() {
        let scale = OrdinalScale::new();
        scale.set_domain(strings(&["x"])).unwrap();
        scale.update_extent("p", "x", strings(&["y"]));
        scale.auto_domain_if_automatic().unwrap();
        assert_eq!(scale.domain(), strings(&["x"]));
        assert!(scale.set_domain(strings(&["x", "x"])).is_err());
    }

    #[test]
    fn test_padding_validation() {
        let scale = OrdinalScale::new();
        assert!(scale.range_bands(1.0, 0.0).is_err());
        assert!(scale.range_points(-1.0).is_err());
    }
}

//! Quantitative transforms - linear, log and symmetric ("modified") log.
//!
//! Each transform knows how to map values into the space where the scale is
//! linear, which values it accepts, its fallback extent, and how to round a
//! domain outward and pick tick values.

use super::Extent;

/// Tick count used when a caller asks for nice rounding without one.
pub const DEFAULT_TICK_COUNT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScaleTransform {
    Linear,
    /// Strictly positive values only.
    Log { base: f64 },
    /// Sign-symmetric log, linear-ish below the pivot (`pivot == base`).
    ModifiedLog { base: f64 },
}

impl ScaleTransform {
    /// Value to transformed space.
    pub fn forward(self, value: f64) -> f64 {
        match self {
            ScaleTransform::Linear => value,
            ScaleTransform::Log { base } => log(value, base),
            ScaleTransform::ModifiedLog { base } => adjusted_log(value, base),
        }
    }

    /// Transformed space back to a value.
    pub fn inverse(self, t: f64) -> f64 {
        match self {
            ScaleTransform::Linear => t,
            ScaleTransform::Log { base } => base.powf(t),
            ScaleTransform::ModifiedLog { base } => inverted_adjusted_log(t, base),
        }
    }

    pub fn accepts(self, value: f64) -> bool {
        value.is_finite()
            && match self {
                ScaleTransform::Log { .. } => value > 0.0,
                _ => true,
            }
    }

    /// Domain used when no extents are registered.
    pub fn default_extent(self) -> Extent {
        match self {
            ScaleTransform::Log { .. } => [1.0, 10.0],
            _ => [0.0, 1.0],
        }
    }

    /// Extend `domain` outward to round values for about `count` ticks.
    pub fn nice(self, domain: Extent, count: usize) -> Extent {
        match self {
            ScaleTransform::Linear => nice_linear(domain, count),
            ScaleTransform::Log { base } => {
                let [a, b] = domain;
                let reversed = a > b;
                let (lo, hi) = if reversed { (b, a) } else { (a, b) };
                let niced = [
                    base.powi(log(lo, base).floor() as i32),
                    base.powi(log(hi, base).ceil() as i32),
                ];
                if reversed { [niced[1], niced[0]] } else { niced }
            }
            ScaleTransform::ModifiedLog { .. } => {
                let t = nice_linear([self.forward(domain[0]), self.forward(domain[1])], count);
                [self.inverse(t[0]), self.inverse(t[1])]
            }
        }
    }

    /// Tick values inside `domain`, ascending.
    pub fn ticks(self, domain: Extent, count: usize) -> Vec<f64> {
        let (lo, hi) = ordered(domain);
        match self {
            ScaleTransform::Linear => linear_ticks(lo, hi, count),
            ScaleTransform::Log { base } => {
                let ticks = powers_between(lo, hi, base);
                if ticks.len() < 2 {
                    linear_ticks(lo, hi, count)
                } else {
                    ticks
                }
            }
            ScaleTransform::ModifiedLog { base } => {
                let pivot = base;
                let mut ticks: Vec<f64> = powers_between(pivot.max(-hi), -lo, base)
                    .into_iter()
                    .rev()
                    .map(|v| -v)
                    .collect();
                ticks.extend([-pivot, 0.0, pivot].into_iter().filter(|v| lo <= *v && *v <= hi));
                ticks.extend(powers_between(pivot.max(lo), hi, base));
                ticks.dedup();
                if ticks.len() <= 1 {
                    linear_ticks(lo, hi, count)
                } else {
                    ticks
                }
            }
        }
    }
}

fn ordered([a, b]: Extent) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Logarithm that lands exactly on integers for exact powers.
fn log(value: f64, base: f64) -> f64 {
    let raw = if base == 10.0 { value.log10() } else { value.log(base) };
    let rounded = raw.round();
    if (raw - rounded).abs() < 1e-9 { rounded } else { raw }
}

fn adjusted_log(value: f64, base: f64) -> f64 {
    let sign = if value < 0.0 { -1.0 } else { 1.0 };
    let mut x = value * sign;
    let pivot = base;
    if x < pivot {
        x += (pivot - x) / pivot;
    }
    log(x, base) * sign
}

fn inverted_adjusted_log(t: f64, base: f64) -> f64 {
    let sign = if t < 0.0 { -1.0 } else { 1.0 };
    let pivot = base;
    let mut x = base.powf(t * sign);
    if x < pivot {
        x = pivot * (x - 1.0) / (pivot - 1.0);
    }
    x * sign
}

/// Round step size for about `count` ticks over `span`.
pub(crate) fn tick_step(span: f64, count: usize) -> f64 {
    if !(span.is_finite() && span > 0.0) || count == 0 {
        return 0.0;
    }
    let count = count as f64;
    let mut step = 10f64.powf((span / count).log10().floor());
    let err = count / span * step;
    if err <= 0.15 {
        step *= 10.0;
    } else if err <= 0.35 {
        step *= 5.0;
    } else if err <= 0.75 {
        step *= 2.0;
    }
    step
}

fn nice_linear(domain: Extent, count: usize) -> Extent {
    let reversed = domain[0] > domain[1];
    let (lo, hi) = ordered(domain);
    let step = tick_step(hi - lo, count);
    if step == 0.0 {
        return domain;
    }
    let niced = [(lo / step).floor() * step, (hi / step).ceil() * step];
    if reversed { [niced[1], niced[0]] } else { niced }
}

fn linear_ticks(lo: f64, hi: f64, count: usize) -> Vec<f64> {
    if lo == hi {
        return vec![lo];
    }
    let step = tick_step(hi - lo, count);
    if step == 0.0 {
        return Vec::new();
    }
    let start = (lo / step).ceil() as i64;
    let stop = (hi / step).floor() as i64;
    // Dividing by the inverse keeps 0.1-style steps free of drift.
    if step < 1.0 {
        let inverse = (1.0 / step).round();
        (start..=stop).map(|i| i as f64 / inverse).collect()
    } else {
        (start..=stop).map(|i| i as f64 * step).collect()
    }
}

/// Integer powers of `base` inside [lo, hi]. Empty unless `0 < lo <= hi`.
fn powers_between(lo: f64, hi: f64, base: f64) -> Vec<f64> {
    if !(lo > 0.0 && lo <= hi) {
        return Vec::new();
    }
    let first = log(lo, base).ceil() as i32;
    let last = log(hi, base).floor() as i32;
    (first..=last).map(|k| base.powi(k)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_linear_nice() {
        assert_eq!(ScaleTransform::Linear.nice([0.3, 9.7], 10), [0.0, 10.0]);
        assert_eq!(ScaleTransform::Linear.nice([12.0, 87.0], 5), [0.0, 100.0]);
        assert_eq!(ScaleTransform::Linear.nice([87.0, 12.0], 5), [100.0, 0.0]);
    }

    #[test]
    fn test_linear_ticks() {
        assert_eq!(
            ScaleTransform::Linear.ticks([0.0, 1.0], 5),
            vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]
        );
        assert_eq!(ScaleTransform::Linear.ticks([0.0, 100.0], 10).len(), 11);
    }

    #[test]
    fn test_log_round_trip_and_nice() {
        let log10 = ScaleTransform::Log { base: 10.0 };
        assert_eq!(log10.forward(1000.0), 3.0);
        assert!(approx(log10.inverse(2.0), 100.0));
        assert_eq!(log10.nice([3.0, 420.0], 10), [1.0, 1000.0]);
        assert_eq!(log10.ticks([1.0, 1000.0], 10), vec![1.0, 10.0, 100.0, 1000.0]);
        assert!(!log10.accepts(0.0));
        assert!(!log10.accepts(-3.0));
    }

    #[test]
    fn test_modified_log_is_symmetric() {
        let t = ScaleTransform::ModifiedLog { base: 10.0 };
        assert_eq!(t.forward(0.0), 0.0);
        for v in [-500.0, -3.0, 0.5, 1.0, 9.0, 10.0, 1234.0] {
            assert!(approx(t.inverse(t.forward(v)), v), "round trip {v}");
            assert!(approx(t.forward(-v), -t.forward(v)));
        }
    }

    #[test]
    fn test_modified_log_ticks() {
        let t = ScaleTransform::ModifiedLog { base: 10.0 };
        assert_eq!(
            t.ticks([-100.0, 100.0], 10),
            vec![-100.0, -10.0, 0.0, 10.0, 100.0]
        );
    }

    #[test]
    fn test_tick_step_degenerate() {
        assert_eq!(tick_step(0.0, 10), 0.0);
        assert_eq!(tick_step(10.0, 0), 0.0);
        assert_eq!(ScaleTransform::Linear.ticks([4.0, 4.0], 10), vec![4.0]);
    }
}

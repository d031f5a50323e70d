//! Scales - value ↔ pixel mappings with registry-driven domains.
//!
//! # Architecture
//!
//! A scale keeps a registry of extents keyed by (perspective, attribute).
//! Registry edits never touch the domain on their own:
//!
//! ```text
//! update_extent / remove_extent → registry
//! auto_domain                   → Domainer(registry) → domain → broadcast
//! set_domain                    → domain (automatic mode off) → broadcast
//! ```
//!
//! Consumers that want the domain to follow their data call
//! [`Scale::auto_domain_if_automatic`] after contributing.
//!
//! # Modules
//!
//! - [`transform`] - Linear / Log / ModifiedLog transforms, nice and ticks
//! - [`domainer`] - Extent merging, padding, exceptions and nicing
//! - [`extent`] - The (perspective, attribute) registry
//! - [`quantitative`] - Continuous scales
//! - [`ordinal`] - Discrete scales with points or bands
//! - [`coordinator`] - Domain lockstep across scales

pub mod coordinator;
pub mod domainer;
pub mod extent;
pub mod ordinal;
pub mod quantitative;
pub mod transform;

pub use coordinator::ScaleDomainCoordinator;
pub use domainer::{DomainSource, Domainer, DEFAULT_PAD_PROPORTION};
pub use extent::{ExtentKey, ExtentRegistry};
pub use ordinal::{OrdinalScale, RangeType};
pub use quantitative::QuantitativeScale;
pub use transform::ScaleTransform;

use crate::broadcast::Listenable;
use crate::data::DataExtent;
use crate::error::PlotResult;

/// Lower and upper bound of a continuous extent or domain.
pub type Extent = [f64; 2];

/// Capabilities shared by every scale kind.
///
/// The broadcaster fires with `()` after every domain assignment.
pub trait Scale: Listenable<Args = ()> {
    /// Pair for continuous scales, ordered set for discrete ones.
    type Domain: Clone + PartialEq + std::fmt::Debug;
    /// What one perspective contributes.
    type Extent: Clone;

    fn domain(&self) -> Self::Domain;

    /// Assign the domain and leave automatic-domain mode.
    fn set_domain(&self, domain: Self::Domain) -> PlotResult<()>;

    fn update_extent(&self, perspective: &str, attribute: &str, extent: Self::Extent);

    fn remove_extent(&self, perspective: &str, attribute: &str);

    /// Recompute the domain from the registry and re-enter automatic mode.
    fn auto_domain(&self) -> PlotResult<()>;

    fn is_auto_domain(&self) -> bool;

    fn auto_domain_if_automatic(&self) -> PlotResult<()> {
        if self.is_auto_domain() {
            self.auto_domain()
        } else {
            Ok(())
        }
    }

    /// Shape a dataset extent for this scale. `None` means nothing to contribute.
    fn convert_extent(extent: DataExtent) -> PlotResult<Option<Self::Extent>>;
}

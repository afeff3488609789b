//! Normalization pipeline stages.
//!
//! - `normalize`: extract the collection from a response envelope
//! - `reconcile`: merge aliased fields onto every name in their group
//! - `date`: pick and format the first valid timestamp
//! - `index`: group one collection by keys of another, count aggregates
//! - `filter`: search term plus categorical selections
//! - `view`: compose the stages into a render-ready view model

pub mod date;
pub mod filter;
pub mod index;
pub mod normalize;
pub mod reconcile;
pub mod view;

pub use date::{DateFormatter, DateResolver, FormatError, LocaleFormatter, ResolvedDate};
pub use filter::{ALL, CategoricalFilter, FilterEngine, FilterState};
pub use index::{GroupIndex, IndexBuilder, build_cross_index, build_index, count_by, count_distinct};
pub use normalize::{Shape, ShapeNormalizer, detect_shape, normalize};
pub use reconcile::{FieldReconciler, reconcile};
pub use view::{Collection, ViewModel, build_view_model};

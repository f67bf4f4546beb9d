//! Shopping-list aggregation and export.
//!
//! Pure domain logic: merging the ingredient lines of every recipe on a
//! user's shopping list into per-ingredient totals, and rendering the
//! result as plain text or as a paginated PDF. No storage access happens
//! here; callers load the lines and hand them over.

pub mod aggregate;
pub mod export;

pub use aggregate::{AggregatedLine, IngredientLine, ShoppingSummary, UnitConflict, aggregate};
pub use export::{page_capacity, paginate, render_pdf, render_text};

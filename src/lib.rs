//! printquote Library
//!
//! Tariff catalog, quote engine and selection state for a business-card
//! print shop, plus the pieces of the command-line front end.

pub mod catalog;
pub mod catalog_file;
pub mod cli;
pub mod commands;
pub mod engine;
pub mod error;
pub mod plans;
pub mod report;
pub mod selection;
pub mod types;

// Re-export main types for convenience
pub use catalog::{
    AddOn, AddOnCatalogs, AddOnPrice, CatalogPath, DiscountBracket, DiscountSchedule, Keyed,
    PaperType, PrintingMethod, SideVariant, TariffCatalog, WeightTier,
};
pub use catalog_file::CatalogFile;
pub use engine::{
    compute_total, parse_recommendation_input, recommend_plan, resolve_unit_price,
    snap_to_nearest_quantity, Quote, Recommendation,
};
pub use error::QuoteError;
pub use plans::Plan;
pub use selection::{Selection, SelectionContext};
pub use types::{AddOnCategory, Level, PlanTier, Quantity, Sidedness, SUPPORTED_QUANTITIES};

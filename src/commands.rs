//! Subcommand implementations.
//!
//! Each command returns the text to print so the binary stays a thin
//! dispatcher and the behaviour can be tested without a terminal.

use anyhow::{Context, Result};
use std::path::Path;

use crate::catalog::TariffCatalog;
use crate::catalog_file::CatalogFile;
use crate::cli::QuoteArgs;
use crate::engine;
use crate::error::QuoteError;
use crate::report;
use crate::selection::Selection;
use crate::types::{AddOnCategory, Level, PlanTier, Quantity};

/// Load the tariff from `path`, or fall back to the built-in one
pub fn load_catalog(path: Option<&Path>) -> Result<TariffCatalog> {
    match path {
        Some(path) => TariffCatalog::load(path),
        None => TariffCatalog::builtin().context("Built-in tariff is invalid"),
    }
}

/// Build a selection from command-line picks and render it.
///
/// With `--plan` the plan is applied first and any level given alongside it
/// refines the plan; otherwise the selection starts as custom.
pub fn quote(catalog: &TariffCatalog, args: &QuoteArgs) -> Result<String> {
    let mut selection = Selection::new(catalog);

    match &args.plan {
        Some(plan) => {
            let tier: PlanTier = plan
                .parse()
                .map_err(|_| QuoteError::unknown_option("plan", plan.as_str()))?;
            selection.apply_plan(tier)?;
        }
        None => selection.start_custom(),
    }

    let picks = [
        (Level::Method, &args.method),
        (Level::Paper, &args.paper),
        (Level::Side, &args.side),
        (Level::Weight, &args.weight),
    ];
    for (level, key) in picks {
        let Some(key) = key else { continue };
        match level {
            Level::Method => selection.select_method(key)?,
            Level::Paper => selection.select_paper(key)?,
            Level::Side => selection.select_side(key)?,
            Level::Weight => selection.select_weight(key)?,
            Level::AddOns => {}
        }
    }

    let add_ons = [
        (AddOnCategory::Lamination, &args.lamination),
        (AddOnCategory::Foil, &args.foil),
        (AddOnCategory::Corners, &args.corners),
    ];
    for (category, key) in add_ons {
        if let Some(key) = key {
            selection.select_add_on(category, key)?;
        }
    }

    if let Some(requested) = args.quantity {
        let quantity = Quantity::new(requested).map_err(|_| {
            QuoteError::invalid_input(format!(
                "{} is not a supported quantity (nearest: {})",
                requested,
                Quantity::nearest(requested)
            ))
        })?;
        selection.set_quantity(quantity);
    }

    Ok(report::render_selection(&selection))
}

/// Recommend a plan from raw budget and quantity text, then price it
pub fn recommend(catalog: &TariffCatalog, budget: &str, quantity: &str) -> Result<String> {
    let (budget, quantity) = engine::parse_recommendation_input(budget, quantity)?;

    let mut selection = Selection::new(catalog);
    let recommendation = selection.recommend(budget, quantity)?;

    let mut out = report::render_recommendation(&recommendation);
    out.push_str(&report::render_selection(&selection));
    Ok(out)
}

/// Load and fully validate a tariff file
pub fn validate(path: &Path) -> Result<String> {
    let catalog = TariffCatalog::load(path)?;
    Ok(format!(
        "✓ Tariff is valid: {} printing methods, {} weight tiers\n",
        catalog.printing_methods().len(),
        catalog.weight_tier_count()
    ))
}

/// Write the active tariff to `output` as JSON
pub fn export(catalog: &TariffCatalog, output: &Path) -> Result<String> {
    CatalogFile::from_catalog(catalog).save_to_file(output)?;
    Ok(format!("✓ Tariff written to {:?}\n", output))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> TariffCatalog {
        TariffCatalog::builtin().unwrap()
    }

    #[test]
    fn test_quote_plan() {
        let args = QuoteArgs {
            plan: Some("standard".to_string()),
            quantity: Some(1000),
            ..Default::default()
        };
        let text = quote(&catalog(), &args).unwrap();
        // 200gr single-sided supercalendered: 16 per unit in 201..=1000
        assert!(text.contains("Итоговая цена: 16000 тг"));
    }

    #[test]
    fn test_quote_unknown_plan() {
        let args = QuoteArgs {
            plan: Some("deluxe".to_string()),
            ..Default::default()
        };
        let err = quote(&catalog(), &args).unwrap_err();
        assert!(err.to_string().contains("Unknown plan option: deluxe"));
    }

    #[test]
    fn test_quote_unsupported_quantity_suggests_nearest() {
        let args = QuoteArgs {
            plan: Some("economy".to_string()),
            quantity: Some(1234),
            ..Default::default()
        };
        let err = quote(&catalog(), &args).unwrap_err();
        assert!(err.to_string().contains("nearest: 1000"));
    }

    #[test]
    fn test_quote_add_on_before_weight_fails() {
        let args = QuoteArgs {
            method: Some("inkjet_printing".to_string()),
            foil: Some("gold".to_string()),
            ..Default::default()
        };
        assert!(quote(&catalog(), &args).is_err());
    }

    #[test]
    fn test_quote_incomplete_custom_is_not_an_error() {
        let args = QuoteArgs::default();
        let text = quote(&catalog(), &args).unwrap();
        assert!(text.contains("План: Кастом"));
        assert!(text.contains("Выберите способ печати"));
    }

    #[test]
    fn test_recommend_invalid_input() {
        let err = recommend(&catalog(), "-5", "100").unwrap_err();
        assert!(err.to_string().contains("budget must be positive"));
        assert!(recommend(&catalog(), "lots", "100").is_err());
    }

    #[test]
    fn test_recommend_output() {
        let text = recommend(&catalog(), "50000", "2000").unwrap();
        assert!(text.contains("Рекомендуем: Премиум (2000 шт., 25 тг за штуку)"));
        assert!(text.contains("Количество: 2000"));
    }

    #[test]
    fn test_export_then_validate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tariff.json");
        export(&catalog(), &path).unwrap();
        let text = validate(&path).unwrap();
        assert!(text.starts_with("✓ Tariff is valid: 3 printing methods"));
    }
}

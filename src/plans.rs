//! Curated plans
//!
//! Three fixed shortcuts through the catalog, used for quick selection and as
//! the targets of budget-based recommendation. The paths are part of the
//! product, not of the tariff file, so a tariff that lacks one of them is
//! rejected at load time.

use rust_decimal::Decimal;
use strum::IntoEnumIterator;

use crate::catalog::{CatalogPath, Keyed, TariffCatalog};
use crate::error::{QuoteError, Result};
use crate::types::{PlanTier, Quantity};

/// Static definition of a plan path
struct PlanRoute {
    tier: PlanTier,
    method: &'static str,
    paper: &'static str,
    side: &'static str,
    weight: &'static str,
}

const PLAN_ROUTES: [PlanRoute; 3] = [
    PlanRoute {
        tier: PlanTier::Economy,
        method: "inkjet_printing",
        paper: "glossy_paper",
        side: "single_sided",
        weight: "120gr",
    },
    PlanRoute {
        tier: PlanTier::Standard,
        method: "digital_printing",
        paper: "supercalendered",
        side: "single_sided",
        weight: "200gr",
    },
    PlanRoute {
        tier: PlanTier::Premium,
        method: "digital_printing",
        paper: "coated_gloss_satin",
        side: "double_sided",
        weight: "300gr",
    },
];

/// A named preset bound to one path through the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub tier: PlanTier,
    pub path: CatalogPath,
    pub quantity: Quantity,
    /// Labels along the path, for plan cards
    pub labels: [String; 4],
    /// Base unit price of the plan's weight tier
    pub indicative_unit_price: Decimal,
}

impl Plan {
    pub fn name(&self) -> &'static str {
        self.tier.name()
    }

    /// Same plan with a different lot size
    pub fn with_quantity(&self, quantity: Quantity) -> Self {
        Self {
            quantity,
            ..self.clone()
        }
    }
}

/// Resolve every plan route against the catalog, in tier order.
pub(crate) fn bind(catalog: &TariffCatalog) -> Result<Vec<Plan>> {
    let mut plans = Vec::with_capacity(PLAN_ROUTES.len());

    for (route, tier) in PLAN_ROUTES.iter().zip(PlanTier::iter()) {
        debug_assert_eq!(route.tier, tier);
        let path = CatalogPath {
            method: route.method.to_string(),
            paper: route.paper.to_string(),
            side: route.side.to_string(),
            weight: route.weight.to_string(),
        };
        let resolved = catalog.resolve(&path).map_err(|e| {
            QuoteError::config(format!("{} plan ({}) is not in the tariff: {}", tier, path, e))
        })?;

        plans.push(Plan {
            tier,
            labels: [
                resolved.method.label().to_string(),
                resolved.paper.label().to_string(),
                resolved.side.label().to_string(),
                resolved.weight.label().to_string(),
            ],
            indicative_unit_price: resolved.weight.base_price(),
            quantity: Quantity::DEFAULT,
            path,
        });
    }

    for pair in plans.windows(2) {
        if pair[0].indicative_unit_price >= pair[1].indicative_unit_price {
            tracing::warn!(
                "{} plan ({}) is not cheaper per unit than {} plan ({})",
                pair[0].tier,
                pair[0].indicative_unit_price,
                pair[1].tier,
                pair[1].indicative_unit_price
            );
        }
    }

    Ok(plans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_routes_follow_tier_order() {
        let tiers: Vec<_> = PLAN_ROUTES.iter().map(|r| r.tier).collect();
        let expected: Vec<_> = PlanTier::iter().collect();
        assert_eq!(tiers, expected);
    }

    #[test]
    fn test_builtin_plans_bind() {
        let catalog = TariffCatalog::builtin().unwrap();
        let plans = catalog.plans();
        assert_eq!(plans.len(), 3);

        let economy = catalog.plan(PlanTier::Economy);
        assert_eq!(economy.name(), "Эконом");
        assert_eq!(economy.path.method, "inkjet_printing");
        assert_eq!(economy.labels[3], "120гр");
        assert_eq!(economy.quantity, Quantity::DEFAULT);

        let premium = catalog.plan(PlanTier::Premium);
        assert_eq!(premium.path.side, "double_sided");
        assert_eq!(premium.labels[2], "Двусторонняя");
    }

    #[test]
    fn test_builtin_plans_ordered_by_unit_price() {
        let catalog = TariffCatalog::builtin().unwrap();
        let prices: Vec<_> = catalog
            .plans()
            .iter()
            .map(|p| p.indicative_unit_price)
            .collect();
        assert!(prices.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_with_quantity_keeps_path() {
        let catalog = TariffCatalog::builtin().unwrap();
        let standard = catalog.plan(PlanTier::Standard);
        let bigger = standard.with_quantity(Quantity::new(2000).unwrap());
        assert_eq!(bigger.path, standard.path);
        assert_eq!(bigger.quantity.get(), 2000);
    }
}

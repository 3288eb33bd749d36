//! Quote Engine
//!
//! Pure pricing functions over the tariff catalog:
//!
//! - **Unit price**: a four-bracket staircase over quantity, no interpolation
//! - **Total**: base cost plus per-unit add-ons, all scaled by quantity
//! - **Recommendation**: snap a desired quantity to a lot size and bucket the
//!   budget per unit into one of the three curated plans
//!
//! # What This Explicitly Refuses To Do
//!
//! - Optimize over the full catalog: recommendation only picks a curated plan
//! - Price add-ons into a recommendation: plans are quoted bare
//! - Coerce bad input: unparsable or non-positive numbers are rejected

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::catalog::{AddOn, TariffCatalog, WeightTier, BASE_BRACKET_LIMIT};
use crate::error::{QuoteError, Result};
use crate::plans::Plan;
use crate::selection::Selection;
use crate::types::{AddOnCategory, PlanTier, Quantity, Sidedness};

/// Itemised price of a complete selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub quantity: Quantity,
    pub sidedness: Sidedness,
    /// Per-unit price of the weight tier after volume discount
    pub unit_price: Decimal,
    pub base_cost: Decimal,
    pub lamination: Decimal,
    pub foil: Decimal,
    pub corners: Decimal,
    pub total: Decimal,
}

/// Outcome of a budget-based recommendation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    /// Curated plan, with its quantity set to the snapped lot size
    pub plan: Plan,
    /// Budget divided by the snapped quantity
    pub per_unit: Decimal,
}

impl Recommendation {
    #[inline]
    pub fn tier(&self) -> PlanTier {
        self.plan.tier
    }

    #[inline]
    pub fn quantity(&self) -> Quantity {
        self.plan.quantity
    }
}

/// Unit price of a weight tier for a quantity.
///
/// | Quantity          | Unit price      |
/// |-------------------|-----------------|
/// | ≤ 200             | base price      |
/// | 201 ..= 1000      | discount 1      |
/// | 1001 ..= 5000     | discount 2      |
/// | 5001 ..= 10000    | discount 3      |
/// | > 10000           | discount 4      |
///
/// A tier without a discount schedule is always charged its base price.
pub fn resolve_unit_price(tier: &WeightTier, quantity: u32) -> Decimal {
    let Some(schedule) = tier.discounts() else {
        return tier.base_price();
    };
    if quantity <= BASE_BRACKET_LIMIT {
        return tier.base_price();
    }

    schedule
        .brackets()
        .iter()
        .find(|bracket| bracket.up_to.is_none_or(|bound| quantity <= bound))
        .map_or(tier.base_price(), |bracket| bracket.unit_price)
}

/// Price the selection, or `None` while side or weight is still unchosen.
///
/// `None` is the normal "no price yet" state, not an error.
pub fn compute_total(selection: &Selection<'_>) -> Option<Quote> {
    let side = selection.side()?;
    let weight = selection.weight()?;

    let quantity = selection.quantity();
    let units = Decimal::from(quantity.get());
    let sidedness = side.sidedness();

    let unit_price = resolve_unit_price(weight, quantity.get());
    let base_cost = unit_price * units;
    let add_on_cost = |category: AddOnCategory| {
        selection
            .add_on(category)
            .map_or(Decimal::ZERO, |add_on: &AddOn| add_on.price_for(sidedness) * units)
    };
    let lamination = add_on_cost(AddOnCategory::Lamination);
    let foil = add_on_cost(AddOnCategory::Foil);
    let corners = add_on_cost(AddOnCategory::Corners);

    Some(Quote {
        quantity,
        sidedness,
        unit_price,
        base_cost,
        lamination,
        foil,
        corners,
        total: base_cost + lamination + foil + corners,
    })
}

/// Closest supported lot size; the smaller one wins an exact tie.
pub fn snap_to_nearest_quantity(desired: u32) -> Quantity {
    Quantity::nearest(desired)
}

/// Pick one of the curated plans for a budget and desired quantity.
///
/// # Errors
///
/// `InvalidInput` if the budget or quantity is not strictly positive.
pub fn recommend_plan(
    catalog: &TariffCatalog,
    budget: Decimal,
    desired_quantity: u32,
) -> Result<Recommendation> {
    if budget <= Decimal::ZERO {
        return Err(QuoteError::invalid_input(format!(
            "budget must be positive, got {}",
            budget
        )));
    }
    if desired_quantity == 0 {
        return Err(QuoteError::invalid_input("quantity must be positive"));
    }

    let quantity = snap_to_nearest_quantity(desired_quantity);
    let per_unit = budget / Decimal::from(quantity.get());
    let tier = PlanTier::classify(per_unit);

    tracing::debug!(
        "Budget {} for {} cards snaps to {} ({} per unit): {} plan",
        budget,
        desired_quantity,
        quantity,
        per_unit,
        tier
    );

    Ok(Recommendation {
        plan: catalog.plan(tier).with_quantity(quantity),
        per_unit,
    })
}

/// Parse raw budget and quantity text as typed by a user.
///
/// The budget may be fractional; the quantity must be a whole number. Nothing
/// is rounded or truncated: anything else is rejected so the caller can ask
/// again. Positivity is checked by [`recommend_plan`].
pub fn parse_recommendation_input(budget: &str, quantity: &str) -> Result<(Decimal, u32)> {
    let budget = Decimal::from_str(budget.trim())
        .map_err(|_| QuoteError::invalid_input(format!("budget '{}' is not a number", budget)))?;

    let quantity_text = quantity.trim();
    let quantity = match quantity_text.parse::<i64>() {
        Ok(n) if n <= 0 => {
            return Err(QuoteError::invalid_input(format!(
                "quantity must be positive, got {}",
                n
            )));
        }
        Ok(n) => u32::try_from(n).map_err(|_| {
            QuoteError::invalid_input(format!("quantity {} is too large", n))
        })?,
        Err(_) => {
            return Err(QuoteError::invalid_input(format!(
                "quantity '{}' is not a whole number",
                quantity
            )));
        }
    };

    Ok((budget, quantity))
}

//! Selection State
//!
//! The one piece of mutable state in a quoting session: what the user has
//! picked so far, borrowed from an immutable [`TariffCatalog`].
//!
//! # Design Principles
//!
//! - **One transition**: every pick goes through [`Selection::narrow_to`],
//!   which clears all levels below the one being changed
//! - **Validated picks**: unknown keys or picks out of order return errors
//!   and leave the selection untouched
//! - **Level-triggered pricing**: after every change the price is recomputed
//!   if a plan or custom context exists and side and weight are chosen
//!
//! # Reset Cascade
//!
//! ```text
//! method  → clears paper, side, weight, add-ons, price
//! paper   → clears side, weight, add-ons, price
//! side    → clears weight, add-ons, price
//! weight  → clears add-ons, price
//! add-on  → clears price
//! ```

use rust_decimal::Decimal;

use crate::catalog::{
    AddOn, Keyed, PaperType, PrintingMethod, SideVariant, TariffCatalog, WeightTier,
};
use crate::engine::{self, Quote, Recommendation};
use crate::error::{QuoteError, Result};
use crate::types::{AddOnCategory, Level, PlanTier, Quantity};

/// How the current picks came about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionContext {
    /// Started from a curated plan (possibly refined afterwards)
    Plan(PlanTier),
    /// Built level by level
    Custom,
}

/// Transient per-session selection
#[derive(Debug, Clone)]
pub struct Selection<'c> {
    catalog: &'c TariffCatalog,
    context: Option<SelectionContext>,
    method: Option<&'c PrintingMethod>,
    paper: Option<&'c PaperType>,
    side: Option<&'c SideVariant>,
    weight: Option<&'c WeightTier>,
    lamination: Option<&'c AddOn>,
    foil: Option<&'c AddOn>,
    corners: Option<&'c AddOn>,
    quantity: Quantity,
    price: Option<Quote>,
}

impl<'c> Selection<'c> {
    /// Empty selection: no context, nothing picked, default quantity
    pub fn new(catalog: &'c TariffCatalog) -> Self {
        Self {
            catalog,
            context: None,
            method: None,
            paper: None,
            side: None,
            weight: None,
            lamination: None,
            foil: None,
            corners: None,
            quantity: Quantity::DEFAULT,
            price: None,
        }
    }

    pub fn catalog(&self) -> &'c TariffCatalog {
        self.catalog
    }

    #[inline]
    pub fn context(&self) -> Option<SelectionContext> {
        self.context
    }

    #[inline]
    pub fn method(&self) -> Option<&'c PrintingMethod> {
        self.method
    }

    #[inline]
    pub fn paper(&self) -> Option<&'c PaperType> {
        self.paper
    }

    #[inline]
    pub fn side(&self) -> Option<&'c SideVariant> {
        self.side
    }

    #[inline]
    pub fn weight(&self) -> Option<&'c WeightTier> {
        self.weight
    }

    pub fn add_on(&self, category: AddOnCategory) -> Option<&'c AddOn> {
        match category {
            AddOnCategory::Lamination => self.lamination,
            AddOnCategory::Foil => self.foil,
            AddOnCategory::Corners => self.corners,
        }
    }

    #[inline]
    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Last computed price; `None` until the selection is priceable
    #[inline]
    pub fn price(&self) -> Option<&Quote> {
        self.price.as_ref()
    }

    pub fn total(&self) -> Option<Decimal> {
        self.price.map(|quote| quote.total)
    }

    /// The first hierarchy level still waiting for a pick, if any
    pub fn next_level(&self) -> Option<Level> {
        if self.method.is_none() {
            Some(Level::Method)
        } else if self.paper.is_none() {
            Some(Level::Paper)
        } else if self.side.is_none() {
            Some(Level::Side)
        } else if self.weight.is_none() {
            Some(Level::Weight)
        } else {
            None
        }
    }

    /// Clear every pick strictly below `level`, and the price.
    ///
    /// `narrow_to(Level::AddOns)` therefore clears only the price.
    pub fn narrow_to(&mut self, level: Level) {
        if level < Level::Paper {
            self.paper = None;
        }
        if level < Level::Side {
            self.side = None;
        }
        if level < Level::Weight {
            self.weight = None;
        }
        if level < Level::AddOns {
            self.lamination = None;
            self.foil = None;
            self.corners = None;
        }
        self.price = None;
        tracing::trace!("Selection narrowed to {}", level);
    }

    fn not_ready(level: Level) -> QuoteError {
        QuoteError::NotReady {
            level: level.name(),
            // parent() is only None for Method, which is never "not ready"
            missing: level.parent().map_or("", Level::name),
        }
    }

    /// Choose a printing method, invalidating everything below it
    pub fn select_method(&mut self, key: &str) -> Result<()> {
        let method = self
            .catalog
            .printing_method(key)
            .ok_or_else(|| QuoteError::unknown_option(Level::Method.name(), key))?;

        self.narrow_to(Level::Method);
        self.method = Some(method);
        tracing::debug!("Printing method: {}", method.label());
        self.refresh();
        Ok(())
    }

    pub fn select_paper(&mut self, key: &str) -> Result<()> {
        let method = self.method.ok_or_else(|| Self::not_ready(Level::Paper))?;
        let paper = method
            .paper_type(key)
            .ok_or_else(|| QuoteError::unknown_option(Level::Paper.name(), key))?;

        self.narrow_to(Level::Paper);
        self.paper = Some(paper);
        tracing::debug!("Paper type: {}", paper.label());
        self.refresh();
        Ok(())
    }

    pub fn select_side(&mut self, key: &str) -> Result<()> {
        let paper = self.paper.ok_or_else(|| Self::not_ready(Level::Side))?;
        let side = paper
            .side(key)
            .ok_or_else(|| QuoteError::unknown_option(Level::Side.name(), key))?;

        self.narrow_to(Level::Side);
        self.side = Some(side);
        tracing::debug!("Side: {}", side.label());
        self.refresh();
        Ok(())
    }

    pub fn select_weight(&mut self, key: &str) -> Result<()> {
        let side = self.side.ok_or_else(|| Self::not_ready(Level::Weight))?;
        let weight = side
            .weight(key)
            .ok_or_else(|| QuoteError::unknown_option(Level::Weight.name(), key))?;

        self.narrow_to(Level::Weight);
        self.weight = Some(weight);
        tracing::debug!("Weight: {}", weight.label());
        self.refresh();
        Ok(())
    }

    /// Choose an add-on; only offered once a weight is chosen
    pub fn select_add_on(&mut self, category: AddOnCategory, key: &str) -> Result<()> {
        if self.weight.is_none() {
            return Err(Self::not_ready(Level::AddOns));
        }
        let add_on = self
            .catalog
            .add_on(category, key)
            .ok_or_else(|| QuoteError::unknown_option(category_level(category), key))?;

        self.narrow_to(Level::AddOns);
        *self.add_on_slot(category) = Some(add_on);
        tracing::debug!("{}: {}", category.title(), add_on.label());
        self.refresh();
        Ok(())
    }

    pub fn clear_add_on(&mut self, category: AddOnCategory) {
        self.narrow_to(Level::AddOns);
        *self.add_on_slot(category) = None;
        self.refresh();
    }

    pub fn set_quantity(&mut self, quantity: Quantity) {
        self.quantity = quantity;
        self.refresh();
    }

    /// Load a curated plan's path, dropping add-ons and resetting quantity.
    pub fn apply_plan(&mut self, tier: PlanTier) -> Result<()> {
        let plan = self.catalog.plan(tier);
        let resolved = self.catalog.resolve(&plan.path)?;

        self.narrow_to(Level::Method);
        self.context = Some(SelectionContext::Plan(tier));
        self.method = Some(resolved.method);
        self.paper = Some(resolved.paper);
        self.side = Some(resolved.side);
        self.weight = Some(resolved.weight);
        self.quantity = plan.quantity;
        tracing::debug!("Applied {} plan ({})", tier, plan.path);
        self.refresh();
        Ok(())
    }

    /// Switch to building a custom selection from scratch
    pub fn start_custom(&mut self) {
        self.narrow_to(Level::Method);
        self.method = None;
        self.context = Some(SelectionContext::Custom);
        self.quantity = Quantity::DEFAULT;
        tracing::debug!("Started custom selection");
        self.refresh();
    }

    /// Apply the plan recommended for a budget and desired quantity.
    ///
    /// Invalid input is rejected before anything changes.
    pub fn recommend(&mut self, budget: Decimal, desired_quantity: u32) -> Result<Recommendation> {
        let recommendation = engine::recommend_plan(self.catalog, budget, desired_quantity)?;
        self.apply_plan(recommendation.tier())?;
        self.set_quantity(recommendation.quantity());
        Ok(recommendation)
    }

    fn add_on_slot(&mut self, category: AddOnCategory) -> &mut Option<&'c AddOn> {
        match category {
            AddOnCategory::Lamination => &mut self.lamination,
            AddOnCategory::Foil => &mut self.foil,
            AddOnCategory::Corners => &mut self.corners,
        }
    }

    /// Recompute the price when a context exists; otherwise leave it unset
    fn refresh(&mut self) {
        self.price = match self.context {
            Some(_) => engine::compute_total(self),
            None => None,
        };
        if let Some(quote) = &self.price {
            tracing::debug!("Price for {}: {}", quote.quantity, quote.total);
        }
    }
}

fn category_level(category: AddOnCategory) -> &'static str {
    match category {
        AddOnCategory::Lamination => "lamination",
        AddOnCategory::Foil => "foil",
        AddOnCategory::Corners => "corners",
    }
}

//! Tariff Catalog
//!
//! An immutable, fixed-depth tree of priced options:
//!
//! ```text
//! PrintingMethod
//!     ↓
//! PaperType
//!     ↓
//! SideVariant (single- or double-sided)
//!     ↓
//! WeightTier (base price + optional discount schedule)
//! ```
//!
//! plus three flat add-on catalogs (lamination, foil, corner rounding).
//!
//! Every node is built through a validating constructor, so a catalog that
//! exists is internally consistent: keys and labels are unique per level,
//! every node has children, discount brackets follow the fixed staircase,
//! every price can be totalled for the largest order and every curated plan
//! points at a real weight tier. Children keep their insertion
//! order, which is the order they are listed in.

use rust_decimal::Decimal;
use std::collections::HashSet;
use std::fmt;
use strum::IntoEnumIterator;

use crate::error::{QuoteError, Result};
use crate::plans::{self, Plan};
use crate::types::{AddOnCategory, PlanTier, Sidedness, SUPPORTED_QUANTITIES};

/// Quantities up to and including this bound are charged the base price
pub const BASE_BRACKET_LIMIT: u32 = 200;

/// Upper bounds of the first three discount brackets; the fourth is open
pub const DISCOUNT_BOUNDS: [u32; 3] = [1000, 5000, 10000];

/// Number of discount entries a schedule carries beyond the base price
pub const DISCOUNT_BRACKETS: usize = 4;

/// Anything with a stable identifier and a display label
pub trait Keyed {
    fn key(&self) -> &str;
    fn label(&self) -> &str;
}

macro_rules! impl_keyed {
    ($($ty:ty),*) => {
        $(impl Keyed for $ty {
            fn key(&self) -> &str {
                &self.key
            }

            fn label(&self) -> &str {
                &self.label
            }
        })*
    };
}

fn find<'a, T: Keyed>(items: &'a [T], key: &str) -> Option<&'a T> {
    items.iter().find(|item| item.key() == key)
}

/// Reject empty or duplicate keys and labels among siblings.
fn ensure_unique<T: Keyed>(level: &str, items: &[T]) -> Result<()> {
    let mut keys = HashSet::new();
    let mut labels = HashSet::new();
    for item in items {
        if item.key().trim().is_empty() {
            return Err(QuoteError::config(format!("{} with an empty key", level)));
        }
        if !keys.insert(item.key()) {
            return Err(QuoteError::config(format!(
                "duplicate {} key '{}'",
                level,
                item.key()
            )));
        }
        if !labels.insert(item.label()) {
            return Err(QuoteError::config(format!(
                "duplicate {} label '{}'",
                level,
                item.label()
            )));
        }
    }
    Ok(())
}

fn ensure_children<T: Keyed>(
    parent: &str,
    key: &str,
    child_level: &str,
    items: &[T],
) -> Result<()> {
    if items.is_empty() {
        return Err(QuoteError::config(format!(
            "{} '{}' has no {} options",
            parent, key, child_level
        )));
    }
    ensure_unique(child_level, items)
}

/// Lines summed into one total: the print run plus one per add-on category
const PRICED_LINES: u32 = 4;

/// Reject negative prices and prices that cannot be totalled for the
/// largest supported order.
fn ensure_price(what: &str, key: &str, price: Decimal) -> Result<()> {
    if price.is_sign_negative() {
        return Err(QuoteError::config(format!(
            "{} '{}' has a negative price {}",
            what, key, price
        )));
    }

    let largest_order = SUPPORTED_QUANTITIES[SUPPORTED_QUANTITIES.len() - 1];
    if price
        .checked_mul(Decimal::from(largest_order * PRICED_LINES))
        .is_none()
    {
        return Err(QuoteError::config(format!(
            "{} '{}' price {} is too large to total a {}-unit order",
            what, key, price, largest_order
        )));
    }
    Ok(())
}

/// One quantity bracket: `unit_price` applies up to and including `up_to`.
/// `up_to == None` marks the open bracket above the largest threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountBracket {
    pub up_to: Option<u32>,
    pub unit_price: Decimal,
}

fn bound_label(up_to: Option<u32>) -> String {
    up_to.map_or_else(|| "no bound".to_string(), |bound| bound.to_string())
}

/// Volume discounts applied above [`BASE_BRACKET_LIMIT`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscountSchedule {
    brackets: Vec<DiscountBracket>,
}

impl DiscountSchedule {
    /// Build a schedule from explicit brackets.
    ///
    /// Requires exactly [`DISCOUNT_BRACKETS`] entries ending at
    /// [`DISCOUNT_BOUNDS`] in order, with only the last entry open.
    pub fn new(brackets: Vec<DiscountBracket>) -> Result<Self> {
        if brackets.len() != DISCOUNT_BRACKETS {
            return Err(QuoteError::config(format!(
                "discount schedule needs {} entries, found {}",
                DISCOUNT_BRACKETS,
                brackets.len()
            )));
        }

        for (i, bracket) in brackets.iter().enumerate() {
            ensure_price("discount bracket", &(i + 1).to_string(), bracket.unit_price)?;
            let expected = DISCOUNT_BOUNDS.get(i).copied();
            if bracket.up_to != expected {
                return Err(QuoteError::config(format!(
                    "discount bracket {} must end at {}, found {}",
                    i + 1,
                    bound_label(expected),
                    bound_label(bracket.up_to)
                )));
            }
        }

        Ok(Self { brackets })
    }

    /// The shop's standard staircase: 200 < q ≤ 1000, ≤ 5000, ≤ 10000, above.
    pub fn standard(prices: [Decimal; DISCOUNT_BRACKETS]) -> Self {
        let brackets = prices
            .iter()
            .enumerate()
            .map(|(i, &unit_price)| DiscountBracket {
                up_to: DISCOUNT_BOUNDS.get(i).copied(),
                unit_price,
            })
            .collect();
        Self { brackets }
    }

    pub fn brackets(&self) -> &[DiscountBracket] {
        &self.brackets
    }

    /// Discounted prices in bracket order
    pub fn prices(&self) -> impl Iterator<Item = Decimal> + '_ {
        self.brackets.iter().map(|b| b.unit_price)
    }
}

/// A priced leaf: one complete method / paper / side / weight combination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightTier {
    key: String,
    label: String,
    base_price: Decimal,
    discounts: Option<DiscountSchedule>,
}

impl WeightTier {
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        base_price: Decimal,
        discounts: Option<DiscountSchedule>,
    ) -> Result<Self> {
        let key = key.into();
        ensure_price("weight tier", &key, base_price)?;

        if let Some(schedule) = &discounts {
            let mut previous = base_price;
            for price in schedule.prices() {
                ensure_price("weight tier", &key, price)?;
                if price > previous {
                    tracing::warn!(
                        "Weight tier '{}' charges more in a higher bracket ({} > {})",
                        key,
                        price,
                        previous
                    );
                }
                previous = price;
            }
        }

        Ok(Self {
            key,
            label: label.into(),
            base_price,
            discounts,
        })
    }

    #[inline]
    pub fn base_price(&self) -> Decimal {
        self.base_price
    }

    #[inline]
    pub fn discounts(&self) -> Option<&DiscountSchedule> {
        self.discounts.as_ref()
    }
}

/// Single- or double-sided printing on one paper type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideVariant {
    key: String,
    label: String,
    sidedness: Sidedness,
    weights: Vec<WeightTier>,
}

impl SideVariant {
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        sidedness: Sidedness,
        weights: Vec<WeightTier>,
    ) -> Result<Self> {
        let key = key.into();
        ensure_children("side", &key, "weight", &weights)?;
        Ok(Self {
            key,
            label: label.into(),
            sidedness,
            weights,
        })
    }

    #[inline]
    pub fn sidedness(&self) -> Sidedness {
        self.sidedness
    }

    /// Weight tiers in listing order
    pub fn weights(&self) -> &[WeightTier] {
        &self.weights
    }

    pub fn weight(&self, key: &str) -> Option<&WeightTier> {
        find(&self.weights, key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperType {
    key: String,
    label: String,
    sides: Vec<SideVariant>,
}

impl PaperType {
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        sides: Vec<SideVariant>,
    ) -> Result<Self> {
        let key = key.into();
        ensure_children("paper type", &key, "side", &sides)?;
        Ok(Self {
            key,
            label: label.into(),
            sides,
        })
    }

    pub fn sides(&self) -> &[SideVariant] {
        &self.sides
    }

    pub fn side(&self, key: &str) -> Option<&SideVariant> {
        find(&self.sides, key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintingMethod {
    key: String,
    label: String,
    paper_types: Vec<PaperType>,
}

impl PrintingMethod {
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        paper_types: Vec<PaperType>,
    ) -> Result<Self> {
        let key = key.into();
        ensure_children("printing method", &key, "paper type", &paper_types)?;
        Ok(Self {
            key,
            label: label.into(),
            paper_types,
        })
    }

    pub fn paper_types(&self) -> &[PaperType] {
        &self.paper_types
    }

    pub fn paper_type(&self, key: &str) -> Option<&PaperType> {
        find(&self.paper_types, key)
    }
}

/// How an add-on is charged per unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOnPrice {
    /// Depends on whether the card is printed on one or both sides
    BySide { single: Decimal, double: Decimal },
    /// Same charge regardless of sidedness
    Flat(Decimal),
}

impl AddOnPrice {
    pub fn price_for(&self, sidedness: Sidedness) -> Decimal {
        match (self, sidedness) {
            (Self::BySide { single, .. }, Sidedness::SingleSided) => *single,
            (Self::BySide { double, .. }, Sidedness::DoubleSided) => *double,
            (Self::Flat(price), _) => *price,
        }
    }
}

/// An optional per-unit finishing charge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOn {
    key: String,
    label: String,
    price: AddOnPrice,
}

impl AddOn {
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        price: AddOnPrice,
    ) -> Result<Self> {
        let key = key.into();
        match price {
            AddOnPrice::BySide { single, double } => {
                ensure_price("add-on", &key, single)?;
                ensure_price("add-on", &key, double)?;
            }
            AddOnPrice::Flat(flat) => ensure_price("add-on", &key, flat)?,
        }
        Ok(Self {
            key,
            label: label.into(),
            price,
        })
    }

    #[inline]
    pub fn price(&self) -> AddOnPrice {
        self.price
    }

    /// Per-unit charge for the given sidedness
    #[inline]
    pub fn price_for(&self, sidedness: Sidedness) -> Decimal {
        self.price.price_for(sidedness)
    }
}

impl_keyed!(WeightTier, SideVariant, PaperType, PrintingMethod, AddOn);

/// The three add-on catalogs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddOnCatalogs {
    pub lamination: Vec<AddOn>,
    pub foil: Vec<AddOn>,
    pub corners: Vec<AddOn>,
}

impl AddOnCatalogs {
    pub fn get(&self, category: AddOnCategory) -> &[AddOn] {
        match category {
            AddOnCategory::Lamination => &self.lamination,
            AddOnCategory::Foil => &self.foil,
            AddOnCategory::Corners => &self.corners,
        }
    }

    fn validate(&self) -> Result<()> {
        for category in AddOnCategory::iter() {
            let entries = self.get(category);
            ensure_unique(category.title(), entries)?;
            for add_on in entries {
                let flat = matches!(add_on.price(), AddOnPrice::Flat(_));
                let wants_flat = category == AddOnCategory::Corners;
                if flat != wants_flat {
                    return Err(QuoteError::config(format!(
                        "{} add-on '{}' must be priced {}",
                        category,
                        add_on.key(),
                        if wants_flat { "flat" } else { "per side" }
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Keys naming one weight tier through the whole hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogPath {
    pub method: String,
    pub paper: String,
    pub side: String,
    pub weight: String,
}

impl fmt::Display for CatalogPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} / {} / {}",
            self.method, self.paper, self.side, self.weight
        )
    }
}

/// Borrowed nodes along a resolved [`CatalogPath`]
#[derive(Debug, Clone, Copy)]
pub struct ResolvedPath<'c> {
    pub method: &'c PrintingMethod,
    pub paper: &'c PaperType,
    pub side: &'c SideVariant,
    pub weight: &'c WeightTier,
}

/// Read-only tariff, loaded once and never mutated
#[derive(Debug, Clone)]
pub struct TariffCatalog {
    methods: Vec<PrintingMethod>,
    add_ons: AddOnCatalogs,
    plans: Vec<Plan>,
}

impl TariffCatalog {
    /// Validate the tree and bind the curated plans to it
    pub fn new(methods: Vec<PrintingMethod>, add_ons: AddOnCatalogs) -> Result<Self> {
        if methods.is_empty() {
            return Err(QuoteError::config("catalog has no printing methods"));
        }
        ensure_unique("printing method", &methods)?;
        add_ons.validate()?;

        let mut catalog = Self {
            methods,
            add_ons,
            plans: Vec::new(),
        };
        catalog.plans = plans::bind(&catalog)?;

        tracing::debug!(
            "Tariff catalog ready: {} printing methods, {} weight tiers",
            catalog.methods.len(),
            catalog.weight_tier_count()
        );
        Ok(catalog)
    }

    /// Printing methods in listing order
    pub fn printing_methods(&self) -> &[PrintingMethod] {
        &self.methods
    }

    pub fn printing_method(&self, key: &str) -> Option<&PrintingMethod> {
        find(&self.methods, key)
    }

    /// Add-ons of one category; unpriced entries were dropped at load
    pub fn add_ons(&self, category: AddOnCategory) -> &[AddOn] {
        self.add_ons.get(category)
    }

    pub fn add_on(&self, category: AddOnCategory, key: &str) -> Option<&AddOn> {
        find(self.add_ons(category), key)
    }

    pub fn add_on_catalogs(&self) -> &AddOnCatalogs {
        &self.add_ons
    }

    /// The three curated plans, Economy first
    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    pub fn plan(&self, tier: PlanTier) -> &Plan {
        // bind() yields exactly one plan per tier in tier order
        &self.plans[tier as usize]
    }

    /// Walk a full path, naming the first level that does not resolve.
    pub fn resolve(&self, path: &CatalogPath) -> Result<ResolvedPath<'_>> {
        let method = self
            .printing_method(&path.method)
            .ok_or_else(|| QuoteError::unknown_option("printing method", &path.method))?;
        let paper = method
            .paper_type(&path.paper)
            .ok_or_else(|| QuoteError::unknown_option("paper type", &path.paper))?;
        let side = paper
            .side(&path.side)
            .ok_or_else(|| QuoteError::unknown_option("side", &path.side))?;
        let weight = side
            .weight(&path.weight)
            .ok_or_else(|| QuoteError::unknown_option("weight", &path.weight))?;
        Ok(ResolvedPath {
            method,
            paper,
            side,
            weight,
        })
    }

    /// Total number of priced leaves
    pub fn weight_tier_count(&self) -> usize {
        self.methods
            .iter()
            .flat_map(|m| m.paper_types())
            .flat_map(|p| p.sides())
            .map(|s| s.weights().len())
            .sum()
    }
}

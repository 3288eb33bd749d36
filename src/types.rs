//! Type-safe option vocabulary for the quoting engine
//!
//! Sidedness, add-on categories, plan tiers and lot sizes are closed sets, so
//! they are modelled as enums and newtypes instead of loose strings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumIter, EnumString};

use crate::error::{QuoteError, Result};

/// Whether a side variant prints on one or both faces of the card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
pub enum Sidedness {
    #[strum(
        to_string = "Односторонняя",
        serialize = "single-sided",
        serialize = "single_sided"
    )]
    SingleSided,
    #[strum(
        to_string = "Двусторонняя",
        serialize = "double-sided",
        serialize = "double_sided"
    )]
    DoubleSided,
}

impl Sidedness {
    /// Classify a side alias from the tariff.
    ///
    /// An alias outside the two known labels means the tariff is broken, so
    /// this is a configuration error rather than something to guess around.
    pub fn from_alias(alias: &str) -> Result<Self> {
        alias
            .trim()
            .parse()
            .map_err(|_| QuoteError::config(format!("unrecognized side alias '{}'", alias)))
    }
}

/// Finishing add-on catalogs, each priced per unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum AddOnCategory {
    Lamination,
    Foil,
    Corners,
}

impl AddOnCategory {
    /// Human-readable section title
    pub const fn title(self) -> &'static str {
        match self {
            Self::Lamination => "Ламинирование",
            Self::Foil => "Фольгирование",
            Self::Corners => "Скругление углов",
        }
    }
}

/// The three curated presets, ordered by indicative price per unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Economy,
    Standard,
    Premium,
}

impl PlanTier {
    /// Per-unit budget below which Economy is recommended
    pub const STANDARD_FLOOR: Decimal = Decimal::from_parts(10, 0, 0, false, 0);
    /// Per-unit budget from which Premium is recommended
    pub const PREMIUM_FLOOR: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

    /// Display name shown on the plan card
    pub const fn name(self) -> &'static str {
        match self {
            Self::Economy => "Эконом",
            Self::Standard => "Стандарт",
            Self::Premium => "Премиум",
        }
    }

    /// Bucket a per-unit budget: `< 10` Economy, `[10, 20)` Standard, `>= 20` Premium.
    pub fn classify(per_unit: Decimal) -> Self {
        if per_unit < Self::STANDARD_FLOOR {
            Self::Economy
        } else if per_unit < Self::PREMIUM_FLOOR {
            Self::Standard
        } else {
            Self::Premium
        }
    }
}

/// Supported lot sizes in ascending order
pub const SUPPORTED_QUANTITIES: [u32; 20] = [
    50, 100, 200, 300, 400, 500, 1000, 1500, 2000, 2500, 3000, 3500, 4000, 4500, 5000, 6000,
    7000, 8000, 9000, 10000,
];

/// A lot size the print shop actually sells.
///
/// Only values from [`SUPPORTED_QUANTITIES`] can be constructed; arbitrary
/// requests go through [`Quantity::nearest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    /// Initial lot size, also used whenever a plan or custom mode is (re)started
    pub const DEFAULT: Self = Self(SUPPORTED_QUANTITIES[0]);

    /// Accept only a supported lot size
    pub fn new(value: u32) -> Result<Self> {
        if SUPPORTED_QUANTITIES.contains(&value) {
            Ok(Self(value))
        } else {
            Err(QuoteError::invalid_input(format!(
                "{} is not a supported quantity",
                value
            )))
        }
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Snap an arbitrary desired quantity to the closest supported lot size.
    ///
    /// On an exact tie the smaller lot size wins (75 snaps to 50).
    pub fn nearest(desired: u32) -> Self {
        let mut best = SUPPORTED_QUANTITIES[0];
        for &candidate in &SUPPORTED_QUANTITIES[1..] {
            if candidate.abs_diff(desired) < best.abs_diff(desired) {
                best = candidate;
            }
        }
        Self(best)
    }

    /// All supported lot sizes, ascending
    pub fn all() -> impl Iterator<Item = Self> {
        SUPPORTED_QUANTITIES.iter().copied().map(Self)
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuoteError;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Depth in the option hierarchy, top to bottom.
///
/// Choosing a value at one level invalidates everything strictly below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Method,
    Paper,
    Side,
    Weight,
    AddOns,
}

impl Level {
    /// Name used in error messages and logs
    pub const fn name(self) -> &'static str {
        match self {
            Self::Method => "printing method",
            Self::Paper => "paper type",
            Self::Side => "side",
            Self::Weight => "weight",
            Self::AddOns => "add-on",
        }
    }

    /// Accusative form for the "choose a ..." prompt
    pub const fn title(self) -> &'static str {
        match self {
            Self::Method => "способ печати",
            Self::Paper => "тип бумаги",
            Self::Side => "стороны печати",
            Self::Weight => "плотность бумаги",
            Self::AddOns => "дополнительные услуги",
        }
    }

    /// The level that must be chosen before this one
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::Method => None,
            Self::Paper => Some(Self::Method),
            Self::Side => Some(Self::Paper),
            Self::Weight => Some(Self::Side),
            Self::AddOns => Some(Self::Weight),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_sidedness_from_alias() {
        assert_eq!(
            Sidedness::from_alias("Односторонняя").unwrap(),
            Sidedness::SingleSided
        );
        assert_eq!(
            Sidedness::from_alias("Двусторонняя").unwrap(),
            Sidedness::DoubleSided
        );
        assert_eq!(
            Sidedness::from_alias("double-sided").unwrap(),
            Sidedness::DoubleSided
        );
    }

    #[test]
    fn test_sidedness_unknown_alias_is_config_error() {
        let err = Sidedness::from_alias("Трёхсторонняя").unwrap_err();
        assert!(matches!(err, QuoteError::Config(_)));
    }

    #[test]
    fn test_sidedness_display_is_catalog_label() {
        assert_eq!(Sidedness::SingleSided.to_string(), "Односторонняя");
        assert_eq!(Sidedness::DoubleSided.to_string(), "Двусторонняя");
    }

    #[test]
    fn test_plan_tier_parse_case_insensitive() {
        assert_eq!("Premium".parse::<PlanTier>().unwrap(), PlanTier::Premium);
        assert_eq!("economy".parse::<PlanTier>().unwrap(), PlanTier::Economy);
        assert!("deluxe".parse::<PlanTier>().is_err());
    }

    #[test]
    fn test_plan_tier_classify_boundaries() {
        assert_eq!(PlanTier::classify(Decimal::new(999, 2)), PlanTier::Economy);
        assert_eq!(PlanTier::classify(Decimal::from(10)), PlanTier::Standard);
        assert_eq!(PlanTier::classify(Decimal::new(1999, 2)), PlanTier::Standard);
        assert_eq!(PlanTier::classify(Decimal::from(20)), PlanTier::Premium);
    }

    #[test]
    fn test_plan_tiers_are_ordered() {
        let tiers: Vec<_> = PlanTier::iter().collect();
        assert_eq!(
            tiers,
            vec![PlanTier::Economy, PlanTier::Standard, PlanTier::Premium]
        );
        assert!(PlanTier::Economy < PlanTier::Premium);
    }

    #[test]
    fn test_quantity_rejects_unsupported() {
        assert!(Quantity::new(50).is_ok());
        assert!(Quantity::new(75).is_err());
        assert!(Quantity::new(0).is_err());
        assert!(Quantity::new(20000).is_err());
    }

    #[test]
    fn test_quantity_nearest_endpoints() {
        assert_eq!(Quantity::nearest(50).get(), 50);
        assert_eq!(Quantity::nearest(10000).get(), 10000);
        assert_eq!(Quantity::nearest(1).get(), 50);
        assert_eq!(Quantity::nearest(1_000_000).get(), 10000);
    }

    #[test]
    fn test_quantity_nearest_tie_prefers_lower() {
        assert_eq!(Quantity::nearest(75).get(), 50);
        assert_eq!(Quantity::nearest(750).get(), 500);
        assert_eq!(Quantity::nearest(5500).get(), 5000);
        assert_eq!(Quantity::nearest(76).get(), 100);
    }

    #[test]
    fn test_quantity_serde_rejects_unsupported() {
        let ok: Quantity = serde_json::from_str("1500").unwrap();
        assert_eq!(ok.get(), 1500);
        assert!(serde_json::from_str::<Quantity>("1234").is_err());
    }

    #[test]
    fn test_level_parents() {
        assert_eq!(Level::Method.parent(), None);
        assert_eq!(Level::Weight.parent(), Some(Level::Side));
        assert!(Level::Method < Level::AddOns);
    }
}

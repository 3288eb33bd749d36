//! Tariff file handling for loading, validating and exporting catalogs.
//!
//! The on-disk shape is a JSON document of nested arrays. Entries are turned
//! into the typed catalog through its validating constructors, so every rule
//! the catalog enforces also applies to files.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::catalog::{
    AddOn, AddOnCatalogs, AddOnPrice, DiscountSchedule, Keyed, PaperType, PrintingMethod,
    SideVariant, TariffCatalog, WeightTier, DISCOUNT_BRACKETS,
};
use crate::error::QuoteError;
use crate::types::{AddOnCategory, Sidedness};

/// Tariff compiled into the binary
const BUILTIN_TARIFF: &str = include_str!("../data/tariff.json");

/// Prices are written as plain JSON numbers, digits kept exactly
mod price_list {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(transparent)]
    struct Price(#[serde(with = "rust_decimal::serde::arbitrary_precision")] Decimal);

    pub fn serialize<S>(prices: &Option<Vec<Decimal>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        prices
            .as_ref()
            .map(|prices| prices.iter().copied().map(Price).collect::<Vec<_>>())
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<Decimal>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let prices = Option::<Vec<Price>>::deserialize(deserializer)?;
        Ok(prices.map(|prices| prices.into_iter().map(|Price(price)| price).collect()))
    }
}

/// Tariff document as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogFile {
    pub printing_methods: Vec<MethodEntry>,
    #[serde(default)]
    pub add_ons: AddOnEntries,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodEntry {
    pub key: String,
    pub label: String,
    pub paper_types: Vec<PaperEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaperEntry {
    pub key: String,
    pub label: String,
    pub sides: Vec<SideEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SideEntry {
    pub key: String,
    pub label: String,
    /// Sidedness label used to pick add-on prices
    pub alias: String,
    pub weights: Vec<WeightEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeightEntry {
    pub key: String,
    pub label: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub price: Decimal,
    /// Unit prices for 201-1000, 1001-5000, 5001-10000 and above 10000
    #[serde(default, skip_serializing_if = "Option::is_none", with = "price_list")]
    pub discounts: Option<Vec<Decimal>>,
}

/// Add-on catalogs; `null` entries are unpriced and skipped
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddOnEntries {
    #[serde(default)]
    pub lamination: Vec<Option<AddOnEntry>>,
    #[serde(default)]
    pub foil: Vec<Option<AddOnEntry>>,
    #[serde(default)]
    pub corners: Vec<Option<AddOnEntry>>,
}

/// Either `price` alone, or both `single_sided` and `double_sided`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddOnEntry {
    pub key: String,
    pub label: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::arbitrary_precision_option"
    )]
    pub price: Option<Decimal>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::arbitrary_precision_option"
    )]
    pub single_sided: Option<Decimal>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::arbitrary_precision_option"
    )]
    pub double_sided: Option<Decimal>,
}

impl AddOnEntry {
    fn into_add_on(self, category: AddOnCategory) -> crate::error::Result<AddOn> {
        let price = match (self.price, self.single_sided, self.double_sided) {
            (Some(flat), None, None) => AddOnPrice::Flat(flat),
            (None, Some(single), Some(double)) => AddOnPrice::BySide { single, double },
            _ => {
                return Err(QuoteError::config(format!(
                    "{} add-on '{}' needs either 'price' or both 'single_sided' and 'double_sided'",
                    category, self.key
                )));
            }
        };
        AddOn::new(self.key, self.label, price)
    }

    fn from_add_on(add_on: &AddOn) -> Self {
        let (price, single_sided, double_sided) = match add_on.price() {
            AddOnPrice::Flat(flat) => (Some(flat), None, None),
            AddOnPrice::BySide { single, double } => (None, Some(single), Some(double)),
        };
        Self {
            key: add_on.key().to_string(),
            label: add_on.label().to_string(),
            price,
            single_sided,
            double_sided,
        }
    }
}

fn convert_add_ons(
    category: AddOnCategory,
    entries: Vec<Option<AddOnEntry>>,
) -> crate::error::Result<Vec<AddOn>> {
    entries
        .into_iter()
        .flatten()
        .map(|entry| entry.into_add_on(category))
        .collect()
}

fn convert_weight(entry: WeightEntry) -> crate::error::Result<WeightTier> {
    let discounts = match entry.discounts {
        None => None,
        Some(prices) => {
            let prices: [Decimal; DISCOUNT_BRACKETS] =
                prices.as_slice().try_into().map_err(|_| {
                    QuoteError::config(format!(
                        "weight '{}' needs exactly {} discount prices, found {}",
                        entry.key,
                        DISCOUNT_BRACKETS,
                        prices.len()
                    ))
                })?;
            Some(DiscountSchedule::standard(prices))
        }
    };
    WeightTier::new(entry.key, entry.label, entry.price, discounts)
}

fn convert_side(entry: SideEntry) -> crate::error::Result<SideVariant> {
    let sidedness = Sidedness::from_alias(&entry.alias)
        .map_err(|e| QuoteError::config(format!("side '{}': {}", entry.key, e)))?;
    let weights = entry
        .weights
        .into_iter()
        .map(convert_weight)
        .collect::<crate::error::Result<Vec<_>>>()?;
    SideVariant::new(entry.key, entry.label, sidedness, weights)
}

fn convert_paper(entry: PaperEntry) -> crate::error::Result<PaperType> {
    let sides = entry
        .sides
        .into_iter()
        .map(convert_side)
        .collect::<crate::error::Result<Vec<_>>>()?;
    PaperType::new(entry.key, entry.label, sides)
}

fn convert_method(entry: MethodEntry) -> crate::error::Result<PrintingMethod> {
    let paper_types = entry
        .paper_types
        .into_iter()
        .map(convert_paper)
        .collect::<crate::error::Result<Vec<_>>>()?;
    PrintingMethod::new(entry.key, entry.label, paper_types)
}

impl CatalogFile {
    /// Parse a tariff document without validating it
    pub fn from_json_str(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a tariff document from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read tariff from {:?}", path.as_ref()))?;

        let file: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse tariff JSON in {:?}", path.as_ref()))?;

        Ok(file)
    }

    /// Save the tariff document to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize tariff to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write tariff to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Validate and build the typed catalog
    pub fn into_catalog(self) -> crate::error::Result<TariffCatalog> {
        let methods = self
            .printing_methods
            .into_iter()
            .map(convert_method)
            .collect::<crate::error::Result<Vec<_>>>()?;

        let add_ons = AddOnCatalogs {
            lamination: convert_add_ons(AddOnCategory::Lamination, self.add_ons.lamination)?,
            foil: convert_add_ons(AddOnCategory::Foil, self.add_ons.foil)?,
            corners: convert_add_ons(AddOnCategory::Corners, self.add_ons.corners)?,
        };

        TariffCatalog::new(methods, add_ons)
    }

    /// Describe an existing catalog in file form
    pub fn from_catalog(catalog: &TariffCatalog) -> Self {
        let printing_methods = catalog
            .printing_methods()
            .iter()
            .map(|method| MethodEntry {
                key: method.key().to_string(),
                label: method.label().to_string(),
                paper_types: method
                    .paper_types()
                    .iter()
                    .map(|paper| PaperEntry {
                        key: paper.key().to_string(),
                        label: paper.label().to_string(),
                        sides: paper
                            .sides()
                            .iter()
                            .map(|side| SideEntry {
                                key: side.key().to_string(),
                                label: side.label().to_string(),
                                alias: side.sidedness().to_string(),
                                weights: side
                                    .weights()
                                    .iter()
                                    .map(|weight| WeightEntry {
                                        key: weight.key().to_string(),
                                        label: weight.label().to_string(),
                                        price: weight.base_price(),
                                        discounts: weight
                                            .discounts()
                                            .map(|s| s.prices().collect()),
                                    })
                                    .collect(),
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        let entries = |category: AddOnCategory| -> Vec<Option<AddOnEntry>> {
            catalog
                .add_ons(category)
                .iter()
                .map(|a| Some(AddOnEntry::from_add_on(a)))
                .collect()
        };

        Self {
            printing_methods,
            add_ons: AddOnEntries {
                lamination: entries(AddOnCategory::Lamination),
                foil: entries(AddOnCategory::Foil),
                corners: entries(AddOnCategory::Corners),
            },
        }
    }
}

impl TariffCatalog {
    /// The tariff shipped with the crate
    pub fn builtin() -> crate::error::Result<Self> {
        CatalogFile::from_json_str(BUILTIN_TARIFF)?.into_catalog()
    }

    /// Load and validate a tariff file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let catalog = CatalogFile::load_from_file(&path)?
            .into_catalog()
            .with_context(|| format!("Invalid tariff in {:?}", path.as_ref()))?;
        tracing::info!("Loaded tariff from {:?}", path.as_ref());
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn minimal_json() -> serde_json::Value {
        let side = |key: &str, alias: &str, weight: &str| {
            serde_json::json!({
                "key": key,
                "label": alias,
                "alias": alias,
                "weights": [
                    { "key": weight, "label": weight, "price": 10, "discounts": [9, 8, 7, 6] }
                ]
            })
        };
        serde_json::json!({
            "printing_methods": [
                {
                    "key": "inkjet_printing",
                    "label": "Струйная",
                    "paper_types": [
                        { "key": "glossy_paper", "label": "Глянцевая",
                          "sides": [side("single_sided", "Односторонняя", "120gr")] }
                    ]
                },
                {
                    "key": "digital_printing",
                    "label": "Цифровая",
                    "paper_types": [
                        { "key": "supercalendered", "label": "Суперкаландрированная",
                          "sides": [side("single_sided", "Односторонняя", "200gr")] },
                        { "key": "coated_gloss_satin", "label": "Мелованная",
                          "sides": [side("double_sided", "Двусторонняя", "300gr")] }
                    ]
                }
            ],
            "add_ons": {
                "lamination": [
                    { "key": "glossy", "label": "Глянцевая", "single_sided": 5, "double_sided": 9 },
                    null
                ],
                "corners": [ { "key": "rounded", "label": "Скругление", "price": 2 } ]
            }
        })
    }

    fn load_value(value: serde_json::Value) -> crate::error::Result<TariffCatalog> {
        CatalogFile::from_json_str(&value.to_string())?.into_catalog()
    }

    #[test]
    fn test_builtin_tariff_loads() {
        let catalog = TariffCatalog::builtin().unwrap();
        assert_eq!(catalog.printing_methods().len(), 3);
        assert_eq!(catalog.printing_methods()[0].key(), "digital_printing");
        assert!(catalog.weight_tier_count() > 10);
    }

    #[test]
    fn test_builtin_null_add_on_is_omitted() {
        let catalog = TariffCatalog::builtin().unwrap();
        let lamination: Vec<_> = catalog
            .add_ons(AddOnCategory::Lamination)
            .iter()
            .map(|a| a.key())
            .collect();
        assert_eq!(lamination, vec!["none", "glossy", "matte"]);
    }

    #[test]
    fn test_minimal_tariff_loads() {
        let catalog = load_value(minimal_json()).unwrap();
        assert_eq!(catalog.add_ons(AddOnCategory::Lamination).len(), 1);
        assert!(catalog.add_ons(AddOnCategory::Foil).is_empty());
        assert_eq!(
            catalog.add_on(AddOnCategory::Corners, "rounded").unwrap().price(),
            AddOnPrice::Flat(Decimal::from(2))
        );
    }

    #[test]
    fn test_unknown_side_alias_rejected() {
        let mut value = minimal_json();
        value["printing_methods"][0]["paper_types"][0]["sides"][0]["alias"] =
            serde_json::json!("Трёхсторонняя");
        let err = load_value(value).unwrap_err();
        assert!(matches!(err, QuoteError::Config(_)));
        assert!(err.to_string().contains("Трёхсторонняя"));
    }

    #[test]
    fn test_half_priced_add_on_rejected() {
        let mut value = minimal_json();
        value["add_ons"]["foil"] =
            serde_json::json!([{ "key": "gold", "label": "Золото", "single_sided": 8 }]);
        let err = load_value(value).unwrap_err();
        assert!(err.to_string().contains("gold"));
    }

    #[test]
    fn test_wrong_discount_count_rejected() {
        let mut value = minimal_json();
        value["printing_methods"][0]["paper_types"][0]["sides"][0]["weights"][0]["discounts"] =
            serde_json::json!([9, 8, 7]);
        let err = load_value(value).unwrap_err();
        assert!(err.to_string().contains("exactly 4 discount prices"));
    }

    #[test]
    fn test_missing_plan_path_rejected() {
        let mut value = minimal_json();
        value["printing_methods"][0]["paper_types"][0]["sides"][0]["weights"][0]["key"] =
            serde_json::json!("130gr");
        let err = load_value(value).unwrap_err();
        assert!(err.to_string().contains("economy plan"));
    }

    #[test]
    fn test_price_too_large_to_total_rejected() {
        let mut value = minimal_json();
        value["printing_methods"][1]["paper_types"][0]["sides"][0]["weights"][0]["price"] =
            serde_json::json!("70000000000000000000000000000");
        let err = load_value(value).unwrap_err();
        assert!(matches!(err, QuoteError::Config(_)));
        assert!(err.to_string().contains("200gr"));
    }

    #[test]
    fn test_discount_too_large_to_total_rejected() {
        let mut value = minimal_json();
        value["printing_methods"][0]["paper_types"][0]["sides"][0]["weights"][0]["discounts"] =
            serde_json::json!([9, 8, 7, "70000000000000000000000000000"]);
        let err = load_value(value).unwrap_err();
        assert!(err.to_string().contains("too large to total"));
    }

    #[test]
    fn test_add_on_price_too_large_to_total_rejected() {
        let mut value = minimal_json();
        value["add_ons"]["corners"][0]["price"] =
            serde_json::json!("70000000000000000000000000000");
        let err = load_value(value).unwrap_err();
        assert!(matches!(err, QuoteError::Config(_)));
        assert!(err.to_string().contains("rounded"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut value = minimal_json();
        value["printing_methods"][0]["colour"] = serde_json::json!("cmyk");
        assert!(matches!(load_value(value), Err(QuoteError::Json(_))));
    }

    #[test]
    fn test_fractional_prices_are_exact() {
        let catalog = TariffCatalog::builtin().unwrap();
        let side = catalog
            .printing_method("offset_printing")
            .and_then(|m| m.paper_type("coated_matte"))
            .and_then(|p| p.side("single_sided"))
            .unwrap();
        let prices: Vec<_> = side.weights()[0].discounts().unwrap().prices().collect();
        assert_eq!(prices[0], Decimal::new(75, 1));
        assert_eq!(prices[3], Decimal::new(38, 1));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = TariffCatalog::load(Path::new("/nonexistent/tariff.json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_invalid_json() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"{ invalid json }").unwrap();
        temp_file.flush().unwrap();

        assert!(CatalogFile::load_from_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_export_and_reload_builtin() {
        let catalog = TariffCatalog::builtin().unwrap();
        let temp_file = NamedTempFile::new().unwrap();

        CatalogFile::from_catalog(&catalog)
            .save_to_file(temp_file.path())
            .unwrap();
        let reloaded = TariffCatalog::load(temp_file.path()).unwrap();

        assert_eq!(reloaded.printing_methods(), catalog.printing_methods());
        assert_eq!(reloaded.add_on_catalogs(), catalog.add_on_catalogs());
        assert_eq!(reloaded.plans(), catalog.plans());
    }

    #[test]
    fn test_export_writes_prices_as_numbers() {
        let catalog = TariffCatalog::builtin().unwrap();
        let temp_file = NamedTempFile::new().unwrap();
        CatalogFile::from_catalog(&catalog)
            .save_to_file(temp_file.path())
            .unwrap();

        let text = std::fs::read_to_string(temp_file.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let weights: Vec<&serde_json::Value> = value["printing_methods"]
            .as_array()
            .unwrap()
            .iter()
            .flat_map(|m| m["paper_types"].as_array().unwrap())
            .flat_map(|p| p["sides"].as_array().unwrap())
            .flat_map(|s| s["weights"].as_array().unwrap())
            .collect();
        assert!(!weights.is_empty());
        for weight in weights {
            assert!(weight["price"].is_number(), "{}", weight);
            if let Some(discounts) = weight["discounts"].as_array() {
                assert!(discounts.iter().all(serde_json::Value::is_number));
            }
        }
        for add_on in value["add_ons"]["foil"].as_array().unwrap() {
            assert!(add_on["single_sided"].is_number());
            assert!(add_on["double_sided"].is_number());
        }
        assert!(text.contains("7.5"));
        assert!(!text.contains("\"7.5\""));
    }
}

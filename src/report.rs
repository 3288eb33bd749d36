//! Plain-text rendering of catalogs, plans and quotes for the terminal.

use rust_decimal::Decimal;
use std::fmt::Write;
use strum::IntoEnumIterator;

use crate::catalog::{AddOnPrice, Keyed, TariffCatalog};
use crate::engine::Recommendation;
use crate::selection::{Selection, SelectionContext};
use crate::types::{AddOnCategory, Level, Quantity};

/// Currency suffix used on every printed price
pub const CURRENCY: &str = "тг";

pub fn format_price(amount: Decimal) -> String {
    format!("{} {}", amount.normalize(), CURRENCY)
}

/// The full option tree followed by the add-on catalogs
pub fn render_catalog(catalog: &TariffCatalog) -> String {
    let mut out = String::new();

    for method in catalog.printing_methods() {
        let _ = writeln!(out, "{} [{}]", method.label(), method.key());
        for paper in method.paper_types() {
            let _ = writeln!(out, "  {} [{}]", paper.label(), paper.key());
            for side in paper.sides() {
                let _ = writeln!(out, "    {} [{}]", side.label(), side.key());
                for weight in side.weights() {
                    let _ = write!(
                        out,
                        "      {} [{}]: {}",
                        weight.label(),
                        weight.key(),
                        format_price(weight.base_price())
                    );
                    if let Some(schedule) = weight.discounts() {
                        let prices: Vec<String> =
                            schedule.prices().map(|p| p.normalize().to_string()).collect();
                        let _ = write!(out, " (discounts {})", prices.join(" / "));
                    }
                    out.push('\n');
                }
            }
        }
    }

    for category in AddOnCategory::iter() {
        let _ = writeln!(out, "{} [{}]", category.title(), category);
        for add_on in catalog.add_ons(category) {
            let price = match add_on.price() {
                AddOnPrice::Flat(flat) => format_price(flat),
                AddOnPrice::BySide { single, double } => {
                    format!("{} / {}", format_price(single), format_price(double))
                }
            };
            let _ = writeln!(out, "  {} [{}]: {}", add_on.label(), add_on.key(), price);
        }
    }

    out
}

/// One card per curated plan
pub fn render_plans(catalog: &TariffCatalog) -> String {
    let mut out = String::new();
    for plan in catalog.plans() {
        let _ = writeln!(out, "{} [{}]", plan.name(), plan.tier);
        let _ = writeln!(out, "  Тип печати: {}", plan.labels[0]);
        let _ = writeln!(out, "  Тип бумаги: {}", plan.labels[1]);
        let _ = writeln!(out, "  Стороны: {}", plan.labels[2]);
        let _ = writeln!(out, "  Граммовка: {}", plan.labels[3]);
        let _ = writeln!(
            out,
            "  От {} за штуку",
            format_price(plan.indicative_unit_price)
        );
    }
    out
}

pub fn render_quantities() -> String {
    let values: Vec<String> = Quantity::all().map(|q| q.to_string()).collect();
    values.join(" ")
}

/// Summary of the picks plus either the itemised price or what is missing
pub fn render_selection(selection: &Selection<'_>) -> String {
    let mut out = String::new();

    match selection.context() {
        Some(SelectionContext::Plan(tier)) => {
            let _ = writeln!(out, "План: {}", tier.name());
        }
        Some(SelectionContext::Custom) => {
            let _ = writeln!(out, "План: Кастом");
        }
        None => {}
    }

    let picks = [
        ("Тип печати", selection.method().map(|m| m.label())),
        ("Тип бумаги", selection.paper().map(|p| p.label())),
        ("Стороны", selection.side().map(|s| s.label())),
        ("Граммовка", selection.weight().map(|w| w.label())),
    ];
    for (title, label) in picks.iter() {
        if let Some(label) = label {
            let _ = writeln!(out, "{}: {}", title, label);
        }
    }
    for category in AddOnCategory::iter() {
        if let Some(add_on) = selection.add_on(category) {
            let _ = writeln!(out, "{}: {}", category.title(), add_on.label());
        }
    }
    let _ = writeln!(out, "Количество: {}", selection.quantity());

    match selection.price() {
        Some(quote) => {
            let _ = writeln!(
                out,
                "Цена за штуку: {}",
                format_price(quote.unit_price)
            );
            let _ = writeln!(out, "Печать: {}", format_price(quote.base_cost));
            for (category, cost) in [
                (AddOnCategory::Lamination, quote.lamination),
                (AddOnCategory::Foil, quote.foil),
                (AddOnCategory::Corners, quote.corners),
            ] {
                if selection.add_on(category).is_some() {
                    let _ = writeln!(out, "{}: {}", category.title(), format_price(cost));
                }
            }
            let _ = writeln!(out, "Итоговая цена: {}", format_price(quote.total));
        }
        None => {
            let _ = writeln!(out, "Итоговая цена: —");
            if let Some(level) = selection.next_level() {
                let options = options_for(selection, level);
                let _ = writeln!(out, "Выберите {}: {}", level.title(), options.join(", "));
            }
        }
    }

    out
}

/// Keys available at `level` under the current picks
pub fn options_for(selection: &Selection<'_>, level: Level) -> Vec<String> {
    match level {
        Level::Method => keys_of(selection.catalog().printing_methods()),
        Level::Paper => selection.method().map_or_else(Vec::new, |m| keys_of(m.paper_types())),
        Level::Side => selection.paper().map_or_else(Vec::new, |p| keys_of(p.sides())),
        Level::Weight => selection.side().map_or_else(Vec::new, |s| keys_of(s.weights())),
        Level::AddOns => Vec::new(),
    }
}

fn keys_of<T: Keyed>(items: &[T]) -> Vec<String> {
    items.iter().map(|item| item.key().to_string()).collect()
}

pub fn render_recommendation(recommendation: &Recommendation) -> String {
    format!(
        "Рекомендуем: {} ({} шт., {} за штуку)\n",
        recommendation.plan.name(),
        recommendation.quantity(),
        format_price(recommendation.per_unit.round_dp(2))
    )
}

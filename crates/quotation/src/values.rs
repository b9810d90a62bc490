//! Control values for one quotation
//!
//! [`QuotationValues`] resolves control names through a [`ControlMap`] and
//! renders the bound request data as text.
//!
//! Column controls outside a repeating row depend on where they appear. The
//! standard template has one cost table per section, each holding a single
//! row of `Module`/`Aantal` controls, so the first occurrence of such a
//! control shows the one-time lines and the second the recurring lines,
//! one line per item.

use crate::bindings::{Binding, Column, ControlMap, Formula};
use crate::model::{CostItem, CostSection, QuotationRequest};
use crate::totals::{format_amount, format_euro, format_quantity, Totals};
use docx_template::FillSource;

/// Shown by a list control when its section has no items
pub const EMPTY_LIST_TEXT: &str = "Geen items";

pub struct QuotationValues<'a> {
    request: &'a QuotationRequest,
    controls: &'a ControlMap,
    totals: Totals,
    date: String,
}

impl<'a> QuotationValues<'a> {
    /// `date` is the already formatted current date, captured once so every
    /// date control shows the same value
    pub fn new(
        request: &'a QuotationRequest,
        controls: &'a ControlMap,
        totals: Totals,
        date: impl Into<String>,
    ) -> Self {
        Self {
            request,
            controls,
            totals,
            date: date.into(),
        }
    }

    fn render(&self, binding: &Binding, occurrence: usize) -> String {
        match binding {
            Binding::Field { value } => value.get(self.request).to_string(),
            Binding::Calculated { formula } => self.calculated(*formula),
            Binding::List { value } => bullet_list(value.items(self.request)),
            Binding::Column { column, section } => {
                let section = section.or(match occurrence {
                    1 => Some(CostSection::OneTime),
                    2 => Some(CostSection::Recurring),
                    _ => None,
                });
                match section {
                    Some(section) => column_lines(section.items(self.request), *column),
                    None => String::new(),
                }
            }
            Binding::Literal { value } => value.clone(),
        }
    }

    fn calculated(&self, formula: Formula) -> String {
        match formula {
            Formula::CurrentDate => self.date.clone(),
            Formula::SumOneTimeCosts => format_amount(self.totals.one_time),
            Formula::SumRecurringCosts => format_amount(self.totals.recurring),
            Formula::TotalExclVat => format_amount(self.totals.total_excl_vat),
            Formula::Vat => format_amount(self.totals.vat),
            Formula::GrandTotal => format_amount(self.totals.grand_total),
        }
    }
}

impl FillSource for QuotationValues<'_> {
    fn value(&self, name: &str, occurrence: usize) -> Option<String> {
        let binding = self.controls.lookup(name)?;
        Some(self.render(binding, occurrence))
    }

    fn section_len(&self, name: &str) -> Option<usize> {
        let section = self.controls.section(name)?;
        Some(section.items(self.request).len())
    }

    fn row_value(&self, section: &str, row: usize, name: &str) -> Option<String> {
        let section = self.controls.section(section)?;
        let item = section.items(self.request).get(row)?;
        match self.controls.lookup(name)? {
            Binding::Column { column, .. } => Some(column_value(item, *column)),
            // a scalar control copied along with the row
            other => Some(self.render(other, 1)),
        }
    }
}

/// One column of one item
pub fn column_value(item: &CostItem, column: Column) -> String {
    match column {
        Column::Material => item.material.clone(),
        Column::Quantity => format_quantity(item.quantity),
        Column::UnitPrice => format_euro(item.unit_price),
        Column::LineTotal => format_euro(item.computed_total()),
    }
}

/// One column of every item, one per line
///
/// Empty text columns are skipped. Price columns of an empty list show
/// `€0.00`.
pub fn column_lines(items: &[CostItem], column: Column) -> String {
    match column {
        Column::Material | Column::Quantity => items
            .iter()
            .map(|item| column_value(item, column))
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        Column::UnitPrice | Column::LineTotal if items.is_empty() => format_euro(0.0),
        Column::UnitPrice | Column::LineTotal => items
            .iter()
            .map(|item| column_value(item, column))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// `• Setup - Aantal: 1 x €500.00 = €500.00`, one line per item
pub fn bullet_list(items: &[CostItem]) -> String {
    if items.is_empty() {
        return EMPTY_LIST_TEXT.to_string();
    }
    items
        .iter()
        .map(|item| {
            format!(
                "• {} - Aantal: {} x {} = {}",
                item.material,
                format_quantity(item.quantity),
                format_euro(item.unit_price),
                format_euro(item.line_total())
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

//! Totals, VAT and number formatting

use crate::model::{CostSection, QuotationRequest};
use serde::Serialize;

/// Dutch standard VAT rate
pub const DEFAULT_VAT_RATE: f64 = 0.21;

/// Calculated totals of a quotation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub one_time: f64,
    pub recurring: f64,
    pub total_excl_vat: f64,
    pub vat: f64,
    pub grand_total: f64,
}

impl Totals {
    pub fn calculate(request: &QuotationRequest, vat_rate: f64) -> Self {
        let one_time = section_total(request, CostSection::OneTime);
        let recurring = section_total(request, CostSection::Recurring);
        let total_excl_vat = one_time + recurring;
        let vat = total_excl_vat * vat_rate;

        Self {
            one_time,
            recurring,
            total_excl_vat,
            vat,
            grand_total: total_excl_vat + vat,
        }
    }

    /// Total of one section
    pub fn section(&self, section: CostSection) -> f64 {
        match section {
            CostSection::OneTime => self.one_time,
            CostSection::Recurring => self.recurring,
        }
    }
}

/// Sum of line totals in a section
pub fn section_total(request: &QuotationRequest, section: CostSection) -> f64 {
    section.items(request).iter().map(|item| item.line_total()).sum()
}

/// Two decimals, no currency symbol: `1234.50`
pub fn format_amount(value: f64) -> String {
    // avoid printing -0.00
    let value = if value.abs() < 0.005 { 0.0 } else { value };
    format!("{:.2}", value)
}

/// Euro amount: `€1234.50`
pub fn format_euro(value: f64) -> String {
    format!("€{}", format_amount(value))
}

/// Quantities print as integers when they are whole
pub fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 && quantity.abs() < 1e15 {
        format!("{}", quantity as i64)
    } else {
        format!("{}", quantity)
    }
}

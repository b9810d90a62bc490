//! Quotation request model
//!
//! The JSON body posted by the web form: customer details plus two lists of
//! cost lines. Every field is optional on the wire and defaults to empty.

use crate::error::{QuotationError, Result};
use serde::{Deserialize, Serialize};

/// A quotation to generate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuotationRequest {
    pub company_name: String,
    pub contact_name: String,
    pub address: String,
    pub postal_code: String,
    pub city: String,
    /// VAT or chamber of commerce number
    pub company_id: String,
    pub description: String,
    pub one_time_costs: Vec<CostItem>,
    pub recurring_costs: Vec<CostItem>,
}

/// One cost line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CostItem {
    pub material: String,
    pub quantity: f64,
    pub unit_price: f64,
    /// Line total as entered by the client, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
}

impl CostItem {
    pub fn new(material: impl Into<String>, quantity: f64, unit_price: f64) -> Self {
        Self {
            material: material.into(),
            quantity,
            unit_price,
            total: None,
        }
    }

    /// Builder: set the client-supplied total
    pub fn with_total(mut self, total: f64) -> Self {
        self.total = Some(total);
        self
    }

    /// Quantity times unit price
    pub fn computed_total(&self) -> f64 {
        self.quantity * self.unit_price
    }

    /// The supplied total, falling back to quantity times unit price
    pub fn line_total(&self) -> f64 {
        self.total.unwrap_or_else(|| self.computed_total())
    }
}

/// The two cost lists of a quotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CostSection {
    #[serde(rename = "oneTimeCosts")]
    OneTime,
    #[serde(rename = "recurringCosts")]
    Recurring,
}

impl CostSection {
    pub const ALL: [CostSection; 2] = [CostSection::OneTime, CostSection::Recurring];

    /// The items of this section in `request`
    pub fn items(self, request: &QuotationRequest) -> &[CostItem] {
        match self {
            CostSection::OneTime => &request.one_time_costs,
            CostSection::Recurring => &request.recurring_costs,
        }
    }

    /// JSON field name of the list
    pub fn field_name(self) -> &'static str {
        match self {
            CostSection::OneTime => "oneTimeCosts",
            CostSection::Recurring => "recurringCosts",
        }
    }

    /// Dutch label used in totals rows
    pub fn label(self) -> &'static str {
        match self {
            CostSection::OneTime => "EENMALIG",
            CostSection::Recurring => "JAARLIJKS",
        }
    }
}

impl QuotationRequest {
    /// Check that every amount is a finite, non-negative number
    pub fn validate(&self) -> Result<()> {
        for section in CostSection::ALL {
            for (i, item) in section.items(self).iter().enumerate() {
                let amounts = [
                    ("quantity", Some(item.quantity)),
                    ("unitPrice", Some(item.unit_price)),
                    ("total", item.total),
                ];
                for (field, value) in amounts {
                    if let Some(value) = value {
                        if !value.is_finite() || value < 0.0 {
                            return Err(QuotationError::InvalidData(format!(
                                "{}[{}].{} must be a non-negative number, got {}",
                                section.field_name(),
                                i,
                                field,
                                value
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Whether there is anything to put in the cost summary
    pub fn has_costs(&self) -> bool {
        !self.one_time_costs.is_empty() || !self.recurring_costs.is_empty()
    }
}

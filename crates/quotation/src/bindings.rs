//! Control bindings
//!
//! A [`ControlMap`] says where each named content control of the template
//! gets its value from. The built-in map matches the standard quotation
//! template; a JSON file of the form `{"controls": {"name": {"type": ...}}}`
//! can replace it.

use crate::error::Result;
use crate::model::{CostSection, QuotationRequest};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Where a control's value comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Binding {
    /// A text field of the request
    #[serde(alias = "input")]
    Field { value: RequestField },
    /// A calculated value
    Calculated {
        #[serde(alias = "value")]
        formula: Formula,
    },
    /// A cost list: drives row cloning on a repeating section, renders as
    /// a bullet list on a plain control
    List { value: CostSection },
    /// One column of the cost lines
    Column {
        column: Column,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        section: Option<CostSection>,
    },
    /// Fixed text
    Literal { value: String },
}

impl Binding {
    pub fn field(value: RequestField) -> Self {
        Binding::Field { value }
    }

    pub fn calculated(formula: Formula) -> Self {
        Binding::Calculated { formula }
    }

    pub fn list(section: CostSection) -> Self {
        Binding::List { value: section }
    }

    pub fn column(column: Column, section: Option<CostSection>) -> Self {
        Binding::Column { column, section }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Binding::Literal {
            value: value.into(),
        }
    }
}

/// Text fields of a [`QuotationRequest`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestField {
    CompanyName,
    ContactName,
    Address,
    PostalCode,
    City,
    CompanyId,
    Description,
}

impl RequestField {
    pub fn get(self, request: &QuotationRequest) -> &str {
        match self {
            RequestField::CompanyName => &request.company_name,
            RequestField::ContactName => &request.contact_name,
            RequestField::Address => &request.address,
            RequestField::PostalCode => &request.postal_code,
            RequestField::City => &request.city,
            RequestField::CompanyId => &request.company_id,
            RequestField::Description => &request.description,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Formula {
    CurrentDate,
    SumOneTimeCosts,
    SumRecurringCosts,
    #[serde(alias = "recurringandonetimewithoutVAT")]
    TotalExclVat,
    #[serde(alias = "VAT")]
    Vat,
    #[serde(alias = "grandtotal")]
    GrandTotal,
}

/// Per-line values of a cost item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Material,
    Quantity,
    UnitPrice,
    /// Quantity times unit price
    LineTotal,
}

/// Control name to binding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlMap {
    controls: BTreeMap<String, Binding>,
}

impl ControlMap {
    /// A map with no bindings
    pub fn empty() -> Self {
        Self {
            controls: BTreeMap::new(),
        }
    }

    /// Load a map from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON in the file format
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builder: add or replace a binding
    pub fn with(mut self, name: impl Into<String>, binding: Binding) -> Self {
        self.insert(name, binding);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, binding: Binding) {
        self.controls.insert(name.into(), binding);
    }

    /// Look up a control: exact name first, then case-insensitive
    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        if let Some(binding) = self.controls.get(name) {
            return Some(binding);
        }
        let lower = name.to_lowercase();
        self.controls
            .iter()
            .find(|(key, _)| key.to_lowercase() == lower)
            .map(|(_, binding)| binding)
    }

    /// The cost section a control name is bound to with a `list` binding
    pub fn section(&self, name: &str) -> Option<CostSection> {
        match self.lookup(name)? {
            Binding::List { value } => Some(*value),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }
}

impl Default for ControlMap {
    /// Bindings for the standard Compufit quotation template
    fn default() -> Self {
        use RequestField::*;

        let fields = [
            ("praktijknaam", CompanyName),
            ("praktijk", CompanyName),
            ("bedrijf", CompanyName),
            ("companyName", CompanyName),
            ("naam", ContactName),
            ("contactName", ContactName),
            ("straat", Address),
            ("adres", Address),
            ("address", Address),
            ("postcode", PostalCode),
            ("postalCode", PostalCode),
            ("stad", City),
            ("city", City),
            ("btw", CompanyId),
            ("companyId", CompanyId),
            ("beschrijving", Description),
            ("description", Description),
        ];
        let formulas = [
            ("date", Formula::CurrentDate),
            ("datum", Formula::CurrentDate),
            ("totaaleenmalig", Formula::SumOneTimeCosts),
            ("totaaljaarlijks", Formula::SumRecurringCosts),
            ("total", Formula::TotalExclVat),
            ("vat", Formula::Vat),
            ("grandtotal", Formula::GrandTotal),
        ];

        let mut map = ControlMap::empty();
        for (name, field) in fields {
            map.insert(name, Binding::field(field));
        }
        for (name, formula) in formulas {
            map.insert(name, Binding::calculated(formula));
        }

        map.with("items1", Binding::list(CostSection::OneTime))
            .with("items2", Binding::list(CostSection::Recurring))
            .with("Module", Binding::column(Column::Material, None))
            .with("Aantal", Binding::column(Column::Quantity, None))
            .with(
                "éénmalige setupkost",
                Binding::column(Column::UnitPrice, Some(CostSection::OneTime)),
            )
            .with(
                "calctotaalsetup",
                Binding::column(Column::LineTotal, Some(CostSection::OneTime)),
            )
            .with(
                "Jaarlijks",
                Binding::column(Column::UnitPrice, Some(CostSection::Recurring)),
            )
            .with(
                "calctotaaljaarlijks",
                Binding::column(Column::LineTotal, Some(CostSection::Recurring)),
            )
            .with("nummer", Binding::literal(""))
    }
}

//! Quotation generation
//!
//! Ties the pieces together: validate the request, compute totals, fill the
//! template's content controls, optionally append the cost summary and
//! re-zip the package.

use crate::bindings::ControlMap;
use crate::error::{QuotationError, Result};
use crate::model::QuotationRequest;
use crate::summary::append_cost_summary;
use crate::totals::{Totals, DEFAULT_VAT_RATE};
use crate::values::QuotationValues;
use chrono::{Local, NaiveDateTime};
use docx_template::{fill_package, DocxPackage, FillReport, XmlDocument, DOCUMENT_PART};
use std::fmt::Write;

/// Default date format for date controls (`17-10-2026`)
pub const DEFAULT_DATE_FORMAT: &str = "%d-%m-%Y";

/// Generation options
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    pub controls: ControlMap,
    pub vat_rate: f64,
    /// chrono format string for date controls
    pub date_format: String,
    /// Append the "KOSTEN SPECIFICATIE" page
    pub include_summary: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            controls: ControlMap::default(),
            vat_rate: DEFAULT_VAT_RATE,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            include_summary: true,
        }
    }
}

/// A generated quotation
#[derive(Debug, Clone)]
pub struct Generated {
    /// The .docx file contents
    pub bytes: Vec<u8>,
    pub report: FillReport,
    pub totals: Totals,
}

/// Fills quotation templates
#[derive(Debug, Clone, Default)]
pub struct QuotationGenerator {
    options: GeneratorOptions,
}

impl QuotationGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Generate a quotation dated today
    pub fn generate(&self, template: &[u8], request: &QuotationRequest) -> Result<Generated> {
        self.generate_at(template, request, Local::now().naive_local())
    }

    /// Generate a quotation dated `now`
    pub fn generate_at(
        &self,
        template: &[u8],
        request: &QuotationRequest,
        now: NaiveDateTime,
    ) -> Result<Generated> {
        request.validate()?;

        let date = format_date(now, &self.options.date_format)?;
        let totals = Totals::calculate(request, self.options.vat_rate);
        let values = QuotationValues::new(request, &self.options.controls, totals, date);

        let mut package = DocxPackage::from_bytes(template)?;
        let report = fill_package(&mut package, &values)?;

        if self.options.include_summary && request.has_costs() {
            let xml = package.part_as_string(DOCUMENT_PART)?;
            let mut doc = XmlDocument::parse(&xml)?;
            if append_cost_summary(&mut doc, request)? {
                package.set_part(DOCUMENT_PART, doc.to_xml().into_bytes());
            }
        }

        let bytes = package.to_bytes()?;
        tracing::info!(
            "Generated quotation for '{}': {} controls filled, {} bytes",
            request.company_name,
            report.total_filled(),
            bytes.len()
        );

        Ok(Generated {
            bytes,
            report,
            totals,
        })
    }
}

/// Render `now` with a chrono format string, rejecting invalid formats
pub fn format_date(now: NaiveDateTime, format: &str) -> Result<String> {
    let mut out = String::new();
    write!(out, "{}", now.format(format))
        .map_err(|_| QuotationError::InvalidDateFormat(format.to_string()))?;
    Ok(out)
}

/// `Offerte_{company}_{YYYYmmdd_HHMMSS}.docx`
///
/// Characters other than ASCII letters, digits, `-`, `_` and `.` become `_`
/// and runs of dots collapse, so the name is safe as a file name and in a
/// download URL.
pub fn output_file_name(request: &QuotationRequest, now: NaiveDateTime) -> String {
    let company = request.company_name.trim();
    let company = if company.is_empty() { "unknown" } else { company };
    let mut safe = String::with_capacity(company.len());
    for c in company.chars() {
        match c {
            // never emit ".."
            '.' if safe.ends_with('.') => {}
            c if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') => safe.push(c),
            _ => safe.push('_'),
        }
    }
    format!("Offerte_{}_{}.docx", safe, now.format("%Y%m%d_%H%M%S"))
}

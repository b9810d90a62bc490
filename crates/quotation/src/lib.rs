//! Quotation - fills the Word quotation template
//!
//! This crate turns a [`QuotationRequest`] (customer details plus one-time
//! and recurring cost lines) into a filled .docx by binding the template's
//! content controls to request fields, calculated totals and cost lines.
//!
//! # Example
//!
//! ```rust,no_run
//! use quotation::{output_file_name, QuotationGenerator, QuotationRequest};
//!
//! let template = std::fs::read("standaardofferte Compufit NL.docx").unwrap();
//! let request: QuotationRequest =
//!     serde_json::from_str(r#"{"companyName": "Praktijk De Molen"}"#).unwrap();
//!
//! let generated = QuotationGenerator::default().generate(&template, &request).unwrap();
//! let name = output_file_name(&request, chrono::Local::now().naive_local());
//! std::fs::write(name, generated.bytes).unwrap();
//! ```

mod bindings;
mod error;
mod generator;
mod model;
mod summary;
mod totals;
mod values;

pub use bindings::{Binding, Column, ControlMap, Formula, RequestField};
pub use error::{QuotationError, Result};
pub use generator::{
    format_date, output_file_name, Generated, GeneratorOptions, QuotationGenerator,
    DEFAULT_DATE_FORMAT,
};
pub use model::{CostItem, CostSection, QuotationRequest};
pub use summary::{append_cost_summary, cost_summary, SUMMARY_TITLE};
pub use totals::{format_amount, format_euro, format_quantity, section_total, Totals, DEFAULT_VAT_RATE};
pub use values::{bullet_list, column_lines, column_value, QuotationValues, EMPTY_LIST_TEXT};

//! Cost summary appendix
//!
//! Appends a "KOSTEN SPECIFICATIE" page to the filled document with one
//! detail table per non-empty cost section.

use crate::model::{CostSection, QuotationRequest};
use crate::totals::{format_euro, format_quantity, section_total};
use docx_template::body::{append_to_body, heading, page_break_paragraph, table};
use docx_template::{DocxResult, XmlDocument, XmlNode};

pub const SUMMARY_TITLE: &str = "KOSTEN SPECIFICATIE";

fn subheading(section: CostSection) -> &'static str {
    match section {
        CostSection::OneTime => "Eenmalige Kosten Detail",
        CostSection::Recurring => "Jaarlijkse Kosten Detail",
    }
}

fn price_header(section: CostSection) -> &'static str {
    match section {
        CostSection::OneTime => "Prijs per stuk",
        CostSection::Recurring => "Jaarlijks",
    }
}

/// The appendix blocks, empty when the request has no cost lines
pub fn cost_summary(request: &QuotationRequest) -> Vec<XmlNode> {
    if !request.has_costs() {
        return Vec::new();
    }

    let mut blocks: Vec<XmlNode> = vec![
        page_break_paragraph().into(),
        heading(SUMMARY_TITLE, 1, true).into(),
    ];

    for section in CostSection::ALL {
        let items = section.items(request);
        if items.is_empty() {
            continue;
        }

        let mut rows: Vec<Vec<String>> = items
            .iter()
            .map(|item| {
                vec![
                    item.material.clone(),
                    format_quantity(item.quantity),
                    format_euro(item.unit_price),
                    format_euro(item.line_total()),
                ]
            })
            .collect();
        rows.push(vec![
            format!("TOTAAL {}", section.label()),
            String::new(),
            String::new(),
            format_euro(section_total(request, section)),
        ]);

        blocks.push(heading(subheading(section), 2, false).into());
        blocks.push(
            table(
                &["Module", "Aantal", price_header(section), "Totaal"],
                &rows,
                true,
            )
            .into(),
        );
    }
    blocks
}

/// Append the cost summary to a parsed `word/document.xml`
///
/// Returns whether anything was added.
pub fn append_cost_summary(doc: &mut XmlDocument, request: &QuotationRequest) -> DocxResult<bool> {
    let blocks = cost_summary(request);
    if blocks.is_empty() {
        return Ok(false);
    }
    append_to_body(doc, blocks)?;
    tracing::debug!("Appended cost summary");
    Ok(true)
}

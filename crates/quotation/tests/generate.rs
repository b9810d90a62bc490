//! Generating quotations from in-memory templates

use chrono::NaiveDate;
use docx_template::{list_controls, DocxPackage, XmlDocument, DOCUMENT_PART};
use quotation::{
    CostItem, GeneratorOptions, QuotationGenerator, QuotationRequest, EMPTY_LIST_TEXT,
    SUMMARY_TITLE,
};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn control(name: &str) -> String {
    format!(
        r#"<w:sdt><w:sdtPr><w:alias w:val="{name}"/><w:showingPlcHdr/></w:sdtPr><w:sdtContent><w:r><w:t>{name}</w:t></w:r></w:sdtContent></w:sdt>"#
    )
}

fn cell(name: &str) -> String {
    format!(
        r#"<w:tc><w:sdt><w:sdtPr><w:alias w:val="{name}"/></w:sdtPr><w:sdtContent><w:p><w:r><w:t>{name}</w:t></w:r></w:p></w:sdtContent></w:sdt></w:tc>"#
    )
}

/// The layout of the standard template: one single-row table per section
fn flat_template() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p>{}</w:p><w:p>{}</w:p><w:p>{}</w:p><w:tbl><w:tr>{}{}{}{}</w:tr></w:tbl><w:tbl><w:tr>{}{}{}{}</w:tr></w:tbl><w:p>{}</w:p><w:p>{}</w:p><w:p>{}</w:p><w:sectPr/></w:body></w:document>"#,
        control("praktijknaam"),
        control("date"),
        control("items2"),
        cell("Module"),
        cell("Aantal"),
        cell("éénmalige setupkost"),
        cell("calctotaalsetup"),
        cell("Module"),
        cell("Aantal"),
        cell("Jaarlijks"),
        cell("calctotaaljaarlijks"),
        control("total"),
        control("vat"),
        control("grandtotal"),
    )
}

/// A template whose one-time table is a repeating section
fn repeating_template() -> String {
    format!(
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:w15="http://schemas.microsoft.com/office/word/2012/wordml"><w:body><w:tbl><w:sdt><w:sdtPr><w:tag w:val="items1"/><w15:repeatingSection/></w:sdtPr><w:sdtContent><w:sdt><w:sdtPr><w15:repeatingSectionItem/></w:sdtPr><w:sdtContent><w:tr>{}{}{}{}</w:tr></w:sdtContent></w:sdt></w:sdtContent></w:sdt></w:tbl><w:p>{}</w:p></w:body></w:document>"#,
        cell("Module"),
        cell("Aantal"),
        cell("éénmalige setupkost"),
        cell("calctotaalsetup"),
        control("totaaleenmalig"),
    )
}

/// One-time costs in a repeating section, recurring costs in a plain row
fn mixed_template() -> String {
    format!(
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:w15="http://schemas.microsoft.com/office/word/2012/wordml"><w:body><w:tbl><w:sdt><w:sdtPr><w:tag w:val="items1"/><w15:repeatingSection/></w:sdtPr><w:sdtContent><w:sdt><w:sdtPr><w15:repeatingSectionItem/></w:sdtPr><w:sdtContent><w:tr>{}{}</w:tr></w:sdtContent></w:sdt></w:sdtContent></w:sdt></w:tbl><w:tbl><w:tr>{}{}{}</w:tr></w:tbl></w:body></w:document>"#,
        cell("Module"),
        cell("Aantal"),
        cell("Module"),
        cell("Aantal"),
        cell("Jaarlijks"),
    )
}

fn build_docx(document: &str) -> Vec<u8> {
    let header = format!(
        r#"<w:hdr xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:p>{}</w:p></w:hdr>"#,
        control("btw")
    );
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    let files = [
        ("[Content_Types].xml", "<Types/>".to_string()),
        ("word/document.xml", document.to_string()),
        ("word/header1.xml", header),
    ];
    for (name, content) in files {
        zip.start_file(name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn request() -> QuotationRequest {
    QuotationRequest {
        company_name: "TEST PRAKTIJK BV".into(),
        company_id: "NL123456789B01".into(),
        one_time_costs: vec![
            CostItem::new("Setup", 1.0, 1000.0).with_total(1000.0),
            CostItem::new("Training", 2.0, 150.0),
        ],
        recurring_costs: vec![CostItem::new("Licentie", 12.0, 100.0).with_total(1200.0)],
        ..Default::default()
    }
}

fn generator(include_summary: bool) -> QuotationGenerator {
    QuotationGenerator::new(GeneratorOptions {
        include_summary,
        ..Default::default()
    })
}

fn now() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 17)
        .unwrap()
        .and_hms_opt(14, 30, 0)
        .unwrap()
}

fn controls_of(bytes: &[u8], part: &str) -> Vec<(String, String)> {
    let package = DocxPackage::from_bytes(bytes).unwrap();
    let doc = XmlDocument::parse(&package.part_as_string(part).unwrap()).unwrap();
    list_controls(&doc)
        .into_iter()
        .map(|c| (c.name, c.text))
        .collect()
}

fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
    expected
        .iter()
        .map(|(n, t)| (n.to_string(), t.to_string()))
        .collect()
}

#[test]
fn test_flat_template_by_occurrence() {
    let generated = generator(false)
        .generate_at(build_docx(&flat_template()).as_slice(), &request(), now())
        .unwrap();

    assert_eq!(
        controls_of(&generated.bytes, DOCUMENT_PART),
        pairs(&[
            ("praktijknaam", "TEST PRAKTIJK BV"),
            ("date", "17-10-2026"),
            ("items2", "• Licentie - Aantal: 12 x €100.00 = €1200.00"),
            ("Module", "Setup\nTraining"),
            ("Aantal", "1\n2"),
            ("éénmalige setupkost", "€1000.00\n€150.00"),
            ("calctotaalsetup", "€1000.00\n€300.00"),
            ("Module", "Licentie"),
            ("Aantal", "12"),
            ("Jaarlijks", "€100.00"),
            ("calctotaaljaarlijks", "€1200.00"),
            ("total", "2500.00"),
            ("vat", "525.00"),
            ("grandtotal", "3025.00"),
        ])
    );
    assert_eq!(
        controls_of(&generated.bytes, "word/header1.xml"),
        pairs(&[("btw", "NL123456789B01")])
    );

    assert_eq!(generated.report.total_filled(), 15);
    assert!(generated.report.unmapped().is_empty());
    assert_eq!(generated.totals.one_time, 1300.0);
}

#[test]
fn test_repeating_section_rows() {
    let generated = generator(false)
        .generate_at(build_docx(&repeating_template()).as_slice(), &request(), now())
        .unwrap();

    assert_eq!(
        controls_of(&generated.bytes, DOCUMENT_PART),
        pairs(&[
            ("items1", "Setup1€1000.00€1000.00Training2€150.00€300.00"),
            ("Module", "Setup"),
            ("Aantal", "1"),
            ("éénmalige setupkost", "€1000.00"),
            ("calctotaalsetup", "€1000.00"),
            ("Module", "Training"),
            ("Aantal", "2"),
            ("éénmalige setupkost", "€150.00"),
            ("calctotaalsetup", "€300.00"),
            ("totaaleenmalig", "1300.00"),
        ])
    );
    assert_eq!(generated.report.total_rows(), 2);
}

#[test]
fn test_plain_row_after_repeating_section_shows_recurring_costs() {
    let generated = generator(false)
        .generate_at(build_docx(&mixed_template()).as_slice(), &request(), now())
        .unwrap();

    let controls = controls_of(&generated.bytes, DOCUMENT_PART);
    let modules: Vec<&str> = controls
        .iter()
        .filter(|(name, _)| name == "Module")
        .map(|(_, text)| text.as_str())
        .collect();
    assert_eq!(modules, vec!["Setup", "Training", "Licentie"]);
    assert!(controls.contains(&("Aantal".to_string(), "12".to_string())));
    assert!(controls.contains(&("Jaarlijks".to_string(), "€100.00".to_string())));
}

#[test]
fn test_empty_lists() {
    let request = QuotationRequest {
        company_name: "Leeg".into(),
        ..Default::default()
    };
    let generated = generator(true)
        .generate_at(build_docx(&flat_template()).as_slice(), &request, now())
        .unwrap();

    let controls = controls_of(&generated.bytes, DOCUMENT_PART);
    assert!(controls.contains(&("items2".to_string(), EMPTY_LIST_TEXT.to_string())));
    assert!(controls.contains(&("Jaarlijks".to_string(), "€0.00".to_string())));
    assert!(controls.contains(&("grandtotal".to_string(), "0.00".to_string())));

    // no cost lines, no summary page
    let package = DocxPackage::from_bytes(&generated.bytes).unwrap();
    let xml = package.part_as_string(DOCUMENT_PART).unwrap();
    assert!(!xml.contains(SUMMARY_TITLE));
}

#[test]
fn test_summary_appended_before_section_properties() {
    let generated = generator(true)
        .generate_at(build_docx(&flat_template()).as_slice(), &request(), now())
        .unwrap();

    let package = DocxPackage::from_bytes(&generated.bytes).unwrap();
    let xml = package.part_as_string(DOCUMENT_PART).unwrap();
    assert!(xml.contains(SUMMARY_TITLE));
    assert!(xml.contains("TOTAAL EENMALIG"));
    assert!(xml.contains("TOTAAL JAARLIJKS"));
    assert!(xml.ends_with("<w:sectPr/></w:body></w:document>"));
    assert!(xml.find(SUMMARY_TITLE) > xml.find("grandtotal"));
}

#[test]
fn test_custom_mapping_and_vat() {
    let controls = quotation::ControlMap::from_json_str(
        r#"{"controls": {"praktijknaam": {"type": "literal", "value": "Vast"}}}"#,
    )
    .unwrap();
    let generator = QuotationGenerator::new(GeneratorOptions {
        controls,
        vat_rate: 0.09,
        include_summary: false,
        ..Default::default()
    });

    let generated = generator
        .generate_at(build_docx(&flat_template()).as_slice(), &request(), now())
        .unwrap();

    let controls = controls_of(&generated.bytes, DOCUMENT_PART);
    assert_eq!(controls[0], ("praktijknaam".to_string(), "Vast".to_string()));
    assert_eq!(controls[1], ("date".to_string(), "date".to_string()));
    assert_eq!(format!("{:.2}", generated.totals.vat), "225.00");
    assert!(generated.report.unmapped().contains(&"vat"));
}

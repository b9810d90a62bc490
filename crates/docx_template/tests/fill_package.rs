//! End-to-end filling of an in-memory package

use docx_template::{
    fill_package, list_controls, DocxError, DocxPackage, FieldMap, XmlDocument, DOCUMENT_PART,
};
use std::collections::HashMap;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:w15="http://schemas.microsoft.com/office/word/2012/wordml"><w:body><w:p><w:sdt><w:sdtPr><w:alias w:val="Praktijk"/><w:tag w:val="praktijknaam"/><w:showingPlcHdr/></w:sdtPr><w:sdtContent><w:r><w:t>Praktijknaam</w:t></w:r></w:sdtContent></w:sdt></w:p><w:tbl><w:sdt><w:sdtPr><w:tag w:val="items"/><w15:repeatingSection/></w:sdtPr><w:sdtContent><w:sdt><w:sdtPr><w15:repeatingSectionItem/></w:sdtPr><w:sdtContent><w:tr><w:tc><w:sdt><w:sdtPr><w:tag w:val="regel"/></w:sdtPr><w:sdtContent><w:p><w:r><w:t>regel</w:t></w:r></w:p></w:sdtContent></w:sdt></w:tc></w:tr></w:sdtContent></w:sdt></w:sdtContent></w:sdt></w:tbl><w:sectPr/></w:body></w:document>"#;

const HEADER: &str = r#"<w:hdr xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:p><w:sdt><w:sdtPr><w:tag w:val="praktijknaam"/></w:sdtPr><w:sdtContent><w:r><w:t>kop</w:t></w:r></w:sdtContent></w:sdt></w:p></w:hdr>"#;

const BROKEN_FOOTER: &str = "<w:ftr><w:p></w:ftr>";

fn build_docx(document: &str) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    let files = [
        ("[Content_Types].xml", "<Types/>"),
        ("word/document.xml", document),
        ("word/header1.xml", HEADER),
        ("word/footer1.xml", BROKEN_FOOTER),
    ];
    for (name, content) in files {
        zip.start_file(name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn source() -> FieldMap {
    let rows = ["Eerste", "Tweede"]
        .iter()
        .map(|v| HashMap::from([("regel".to_string(), v.to_string())]))
        .collect();
    FieldMap::new()
        .with_value("Praktijk", "Tandartspraktijk De Molen")
        .with_value("praktijknaam", "Header Naam")
        .with_section("items", rows)
}

#[test]
fn test_fill_package_round_trip() {
    let mut package = DocxPackage::from_bytes(&build_docx(DOCUMENT)).unwrap();

    let report = fill_package(&mut package, &source()).unwrap();

    // document: 1 scalar + 2 rows, header: 1 scalar
    assert_eq!(report.total_filled(), 4);
    assert_eq!(report.total_rows(), 2);
    assert_eq!(report.skipped_parts, vec!["word/footer1.xml".to_string()]);

    let bytes = package.to_bytes().unwrap();
    let reloaded = DocxPackage::from_bytes(&bytes).unwrap();

    let xml = reloaded.part_as_string(DOCUMENT_PART).unwrap();
    assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#));
    let doc = XmlDocument::parse(&xml).unwrap();
    let texts: Vec<(String, String)> = list_controls(&doc)
        .into_iter()
        .map(|c| (c.name, c.text))
        .collect();
    assert_eq!(
        texts,
        vec![
            ("Praktijk".to_string(), "Tandartspraktijk De Molen".to_string()),
            ("items".to_string(), "EersteTweede".to_string()),
            ("regel".to_string(), "Eerste".to_string()),
            ("regel".to_string(), "Tweede".to_string()),
        ]
    );

    let header = reloaded.part_as_string("word/header1.xml").unwrap();
    assert!(header.contains("Header Naam"));

    // unparseable footer is copied through byte-for-byte
    assert_eq!(reloaded.part("word/footer1.xml").unwrap(), BROKEN_FOOTER.as_bytes());
}

#[test]
fn test_unchanged_parts_keep_original_bytes() {
    let mut package = DocxPackage::from_bytes(&build_docx(DOCUMENT)).unwrap();

    let report = fill_package(&mut package, &FieldMap::new()).unwrap();

    assert_eq!(report.total_filled(), 0);
    assert_eq!(package.part_as_string(DOCUMENT_PART).unwrap(), DOCUMENT);
    assert_eq!(package.part_as_string("word/header1.xml").unwrap(), HEADER);
    assert_eq!(report.unmapped(), vec!["Praktijk", "regel", "praktijknaam"]);
}

#[test]
fn test_broken_document_is_an_error() {
    let mut package = DocxPackage::from_bytes(&build_docx("<w:document><w:body>")).unwrap();

    let result = fill_package(&mut package, &source());

    assert!(matches!(result, Err(DocxError::InvalidStructure(_))));
}

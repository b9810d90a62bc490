//! Block content appended to the document body
//!
//! Builders for the few block elements needed to add an appendix to a
//! filled template: paragraphs, headings, page breaks and simple bordered
//! tables.

use crate::error::{DocxError, DocxResult};
use crate::xml::{XmlDocument, XmlElement, XmlNode};

/// Insert block content at the end of `w:body`, before the final `w:sectPr`
pub fn append_to_body(doc: &mut XmlDocument, blocks: Vec<XmlNode>) -> DocxResult<()> {
    let body = doc
        .root
        .child_mut("body")
        .ok_or_else(|| DocxError::InvalidStructure("document has no w:body".to_string()))?;

    // Trailing section properties must stay the last child of the body
    let at = match body.children.iter().rposition(|n| n.as_element().is_some()) {
        Some(last) if body.children[last].as_element().is_some_and(|el| el.is("sectPr")) => last,
        _ => body.children.len(),
    };
    body.children.splice(at..at, blocks);
    Ok(())
}

/// A paragraph holding a single page break
pub fn page_break_paragraph() -> XmlElement {
    XmlElement::new("w:p").with_child(
        XmlElement::new("w:r").with_child(XmlElement::new("w:br").with_attr("w:type", "page")),
    )
}

/// A paragraph with one run of text
pub fn paragraph(text: &str, style: Option<&str>, centered: bool) -> XmlElement {
    let mut props = XmlElement::new("w:pPr");
    if let Some(style) = style {
        props.children.push(XmlElement::new("w:pStyle").with_attr("w:val", style).into());
    }
    if centered {
        props.children.push(XmlElement::new("w:jc").with_attr("w:val", "center").into());
    }

    let mut p = XmlElement::new("w:p");
    if !props.children.is_empty() {
        p.children.push(props.into());
    }
    p.with_child(text_run(text, false))
}

/// A heading paragraph using the built-in `HeadingN` style
///
/// The run is bold as well, so the heading stands out in templates that do
/// not define the heading styles.
pub fn heading(text: &str, level: u8, centered: bool) -> XmlElement {
    let style = format!("Heading{}", level.clamp(1, 9));
    let mut p = paragraph("", Some(&style), centered);
    p.remove_children_where(|n| n.as_element().is_some_and(|el| el.is("r")));
    p.with_child(text_run(text, true))
}

/// A run with preserved whitespace, optionally bold
pub fn text_run(text: &str, bold: bool) -> XmlElement {
    let mut run = XmlElement::new("w:r");
    if bold {
        run.children
            .push(XmlElement::new("w:rPr").with_child(XmlElement::new("w:b")).into());
    }
    run.with_child(
        XmlElement::new("w:t")
            .with_attr("xml:space", "preserve")
            .with_text(text),
    )
}

/// A full-width table with single-line borders on every edge
///
/// The header row is bold and repeats on each page. With `emphasize_last`
/// the final row is bold too.
pub fn table(header: &[&str], rows: &[Vec<String>], emphasize_last: bool) -> XmlElement {
    let columns = header
        .len()
        .max(rows.iter().map(Vec::len).max().unwrap_or(0));

    let mut tbl = XmlElement::new("w:tbl").with_child(table_properties());

    let mut grid = XmlElement::new("w:tblGrid");
    // 9000 twips spread over the columns
    let width = if columns > 0 { 9000 / columns } else { 9000 };
    for _ in 0..columns {
        grid.children.push(
            XmlElement::new("w:gridCol")
                .with_attr("w:w", width.to_string())
                .into(),
        );
    }
    tbl.children.push(grid.into());

    if !header.is_empty() {
        let cells: Vec<String> = header.iter().map(|s| s.to_string()).collect();
        tbl.children.push(table_row(&cells, columns, true, true).into());
    }
    for (i, cells) in rows.iter().enumerate() {
        let bold = emphasize_last && i + 1 == rows.len();
        tbl.children.push(table_row(cells, columns, bold, false).into());
    }
    tbl
}

fn table_properties() -> XmlElement {
    let mut borders = XmlElement::new("w:tblBorders");
    for edge in ["top", "left", "bottom", "right", "insideH", "insideV"] {
        borders.children.push(
            XmlElement::new(format!("w:{}", edge))
                .with_attr("w:val", "single")
                .with_attr("w:sz", "4")
                .with_attr("w:space", "0")
                .with_attr("w:color", "auto")
                .into(),
        );
    }

    XmlElement::new("w:tblPr")
        .with_child(
            XmlElement::new("w:tblW")
                .with_attr("w:w", "5000")
                .with_attr("w:type", "pct"),
        )
        .with_child(borders)
        .with_child(
            XmlElement::new("w:tblLook")
                .with_attr("w:val", "04A0")
                .with_attr("w:firstRow", "1")
                .with_attr("w:lastRow", "0")
                .with_attr("w:firstColumn", "1")
                .with_attr("w:lastColumn", "0")
                .with_attr("w:noHBand", "0")
                .with_attr("w:noVBand", "1"),
        )
}

fn table_row(cells: &[String], columns: usize, bold: bool, is_header: bool) -> XmlElement {
    let mut tr = XmlElement::new("w:tr");
    if is_header {
        tr.children
            .push(XmlElement::new("w:trPr").with_child(XmlElement::new("w:tblHeader")).into());
    }
    for i in 0..columns {
        let text = cells.get(i).map(String::as_str).unwrap_or("");
        // Every cell needs at least one paragraph
        let tc = XmlElement::new("w:tc").with_child(
            XmlElement::new("w:p").with_child(text_run(text, bold)),
        );
        tr.children.push(tc.into());
    }
    tr
}

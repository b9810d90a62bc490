//! Content control population
//!
//! Controls are filled in one pass over each part, in document order:
//!
//! - A repeating section bound to a data list is expanded. The first
//!   `w15:repeatingSectionItem` inside the section is the row template; it
//!   is deep-copied once per data row and every named control in the copy
//!   is filled with that row's value.
//! - Every other named leaf control is filled with a scalar value. The
//!   same name may occur several times in a part; the 1-based occurrence is
//!   passed to the [`FillSource`] so values can depend on context. An
//!   expanded section counts as one occurrence of each control in its row.
//!
//! Values are written as runs of `w:t`, one run per line, with a `w:br` run
//! between lines. The formatting of the first existing run is kept.

use crate::content_controls::{
    content_level, control_kind, control_name, has_nested_controls, section_names, ContentLevel,
    ControlKind,
};
use crate::error::{DocxError, DocxResult};
use crate::package::{DocxPackage, DOCUMENT_PART};
use crate::xml::{XmlDocument, XmlElement, XmlNode};
use std::collections::HashMap;

/// Provides values for content controls
pub trait FillSource {
    /// Value for a scalar control. `occurrence` counts controls with this
    /// name in the current part, starting at 1. `None` leaves the control
    /// untouched.
    fn value(&self, name: &str, occurrence: usize) -> Option<String>;

    /// Number of rows for the repeating section `name`, `None` if unbound
    fn section_len(&self, _name: &str) -> Option<usize> {
        None
    }

    /// Value for control `name` in row `row` of `section`
    fn row_value(&self, _section: &str, _row: usize, _name: &str) -> Option<String> {
        None
    }
}

/// A [`FillSource`] backed by plain maps
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    values: HashMap<String, String>,
    sections: HashMap<String, Vec<HashMap<String, String>>>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set a scalar value
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Builder: bind a repeating section to rows of values
    pub fn with_section(
        mut self,
        name: impl Into<String>,
        rows: Vec<HashMap<String, String>>,
    ) -> Self {
        self.sections.insert(name.into(), rows);
        self
    }

    /// Set a scalar value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }
}

impl FillSource for FieldMap {
    fn value(&self, name: &str, _occurrence: usize) -> Option<String> {
        self.values.get(name).cloned()
    }

    fn section_len(&self, name: &str) -> Option<usize> {
        self.sections.get(name).map(Vec::len)
    }

    fn row_value(&self, section: &str, row: usize, name: &str) -> Option<String> {
        self.sections.get(section)?.get(row)?.get(name).cloned()
    }
}

/// Outcome of filling one part
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartReport {
    pub part: String,
    /// Controls that received a value
    pub filled: usize,
    /// Repeating sections that were expanded
    pub sections_expanded: usize,
    /// Rows written into expanded sections
    pub rows_written: usize,
    /// Named controls the source had no value for, deduplicated
    pub unmapped: Vec<String>,
}

impl PartReport {
    /// Whether the part was modified
    pub fn changed(&self) -> bool {
        self.filled > 0 || self.sections_expanded > 0
    }

    fn note_unmapped(&mut self, name: &str) {
        if !self.unmapped.iter().any(|n| n == name) {
            self.unmapped.push(name.to_string());
        }
    }
}

/// Outcome of filling a whole package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillReport {
    pub parts: Vec<PartReport>,
    /// Header/footer parts that could not be parsed and were copied unchanged
    pub skipped_parts: Vec<String>,
}

impl FillReport {
    pub fn total_filled(&self) -> usize {
        self.parts.iter().map(|p| p.filled).sum()
    }

    pub fn total_rows(&self) -> usize {
        self.parts.iter().map(|p| p.rows_written).sum()
    }

    /// Unmapped control names across all parts, deduplicated
    pub fn unmapped(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for name in self.parts.iter().flat_map(|p| p.unmapped.iter()) {
            if !out.contains(&name.as_str()) {
                out.push(name);
            }
        }
        out
    }
}

/// Fill every fillable part of a package in place
pub fn fill_package(package: &mut DocxPackage, source: &dyn FillSource) -> DocxResult<FillReport> {
    let mut report = FillReport::default();

    for part in package.fillable_parts() {
        let parsed = package
            .part_as_string(&part)
            .and_then(|xml| XmlDocument::parse(&xml));

        let mut doc = match parsed {
            Ok(doc) => doc,
            Err(e) if part == DOCUMENT_PART => {
                return Err(DocxError::InvalidStructure(format!("{}: {}", part, e)));
            }
            Err(e) => {
                tracing::warn!("Leaving {} unchanged, could not parse it: {}", part, e);
                report.skipped_parts.push(part);
                continue;
            }
        };

        let mut part_report = fill_document(&mut doc, source);
        part_report.part = part.clone();

        if part_report.changed() {
            tracing::debug!(
                "{}: {} controls filled, {} rows written",
                part,
                part_report.filled,
                part_report.rows_written
            );
            package.set_part(&part, doc.to_xml().into_bytes());
        }
        report.parts.push(part_report);
    }

    tracing::info!(
        "Filled {} content controls and {} repeating rows",
        report.total_filled(),
        report.total_rows()
    );
    if !report.unmapped().is_empty() {
        tracing::debug!("Controls without a value: {:?}", report.unmapped());
    }
    Ok(report)
}

/// Fill the content controls of one parsed part
///
/// Controls are visited in document order, bound repeating sections
/// included, so occurrence counts follow the reading order of the part.
pub fn fill_document(doc: &mut XmlDocument, source: &dyn FillSource) -> PartReport {
    let mut report = PartReport::default();
    let mut occurrences: HashMap<String, usize> = HashMap::new();
    fill_controls(&mut doc.root, source, &mut occurrences, &mut report);
    report
}

// =============================================================================
// Repeating sections
// =============================================================================

fn is_item(el: &XmlElement) -> bool {
    el.is("sdt") && control_kind(el) == ControlKind::RepeatingSectionItem
}

fn is_item_node(node: &XmlNode) -> bool {
    node.as_element().is_some_and(is_item)
}

/// Child indices from `el` down to the element holding the first repeating
/// item. Wrappers such as `w:customXml` are searched, other controls are not.
fn item_path(el: &XmlElement) -> Option<Vec<usize>> {
    if el.children.iter().any(is_item_node) {
        return Some(Vec::new());
    }
    for (i, child) in el.children.iter().enumerate() {
        let Some(child) = child.as_element() else {
            continue;
        };
        if child.is("sdt") {
            continue;
        }
        if let Some(mut path) = item_path(child) {
            path.insert(0, i);
            return Some(path);
        }
    }
    None
}

/// A section marked `w15:repeatingSection`, or any control whose content
/// holds repeating items
fn is_repeating_section(sdt: &XmlElement) -> bool {
    control_kind(sdt) == ControlKind::RepeatingSection
        || sdt
            .child("sdtContent")
            .is_some_and(|body| item_path(body).is_some())
}

/// The section name the source has rows for, if any
fn bound_section(sdt: &XmlElement, source: &dyn FillSource) -> Option<(String, usize)> {
    if !is_repeating_section(sdt) {
        return None;
    }
    section_names(sdt)
        .into_iter()
        .find_map(|name| source.section_len(name).map(|len| (name.to_string(), len)))
}

/// Replace the rows of a bound section with one filled copy per data row
///
/// The row template is the first repeating item, or the first element
/// child of the content when there are no items. Every existing row is
/// removed before the copies go in at the template's position.
fn expand_section(
    sdt: &mut XmlElement,
    section: &str,
    len: usize,
    source: &dyn FillSource,
    occurrences: &mut HashMap<String, usize>,
    report: &mut PartReport,
) {
    let Some(body) = sdt.child_mut("sdtContent") else {
        return;
    };

    let path = item_path(body).unwrap_or_default();
    let mut container = body;
    for i in path {
        let Some(next) = container.children.get_mut(i).and_then(XmlNode::as_element_mut) else {
            return;
        };
        container = next;
    }

    let found = container
        .children
        .iter()
        .position(is_item_node)
        .or_else(|| container.children.iter().position(|n| n.as_element().is_some()));
    let Some(index) = found else {
        tracing::warn!("Repeating section '{}' has no row to repeat", section);
        return;
    };
    let mut template = container.children[index].clone();

    let template_is_item = is_item_node(&template);
    let row_name = template
        .as_element()
        .map(|el| el.name.clone())
        .unwrap_or_default();
    container.remove_children_where(|n| {
        n.as_element().is_some_and(|el| {
            if template_is_item {
                is_item(el)
            } else {
                el.name == row_name
            }
        })
    });

    // The section stands in for one occurrence of each control in its row
    if let XmlNode::Element(ref mut el) = template {
        for name in row_control_names(el) {
            *occurrences.entry(name).or_insert(0) += 1;
        }
    }

    let mut rows = Vec::with_capacity(len.max(1));
    for row in 0..len.max(1) {
        let mut copy = template.clone();
        if let XmlNode::Element(ref mut el) = copy {
            if row > 0 {
                strip_ids(el);
            }
            let filled = fill_row(el, |name| {
                if len == 0 {
                    Some(String::new())
                } else {
                    Some(source.row_value(section, row, name).unwrap_or_default())
                }
            });
            report.filled += filled;
        }
        rows.push(copy);
    }

    report.sections_expanded += 1;
    report.rows_written += len;
    container.children.splice(index..index, rows);
    tracing::debug!("Expanded repeating section '{}' to {} rows", section, len);
}

/// Distinct names of the leaf controls in a row, in document order
fn row_control_names(row: &mut XmlElement) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    visit_leaf_controls(row, false, &mut |_, name, _| {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    });
    names
}

/// Fill every named leaf control inside a row copy
fn fill_row<F>(row: &mut XmlElement, mut resolve: F) -> usize
where
    F: FnMut(&str) -> Option<String>,
{
    let mut filled = 0;
    visit_leaf_controls(row, false, &mut |sdt, name, inline| {
        if let Some(value) = resolve(name) {
            write_value(sdt, &value, inline);
            filled += 1;
        }
    });
    filled
}

/// Remove identifiers Word expects to be unique from a cloned subtree
fn strip_ids(el: &mut XmlElement) {
    el.attributes
        .retain(|(key, _)| key != "w14:paraId" && key != "w14:textId");
    if el.is("sdtPr") {
        el.remove_children_where(|n| n.as_element().is_some_and(|c| c.is("id")));
    }
    for child in el.elements_mut() {
        strip_ids(child);
    }
}

// =============================================================================
// Scalar controls
// =============================================================================

fn fill_controls(
    el: &mut XmlElement,
    source: &dyn FillSource,
    occurrences: &mut HashMap<String, usize>,
    report: &mut PartReport,
) {
    let inline = is_inline_container(el);
    for child in el.elements_mut() {
        if !child.is("sdt") {
            fill_controls(child, source, occurrences, report);
            continue;
        }

        if let Some((section, len)) = bound_section(child, source) {
            expand_section(child, &section, len, source, occurrences, report);
            continue;
        }

        if control_kind(child).is_container() || has_nested_controls(child) {
            if let Some(body) = child.child_mut("sdtContent") {
                fill_controls(body, source, occurrences, report);
            }
            continue;
        }

        let Some(name) = control_name(child).map(str::to_string) else {
            continue;
        };
        let counter = occurrences.entry(name.clone()).or_insert(0);
        *counter += 1;

        match source.value(&name, *counter) {
            Some(value) => {
                write_value(child, &value, inline);
                report.filled += 1;
            }
            None => report.note_unmapped(&name),
        }
    }
}

/// Walk named leaf controls below `el`, descending through containers
fn visit_leaf_controls(
    el: &mut XmlElement,
    parent_inline: bool,
    visit: &mut dyn FnMut(&mut XmlElement, &str, bool),
) {
    if el.is("sdt") && !control_kind(el).is_container() && !has_nested_controls(el) {
        if let Some(name) = control_name(el).map(str::to_string) {
            visit(el, &name, parent_inline);
        }
        return;
    }

    let inline = is_inline_container(el);
    for child in el.elements_mut() {
        if child.is("sdt") && (control_kind(child).is_container() || has_nested_controls(child)) {
            if let Some(body) = child.child_mut("sdtContent") {
                visit_leaf_controls(body, inline, visit);
            }
        } else {
            visit_leaf_controls(child, inline, visit);
        }
    }
}

/// Elements whose children are runs rather than blocks
fn is_inline_container(el: &XmlElement) -> bool {
    matches!(
        el.local_name(),
        "p" | "hyperlink" | "smartTag" | "fldSimple" | "ins" | "del" | "customXml"
    )
}

// =============================================================================
// Writing values
// =============================================================================

/// Replace the content of an SDT with `value`
///
/// `inline` tells whether the control sits inside a paragraph, which
/// decides how an empty control is filled.
pub fn write_value(sdt: &mut XmlElement, value: &str, inline: bool) {
    let showing_placeholder = sdt
        .child("sdtPr")
        .is_some_and(|pr| pr.has_child("showingPlcHdr"));
    if let Some(pr) = sdt.child_mut("sdtPr") {
        pr.remove_children_where(|n| n.as_element().is_some_and(|el| el.is("showingPlcHdr")));
    }

    let level = content_level(sdt);
    if !sdt.has_child("sdtContent") {
        sdt.children.push(XmlElement::new("w:sdtContent").into());
    }
    let Some(body) = sdt.child_mut("sdtContent") else {
        return;
    };

    let run_level = level == ContentLevel::Run || (level == ContentLevel::Empty && inline);
    if run_level {
        replace_runs(body, value, showing_placeholder);
        return;
    }

    // Extra paragraphs directly under the content would keep stale text
    let mut seen = 0;
    body.children.retain(|n| {
        let is_p = n.as_element().is_some_and(|el| el.is("p"));
        if is_p {
            seen += 1;
        }
        !is_p || seen == 1
    });

    match body.find_descendant_mut("p") {
        Some(paragraph) => replace_runs(paragraph, value, showing_placeholder),
        None => {
            let mut paragraph = XmlElement::new("w:p");
            replace_runs(&mut paragraph, value, showing_placeholder);
            body.children.push(paragraph.into());
        }
    }
}

/// Swap the direct `w:r` children of `container` for runs holding `value`
fn replace_runs(container: &mut XmlElement, value: &str, showing_placeholder: bool) {
    let mut run_props = container
        .elements()
        .find(|el| el.is("r"))
        .and_then(|run| run.child("rPr"))
        .cloned();

    // The placeholder style greys the text out
    if showing_placeholder {
        if let Some(ref mut props) = run_props {
            props.remove_children_where(|n| n.as_element().is_some_and(|el| el.is("rStyle")));
        }
    }

    let first = container.position_of("r");
    container.remove_children_where(|n| n.as_element().is_some_and(|el| el.is("r")));
    let at = first.unwrap_or(container.children.len());

    let runs = build_runs(value, run_props.as_ref());
    container.children.splice(at..at, runs);
}

/// One run per line, with a line-break run between lines
pub fn build_runs(value: &str, run_props: Option<&XmlElement>) -> Vec<XmlNode> {
    let lines: Vec<&str> = value.split('\n').map(|l| l.trim_end_matches('\r')).collect();
    let mut runs = Vec::with_capacity(lines.len() * 2);

    for (i, line) in lines.iter().enumerate() {
        let text = XmlElement::new("w:t")
            .with_attr("xml:space", "preserve")
            .with_text(*line);
        runs.push(new_run(run_props).with_child(text).into());

        if i + 1 < lines.len() {
            runs.push(new_run(run_props).with_child(XmlElement::new("w:br")).into());
        }
    }
    runs
}

fn new_run(run_props: Option<&XmlElement>) -> XmlElement {
    let mut run = XmlElement::new("w:r");
    if let Some(props) = run_props {
        if !props.children.is_empty() {
            run.children.push(props.clone().into());
        }
    }
    run
}

//! Content Controls (SDT) discovery
//!
//! Reads `w:sdt` elements out of a parsed part. A control is addressed by
//! its name: the `w:alias` value when present and non-empty, otherwise the
//! `w:tag` value. Word writes the repeating section markers in the w15
//! namespace (`w15:repeatingSection`, `w15:repeatingSectionItem`).

use crate::xml::{XmlDocument, XmlElement};

/// Control type determined from `w:sdtPr`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    RichText,
    PlainText,
    Checkbox,
    DropdownList,
    ComboBox,
    DatePicker,
    Picture,
    RepeatingSection,
    RepeatingSectionItem,
    Group,
}

impl ControlKind {
    /// Whether this control wraps other controls rather than holding a value
    pub fn is_container(self) -> bool {
        matches!(
            self,
            ControlKind::RepeatingSection | ControlKind::RepeatingSectionItem | ControlKind::Group
        )
    }
}

/// Where the control sits in the document structure, judged from its content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentLevel {
    /// Only runs inside `w:sdtContent` (inline control)
    Run,
    /// Paragraphs or tables
    Block,
    /// Table rows
    Row,
    /// Table cells
    Cell,
    /// No content yet
    Empty,
}

/// Summary of one content control found in a part
#[derive(Debug, Clone, PartialEq)]
pub struct ControlInfo {
    /// Alias if present, else tag
    pub name: String,
    pub tag: Option<String>,
    pub alias: Option<String>,
    pub kind: ControlKind,
    pub level: ContentLevel,
    /// Current visible text of the control
    pub text: String,
    /// Name of the enclosing repeating section, if any
    pub section: Option<String>,
}

/// The `w:sdtPr` of an SDT element
pub fn properties(sdt: &XmlElement) -> Option<&XmlElement> {
    sdt.child("sdtPr")
}

/// The `w:sdtContent` of an SDT element
pub fn content(sdt: &XmlElement) -> Option<&XmlElement> {
    sdt.child("sdtContent")
}

fn property_val<'a>(sdt: &'a XmlElement, local: &str) -> Option<&'a str> {
    properties(sdt)?
        .child(local)?
        .w_attr("val")
        .filter(|v| !v.is_empty())
}

/// Tag value (`w:tag/@w:val`)
pub fn tag(sdt: &XmlElement) -> Option<&str> {
    property_val(sdt, "tag")
}

/// Alias value (`w:alias/@w:val`)
pub fn alias(sdt: &XmlElement) -> Option<&str> {
    property_val(sdt, "alias")
}

/// Control name: alias first, then tag
pub fn control_name(sdt: &XmlElement) -> Option<&str> {
    alias(sdt).or_else(|| tag(sdt))
}

/// Names a repeating section may be addressed by: alias and tag
pub fn section_names(sdt: &XmlElement) -> Vec<&str> {
    let mut names = Vec::new();
    if let Some(a) = alias(sdt) {
        names.push(a);
    }
    if let Some(t) = tag(sdt) {
        if !names.contains(&t) {
            names.push(t);
        }
    }
    names
}

/// Determine the control type from the properties
pub fn control_kind(sdt: &XmlElement) -> ControlKind {
    let Some(pr) = properties(sdt) else {
        return ControlKind::RichText;
    };

    for el in pr.elements() {
        let kind = match el.local_name() {
            "repeatingSection" => Some(ControlKind::RepeatingSection),
            "repeatingSectionItem" => Some(ControlKind::RepeatingSectionItem),
            "text" => Some(ControlKind::PlainText),
            "checkbox" => Some(ControlKind::Checkbox),
            "dropDownList" => Some(ControlKind::DropdownList),
            "comboBox" => Some(ControlKind::ComboBox),
            "date" => Some(ControlKind::DatePicker),
            "picture" => Some(ControlKind::Picture),
            "group" => Some(ControlKind::Group),
            _ => None,
        };
        if let Some(kind) = kind {
            return kind;
        }
    }
    ControlKind::RichText
}

/// Determine the content level by inspecting `w:sdtContent` children
pub fn content_level(sdt: &XmlElement) -> ContentLevel {
    let Some(body) = content(sdt) else {
        return ContentLevel::Empty;
    };

    let mut has_run = false;
    for el in body.elements() {
        match el.local_name() {
            "tr" => return ContentLevel::Row,
            "tc" => return ContentLevel::Cell,
            "p" | "tbl" => return ContentLevel::Block,
            "r" => has_run = true,
            _ => {}
        }
    }
    if has_run {
        ContentLevel::Run
    } else {
        ContentLevel::Empty
    }
}

/// Whether the SDT content holds further SDTs
pub fn has_nested_controls(sdt: &XmlElement) -> bool {
    content(sdt).is_some_and(|c| c.contains("sdt"))
}

/// List every content control in a part, in document order
pub fn list_controls(doc: &XmlDocument) -> Vec<ControlInfo> {
    let mut out = Vec::new();
    collect(&doc.root, None, &mut out);
    out
}

fn collect(el: &XmlElement, section: Option<&str>, out: &mut Vec<ControlInfo>) {
    for child in el.elements() {
        if child.is("sdt") {
            let kind = control_kind(child);
            if let Some(name) = control_name(child) {
                out.push(ControlInfo {
                    name: name.to_string(),
                    tag: tag(child).map(str::to_string),
                    alias: alias(child).map(str::to_string),
                    kind,
                    level: content_level(child),
                    text: content(child).map(XmlElement::text_content).unwrap_or_default(),
                    section: section.map(str::to_string),
                });
            }
            let inner_section = if kind == ControlKind::RepeatingSection {
                control_name(child).or(section)
            } else {
                section
            };
            if let Some(body) = content(child) {
                collect(body, inner_section, out);
            }
        } else {
            collect(child, section, out);
        }
    }
}

//! DOCX package reading and rewriting
//!
//! A DOCX file is a ZIP archive of XML parts. Filling a template only
//! touches a handful of parts, so the package keeps every entry as raw bytes
//! in archive order and writes them back unchanged unless a part was replaced.

use crate::error::{DocxError, DocxResult};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// Content types part, required in every package
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
/// Main document part
pub const DOCUMENT_PART: &str = "word/document.xml";

/// One entry of the archive
#[derive(Debug, Clone)]
struct PackageEntry {
    name: String,
    is_dir: bool,
    data: Vec<u8>,
}

/// An in-memory DOCX package
#[derive(Debug, Clone)]
pub struct DocxPackage {
    entries: Vec<PackageEntry>,
}

impl DocxPackage {
    /// Read a package from a source that implements Read + Seek
    pub fn from_reader<R: Read + Seek>(reader: R) -> DocxResult<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();
            let is_dir = file.is_dir();
            let mut data = Vec::new();
            if !is_dir {
                file.read_to_end(&mut data)?;
            }
            entries.push(PackageEntry { name, is_dir, data });
        }

        let package = Self { entries };
        if !package.is_valid_docx() {
            return Err(DocxError::InvalidStructure(format!(
                "package must contain {} and {}",
                CONTENT_TYPES_PART, DOCUMENT_PART
            )));
        }

        tracing::debug!("Loaded DOCX package with {} entries", package.entries.len());
        Ok(package)
    }

    /// Read a package from bytes
    pub fn from_bytes(bytes: &[u8]) -> DocxResult<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Read a package from disk
    pub fn open(path: impl AsRef<Path>) -> DocxResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DocxError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path.display()),
                ))
            } else {
                DocxError::Io(e)
            }
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Check if this is a valid DOCX package
    pub fn is_valid_docx(&self) -> bool {
        self.file_exists(CONTENT_TYPES_PART) && self.file_exists(DOCUMENT_PART)
    }

    /// Check if a part exists in the package
    pub fn file_exists(&self, name: &str) -> bool {
        self.entries.iter().any(|e| !e.is_dir && e.name == name)
    }

    /// Names of all parts in archive order
    pub fn part_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| !e.is_dir)
            .map(|e| e.name.as_str())
            .collect()
    }

    /// Raw bytes of a part
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| !e.is_dir && e.name == name)
            .map(|e| e.data.as_slice())
    }

    /// Read a part as a UTF-8 string
    pub fn part_as_string(&self, name: &str) -> DocxResult<String> {
        let data = self
            .part(name)
            .ok_or_else(|| DocxError::MissingPart(name.to_string()))?;
        Ok(String::from_utf8(data.to_vec())?)
    }

    /// Replace a part, or append it if it does not exist yet
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self.entries.iter_mut().find(|e| !e.is_dir && e.name == name) {
            Some(entry) => entry.data = data,
            None => self.entries.push(PackageEntry {
                name: name.to_string(),
                is_dir: false,
                data,
            }),
        }
    }

    /// Parts that may hold content controls: the main document first, then
    /// headers and footers in archive order
    pub fn fillable_parts(&self) -> Vec<String> {
        let mut parts = Vec::new();
        if self.file_exists(DOCUMENT_PART) {
            parts.push(DOCUMENT_PART.to_string());
        }
        for name in self.part_names() {
            if is_header_or_footer(name) {
                parts.push(name.to_string());
            }
        }
        parts
    }

    /// Write the package to a writer
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> DocxResult<W> {
        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);

        for entry in &self.entries {
            if entry.is_dir {
                zip.add_directory(entry.name.as_str(), options)?;
            } else {
                zip.start_file(entry.name.as_str(), options)?;
                zip.write_all(&entry.data)?;
            }
        }

        Ok(zip.finish()?)
    }

    /// Write the package to a byte vector
    pub fn to_bytes(&self) -> DocxResult<Vec<u8>> {
        let cursor = self.write_to(Cursor::new(Vec::new()))?;
        Ok(cursor.into_inner())
    }

    /// Write the package to disk, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> DocxResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

/// `word/headerN.xml` or `word/footerN.xml`
fn is_header_or_footer(name: &str) -> bool {
    let Some(file) = name.strip_prefix("word/") else {
        return false;
    };
    let Some(stem) = file.strip_suffix(".xml") else {
        return false;
    };
    ["header", "footer"].iter().any(|kind| {
        stem.strip_prefix(kind)
            .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
    })
}

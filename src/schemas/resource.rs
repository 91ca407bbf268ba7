use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind tag carried by every committed resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    #[serde(rename = "Link", alias = "link", alias = "LINK")]
    Link,
    #[serde(rename = "PDF", alias = "pdf")]
    Pdf,
    #[serde(rename = "DOC", alias = "doc")]
    Doc,
    #[serde(rename = "DOCX", alias = "docx")]
    Docx,
    #[serde(rename = "PPT", alias = "ppt")]
    Ppt,
    #[serde(rename = "PPTX", alias = "pptx")]
    Pptx,
    #[serde(rename = "XLS", alias = "xls")]
    Xls,
    #[serde(rename = "XLSX", alias = "xlsx")]
    Xlsx,
    #[serde(rename = "ODT", alias = "odt")]
    Odt,
    #[serde(rename = "TXT", alias = "txt")]
    Txt,
}

impl FileType {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Some(FileType::Pdf),
            "doc" => Some(FileType::Doc),
            "docx" => Some(FileType::Docx),
            "ppt" => Some(FileType::Ppt),
            "pptx" => Some(FileType::Pptx),
            "xls" => Some(FileType::Xls),
            "xlsx" => Some(FileType::Xlsx),
            "odt" => Some(FileType::Odt),
            "txt" => Some(FileType::Txt),
            _ => None,
        }
    }

    /// Canonical file extension; `None` for links.
    pub fn extension(self) -> Option<&'static str> {
        match self {
            FileType::Link => None,
            FileType::Pdf => Some("pdf"),
            FileType::Doc => Some("doc"),
            FileType::Docx => Some("docx"),
            FileType::Ppt => Some("ppt"),
            FileType::Pptx => Some("pptx"),
            FileType::Xls => Some("xls"),
            FileType::Xlsx => Some("xlsx"),
            FileType::Odt => Some("odt"),
            FileType::Txt => Some("txt"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileType::Link => "Link",
            FileType::Pdf => "PDF",
            FileType::Doc => "DOC",
            FileType::Docx => "DOCX",
            FileType::Ppt => "PPT",
            FileType::Pptx => "PPTX",
            FileType::Xls => "XLS",
            FileType::Xlsx => "XLSX",
            FileType::Odt => "ODT",
            FileType::Txt => "TXT",
        }
    }

    pub fn is_document(self) -> bool {
        !matches!(self, FileType::Link)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A committed attachment. Identity is its position inside the owning
/// submission or assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub title: String,
    pub resource_link: String,
    pub file_type: FileType,
}

impl Resource {
    pub fn link(title: impl Into<String>, resource_link: impl Into<String>) -> Self {
        Self { title: title.into(), resource_link: resource_link.into(), file_type: FileType::Link }
    }
}

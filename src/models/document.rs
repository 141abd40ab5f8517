use std::path::Path;

/// A report to analyze: raw PDF bytes plus the label used as its result key.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub label: String,
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    pub fn new(label: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            label: label.into(),
            bytes,
        }
    }

    /// Build from an uploaded file name, deriving the label from it.
    pub fn from_bytes(file_name: &str, bytes: Vec<u8>) -> Self {
        Self::new(label_from_file_name(file_name), bytes)
    }

    /// Read a document from disk.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");
        Ok(Self::from_bytes(file_name, bytes))
    }
}

/// Strip a `.pdf` extension (any case). Other names are returned unchanged.
pub fn label_from_file_name(file_name: &str) -> String {
    let path = Path::new(file_name);
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));

    match (is_pdf, path.file_stem().and_then(|s| s.to_str())) {
        (true, Some(stem)) if !stem.is_empty() => stem.to_string(),
        _ => file_name.to_string(),
    }
}

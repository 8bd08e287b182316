//! Core data models for the drafting client.
//!
//! These types mirror the JSON shapes served by the drafting backend and are
//! shared by the HTTP adapter, the workflow controller and the CLI.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

use crate::defaults::NOT_FOUND_SENTINELS;
use crate::error::{Error, Result};

// =============================================================================
// TEMPLATE TYPES
// =============================================================================

/// Input widget kind for a template field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Textarea,
    Date,
    Number,
    Select,
    Multiselect,
    /// Kind added by a newer backend; rendered as plain text.
    #[serde(other)]
    Other,
}

impl FieldKind {
    /// Whether the field is rendered as a multi-line input.
    pub fn is_multiline(&self) -> bool {
        matches!(self, FieldKind::Textarea)
    }
}

/// A single field descriptor within a template schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateField {
    /// Unique key within the template; used as the form data key.
    pub name: String,
    pub label: String,
    #[serde(rename = "type", default)]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    /// Choices for `select` and `multiselect` fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<JsonValue>,
}

/// A parameterized legal-document schema available for drafting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Stable identifier, sent as `template_type` on analysis and generation.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: Vec<TemplateField>,
}

impl Template {
    /// Look up a field descriptor by name.
    pub fn field(&self, name: &str) -> Option<&TemplateField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns true if `name` is part of this template's schema.
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Field names in schema order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

/// Template catalog as served by the backend.
///
/// Older backends return a bare array, newer ones wrap it in `{"templates": [...]}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TemplateCatalog {
    List(Vec<Template>),
    Wrapped { templates: Vec<Template> },
}

impl TemplateCatalog {
    pub fn into_templates(self) -> Vec<Template> {
        match self {
            TemplateCatalog::List(templates) => templates,
            TemplateCatalog::Wrapped { templates } => templates,
        }
    }
}

// =============================================================================
// DOCUMENT TYPES
// =============================================================================

/// A previously ingested document usable as drafting context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub doc_id: String,
    /// Number of indexed text segments (informational only).
    #[serde(default)]
    pub chunks: u64,
}

/// Response body of the document listing endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentList {
    #[serde(default)]
    pub documents: Vec<DocumentSummary>,
}

// =============================================================================
// FORM DATA
// =============================================================================

/// Field name to value mapping collected for the selected template.
///
/// Empty values are never stored: setting a field to `""` removes it, so
/// [`FormData::len`] is always the number of populated fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData(BTreeMap<String, String>);

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field value. An empty value clears the field.
    ///
    /// Returns the previous value, if any.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        if value.is_empty() {
            self.0.remove(&name)
        } else {
            self.0.insert(name, value)
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of populated fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut data = FormData::new();
        for (k, v) in iter {
            data.set(k, v);
        }
        data
    }
}

// =============================================================================
// CONTEXT ANALYSIS
// =============================================================================

/// Outcome of extracting one field from a context document.
///
/// The wire format is string based; sentinels are decoded here so the rest of
/// the client never compares against magic strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedValue {
    /// A positively extracted value.
    Found(String),
    /// The analyzer looked but could not determine the value.
    NotFound,
    /// No value was produced.
    Unset,
}

impl ExtractedValue {
    /// Decode a wire string.
    pub fn from_wire(raw: &str) -> Self {
        if raw.is_empty() {
            ExtractedValue::Unset
        } else if NOT_FOUND_SENTINELS.contains(&raw) {
            ExtractedValue::NotFound
        } else {
            ExtractedValue::Found(raw.to_string())
        }
    }

    /// Decode an arbitrary JSON value.
    ///
    /// Arrays (multiselect extractions) are joined with `", "`; `null` is unset.
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => ExtractedValue::Unset,
            JsonValue::String(s) => Self::from_wire(s),
            JsonValue::Array(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .filter_map(|item| match Self::from_json(item) {
                        ExtractedValue::Found(v) => Some(v),
                        _ => None,
                    })
                    .collect();
                if parts.is_empty() {
                    ExtractedValue::Unset
                } else {
                    ExtractedValue::Found(parts.join(", "))
                }
            }
            other => ExtractedValue::Found(other.to_string()),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, ExtractedValue::Found(_))
    }

    /// The extracted value, if one was found.
    pub fn into_found(self) -> Option<String> {
        match self {
            ExtractedValue::Found(v) => Some(v),
            _ => None,
        }
    }
}

/// Fields extracted from a context document, keyed by field name.
pub type ExtractedFields = BTreeMap<String, ExtractedValue>;

/// Request payload for context analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeContextRequest {
    pub doc_id: String,
    pub template_type: String,
}

/// Response payload of the context analysis endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeContextResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_fields: Option<BTreeMap<String, JsonValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalyzeContextResponse {
    /// Convert into decoded fields, mapping `success: false` to an error.
    pub fn into_extracted(self) -> Result<ExtractedFields> {
        if !self.success {
            return Err(Error::Analysis(
                self.error
                    .unwrap_or_else(|| "analysis reported no success".to_string()),
            ));
        }
        Ok(self
            .extracted_fields
            .unwrap_or_default()
            .iter()
            .map(|(name, value)| (name.clone(), ExtractedValue::from_json(value)))
            .collect())
    }
}

// =============================================================================
// DRAFT GENERATION
// =============================================================================

/// Request payload for draft generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateDraftRequest {
    pub template_type: String,
    pub user_inputs: FormData,
    pub enhance: bool,
}

/// Downloadable artifact format, encoded by the filename extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftFormat {
    Docx,
    Txt,
}

impl DraftFormat {
    /// Infer the format from a filename extension (case-insensitive).
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "docx" => Some(DraftFormat::Docx),
            "txt" => Some(DraftFormat::Txt),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DraftFormat::Docx => "docx",
            DraftFormat::Txt => "txt",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            DraftFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            DraftFormat::Txt => "text/plain",
        }
    }
}

/// A generated draft returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftResult {
    /// Generated document body for preview.
    pub full_text: String,
    /// Name under which the artifact can be downloaded.
    pub filename: String,
    /// Citations inserted by the generator.
    #[serde(default)]
    pub citations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_time: Option<NaiveDateTime>,
}

impl DraftResult {
    /// Parse a generation response body.
    ///
    /// The backend reports failures in-band as `{"success": false, "error": ...}`.
    pub fn from_response(body: JsonValue) -> Result<Self> {
        if body.get("success").and_then(JsonValue::as_bool) == Some(false) {
            let message = body
                .get("error")
                .and_then(JsonValue::as_str)
                .unwrap_or("generation reported no success")
                .to_string();
            return Err(Error::Generation(message));
        }
        Ok(serde_json::from_value(body)?)
    }

    pub fn format(&self) -> Option<DraftFormat> {
        DraftFormat::from_filename(&self.filename)
    }

    pub fn citation_count(&self) -> usize {
        self.citations.len()
    }
}

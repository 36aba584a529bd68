//! Tag-delimited field extraction
//!
//! LLM responses are free-form text. Stages ask the model to wrap each field in
//! `<field>...</field>` markers and pull the values back out here. Extraction is
//! best-effort: a field whose markers are missing or out of order is simply
//! absent from the result. Nothing in this module returns an error.

use std::collections::HashMap;

use crate::log_debug;

/// One expected field: the tag searched for in the response and the key the
/// value is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub tag: String,
    pub key: String,
}

impl FieldSpec {
    /// A field keyed by its literal tag
    pub fn literal(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            key: tag.to_string(),
        }
    }

    /// A field whose output key differs from its tag
    pub fn renamed(tag: &str, key: &str) -> Self {
        Self {
            tag: tag.to_string(),
            key: key.to_string(),
        }
    }
}

/// Named, ordered list of fields expected for one call purpose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionSchema {
    name: String,
    fields: Vec<FieldSpec>,
}

impl ExtractionSchema {
    pub fn new(name: &str, fields: Vec<FieldSpec>) -> Self {
        Self {
            name: name.to_string(),
            fields,
        }
    }

    /// Schema of literal fields, keyed by tag
    pub fn literal(name: &str, tags: &[&str]) -> Self {
        Self::new(name, tags.iter().map(|t| FieldSpec::literal(t)).collect())
    }

    /// Schema of `count` ordinal fields tagged `{tag_prefix}1..` and keyed
    /// `{key_prefix}_1..`, followed by `extra` literal fields.
    pub fn ordinal(
        name: &str,
        tag_prefix: &str,
        key_prefix: &str,
        count: usize,
        extra: &[&str],
    ) -> Self {
        let mut fields: Vec<FieldSpec> = (1..=count)
            .map(|i| FieldSpec::renamed(&format!("{tag_prefix}{i}"), &format!("{key_prefix}_{i}")))
            .collect();
        fields.extend(extra.iter().map(|t| FieldSpec::literal(t)));
        Self::new(name, fields)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }
}

/// Finds one `<tag>...</tag>` pair in a response.
#[derive(Debug, Clone)]
pub struct TagScanner {
    open: String,
    close: String,
}

impl TagScanner {
    pub fn new(tag: &str) -> Self {
        Self {
            open: format!("<{tag}>"),
            close: format!("</{tag}>"),
        }
    }

    /// Trimmed content between the first start marker and the first end
    /// marker. `None` when either marker is missing or the first end marker
    /// precedes the content start.
    pub fn scan<'a>(&self, text: &'a str) -> Option<&'a str> {
        let start = text.find(&self.open)? + self.open.len();
        let end = text.find(&self.close)?;
        if end < start {
            return None;
        }
        text.get(start..end).map(str::trim)
    }
}

/// Fields pulled from one response, keyed by each field's output key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    values: HashMap<String, String>,
}

impl ExtractedFields {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Removes and returns a field
    pub fn take(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

/// Extract every field of `schema` present in `raw`.
pub fn extract(raw: &str, schema: &ExtractionSchema) -> ExtractedFields {
    let mut values = HashMap::new();
    for field in schema.fields() {
        if let Some(value) = TagScanner::new(&field.tag).scan(raw) {
            values.insert(field.key.clone(), value.to_string());
        }
    }

    let fields = ExtractedFields { values };
    if fields.is_empty() && !raw.trim().is_empty() {
        crate::log_warn!(
            "No {} fields found in response. Raw content: {}",
            schema.name(),
            raw.chars().take(500).collect::<String>()
        );
    } else {
        let mut found: Vec<&str> = fields.keys().collect();
        found.sort_unstable();
        log_debug!(
            "Extracted {}/{} {} fields: {}",
            fields.len(),
            schema.fields().len(),
            schema.name(),
            found.join(", ")
        );
    }

    fields
}

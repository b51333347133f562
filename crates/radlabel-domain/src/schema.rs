//! Schema module - the declared findings a model is asked to populate

use crate::label::LabelRecord;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Errors raised while constructing a schema
///
/// All of these surface before any prompting happens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The schema declares no findings
    #[error("Schema must declare at least one finding")]
    Empty,

    /// A finding name is empty or whitespace
    #[error("Finding names cannot be empty")]
    EmptyName,

    /// A finding name appears more than once
    #[error("Duplicate finding name: {0}")]
    DuplicateFinding(String),

    /// A finding declares a type we cannot render or validate
    #[error("Unsupported type '{value_type}' for finding '{name}'")]
    UnsupportedType {
        /// Finding that carried the type
        name: String,
        /// The rejected type string
        value_type: String,
    },

    /// The schema text is not a JSON object of type descriptors
    #[error("Malformed schema: {0}")]
    Parse(String),
}

/// Declared value type of a finding
///
/// Boolean is what report labeling needs; the other scalars let the same
/// schema carry counts, measurements or free-text notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindingType {
    /// `true` / `false`
    Boolean,

    /// Whole number
    Integer,

    /// Any JSON number
    Number,

    /// Free text
    String,
}

impl FindingType {
    /// Get the type name as it appears in a rendered schema
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingType::Boolean => "boolean",
            FindingType::Integer => "integer",
            FindingType::Number => "number",
            FindingType::String => "string",
        }
    }

    /// Parse a type name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "boolean" | "bool" => Some(FindingType::Boolean),
            "integer" => Some(FindingType::Integer),
            "number" => Some(FindingType::Number),
            "string" => Some(FindingType::String),
            _ => None,
        }
    }

    /// Whether a JSON value carries this type
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FindingType::Boolean => value.is_boolean(),
            FindingType::Integer => value.is_i64() || value.is_u64(),
            FindingType::Number => value.is_number(),
            FindingType::String => value.is_string(),
        }
    }
}

impl fmt::Display for FindingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindingSpec {
    /// Finding name, unique within a schema
    pub name: String,

    /// Declared value type
    pub value_type: FindingType,

    /// Optional hint rendered next to the type
    pub description: Option<String>,
}

impl FindingSpec {
    /// A finding without a description
    pub fn new(name: impl Into<String>, value_type: FindingType) -> Self {
        Self {
            name: name.into(),
            value_type,
            description: None,
        }
    }

    /// Attach a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Ordered, immutable set of findings to extract
///
/// Order is insertion order and is preserved in [`SchemaSpec::render`] so the
/// prompt text is stable across runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaSpec {
    findings: Vec<FindingSpec>,
}

impl SchemaSpec {
    /// Build a schema from declared findings
    ///
    /// # Errors
    /// Returns error if the list is empty, a name is blank, or a name repeats
    pub fn new(findings: Vec<FindingSpec>) -> Result<Self, SchemaError> {
        if findings.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut seen = HashSet::with_capacity(findings.len());
        for finding in &findings {
            if finding.name.trim().is_empty() {
                return Err(SchemaError::EmptyName);
            }
            if !seen.insert(finding.name.as_str()) {
                return Err(SchemaError::DuplicateFinding(finding.name.clone()));
            }
        }

        Ok(Self { findings })
    }

    /// Build an all-boolean schema from finding names
    ///
    /// # Examples
    ///
    /// ```
    /// use radlabel_domain::SchemaSpec;
    ///
    /// let schema = SchemaSpec::booleans(["pneumothorax", "pleural_effusion"]).unwrap();
    /// assert_eq!(
    ///     schema.render(),
    ///     r#"{"pneumothorax": {"type": "boolean"}, "pleural_effusion": {"type": "boolean"}}"#
    /// );
    /// ```
    pub fn booleans<I, S>(names: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            names
                .into_iter()
                .map(|name| FindingSpec::new(name, FindingType::Boolean))
                .collect(),
        )
    }

    /// Parse the JSON schema input format
    ///
    /// Keys are finding names; each value is an object with at least a
    /// `type` field. Duplicate keys in the text are rejected rather than
    /// collapsed.
    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        let raw: RawSchema =
            serde_json::from_str(text).map_err(|e| SchemaError::Parse(e.to_string()))?;
        raw.into_schema()
    }

    /// Declared findings, in order
    pub fn findings(&self) -> &[FindingSpec] {
        &self.findings
    }

    /// Finding names, in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.findings.iter().map(|f| f.name.as_str())
    }

    /// Look up a finding by name
    pub fn get(&self, name: &str) -> Option<&FindingSpec> {
        self.findings.iter().find(|f| f.name == name)
    }

    /// Whether the schema declares a finding
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of findings
    pub fn len(&self) -> usize {
        self.findings.len()
    }

    /// Always false for a constructed schema; present for API symmetry
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Render the schema as a single-line JSON text block for the prompt
    pub fn render(&self) -> String {
        let entries: Vec<String> = self
            .findings
            .iter()
            .map(|finding| {
                let mut descriptor = format!("{{\"type\": \"{}\"", finding.value_type.as_str());
                if let Some(description) = &finding.description {
                    descriptor.push_str(", \"description\": ");
                    descriptor.push_str(&json_string(description));
                }
                descriptor.push('}');
                format!("{}: {}", json_string(&finding.name), descriptor)
            })
            .collect();

        format!("{{{}}}", entries.join(", "))
    }

    /// Compare an extracted record against the schema
    pub fn validate(&self, record: &LabelRecord) -> ValidationReport {
        let mut report = ValidationReport::default();

        for key in record.keys() {
            if !self.contains(key) {
                report.unexpected.push(key.to_string());
            }
        }

        for finding in &self.findings {
            match record.get(&finding.name) {
                None | Some(Value::Null) => report.missing.push(finding.name.clone()),
                Some(value) if !finding.value_type.matches(value) => {
                    report.mistyped.push(finding.name.clone())
                }
                Some(_) => {}
            }
        }

        report
    }

    /// Normalize a record to exactly the declared findings
    ///
    /// Unexpected keys are dropped, missing and mistyped findings become
    /// `null`, and keys follow schema order.
    pub fn conform(&self, record: &LabelRecord) -> LabelRecord {
        let mut conformed = LabelRecord::new();
        for finding in &self.findings {
            let value = match record.get(&finding.name) {
                Some(value) if finding.value_type.matches(value) => value.clone(),
                _ => Value::Null,
            };
            conformed.insert(finding.name.clone(), value);
        }
        conformed
    }
}

impl<'de> Deserialize<'de> for SchemaSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawSchema::deserialize(deserializer)?
            .into_schema()
            .map_err(de::Error::custom)
    }
}

/// Outcome of [`SchemaSpec::validate`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Keys the model produced that the schema does not declare
    pub unexpected: Vec<String>,

    /// Declared findings absent from the record, or `null`
    pub missing: Vec<String>,

    /// Declared findings whose value has the wrong type
    pub mistyped: Vec<String>,
}

impl ValidationReport {
    /// True when the record matches the schema exactly
    pub fn is_clean(&self) -> bool {
        self.unexpected.is_empty() && self.missing.is_empty() && self.mistyped.is_empty()
    }
}

#[derive(Deserialize)]
struct FindingDescriptor {
    #[serde(rename = "type")]
    value_type: String,
    #[serde(default)]
    description: Option<String>,
}

/// Schema entries in document order, duplicates included
struct RawSchema(Vec<(String, FindingDescriptor)>);

impl RawSchema {
    fn into_schema(self) -> Result<SchemaSpec, SchemaError> {
        let findings = self
            .0
            .into_iter()
            .map(|(name, descriptor)| {
                let value_type = FindingType::parse(&descriptor.value_type).ok_or_else(|| {
                    SchemaError::UnsupportedType {
                        name: name.clone(),
                        value_type: descriptor.value_type.clone(),
                    }
                })?;
                Ok(FindingSpec {
                    name,
                    value_type,
                    description: descriptor.description,
                })
            })
            .collect::<Result<Vec<_>, SchemaError>>()?;

        SchemaSpec::new(findings)
    }
}

impl<'de> Deserialize<'de> for RawSchema {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RawSchemaVisitor;

        impl<'de> Visitor<'de> for RawSchemaVisitor {
            type Value = RawSchema;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping finding names to type descriptors")
            }

            fn visit_map<A>(self, mut map: A) -> Result<RawSchema, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, FindingDescriptor>()? {
                    entries.push(entry);
                }
                Ok(RawSchema(entries))
            }
        }

        deserializer.deserialize_map(RawSchemaVisitor)
    }
}

fn json_string(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

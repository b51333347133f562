//! Request types for prompt composition

/// Everything needed to build one prompt
///
/// Built per report, consumed by the composer, then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    /// Role instruction for the system slot
    pub system_instruction: String,

    /// Rendered schema text
    pub schema_text: String,

    /// Free-text report body
    pub report_text: String,

    /// Extra task instructions appended after the schema
    pub instructions: Option<String>,

    /// Registry key of the target chat template
    pub model_family: String,
}

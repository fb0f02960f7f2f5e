use inference::InferenceError;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TriageError;

/// Literal used in every field of a rejected report.
pub const SPAM: &str = "SPAM";

/// Locator of the source image. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference(String);

impl ImageReference {
    /// Trims the input and rejects blank references.
    pub fn parse(raw: &str) -> Result<Self, TriageError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TriageError::EmptyReference);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fetched image bytes, base64-encoded for inline transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub media_type: &'static str,
    /// Standard-alphabet, padded base64.
    pub payload: String,
}

/// Fields pulled out of a classification reply. Empty string means the label was never seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFields {
    pub title: String,
    pub kind: String,
    pub description: String,
}

impl ParsedFields {
    pub fn is_complete(&self) -> bool {
        !self.title.is_empty() && !self.kind.is_empty() && !self.description.is_empty()
    }
}

/// The externally visible result: either fully populated or the uniform SPAM sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyReport {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
}

impl EmergencyReport {
    pub fn spam() -> Self {
        Self {
            title: SPAM.to_string(),
            kind: SPAM.to_string(),
            description: SPAM.to_string(),
        }
    }

    pub fn is_spam(&self) -> bool {
        self.title == SPAM && self.kind == SPAM && self.description == SPAM
    }
}

impl From<ParsedFields> for EmergencyReport {
    fn from(fields: ParsedFields) -> Self {
        Self {
            title: fields.title,
            kind: fields.kind,
            description: fields.description,
        }
    }
}

/// Closed label set the classifier is asked to choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmergencyType {
    Theft,
    Harassment,
    Accident,
    Violence,
    Bullying,
    Garbage,
    #[serde(rename = "Fire outbreak")]
    FireOutbreak,
    #[serde(rename = "Water Leakage")]
    WaterLeakage,
    Other,
    #[serde(rename = "SPAM")]
    Spam,
}

impl EmergencyType {
    pub const ALL: [EmergencyType; 10] = [
        EmergencyType::Theft,
        EmergencyType::Harassment,
        EmergencyType::Accident,
        EmergencyType::Violence,
        EmergencyType::Bullying,
        EmergencyType::Garbage,
        EmergencyType::FireOutbreak,
        EmergencyType::WaterLeakage,
        EmergencyType::Other,
        EmergencyType::Spam,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EmergencyType::Theft => "Theft",
            EmergencyType::Harassment => "Harassment",
            EmergencyType::Accident => "Accident",
            EmergencyType::Violence => "Violence",
            EmergencyType::Bullying => "Bullying",
            EmergencyType::Garbage => "Garbage",
            EmergencyType::FireOutbreak => "Fire outbreak",
            EmergencyType::WaterLeakage => "Water Leakage",
            EmergencyType::Other => "Other",
            EmergencyType::Spam => SPAM,
        }
    }

    /// Case-insensitive lookup of a canonical label; surrounding whitespace is ignored.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str().eq_ignore_ascii_case(label))
    }

    /// Labels offered to the classifier as real emergencies (everything but SPAM).
    pub fn emergency_labels() -> impl Iterator<Item = &'static str> {
        Self::ALL
            .into_iter()
            .filter(|ty| *ty != EmergencyType::Spam)
            .map(EmergencyType::as_str)
    }
}

impl fmt::Display for EmergencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One sequential unit of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Fetching,
    Describing,
    Classifying,
    Parsing,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Fetching => "fetching",
            Stage::Describing => "describing",
            Stage::Classifying => "classifying",
            Stage::Parsing => "parsing",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an inference stage produced fallback content instead of the model's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degraded {
    Timeout,
    Inference(InferenceError),
    /// The response had no `candidates[0].content.parts[0].text`.
    MissingText,
    /// The model answered with nothing but whitespace.
    BlankReply,
}

impl fmt::Display for Degraded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degraded::Timeout => f.write_str("stage deadline exceeded"),
            Degraded::Inference(err) => write!(f, "{err}"),
            Degraded::MissingText => f.write_str("response carried no text part"),
            Degraded::BlankReply => f.write_str("blank reply"),
        }
    }
}

/// Text produced by an inference stage, plus the reason it was substituted, if it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageText {
    pub text: String,
    pub degraded: Option<Degraded>,
}

impl StageText {
    pub fn answered(text: String) -> Self {
        Self {
            text,
            degraded: None,
        }
    }

    pub fn substituted(text: impl Into<String>, reason: Degraded) -> Self {
        Self {
            text: text.into(),
            degraded: Some(reason),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

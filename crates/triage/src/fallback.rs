use tracing::debug;

use crate::{EmergencyReport, EmergencyType, ParsedFields, TypePolicy};

/// Decides between the parsed report and the uniform SPAM sentinel.
///
/// A report with any empty field is never surfaced; consumers either get
/// three real values or three `"SPAM"`s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FallbackPolicy {
    type_policy: TypePolicy,
}

impl FallbackPolicy {
    pub fn new(type_policy: TypePolicy) -> Self {
        Self { type_policy }
    }

    pub fn type_policy(&self) -> TypePolicy {
        self.type_policy
    }

    pub fn apply(&self, fields: ParsedFields) -> EmergencyReport {
        if !fields.is_complete() {
            debug!(
                has_title = !fields.title.is_empty(),
                has_type = !fields.kind.is_empty(),
                has_description = !fields.description.is_empty(),
                "fallback_incomplete"
            );
            return EmergencyReport::spam();
        }

        match self.type_policy {
            TypePolicy::Passthrough => fields.into(),
            TypePolicy::Strict => match EmergencyType::from_label(&fields.kind) {
                Some(EmergencyType::Spam) | None => {
                    debug!(kind = %fields.kind, "fallback_rejected_type");
                    EmergencyReport::spam()
                }
                Some(ty) => EmergencyReport {
                    title: fields.title,
                    kind: ty.as_str().to_string(),
                    description: fields.description,
                },
            },
        }
    }
}

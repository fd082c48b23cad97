use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredIssue {
    pub kind: String,
    pub severity: IssueSeverity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub future_id: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl StructuredIssue {
    pub fn error(kind: impl Into<String>, future_id: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            severity: IssueSeverity::Error,
            future_id: future_id.map(str::to_string),
            message: message.into(),
            reference: None,
        }
    }

    pub fn warning(kind: impl Into<String>, future_id: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Warning,
            ..Self::error(kind, future_id, message)
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn sort_stable(issues: &mut [Self]) {
        issues.sort_by(|left, right| {
            (left.severity, &left.kind, &left.future_id, &left.message).cmp(&(
                right.severity,
                &right.kind,
                &right.future_id,
                &right.message,
            ))
        });
    }

    pub fn has_errors(issues: &[Self]) -> bool {
        issues
            .iter()
            .any(|issue| issue.severity == IssueSeverity::Error)
    }
}

impl std::fmt::Display for StructuredIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.future_id {
            Some(future_id) => write!(f, "[{}] {}: {}", self.kind, future_id, self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

#[cfg(test)]
#[path = "issues_test.rs"]
mod tests;

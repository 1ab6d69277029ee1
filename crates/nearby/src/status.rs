use std::fmt;

/// Prefix carried by every message that describes locally substituted data.
pub const DEGRADED_MARKER: &str = "Demo:";

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    /// The remote collaborators answered and the result is authoritative.
    Success,
    /// The directory was unreachable and demo data stands in for its answer.
    Degraded,
    /// The workflow stopped; shared state was left untouched.
    Failed,
}

/// User-facing outcome of a workflow.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub message: String,
}

impl Status {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            message: message.into(),
        }
    }

    /// Degraded status; the demo marker is prepended unless already present.
    pub fn degraded(message: impl AsRef<str>) -> Self {
        let message = message.as_ref();
        let message = if message.starts_with(DEGRADED_MARKER) {
            message.to_string()
        } else {
            format!("{DEGRADED_MARKER} {message}")
        };
        Self {
            kind: StatusKind::Degraded,
            message,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Failed,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == StatusKind::Success
    }

    pub fn is_degraded(&self) -> bool {
        self.kind == StatusKind::Degraded
    }

    pub fn is_failure(&self) -> bool {
        self.kind == StatusKind::Failed
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

//! The pending outbound draft.

/// Not-yet-sent text held by the local input state.
///
/// A send clears the draft only on success; on failure it is preserved so
/// the user can retry manually.
#[derive(Debug, Clone, Default)]
pub struct Draft {
    text: String,
}

impl Draft {
    /// Create an empty draft.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the draft text.
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// The current draft text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Clear the draft after a successful send.
    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Whether the draft is empty or whitespace-only, i.e. not sendable.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

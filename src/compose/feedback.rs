/// Success / error acknowledgement panels
use crate::error::ComposerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Success,
    Error,
}

/// What the panel's primary button does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackAction {
    Dismiss,
    /// Dismiss and open the file picker again
    ReopenPicker,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub title: String,
    pub action: FeedbackAction,
}

impl Feedback {
    pub fn success() -> Self {
        Self {
            kind: FeedbackKind::Success,
            title: "Image uploaded successfully".to_string(),
            action: FeedbackAction::Dismiss,
        }
    }

    pub fn from_error(err: &ComposerError) -> Self {
        let action = if err.reopens_picker() {
            FeedbackAction::ReopenPicker
        } else {
            FeedbackAction::Dismiss
        };
        Self {
            kind: FeedbackKind::Error,
            title: err.to_string(),
            action,
        }
    }

    pub fn button_label(&self) -> &'static str {
        match (self.kind, self.action) {
            (FeedbackKind::Success, _) => "Cool!",
            (FeedbackKind::Error, FeedbackAction::ReopenPicker) => "Pick another file",
            (FeedbackKind::Error, FeedbackAction::Dismiss) => "Try again",
        }
    }
}

/// State of one composition session
///
/// Created when the composer opens, mutated by every interaction and
/// reset in full when it closes. Owned by the `Composer`; nothing here
/// is global.
use crate::compose::effects::{Capability, EffectEngine};
use crate::compose::preview::PreviewHandle;
use crate::compose::scale::ScaleControl;
use crate::error::TransportError;
use crate::state::data::SelectedFile;
use crate::state::edit::EditParams;

/// Text fields of the composer form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Hashtags,
    Comment,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Validating,
    Sending,
    Success,
    Failed(TransportError),
}

impl SubmissionStatus {
    pub fn is_sending(&self) -> bool {
        matches!(self, SubmissionStatus::Sending)
    }
}

#[derive(Debug)]
pub struct CompositionState {
    pub selected_file: Option<SelectedFile>,
    pub preview: Option<PreviewHandle>,
    pub scale: ScaleControl,
    pub effects: EffectEngine,
    pub hashtags: String,
    pub comment: String,
    /// Inline message under the hashtag field
    pub hashtag_error: Option<String>,
    /// Inline message under the comment field
    pub comment_error: Option<String>,
    pub status: SubmissionStatus,
    /// Text field holding input focus, if any
    pub focus: Option<Field>,
}

impl CompositionState {
    pub fn new(capability: Capability) -> Self {
        Self {
            selected_file: None,
            preview: None,
            scale: ScaleControl::default(),
            effects: EffectEngine::new(capability),
            hashtags: String::new(),
            comment: String::new(),
            hashtag_error: None,
            comment_error: None,
            status: SubmissionStatus::Idle,
            focus: None,
        }
    }

    /// Snapshot of the preview edits
    pub fn edits(&self) -> EditParams {
        EditParams::capture(&self.scale, &self.effects)
    }

    /// Reset controls and form fields to their defaults
    ///
    /// File and preview ownership is handled by the modal lifecycle.
    pub fn reset_form(&mut self) {
        self.scale.reset();
        self.effects.reset();
        self.hashtags.clear();
        self.comment.clear();
        self.hashtag_error = None;
        self.comment_error = None;
        self.status = SubmissionStatus::Idle;
        self.focus = None;
    }

    pub fn is_sending(&self) -> bool {
        self.status.is_sending()
    }

    /// Submit control label
    pub fn submit_label(&self) -> &'static str {
        if self.is_sending() {
            "Publishing..."
        } else {
            "Publish"
        }
    }

    /// The submit control is locked only while a transmission is in flight
    pub fn submit_enabled(&self) -> bool {
        !self.is_sending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::effects::Effect;

    #[test]
    fn test_reset_form() {
        let mut state = CompositionState::new(Capability::Full);
        state.scale.decrease();
        state.effects.select_effect(Effect::Sepia);
        state.hashtags.push_str("#a");
        state.comment.push_str("hello");
        state.hashtag_error = Some("bad".into());
        state.focus = Some(Field::Comment);

        state.reset_form();

        assert!(state.edits().is_unedited());
        assert!(state.hashtags.is_empty());
        assert!(state.comment.is_empty());
        assert!(state.hashtag_error.is_none());
        assert!(state.focus.is_none());
        assert_eq!(state.status, SubmissionStatus::Idle);
    }

    #[test]
    fn test_submit_control_locks_while_sending() {
        let mut state = CompositionState::new(Capability::Full);
        assert!(state.submit_enabled());
        assert_eq!(state.submit_label(), "Publish");

        state.status = SubmissionStatus::Sending;
        assert!(!state.submit_enabled());
        assert_eq!(state.submit_label(), "Publishing...");
    }
}

/// Submission pipeline: validate -> lock -> transmit -> unlock -> route
///
/// The pipeline is split around its one suspension point. [`begin`]
/// validates and locks, handing back the payload to transmit; [`finish`]
/// takes the transport result, unlocks and decides the feedback.
use tracing::{debug, info, warn};

use crate::compose::feedback::Feedback;
use crate::compose::validation::{validate_comment, validate_hashtags};
use crate::error::TransportError;
use crate::state::composition::{CompositionState, Field, SubmissionStatus};

/// Multipart body sent to the server
#[derive(Clone, PartialEq)]
pub struct Payload {
    pub file_name: String,
    pub mime: &'static str,
    pub file_bytes: Vec<u8>,
    /// Space-joined hashtags
    pub hashtags: String,
    pub description: String,
    /// e.g. "75%"
    pub scale: String,
    pub effect: String,
    /// Empty when no effect is applied
    pub effect_level: String,
}

impl std::fmt::Debug for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Payload")
            .field("file_name", &self.file_name)
            .field("bytes", &self.file_bytes.len())
            .field("hashtags", &self.hashtags)
            .field("description", &self.description)
            .field("scale", &self.scale)
            .field("effect", &self.effect)
            .field("effect_level", &self.effect_level)
            .finish()
    }
}

/// Result of starting a submission
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Validation failed; the field to bring into view
    Invalid(Field),
    /// A transmission is already in flight
    Busy,
    /// No file has been accepted
    NothingToSend,
    /// Locked and ready: transmit this payload
    Send(Payload),
}

/// Result of a finished transmission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitCompletion {
    /// Sent; the composer closes and a success panel follows shortly
    Delivered,
    /// Not sent; the form stays open with its contents
    Failed(Feedback),
}

/// Re-run both validators and store their inline messages
///
/// Returns the first failing field, in form order.
pub fn validate_fields(state: &mut CompositionState) -> Option<Field> {
    let hashtags = validate_hashtags(&state.hashtags);
    let comment = validate_comment(&state.comment);
    state.hashtag_error = hashtags.first_message();
    state.comment_error = comment.message();

    if !hashtags.ok {
        Some(Field::Hashtags)
    } else if !comment.ok {
        Some(Field::Comment)
    } else {
        None
    }
}

pub fn begin(state: &mut CompositionState) -> SubmitOutcome {
    if state.is_sending() {
        return SubmitOutcome::Busy;
    }

    state.status = SubmissionStatus::Validating;
    if let Some(field) = validate_fields(state) {
        state.status = SubmissionStatus::Idle;
        info!(?field, "submission blocked by validation");
        return SubmitOutcome::Invalid(field);
    }

    let Some(file) = state.selected_file.as_ref() else {
        state.status = SubmissionStatus::Idle;
        return SubmitOutcome::NothingToSend;
    };

    let edits = state.edits();
    if let Ok(json) = edits.to_json() {
        debug!(edits = %json, unedited = edits.is_unedited(), "preview edits captured");
    }
    let payload = Payload {
        file_name: file.name.clone(),
        mime: file.mime(),
        file_bytes: file.bytes.clone(),
        hashtags: state.hashtags.split_whitespace().collect::<Vec<_>>().join(" "),
        description: state.comment.clone(),
        scale: edits.scale_text(),
        effect: edits.effect.as_str().to_string(),
        effect_level: edits.effect_level_text(),
    };

    state.status = SubmissionStatus::Sending;
    info!(?payload, "submission started");
    SubmitOutcome::Send(payload)
}

/// Record the transport result and unlock the submit control
///
/// Closing the composer on success is the caller's job.
pub fn finish(state: &mut CompositionState, result: Result<(), TransportError>) -> SubmitCompletion {
    match result {
        Ok(()) => {
            state.status = SubmissionStatus::Success;
            info!("submission delivered");
            SubmitCompletion::Delivered
        }
        Err(err) => {
            warn!(error = %err, detail = err.detail().unwrap_or_default(), "submission failed");
            let feedback = Feedback::from_error(&err.clone().into());
            state.status = SubmissionStatus::Failed(err);
            SubmitCompletion::Failed(feedback)
        }
    }
}

/// Feedback dismissed: terminal states fall back to idle
pub fn acknowledge(state: &mut CompositionState) {
    if matches!(
        state.status,
        SubmissionStatus::Success | SubmissionStatus::Failed(_)
    ) {
        state.status = SubmissionStatus::Idle;
    }
}

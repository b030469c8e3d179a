//! Upload composer
//!
//! This module holds the composer's engines:
//! - Field validation (validation.rs)
//! - Filters and their intensity (effects.rs)
//! - Preview zoom (scale.rs)
//! - Preview handles and pixel rendering (preview.rs)
//! - Open/close lifecycle and the modal stack (modal.rs)
//! - Submission pipeline (submission.rs)
//! - Success and error panels (feedback.rs)
//!
//! [`Composer`] wires them into one session and is the only type the UI
//! talks to.

pub mod effects;
pub mod feedback;
pub mod modal;
pub mod preview;
pub mod scale;
pub mod submission;
pub mod validation;

use image::RgbaImage;
use tracing::{debug, info};

use crate::config::ComposerConfig;
use crate::error::{ComposerError, ResourceError, TransportError};
use crate::state::composition::{CompositionState, Field, SubmissionStatus};
use crate::state::data::SelectedFile;

use self::effects::{Effect, IntensityRange, Rendering};
use self::feedback::Feedback;
use self::modal::{CloseOutcome, ModalLifecycle, ModalStack};
use self::scale::ScaleReading;
use self::submission::{SubmitCompletion, SubmitOutcome};
use self::validation::{validate_comment, validate_hashtags};

#[derive(Debug)]
pub struct Composer {
    state: CompositionState,
    modal: ModalLifecycle,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new(&ComposerConfig::default())
    }
}

impl Composer {
    pub fn new(config: &ComposerConfig) -> Self {
        Self {
            state: CompositionState::new(config.capability()),
            modal: ModalLifecycle::new(config.preview_max_edge),
        }
    }

    /// A file was picked; decode it with [`preview::decode`] and pass the
    /// result to [`Composer::finish_open`]
    ///
    /// Refused with [`ComposerError::Busy`] while a send is in flight, so
    /// the session being sent is never replaced.
    pub fn begin_open(&mut self, stack: &mut ModalStack, file: &SelectedFile) -> Result<(), ComposerError> {
        self.modal.begin_open(&mut self.state, stack, file)
    }

    /// Preview decoded; returns `Ok(true)` once the composer is showing
    ///
    /// On error the composer stays closed; show the returned error as
    /// feedback.
    pub fn finish_open(
        &mut self,
        stack: &mut ModalStack,
        decoded: Result<(SelectedFile, RgbaImage), ResourceError>,
    ) -> Result<bool, ComposerError> {
        self.modal.finish_open(&mut self.state, stack, decoded)
    }

    #[cfg(test)]
    pub fn open(&mut self, stack: &mut ModalStack, file: SelectedFile) -> Result<(), ComposerError> {
        self.modal.open(&mut self.state, stack, file)
    }

    /// Longest preview edge to decode to
    pub fn preview_edge(&self) -> u32 {
        self.modal.previews().max_edge()
    }

    /// Cancel button
    ///
    /// Refused while a transmission is in flight.
    pub fn close(&mut self, stack: &mut ModalStack) -> CloseOutcome {
        if !self.modal.is_open() {
            return CloseOutcome::AlreadyClosed;
        }
        if self.state.is_sending() {
            debug!("close refused while sending");
            return CloseOutcome::Blocked;
        }
        self.modal.close(&mut self.state, stack);
        CloseOutcome::Closed
    }

    /// Escape reached the composer layer
    pub fn escape(&mut self, stack: &mut ModalStack) -> CloseOutcome {
        if !self.modal.is_open() {
            return CloseOutcome::AlreadyClosed;
        }
        if self.state.is_sending() {
            return CloseOutcome::Blocked;
        }
        if !self.modal.escape_armed(&self.state, stack) {
            return CloseOutcome::Suspended;
        }
        self.close(stack)
    }

    pub fn select_effect(&mut self, effect: Effect) -> Option<IntensityRange> {
        self.state.effects.select_effect(effect)
    }

    pub fn set_intensity(&mut self, value: f64) -> Rendering {
        self.state.effects.set_intensity(value)
    }

    pub fn scale_up(&mut self) -> ScaleReading {
        self.state.scale.increase()
    }

    pub fn scale_down(&mut self) -> ScaleReading {
        self.state.scale.decrease()
    }

    /// Hashtag field edited; validated live
    pub fn edit_hashtags(&mut self, text: String) {
        self.state.hashtag_error = validate_hashtags(&text).first_message();
        self.state.hashtags = text;
    }

    /// Comment field edited; validated live
    pub fn edit_comment(&mut self, text: String) {
        self.state.comment_error = validate_comment(&text).message();
        self.state.comment = text;
    }

    /// A text field gained focus: Escape stops closing the composer
    pub fn focus_field(&mut self, field: Field) {
        self.state.focus = Some(field);
    }

    /// Focus left the text fields: Escape closes the composer again
    pub fn blur_field(&mut self) {
        self.state.focus = None;
    }

    /// Validate and lock; returns the payload to transmit
    pub fn submit(&mut self) -> SubmitOutcome {
        if !self.modal.is_open() {
            return SubmitOutcome::NothingToSend;
        }
        submission::begin(&mut self.state)
    }

    /// Transport finished; closes the composer on success
    pub fn complete_submission(
        &mut self,
        stack: &mut ModalStack,
        result: Result<(), TransportError>,
    ) -> SubmitCompletion {
        let completion = submission::finish(&mut self.state, result);
        if completion == SubmitCompletion::Delivered {
            self.modal.close(&mut self.state, stack);
            // Pending acknowledgement survives the reset
            self.state.status = SubmissionStatus::Success;
            info!("composition published");
        }
        completion
    }

    /// Feedback panel dismissed
    pub fn acknowledge(&mut self) {
        submission::acknowledge(&mut self.state);
    }

    /// Feedback for a failed open
    pub fn open_failure(err: &ComposerError) -> Feedback {
        Feedback::from_error(err)
    }

    /// Source pixels and the filter to apply, for rendering off the UI
    /// thread with [`preview::render`]
    pub fn preview_job(&self) -> Option<(RgbaImage, Rendering)> {
        let handle = self.state.preview.as_ref()?;
        let source = self.modal.previews().image(handle)?;
        Some((source.clone(), self.state.effects.rendering()))
    }

    pub fn state(&self) -> &CompositionState {
        &self.state
    }

    #[cfg(test)]
    pub fn modal(&self) -> &ModalLifecycle {
        &self.modal
    }

    pub fn is_open(&self) -> bool {
        self.modal.is_open()
    }

    pub fn is_opening(&self) -> bool {
        self.modal.is_opening()
    }

    /// Cancel is disabled while a transmission is in flight
    pub fn cancel_enabled(&self) -> bool {
        self.is_open() && !self.state.is_sending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::effects::Effect;
    use crate::compose::feedback::FeedbackAction;
    use crate::compose::modal::Layer;
    use crate::compose::preview::tests::png_bytes;
    use crate::compose::submission::Payload;
    use crate::state::data::Photo;
    use crate::transport::Transport;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeTransport {
        result: Result<(), TransportError>,
        calls: AtomicUsize,
        last: Mutex<Option<Payload>>,
    }

    impl FakeTransport {
        fn new(result: Result<(), TransportError>) -> Self {
            Self {
                result,
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Transport for FakeTransport {
        fn load_photos(&self) -> impl Future<Output = Result<Vec<Photo>, TransportError>> + Send {
            async { Ok(Vec::new()) }
        }

        fn send_composition(
            &self,
            payload: Payload,
        ) -> impl Future<Output = Result<(), TransportError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(payload);
            let result = self.result.clone();
            async move { result }
        }

        fn fetch_image(
            &self,
            _url: &str,
        ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send {
            async { Ok(Vec::new()) }
        }
    }

    /// Submit, transmit and complete, the way the app sequences it
    async fn publish(
        composer: &mut Composer,
        stack: &mut ModalStack,
        transport: &FakeTransport,
    ) -> Result<SubmitCompletion, SubmitOutcome> {
        match composer.submit() {
            SubmitOutcome::Send(payload) => {
                let result = transport.send_composition(payload).await;
                Ok(composer.complete_submission(stack, result))
            }
            other => Err(other),
        }
    }

    fn open_composer(stack: &mut ModalStack) -> Composer {
        let mut composer = Composer::default();
        composer
            .open(stack, SelectedFile::new("cat.png", png_bytes(4, 4, [90, 60, 30, 255])))
            .unwrap();
        composer
    }

    #[tokio::test]
    async fn test_successful_submit_resets_session() {
        let mut stack = ModalStack::default();
        let mut composer = open_composer(&mut stack);
        composer.edit_hashtags("#cat #sun".into());
        composer.edit_comment("Lovely".into());
        composer.scale_down();
        composer.select_effect(Effect::Chrome);
        composer.set_intensity(0.4);

        let transport = FakeTransport::new(Ok(()));
        let report = publish(&mut composer, &mut stack, &transport).await;

        assert_eq!(report, Ok(SubmitCompletion::Delivered));
        assert_eq!(transport.calls(), 1);
        let sent = transport.last.lock().unwrap().clone().unwrap();
        assert_eq!(sent.scale, "75%");
        assert_eq!(sent.effect_level, "0.4");

        assert!(!composer.is_open());
        assert!(composer.state().hashtags.is_empty());
        assert!(composer.state().comment.is_empty());
        assert!(composer.state().edits().is_unedited());
        assert_eq!(composer.state().status, SubmissionStatus::Success);
        assert_eq!(composer.modal().previews().live_count(), 0);
        assert!(!stack.contains(Layer::Composer));

        composer.acknowledge();
        assert_eq!(composer.state().status, SubmissionStatus::Idle);
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_form_open() {
        let mut stack = ModalStack::default();
        let mut composer = open_composer(&mut stack);
        composer.edit_hashtags("#keep".into());
        composer.edit_comment("still here".into());

        let transport = FakeTransport::new(Err(TransportError::Send { detail: "500".into() }));
        let report = publish(&mut composer, &mut stack, &transport).await;

        let Ok(SubmitCompletion::Failed(feedback)) = report else {
            panic!("expected failure, got {report:?}");
        };
        assert_eq!(feedback.action, FeedbackAction::Dismiss);
        assert!(composer.is_open());
        assert!(composer.state().submit_enabled());
        assert_eq!(composer.state().hashtags, "#keep");
        assert_eq!(composer.state().comment, "still here");
        assert_eq!(composer.modal().previews().live_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_form_makes_no_call() {
        let mut stack = ModalStack::default();
        let mut composer = open_composer(&mut stack);
        composer.edit_hashtags("#".into());
        assert!(composer.state().hashtag_error.is_some());

        let transport = FakeTransport::new(Ok(()));
        let report = publish(&mut composer, &mut stack, &transport).await;

        assert_eq!(report, Err(SubmitOutcome::Invalid(Field::Hashtags)));
        assert_eq!(transport.calls(), 0);
        assert!(composer.is_open());
    }

    #[test]
    fn test_close_blocked_while_sending() {
        let mut stack = ModalStack::default();
        let mut composer = open_composer(&mut stack);
        assert!(matches!(composer.submit(), SubmitOutcome::Send(_)));

        assert!(!composer.cancel_enabled());
        assert_eq!(composer.close(&mut stack), CloseOutcome::Blocked);
        assert_eq!(composer.escape(&mut stack), CloseOutcome::Blocked);
        assert!(composer.is_open());
        assert_eq!(composer.submit(), SubmitOutcome::Busy);

        composer.complete_submission(&mut stack, Err(TransportError::Send { detail: "x".into() }));
        assert_eq!(composer.close(&mut stack), CloseOutcome::Closed);
    }

    #[test]
    fn test_escape_respects_focus() {
        let mut stack = ModalStack::default();
        let mut composer = open_composer(&mut stack);

        composer.focus_field(Field::Comment);
        assert_eq!(composer.escape(&mut stack), CloseOutcome::Suspended);
        assert!(composer.is_open());

        composer.blur_field();
        assert_eq!(composer.escape(&mut stack), CloseOutcome::Closed);
        assert_eq!(composer.escape(&mut stack), CloseOutcome::AlreadyClosed);
    }

    #[test]
    fn test_double_close() {
        let mut stack = ModalStack::default();
        let mut composer = open_composer(&mut stack);
        assert_eq!(composer.close(&mut stack), CloseOutcome::Closed);
        assert_eq!(composer.close(&mut stack), CloseOutcome::AlreadyClosed);
        assert_eq!(composer.modal().previews().revoked_count(), 1);
    }

    #[test]
    fn test_unsupported_file_feedback() {
        let mut stack = ModalStack::default();
        let mut composer = Composer::default();
        let err = composer
            .open(&mut stack, SelectedFile::new("clip.gif", vec![1, 2, 3]))
            .unwrap_err();
        let feedback = Composer::open_failure(&err);
        assert_eq!(feedback.action, FeedbackAction::ReopenPicker);
        assert!(!composer.is_open());
        assert_eq!(composer.modal().previews().live_count(), 0);
    }

    #[test]
    fn test_render_preview_applies_filter() {
        let mut stack = ModalStack::default();
        let mut composer = open_composer(&mut stack);
        let (source, rendering) = composer.preview_job().unwrap();
        assert_eq!(rendering, Rendering::None);

        composer.select_effect(Effect::Marvin);
        let (_, rendering) = composer.preview_job().unwrap();
        let inverted = preview::render(&source, rendering);
        assert_ne!(source, inverted);
        assert_eq!(inverted.get_pixel(0, 0).0, [165, 195, 225, 255]);

        composer.close(&mut stack);
        assert!(composer.preview_job().is_none());
    }

    #[tokio::test]
    async fn test_new_file_cannot_replace_session_being_sent() {
        let mut stack = ModalStack::default();
        let mut composer = open_composer(&mut stack);
        composer.edit_comment("first".into());
        let SubmitOutcome::Send(payload) = composer.submit() else {
            panic!("expected a payload");
        };

        let second = SelectedFile::new("dog.png", png_bytes(4, 4, [1, 1, 1, 255]));
        assert_eq!(composer.begin_open(&mut stack, &second), Err(ComposerError::Busy));
        assert!(composer.state().is_sending());
        assert_eq!(composer.state().comment, "first");

        let transport = FakeTransport::new(Ok(()));
        let result = transport.send_composition(payload).await;
        assert_eq!(composer.complete_submission(&mut stack, result), SubmitCompletion::Delivered);

        // The next pick after delivery opens normally
        composer.begin_open(&mut stack, &second).unwrap();
        let pixels = preview::decode(&second, composer.preview_edge()).unwrap();
        assert_eq!(composer.finish_open(&mut stack, Ok((second, pixels))), Ok(true));
        assert_eq!(composer.state().selected_file.as_ref().unwrap().name, "dog.png");
    }
}

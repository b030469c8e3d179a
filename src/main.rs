use std::path::PathBuf;

use iced::widget::image::Handle;
use iced::widget::Stack;
use iced::{event, keyboard, Element, Event, Length, Subscription, Task, Theme};
use image::RgbaImage;
use rfd::FileDialog;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod compose;
mod config;
mod error;
mod state;
mod timer;
mod transport;
mod ui;

use compose::effects::{Effect, Rendering};
use compose::feedback::{Feedback, FeedbackAction};
use compose::modal::{CloseOutcome, Layer, ModalStack, ACCEPTED_EXTENSIONS};
use compose::preview;
use compose::submission::{SubmitCompletion, SubmitOutcome};
use compose::Composer;
use config::Config;
use error::{ResourceError, TransportError};
use state::data::{Photo, SelectedFile};
use state::gallery::{Gallery, SortFilter};
use state::viewer::Viewer;
use timer::{Timer, TimerToken};
use transport::{HttpTransport, Transport};
use ui::composer::PreviewImage;

/// Main application state
struct Kekstagram {
    config: Config,
    /// None when the HTTP client could not be built
    transport: Option<HttpTransport>,
    gallery: Gallery,
    /// Open overlays, bottom first
    stack: ModalStack,
    composer: Composer,
    /// Filtered preview as last rendered
    preview: Option<PreviewImage>,
    /// Guards preview renders; also debounces slider re-renders
    preview_timer: Timer,
    /// Guards the decode of the most recently picked file
    open_timer: Timer,
    success_timer: Timer,
    viewer: Option<Viewer>,
    picture: Option<Handle>,
    feedback: Option<Feedback>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    PhotosLoaded(Result<Vec<Photo>, TransportError>),
    FilterClicked(SortFilter),
    FilterDebounced(TimerToken),
    OpenPhoto(u32),
    PictureLoaded(u32, Result<Vec<u8>, TransportError>),
    ShowMoreComments,
    CloseViewer,
    /// Upload button or "pick another file"
    PickFile,
    FilePicked(Result<SelectedFile, ResourceError>),
    PreviewDecoded(TimerToken, Result<(SelectedFile, RgbaImage), ResourceError>),
    PreviewRendered(TimerToken, Option<RgbaImage>),
    CancelComposer,
    ScaleDown,
    ScaleUp,
    EffectSelected(Effect),
    IntensityChanged(f64),
    PreviewDebounced(TimerToken),
    HashtagsEdited(String),
    CommentEdited(String),
    /// A focused text field swallowed Escape and dropped its focus
    FieldBlurred,
    Submit,
    Submitted(Result<(), TransportError>),
    SuccessDelayElapsed(TimerToken),
    FeedbackPrimary,
    DismissFeedback,
    /// Escape reached the application unhandled
    EscapePressed,
}

impl Kekstagram {
    fn new() -> (Self, Task<Message>) {
        let config = config::load().unwrap_or_else(|e| {
            warn!(error = %e, "config unusable, falling back to defaults");
            Config::default()
        });

        let transport = match HttpTransport::new(&config.server) {
            Ok(transport) => Some(transport),
            Err(e) => {
                error!(error = %e, "HTTP client unavailable");
                None
            }
        };

        info!(server = %config.server.base_url, "kekstagram starting");

        let load = match transport.clone() {
            Some(transport) => Task::perform(
                async move { transport.load_photos().await },
                Message::PhotosLoaded,
            ),
            None => Task::done(Message::PhotosLoaded(Err(TransportError::Load {
                detail: "no HTTP client".to_string(),
            }))),
        };

        let app = Kekstagram {
            gallery: Gallery::new(config.gallery.random_count),
            composer: Composer::new(&config.composer),
            config,
            transport,
            stack: ModalStack::default(),
            preview: None,
            preview_timer: Timer::default(),
            open_timer: Timer::default(),
            success_timer: Timer::default(),
            viewer: None,
            picture: None,
            feedback: None,
        };

        (app, load)
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PhotosLoaded(Ok(photos)) => {
                info!(count = photos.len(), "photos loaded");
                self.gallery.set_photos(photos);
                Task::none()
            }
            Message::PhotosLoaded(Err(e)) => {
                error!(error = %e, detail = e.detail().unwrap_or_default(), "photo list failed");
                self.show_feedback(Feedback::from_error(&e.into()));
                Task::none()
            }
            Message::FilterClicked(filter) => match self.gallery.request_filter(filter) {
                Some(token) => Task::perform(
                    timer::wait(self.config.gallery.filter_debounce(), token),
                    Message::FilterDebounced,
                ),
                None => Task::none(),
            },
            Message::FilterDebounced(token) => {
                self.gallery.apply_pending(token);
                Task::none()
            }
            Message::OpenPhoto(id) => self.open_viewer(id),
            Message::PictureLoaded(id, result) => {
                let current = self.viewer.as_ref().map(|v| v.photo().id);
                match result {
                    // A late answer for a viewer that has since changed is dropped
                    Ok(bytes) if current == Some(id) => {
                        self.picture = Some(Handle::from_bytes(bytes));
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(id, error = %e, detail = e.detail().unwrap_or_default(), "picture fetch failed");
                    }
                }
                Task::none()
            }
            Message::ShowMoreComments => {
                if let Some(viewer) = self.viewer.as_mut() {
                    viewer.show_more();
                }
                Task::none()
            }
            Message::CloseViewer => {
                self.close_viewer();
                Task::none()
            }
            Message::PickFile => self.pick_file(),
            Message::FilePicked(Ok(file)) => {
                if let Err(e) = self.composer.begin_open(&mut self.stack, &file) {
                    warn!(error = %e, name = %file.name, "picked file rejected");
                    self.show_feedback(Composer::open_failure(&e));
                    return Task::none();
                }
                // A success panel still pending belongs to the previous session
                self.success_timer.cancel();
                self.drop_preview();

                let token = self.open_timer.arm();
                Task::perform(
                    decode_selected(file, self.composer.preview_edge()),
                    move |decoded| Message::PreviewDecoded(token, decoded),
                )
            }
            Message::PreviewDecoded(token, decoded) => {
                if !self.open_timer.fire(token) {
                    debug!("stale preview decode dropped");
                    return Task::none();
                }
                match self.composer.finish_open(&mut self.stack, decoded) {
                    Ok(true) => self.refresh_preview(),
                    Ok(false) => Task::none(),
                    Err(e) => {
                        warn!(error = %e, "preview could not be decoded");
                        self.show_feedback(Composer::open_failure(&e));
                        Task::none()
                    }
                }
            }
            Message::PreviewRendered(token, pixels) => {
                if self.preview_timer.fire(token) {
                    match pixels {
                        Some(pixels) => self.preview = Some(PreviewImage::from_rgba(pixels)),
                        None => warn!("preview render task failed"),
                    }
                }
                Task::none()
            }
            Message::FilePicked(Err(e)) => {
                warn!(error = %e, "picked file unreadable");
                self.show_feedback(Feedback::from_error(&e.into()));
                Task::none()
            }
            Message::CancelComposer => {
                self.composer.blur_field();
                if self.composer.close(&mut self.stack) == CloseOutcome::Closed {
                    self.drop_preview();
                }
                Task::none()
            }
            Message::ScaleDown => {
                self.composer.blur_field();
                self.composer.scale_down();
                Task::none()
            }
            Message::ScaleUp => {
                self.composer.blur_field();
                self.composer.scale_up();
                Task::none()
            }
            Message::EffectSelected(effect) => {
                self.composer.blur_field();
                self.composer.select_effect(effect);
                self.refresh_preview()
            }
            Message::IntensityChanged(value) => {
                self.composer.blur_field();
                self.composer.set_intensity(value);
                let token = self.preview_timer.arm();
                Task::perform(
                    timer::wait(self.config.composer.render_debounce(), token),
                    Message::PreviewDebounced,
                )
            }
            Message::PreviewDebounced(token) => {
                if self.preview_timer.fire(token) {
                    return self.refresh_preview();
                }
                Task::none()
            }
            Message::HashtagsEdited(text) => {
                self.composer.focus_field(state::composition::Field::Hashtags);
                self.composer.edit_hashtags(text);
                Task::none()
            }
            Message::CommentEdited(text) => {
                self.composer.focus_field(state::composition::Field::Comment);
                self.composer.edit_comment(text);
                Task::none()
            }
            Message::FieldBlurred => {
                self.composer.blur_field();
                Task::none()
            }
            Message::Submit => self.submit(),
            Message::Submitted(result) => {
                match self.composer.complete_submission(&mut self.stack, result) {
                    SubmitCompletion::Delivered => {
                        self.drop_preview();
                        let token = self.success_timer.arm();
                        return Task::perform(
                            timer::wait(self.config.composer.success_delay(), token),
                            Message::SuccessDelayElapsed,
                        );
                    }
                    SubmitCompletion::Failed(feedback) => self.show_feedback(feedback),
                }
                Task::none()
            }
            Message::SuccessDelayElapsed(token) => {
                if self.success_timer.fire(token) {
                    self.show_feedback(Feedback::success());
                }
                Task::none()
            }
            Message::FeedbackPrimary => match self.dismiss_feedback() {
                Some(feedback) if feedback.action == FeedbackAction::ReopenPicker => {
                    self.pick_file()
                }
                _ => Task::none(),
            },
            Message::DismissFeedback => {
                self.dismiss_feedback();
                Task::none()
            }
            Message::EscapePressed => {
                self.route_escape();
                Task::none()
            }
        }
    }

    /// Escape goes to the topmost overlay only
    fn route_escape(&mut self) {
        match self.stack.top() {
            Some(Layer::Feedback) => {
                self.dismiss_feedback();
            }
            Some(Layer::Viewer) => self.close_viewer(),
            Some(Layer::Composer) => {
                // An unhandled Escape means no text field holds focus
                self.composer.blur_field();
                match self.composer.escape(&mut self.stack) {
                    CloseOutcome::Closed => self.drop_preview(),
                    outcome => debug!(?outcome, "escape ignored by composer"),
                }
            }
            None => {}
        }
    }

    fn submit(&mut self) -> Task<Message> {
        match self.composer.submit() {
            SubmitOutcome::Send(payload) => match self.transport.clone() {
                Some(transport) => Task::perform(
                    async move { transport.send_composition(payload).await },
                    Message::Submitted,
                ),
                None => Task::done(Message::Submitted(Err(TransportError::Send {
                    detail: "no HTTP client".to_string(),
                }))),
            },
            SubmitOutcome::Invalid(field) => {
                self.composer.focus_field(field);
                ui::composer::reveal_field(field)
            }
            SubmitOutcome::Busy | SubmitOutcome::NothingToSend => Task::none(),
        }
    }

    /// Show the native picker, then read the chosen file off the UI thread
    fn pick_file(&mut self) -> Task<Message> {
        if self.composer.state().is_sending() {
            return Task::none();
        }

        let picked = FileDialog::new()
            .set_title("Choose a photo")
            .add_filter("Images", &ACCEPTED_EXTENSIONS[..])
            .add_filter("All files", &["*"])
            .pick_file();

        match picked {
            Some(path) => Task::perform(read_selected(path), Message::FilePicked),
            None => {
                debug!("file picker dismissed");
                Task::none()
            }
        }
    }

    fn open_viewer(&mut self, id: u32) -> Task<Message> {
        let Some(photo) = self.gallery.find(id).cloned() else {
            warn!(id, "photo not found");
            return Task::none();
        };

        let url = photo.url.clone();
        self.viewer = Some(Viewer::open(photo));
        self.picture = None;
        self.stack.push(Layer::Viewer);
        debug!(id, "viewer opened");

        match self.transport.clone() {
            Some(transport) => Task::perform(
                async move { transport.fetch_image(&url).await },
                move |result| Message::PictureLoaded(id, result),
            ),
            None => Task::none(),
        }
    }

    fn close_viewer(&mut self) {
        self.viewer = None;
        self.picture = None;
        self.stack.remove(Layer::Viewer);
    }

    fn show_feedback(&mut self, feedback: Feedback) {
        self.feedback = Some(feedback);
        self.stack.push(Layer::Feedback);
    }

    fn dismiss_feedback(&mut self) -> Option<Feedback> {
        let feedback = self.feedback.take()?;
        self.stack.remove(Layer::Feedback);
        self.composer.acknowledge();
        Some(feedback)
    }

    /// Re-render the preview off the UI thread
    ///
    /// Unfiltered pixels are shown at once. Any render still running is
    /// superseded.
    fn refresh_preview(&mut self) -> Task<Message> {
        let token = self.preview_timer.arm();
        let Some((source, rendering)) = self.composer.preview_job() else {
            self.drop_preview();
            return Task::none();
        };
        if rendering == Rendering::None {
            self.preview_timer.cancel();
            self.preview = Some(PreviewImage::from_rgba(source));
            return Task::none();
        }
        Task::perform(render_preview(source, rendering), move |pixels| {
            Message::PreviewRendered(token, pixels)
        })
    }

    fn drop_preview(&mut self) {
        self.preview_timer.cancel();
        self.preview = None;
    }

    fn view(&self) -> Element<'_, Message> {
        let base = ui::gallery::view(
            &self.gallery,
            self.stack.scroll_locked(),
            self.composer.is_opening(),
        );

        self.stack
            .iter()
            .fold(Stack::new().push(base), |layers, layer| {
                let content = match layer {
                    Layer::Composer => Some(ui::overlay(
                        ui::composer::view(&self.composer, self.preview.as_ref()),
                        None,
                    )),
                    Layer::Viewer => self.viewer.as_ref().map(|viewer| {
                        ui::overlay(ui::viewer::view(viewer, self.picture.as_ref()), None)
                    }),
                    Layer::Feedback => self.feedback.as_ref().map(|feedback| {
                        ui::overlay(ui::feedback::view(feedback), Some(Message::DismissFeedback))
                    }),
                };
                match content {
                    Some(content) => layers.push(content),
                    None => layers,
                }
            })
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        event::listen_with(|event, status, _window| match event {
            Event::Keyboard(keyboard::Event::KeyPressed {
                key: keyboard::Key::Named(keyboard::key::Named::Escape),
                ..
            }) => match status {
                event::Status::Ignored => Some(Message::EscapePressed),
                event::Status::Captured => Some(Message::FieldBlurred),
            },
            _ => None,
        })
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Read a picked file into memory
async fn read_selected(path: PathBuf) -> Result<SelectedFile, ResourceError> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| ResourceError::Unreadable {
            name: name.clone(),
            reason: e.to_string(),
        })?;

    debug!(%name, bytes = bytes.len(), "file read");
    Ok(SelectedFile::new(name, bytes))
}

/// Decode the preview on the blocking pool
async fn decode_selected(
    file: SelectedFile,
    max_edge: u32,
) -> Result<(SelectedFile, RgbaImage), ResourceError> {
    let name = file.name.clone();
    tokio::task::spawn_blocking(move || -> Result<_, ResourceError> {
        let pixels = preview::decode(&file, max_edge)?;
        Ok((file, pixels))
    })
    .await
    .map_err(|e| ResourceError::Undecodable {
        name,
        reason: e.to_string(),
    })?
}

/// Apply a filter on the blocking pool
async fn render_preview(source: RgbaImage, rendering: Rendering) -> Option<RgbaImage> {
    tokio::task::spawn_blocking(move || preview::render(&source, rendering))
        .await
        .ok()
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kekstagram=info")),
        )
        .init();

    iced::application("Kekstagram", Kekstagram::update, Kekstagram::view)
        .theme(Kekstagram::theme)
        .subscription(Kekstagram::subscription)
        .centered()
        .run_with(Kekstagram::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::preview::tests::png_bytes;

    fn app() -> Kekstagram {
        let config = Config::default();
        Kekstagram {
            gallery: Gallery::new(config.gallery.random_count),
            composer: Composer::new(&config.composer),
            config,
            transport: None,
            stack: ModalStack::default(),
            preview: None,
            preview_timer: Timer::default(),
            open_timer: Timer::default(),
            success_timer: Timer::default(),
            viewer: None,
            picture: None,
            feedback: None,
        }
    }

    fn selected(name: &str) -> SelectedFile {
        SelectedFile::new(name, png_bytes(8, 8, [10, 20, 30, 255]))
    }

    fn picked(name: &str) -> Message {
        Message::FilePicked(Ok(selected(name)))
    }

    /// Pick a file, then deliver its decode the way the background task does
    fn open(app: &mut Kekstagram, name: &str) {
        let file = selected(name);
        let _ = app.update(Message::FilePicked(Ok(file.clone())));
        assert!(app.composer.is_opening());

        let token = app.open_timer.arm();
        let pixels = preview::decode(&file, app.composer.preview_edge()).unwrap();
        let _ = app.update(Message::PreviewDecoded(token, Ok((file, pixels))));
    }

    #[test]
    fn test_open_and_escape() {
        let mut app = app();
        open(&mut app, "cat.png");
        assert!(app.composer.is_open());
        assert!(app.preview.is_some());
        assert_eq!(app.stack.top(), Some(Layer::Composer));

        let _ = app.update(Message::EscapePressed);
        assert!(!app.composer.is_open());
        assert!(app.preview.is_none());
        assert!(app.stack.is_empty());
    }

    #[test]
    fn test_rejected_file_shows_feedback() {
        let mut app = app();
        let _ = app.update(picked("clip.gif"));
        assert!(!app.composer.is_open());
        assert_eq!(app.stack.top(), Some(Layer::Feedback));
        assert_eq!(
            app.feedback.as_ref().map(|f| f.action),
            Some(FeedbackAction::ReopenPicker)
        );

        let _ = app.update(Message::EscapePressed);
        assert!(app.feedback.is_none());
        assert!(app.stack.is_empty());
    }

    #[test]
    fn test_escape_hits_feedback_before_composer() {
        let mut app = app();
        open(&mut app, "cat.png");
        let _ = app.update(Message::Submitted(Err(TransportError::Send {
            detail: "503".into(),
        })));
        assert_eq!(app.stack.top(), Some(Layer::Feedback));

        let _ = app.update(Message::EscapePressed);
        assert!(app.composer.is_open());
        assert_eq!(app.stack.top(), Some(Layer::Composer));
    }

    #[test]
    fn test_delivered_submission_closes_composer() {
        let mut app = app();
        open(&mut app, "cat.png");
        let _ = app.update(Message::HashtagsEdited("#cat".into()));
        let _ = app.update(Message::Submit);
        assert!(app.composer.state().is_sending());

        let _ = app.update(Message::EscapePressed);
        assert!(app.composer.is_open());

        let _ = app.update(Message::Submitted(Ok(())));
        assert!(!app.composer.is_open());
        assert!(app.preview.is_none());
        assert!(app.success_timer.is_armed());
    }

    #[test]
    fn test_invalid_submit_focuses_field() {
        let mut app = app();
        open(&mut app, "cat.png");
        let _ = app.update(Message::CommentEdited("x".repeat(141)));
        let _ = app.update(Message::FieldBlurred);
        let _ = app.update(Message::Submit);

        assert!(!app.composer.state().is_sending());
        assert_eq!(
            app.composer.state().focus,
            Some(state::composition::Field::Comment)
        );
    }

    #[test]
    fn test_pick_during_send_keeps_session() {
        let mut app = app();
        open(&mut app, "cat.png");
        let _ = app.update(Message::CommentEdited("sunset".into()));
        let _ = app.update(Message::Submit);
        assert!(app.composer.state().is_sending());

        let _ = app.update(picked("dog.png"));
        assert!(!app.composer.is_opening());
        assert_eq!(app.stack.top(), Some(Layer::Feedback));
        assert_eq!(app.composer.state().comment, "sunset");
        assert_eq!(
            app.composer.state().selected_file.as_ref().map(|f| f.name.as_str()),
            Some("cat.png")
        );
    }

    #[test]
    fn test_new_session_cancels_pending_success_panel() {
        let mut app = app();
        open(&mut app, "cat.png");
        let _ = app.update(Message::Submit);
        let _ = app.update(Message::Submitted(Ok(())));
        assert!(app.success_timer.is_armed());

        open(&mut app, "dog.png");
        assert!(!app.success_timer.is_armed());
        assert!(app.composer.is_open());
        assert!(app.feedback.is_none());
    }

    #[test]
    fn test_render_finishing_after_close_is_dropped() {
        let mut app = app();
        open(&mut app, "cat.png");
        let _ = app.update(Message::EffectSelected(Effect::Phobos));
        assert!(app.preview_timer.is_armed());
        let token = app.preview_timer.arm();

        let _ = app.update(Message::CancelComposer);
        let _ = app.update(Message::PreviewRendered(token, Some(RgbaImage::new(8, 8))));
        assert!(app.preview.is_none());
    }

    #[test]
    fn test_undecodable_file_shows_feedback() {
        let mut app = app();
        let _ = app.update(picked("cat.png"));
        let token = app.open_timer.arm();
        let _ = app.update(Message::PreviewDecoded(
            token,
            Err(ResourceError::Undecodable {
                name: "cat.png".into(),
                reason: "truncated".into(),
            }),
        ));

        assert!(!app.composer.is_open());
        assert!(!app.composer.is_opening());
        assert_eq!(
            app.feedback.as_ref().map(|f| f.action),
            Some(FeedbackAction::ReopenPicker)
        );
    }
}

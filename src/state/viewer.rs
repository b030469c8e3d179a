/// Full-screen viewer state
///
/// Shows one photo and reveals its comments a page at a time.
use super::data::{Comment, Photo};

/// Comments revealed per "load more" step
pub const COMMENTS_STEP: usize = 5;

#[derive(Debug, Clone)]
pub struct Viewer {
    photo: Photo,
    shown: usize,
}

impl Viewer {
    pub fn open(photo: Photo) -> Self {
        let shown = photo.comments.len().min(COMMENTS_STEP);
        Self { photo, shown }
    }

    /// Reveal the next page of comments
    pub fn show_more(&mut self) {
        self.shown = (self.shown + COMMENTS_STEP).min(self.photo.comments.len());
    }

    pub fn visible_comments(&self) -> &[Comment] {
        &self.photo.comments[..self.shown]
    }

    pub fn has_more(&self) -> bool {
        self.shown < self.photo.comments.len()
    }

    pub fn counter_text(&self) -> String {
        format!(
            "Showing {} of {} comments",
            self.shown,
            self.photo.comments.len()
        )
    }

    pub fn photo(&self) -> &Photo {
        &self.photo
    }
}

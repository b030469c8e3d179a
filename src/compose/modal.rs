/// Modal lifecycle and the top-of-stack modal registry
///
/// The lifecycle owns the preview registry and therefore every preview
/// handle. The stack decides which open layer a press of Escape targets
/// and whether the page behind is scroll-locked.
use image::RgbaImage;
use tracing::{debug, info};

use crate::compose::preview::{self, PreviewRegistry, DEFAULT_PREVIEW_EDGE};
use crate::error::{ComposerError, FileTypeError, ResourceError};
use crate::state::composition::CompositionState;
use crate::state::data::SelectedFile;

/// Extensions the composer accepts
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

pub fn check_file_type(file: &SelectedFile) -> Result<(), FileTypeError> {
    match file.extension() {
        Some(ext) if ACCEPTED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(FileTypeError {
            name: file.name.clone(),
        }),
    }
}

/// Overlay layers that can sit on top of the gallery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Composer,
    Viewer,
    Feedback,
}

/// Ordered registry of open modal layers
///
/// Each layer appears at most once, so each has at most one Escape route.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ModalStack {
    layers: Vec<Layer>,
}

impl ModalStack {
    /// Register a layer on top; returns false if it was already open
    pub fn push(&mut self, layer: Layer) -> bool {
        if self.contains(layer) {
            return false;
        }
        self.layers.push(layer);
        true
    }

    pub fn remove(&mut self, layer: Layer) -> bool {
        let before = self.layers.len();
        self.layers.retain(|l| *l != layer);
        self.layers.len() != before
    }

    /// Layer that receives Escape
    pub fn top(&self) -> Option<Layer> {
        self.layers.last().copied()
    }

    /// Open layers, bottom first
    pub fn iter(&self) -> impl Iterator<Item = Layer> + '_ {
        self.layers.iter().copied()
    }

    pub fn contains(&self, layer: Layer) -> bool {
        self.layers.contains(&layer)
    }

    /// The page behind scrolls only when no modal is open
    pub fn scroll_locked(&self) -> bool {
        !self.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalPhase {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
}

/// Result of a user request to close the composer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed,
    /// Nothing was open
    AlreadyClosed,
    /// A transmission is in flight
    Blocked,
    /// Escape pressed while a text field has focus
    Suspended,
}

#[derive(Debug)]
pub struct ModalLifecycle {
    phase: ModalPhase,
    previews: PreviewRegistry,
}

impl Default for ModalLifecycle {
    fn default() -> Self {
        Self::new(DEFAULT_PREVIEW_EDGE)
    }
}

impl ModalLifecycle {
    pub fn new(preview_max_edge: u32) -> Self {
        Self {
            phase: ModalPhase::Closed,
            previews: PreviewRegistry::new(preview_max_edge),
        }
    }

    /// Accept a picked file and start decoding its preview
    ///
    /// Refused while a send is in flight. Any running session is closed;
    /// the composer shows again once [`finish_open`](Self::finish_open)
    /// receives the decoded pixels.
    pub fn begin_open(
        &mut self,
        state: &mut CompositionState,
        stack: &mut ModalStack,
        file: &SelectedFile,
    ) -> Result<(), ComposerError> {
        if state.is_sending() {
            debug!(name = %file.name, "open refused while sending");
            return Err(ComposerError::Busy);
        }
        check_file_type(file)?;

        // A fresh pick replaces the running session
        if self.phase != ModalPhase::Closed {
            self.close(state, stack);
        }
        self.phase = ModalPhase::Opening;
        Ok(())
    }

    /// Decoding finished; show the composer or fall back to closed
    ///
    /// Returns `Ok(false)` when no open is pending. On error no preview is
    /// allocated.
    pub fn finish_open(
        &mut self,
        state: &mut CompositionState,
        stack: &mut ModalStack,
        decoded: Result<(SelectedFile, RgbaImage), ResourceError>,
    ) -> Result<bool, ComposerError> {
        if self.phase != ModalPhase::Opening {
            return Ok(false);
        }
        let (file, pixels) = match decoded {
            Ok(decoded) => decoded,
            Err(e) => {
                self.phase = ModalPhase::Closed;
                return Err(e.into());
            }
        };

        state.reset_form();
        state.preview = Some(self.previews.register(pixels));
        info!(name = %file.name, bytes = file.bytes.len(), "composer opened");
        state.selected_file = Some(file);

        stack.push(Layer::Composer);
        self.phase = ModalPhase::Open;
        Ok(true)
    }

    /// Both halves of an open, decoding inline
    #[cfg(test)]
    pub fn open(
        &mut self,
        state: &mut CompositionState,
        stack: &mut ModalStack,
        file: SelectedFile,
    ) -> Result<(), ComposerError> {
        self.begin_open(state, stack, &file)?;
        let decoded = preview::decode(&file, self.previews.max_edge()).map(|pixels| (file, pixels));
        self.finish_open(state, stack, decoded).map(|_| ())
    }

    /// Tear the session down; safe to call any number of times
    ///
    /// Returns false when there was nothing to close.
    pub fn close(&mut self, state: &mut CompositionState, stack: &mut ModalStack) -> bool {
        if self.phase == ModalPhase::Closed && state.preview.is_none() {
            return false;
        }

        self.phase = ModalPhase::Closing;
        if let Some(handle) = state.preview.take() {
            self.previews.revoke(handle);
        }
        state.selected_file = None;
        state.reset_form();
        stack.remove(Layer::Composer);
        self.phase = ModalPhase::Closed;
        debug!("composer closed");
        true
    }

    #[cfg(test)]
    pub fn phase(&self) -> ModalPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase == ModalPhase::Open
    }

    /// A picked file is being decoded
    pub fn is_opening(&self) -> bool {
        self.phase == ModalPhase::Opening
    }

    /// Whether Escape currently closes the composer
    ///
    /// Suspended while a text field has focus or a send is in flight.
    pub fn escape_armed(&self, state: &CompositionState, stack: &ModalStack) -> bool {
        self.is_open()
            && stack.top() == Some(Layer::Composer)
            && state.focus.is_none()
            && !state.is_sending()
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }
}

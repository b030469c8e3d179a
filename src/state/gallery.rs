use rand::seq::SliceRandom;
use tracing::debug;

use super::data::Photo;
use crate::timer::{Timer, TimerToken};

/// Sort filters shown above the gallery grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortFilter {
    /// Server order
    #[default]
    Default,
    /// A handful of distinct random photos
    Random,
    /// Most commented first
    Discussed,
}

impl SortFilter {
    pub const ALL: [SortFilter; 3] = [SortFilter::Default, SortFilter::Random, SortFilter::Discussed];

    pub fn label(&self) -> &'static str {
        match self {
            SortFilter::Default => "Default",
            SortFilter::Random => "Random",
            SortFilter::Discussed => "Discussed",
        }
    }
}

/// The photo list and its active sort filter
///
/// Filter clicks are debounced: [`Gallery::request_filter`] arms the timer
/// and [`Gallery::apply_pending`] commits once the token fires.
#[derive(Debug, Default)]
pub struct Gallery {
    photos: Vec<Photo>,
    visible: Vec<usize>,
    active: SortFilter,
    pending: Option<SortFilter>,
    debounce: Timer,
    random_count: usize,
    loaded: bool,
}

impl Gallery {
    pub fn new(random_count: usize) -> Self {
        Self {
            random_count,
            ..Self::default()
        }
    }

    pub fn set_photos(&mut self, photos: Vec<Photo>) {
        self.photos = photos;
        self.loaded = true;
        self.visible = self.order(self.active);
    }

    /// Filters become usable once the photos arrived
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Filter button clicked; returns a token to fire after the debounce
    ///
    /// Clicking the filter that is already shown does nothing.
    pub fn request_filter(&mut self, filter: SortFilter) -> Option<TimerToken> {
        if filter == self.active && self.pending.is_none() {
            return None;
        }
        self.pending = Some(filter);
        Some(self.debounce.arm())
    }

    /// Debounce elapsed; returns true if the grid changed
    pub fn apply_pending(&mut self, token: TimerToken) -> bool {
        if !self.debounce.fire(token) {
            return false;
        }
        let Some(filter) = self.pending.take() else {
            return false;
        };
        self.active = filter;
        self.visible = self.order(filter);
        debug!(?filter, shown = self.visible.len(), "gallery filter applied");
        true
    }

    fn order(&self, filter: SortFilter) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.photos.len()).collect();
        match filter {
            SortFilter::Default => {}
            SortFilter::Random => {
                let mut rng = rand::thread_rng();
                indices.shuffle(&mut rng);
                indices.truncate(self.random_count);
            }
            SortFilter::Discussed => {
                indices.sort_by_key(|&i| std::cmp::Reverse(self.photos[i].comments.len()));
            }
        }
        indices
    }

    /// Highlighted filter button: the one clicked last
    pub fn highlighted(&self) -> SortFilter {
        self.pending.unwrap_or(self.active)
    }

    pub fn visible(&self) -> impl Iterator<Item = &Photo> {
        self.visible.iter().map(|&i| &self.photos[i])
    }

    pub fn find(&self, id: u32) -> Option<&Photo> {
        self.photos.iter().find(|photo| photo.id == id)
    }
}

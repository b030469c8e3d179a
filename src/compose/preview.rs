/// Preview handles and filter rendering
///
/// A preview handle is a revocable reference to decoded pixels used only
/// for on-screen preview. The registry owns the pixels; revoking a handle
/// frees them. Handles are not `Clone`, so revoking consumes the only one.
use std::collections::HashMap;

use image::imageops::{self, FilterType};
use image::RgbaImage;
use tracing::debug;

use crate::compose::effects::Rendering;
use crate::error::ResourceError;
use crate::state::data::SelectedFile;

/// Longest edge of a decoded preview, in pixels
pub const DEFAULT_PREVIEW_EDGE: u32 = 600;

#[derive(Debug, PartialEq, Eq, Hash)]
pub struct PreviewHandle {
    id: u64,
}

/// Decode a picked file into preview pixels no larger than `max_edge`
///
/// Pure and potentially slow; run it off the UI thread.
pub fn decode(file: &SelectedFile, max_edge: u32) -> Result<RgbaImage, ResourceError> {
    if file.bytes.is_empty() {
        return Err(ResourceError::Unreadable {
            name: file.name.clone(),
            reason: "file is empty".to_string(),
        });
    }

    let decoded = image::load_from_memory(&file.bytes).map_err(|e| ResourceError::Undecodable {
        name: file.name.clone(),
        reason: e.to_string(),
    })?;

    let max_edge = max_edge.max(1);
    let fitted = if decoded.width() > max_edge || decoded.height() > max_edge {
        decoded.resize(max_edge, max_edge, FilterType::Triangle)
    } else {
        decoded
    };
    Ok(fitted.to_rgba8())
}

#[derive(Debug)]
pub struct PreviewRegistry {
    next_id: u64,
    live: HashMap<u64, RgbaImage>,
    revoked: u64,
    max_edge: u32,
}

impl Default for PreviewRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_PREVIEW_EDGE)
    }
}

impl PreviewRegistry {
    pub fn new(max_edge: u32) -> Self {
        Self {
            next_id: 1,
            live: HashMap::new(),
            revoked: 0,
            max_edge: max_edge.max(1),
        }
    }

    /// Edge limit that [`decode`] should be called with
    pub fn max_edge(&self) -> u32 {
        self.max_edge
    }

    /// Take ownership of decoded pixels and hand out their handle
    pub fn register(&mut self, pixels: RgbaImage) -> PreviewHandle {
        let id = self.next_id;
        self.next_id += 1;
        debug!(id, width = pixels.width(), height = pixels.height(), "preview allocated");
        self.live.insert(id, pixels);
        PreviewHandle { id }
    }

    /// Free the pixels behind a handle; returns false if already gone
    pub fn revoke(&mut self, handle: PreviewHandle) -> bool {
        let removed = self.live.remove(&handle.id).is_some();
        if removed {
            self.revoked += 1;
            debug!(id = handle.id, total = self.revoked, "preview revoked");
        }
        removed
    }

    pub fn image(&self, handle: &PreviewHandle) -> Option<&RgbaImage> {
        self.live.get(&handle.id)
    }

    #[cfg(test)]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Total number of revocations performed
    #[cfg(test)]
    pub fn revoked_count(&self) -> u64 {
        self.revoked
    }
}

/// Apply a rendering to preview pixels
pub fn render(source: &RgbaImage, rendering: Rendering) -> RgbaImage {
    match rendering {
        Rendering::None => source.clone(),
        Rendering::Grayscale(amount) => apply_matrix(source, grayscale_matrix(amount)),
        Rendering::Sepia(amount) => apply_matrix(source, sepia_matrix(amount)),
        Rendering::Invert(percent) => invert(source, (percent / 100.0) as f32),
        Rendering::Blur(radius) if radius > 0.0 => imageops::blur(source, radius as f32),
        Rendering::Blur(_) => source.clone(),
        Rendering::Brightness(factor) => brightness(source, factor as f32),
    }
}

type ColorMatrix = [[f32; 3]; 3];

// Matrices follow the CSS filter-effects definitions
fn grayscale_matrix(amount: f64) -> ColorMatrix {
    let a = 1.0 - amount.clamp(0.0, 1.0) as f32;
    [
        [0.2126 + 0.7874 * a, 0.7152 - 0.7152 * a, 0.0722 - 0.0722 * a],
        [0.2126 - 0.2126 * a, 0.7152 + 0.2848 * a, 0.0722 - 0.0722 * a],
        [0.2126 - 0.2126 * a, 0.7152 - 0.7152 * a, 0.0722 + 0.9278 * a],
    ]
}

fn sepia_matrix(amount: f64) -> ColorMatrix {
    let a = 1.0 - amount.clamp(0.0, 1.0) as f32;
    [
        [0.393 + 0.607 * a, 0.769 - 0.769 * a, 0.189 - 0.189 * a],
        [0.349 - 0.349 * a, 0.686 + 0.314 * a, 0.168 - 0.168 * a],
        [0.272 - 0.272 * a, 0.534 - 0.534 * a, 0.131 + 0.869 * a],
    ]
}

fn apply_matrix(source: &RgbaImage, matrix: ColorMatrix) -> RgbaImage {
    let mut out = source.clone();
    for pixel in out.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let (rf, gf, bf) = (r as f32, g as f32, b as f32);
        let channel =
            |row: [f32; 3]| (row[0] * rf + row[1] * gf + row[2] * bf).round().clamp(0.0, 255.0) as u8;
        pixel.0 = [channel(matrix[0]), channel(matrix[1]), channel(matrix[2]), a];
    }
    out
}

fn invert(source: &RgbaImage, amount: f32) -> RgbaImage {
    let amount = amount.clamp(0.0, 1.0);
    let mut out = source.clone();
    for pixel in out.pixels_mut() {
        for channel in pixel.0.iter_mut().take(3) {
            let c = *channel as f32;
            *channel = (c * (1.0 - amount) + (255.0 - c) * amount).round() as u8;
        }
    }
    out
}

fn brightness(source: &RgbaImage, factor: f32) -> RgbaImage {
    let factor = factor.max(0.0);
    let mut out = source.clone();
    for pixel in out.pixels_mut() {
        for channel in pixel.0.iter_mut().take(3) {
            *channel = (*channel as f32 * factor).clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the transport layer and the UI layer.
use serde::{Deserialize, Serialize};

/// A published photo as served by `GET /data`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: u32,
    /// Server-relative path (e.g. "photos/1.jpg")
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// A comment attached to a photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u32,
    #[serde(default)]
    pub avatar: String,
    pub message: String,
    #[serde(default)]
    pub name: String,
}

/// Image file chosen by the user in the picker
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// File name only (e.g. "IMG_0001.jpg")
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Lowercased extension, if the name has one
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| !ext.is_empty())
    }

    /// MIME type derived from the extension
    pub fn mime(&self) -> &'static str {
        match self.extension().as_deref() {
            Some("png") => "image/png",
            Some("jpg" | "jpeg") => "image/jpeg",
            _ => "application/octet-stream",
        }
    }
}

// Keep image bytes out of debug output
impl std::fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Error taxonomy for the upload composer
///
/// Every error here ends up either as an inline field message
/// (validation) or as a feedback panel (everything else).
use thiserror::Error;

/// Hashtag and comment rule violations
///
/// Recovered locally by the form; never reaches the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ValidationError {
    #[error("No more than 5 hashtags")]
    TooMany,
    #[error("Hashtags must be unique")]
    Duplicate,
    #[error("A hashtag cannot consist of a single #")]
    BareHash,
    #[error("A hashtag cannot be longer than 20 characters")]
    TooLong,
    #[error("A hashtag starts with # followed by 1 to 19 letters or digits")]
    BadFormat,
    #[error("A comment cannot be longer than 140 characters")]
    CommentTooLong,
}

/// The picked file does not have an accepted image extension
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("\"{name}\" is not a supported image. Pick a jpg, jpeg or png file.")]
pub struct FileTypeError {
    pub name: String,
}

/// The preview could not be allocated for an accepted file
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    #[error("Could not read \"{name}\": {reason}")]
    Unreadable { name: String, reason: String },
    #[error("Could not decode \"{name}\": {reason}")]
    Undecodable { name: String, reason: String },
}

/// Network or HTTP failure reported by the transport
///
/// The `detail` fields carry the low-level cause for logs; the
/// `Display` text is what the user sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Failed to load data. Try reloading.")]
    Load { detail: String },
    #[error("Failed to send the form. Try again.")]
    Send { detail: String },
    #[error("The server did not accept this file. Pick another image.")]
    UnsupportedFile,
    #[error("Could not fetch the picture.")]
    Image { detail: String },
    #[error("Could not set up the HTTP client: {0}")]
    Client(String),
}

impl TransportError {
    /// Low-level cause, if one was recorded
    pub fn detail(&self) -> Option<&str> {
        match self {
            TransportError::Load { detail }
            | TransportError::Send { detail }
            | TransportError::Image { detail } => Some(detail),
            TransportError::Client(detail) => Some(detail),
            TransportError::UnsupportedFile => None,
        }
    }
}

/// Umbrella error for composer operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComposerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    FileType(#[from] FileTypeError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// A new file arrived while the current composition is being sent
    #[error("Your photo is still being published. Wait for it to finish.")]
    Busy,
}

impl ComposerError {
    /// Whether recovering from this error means picking a different file
    pub fn reopens_picker(&self) -> bool {
        matches!(
            self,
            ComposerError::FileType(_)
                | ComposerError::Resource(_)
                | ComposerError::Transport(TransportError::UnsupportedFile)
        )
    }
}

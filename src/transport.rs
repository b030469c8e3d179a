/// HTTP transport to the photo server
///
/// `GET {base}/data` returns the gallery as JSON; `POST {base}` takes the
/// composer's multipart payload.
use std::future::Future;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::compose::submission::Payload;
use crate::config::ServerConfig;
use crate::error::TransportError;
use crate::state::data::Photo;

/// Seam between the composer and the network
pub trait Transport {
    fn load_photos(&self) -> impl Future<Output = Result<Vec<Photo>, TransportError>> + Send;

    fn send_composition(
        &self,
        payload: Payload,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Raw bytes of a picture referenced by a photo URL
    fn fetch_image(&self, url: &str)
        -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ServerConfig) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Absolute URL for a server-relative path
    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }
}

/// Build the multipart form for a payload
pub fn multipart_form(payload: Payload) -> Result<Form, TransportError> {
    let file = Part::bytes(payload.file_bytes)
        .file_name(payload.file_name)
        .mime_str(payload.mime)
        .map_err(|e| TransportError::Send {
            detail: e.to_string(),
        })?;

    Ok(Form::new()
        .part("filename", file)
        .text("hashtags", payload.hashtags)
        .text("description", payload.description)
        .text("scale", payload.scale)
        .text("effect", payload.effect)
        .text("effect-level", payload.effect_level))
}

/// Map the upload response status onto the error taxonomy
pub fn classify_send_status(status: StatusCode) -> Result<(), TransportError> {
    if status.is_success() {
        return Ok(());
    }
    match status {
        StatusCode::UNSUPPORTED_MEDIA_TYPE | StatusCode::UNPROCESSABLE_ENTITY => {
            Err(TransportError::UnsupportedFile)
        }
        other => Err(TransportError::Send {
            detail: format!("server answered {other}"),
        }),
    }
}

impl Transport for HttpTransport {
    fn load_photos(&self) -> impl Future<Output = Result<Vec<Photo>, TransportError>> + Send {
        let url = self.resolve("data");
        let http = self.http.clone();
        async move {
            let load_err = |detail: String| TransportError::Load { detail };

            let response = http.get(&url).send().await.map_err(|e| load_err(e.to_string()))?;
            if !response.status().is_success() {
                warn!(%url, status = %response.status(), "gallery request rejected");
                return Err(load_err(format!("server answered {}", response.status())));
            }
            let photos: Vec<Photo> = response.json().await.map_err(|e| load_err(e.to_string()))?;
            debug!(count = photos.len(), "gallery loaded");
            Ok(photos)
        }
    }

    fn send_composition(
        &self,
        payload: Payload,
    ) -> impl Future<Output = Result<(), TransportError>> + Send {
        let url = self.resolve("");
        let http = self.http.clone();
        async move {
            let form = multipart_form(payload)?;
            let response = http
                .post(&url)
                .multipart(form)
                .send()
                .await
                .map_err(|e| TransportError::Send {
                    detail: e.to_string(),
                })?;
            classify_send_status(response.status())
        }
    }

    fn fetch_image(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send {
        let url = self.resolve(url);
        let http = self.http.clone();
        async move {
            let image_err = |detail: String| TransportError::Image { detail };

            let response = http.get(&url).send().await.map_err(|e| image_err(e.to_string()))?;
            if !response.status().is_success() {
                return Err(image_err(format!("server answered {}", response.status())));
            }
            let bytes = response.bytes().await.map_err(|e| image_err(e.to_string()))?;
            Ok(bytes.to_vec())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport() -> HttpTransport {
        HttpTransport::new(&ServerConfig {
            base_url: "https://example.test/kekstagram/".into(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_resolve() {
        let t = transport();
        assert_eq!(t.resolve("data"), "https://example.test/kekstagram/data");
        assert_eq!(t.resolve("/photos/1.jpg"), "https://example.test/kekstagram/photos/1.jpg");
        assert_eq!(t.resolve(""), "https://example.test/kekstagram");
        assert_eq!(t.resolve("https://cdn.test/a.jpg"), "https://cdn.test/a.jpg");
    }

    #[test]
    fn test_classify_send_status() {
        assert!(classify_send_status(StatusCode::OK).is_ok());
        assert_eq!(
            classify_send_status(StatusCode::UNSUPPORTED_MEDIA_TYPE),
            Err(TransportError::UnsupportedFile)
        );
        assert!(matches!(
            classify_send_status(StatusCode::BAD_GATEWAY),
            Err(TransportError::Send { .. })
        ));
    }

    #[test]
    fn test_multipart_form_accepts_payload() {
        let payload = Payload {
            file_name: "cat.png".into(),
            mime: "image/png",
            file_bytes: vec![0; 8],
            hashtags: "#cat".into(),
            description: String::new(),
            scale: "100%".into(),
            effect: "none".into(),
            effect_level: String::new(),
        };
        let form = multipart_form(payload).unwrap();
        assert!(!form.boundary().is_empty());
    }
}

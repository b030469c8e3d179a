/// User interface module
///
/// View functions for each screen, all producing the root `Message`:
/// - Gallery grid and sort filters (gallery.rs)
/// - Upload composer panel (composer.rs)
/// - Full-screen photo viewer (viewer.rs)
/// - Success and error panels (feedback.rs)
use iced::widget::{center, container, mouse_area, opaque};
use iced::{Color, Element};

use crate::Message;

pub mod composer;
pub mod feedback;
pub mod gallery;
pub mod viewer;

/// Dimmed backdrop with the content centered on top
///
/// The backdrop swallows all input to the layers below. With `on_blur`,
/// a click outside the content emits that message.
pub fn overlay<'a>(
    content: impl Into<Element<'a, Message>>,
    on_blur: Option<Message>,
) -> Element<'a, Message> {
    let backdrop = center(opaque(content)).style(|_theme| container::Style {
        background: Some(
            Color {
                a: 0.75,
                ..Color::BLACK
            }
            .into(),
        ),
        ..container::Style::default()
    });

    match on_blur {
        Some(message) => opaque(mouse_area(backdrop).on_press(message)),
        None => opaque(backdrop),
    }
}

/// Upload composer panel
use iced::widget::image::Handle;
use iced::widget::scrollable::RelativeOffset;
use iced::widget::{
    button, column, container, horizontal_space, radio, row, scrollable, slider, text,
    text_input, Column, Image, Row,
};
use iced::{Alignment, ContentFit, Element, Length, Task};
use image::RgbaImage;

use crate::compose::effects::Effect;
use crate::compose::Composer;
use crate::state::composition::Field;
use crate::Message;

const PANEL_WIDTH: f32 = 640.0;
const PREVIEW_BOX: f32 = 420.0;

/// Rendered preview, ready for the image widget
#[derive(Debug, Clone)]
pub struct PreviewImage {
    pub handle: Handle,
    pub width: u32,
    pub height: u32,
}

impl PreviewImage {
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        let (width, height) = pixels.dimensions();
        Self {
            handle: Handle::from_rgba(width, height, pixels.into_raw()),
            width,
            height,
        }
    }

    /// Displayed size inside the preview box at the given zoom
    fn display_size(&self, zoom: f32) -> (f32, f32) {
        let (w, h) = (self.width.max(1) as f32, self.height.max(1) as f32);
        let fit = (PREVIEW_BOX / w).min(PREVIEW_BOX / h).min(1.0);
        (w * fit * zoom, h * fit * zoom)
    }
}

pub fn scroll_id() -> scrollable::Id {
    scrollable::Id::new("composer-form")
}

pub fn field_id(field: Field) -> text_input::Id {
    match field {
        Field::Hashtags => text_input::Id::new("composer-hashtags"),
        Field::Comment => text_input::Id::new("composer-comment"),
    }
}

/// Bring a failing field into view and give it focus
pub fn reveal_field(field: Field) -> Task<Message> {
    let y = match field {
        Field::Hashtags => 0.85,
        Field::Comment => 1.0,
    };
    Task::batch([
        scrollable::snap_to(scroll_id(), RelativeOffset { x: 0.0, y }),
        text_input::focus(field_id(field)),
    ])
}

pub fn view<'a>(composer: &'a Composer, preview: Option<&'a PreviewImage>) -> Element<'a, Message> {
    let state = composer.state();
    let reading = state.scale.reading();

    let title = state
        .selected_file
        .as_ref()
        .map_or("New photo", |file| file.name.as_str());

    let header = row![
        text(title).size(22),
        horizontal_space(),
        button("Cancel").on_press_maybe(composer.cancel_enabled().then_some(Message::CancelComposer)),
    ]
    .align_y(Alignment::Center);

    let picture: Element<'a, Message> = match preview {
        Some(preview) => {
            let (width, height) = preview.display_size(reading.zoom);
            Image::new(preview.handle.clone())
                .width(Length::Fixed(width))
                .height(Length::Fixed(height))
                .content_fit(ContentFit::Contain)
                .into()
        }
        None => text("Rendering preview...").into(),
    };
    let preview_box = container(picture)
        .width(Length::Fill)
        .height(Length::Fixed(PREVIEW_BOX))
        .center_x(Length::Fill)
        .center_y(Length::Fixed(PREVIEW_BOX));

    let scale_row = row![
        button("-").on_press_maybe(state.scale.can_decrease().then_some(Message::ScaleDown)),
        text(reading.to_string()).width(Length::Fixed(56.0)).center(),
        button("+").on_press_maybe(state.scale.can_increase().then_some(Message::ScaleUp)),
    ]
    .spacing(10)
    .align_y(Alignment::Center);

    let mut controls = Column::new().spacing(12).push(scale_row);

    if state.effects.intensity_visible() {
        if let (Some(range), Some(level)) = (state.effects.range(), state.effects.intensity()) {
            controls = controls.push(
                row![
                    slider(range.min..=range.max, level, Message::IntensityChanged).step(range.step),
                    text(state.effects.level_text()).width(Length::Fixed(48.0)),
                ]
                .spacing(10)
                .align_y(Alignment::Center),
            );
        }
    }

    let selected = Some(state.effects.effect());
    let effects = Effect::ALL.iter().fold(Row::new().spacing(14), |row, effect| {
        row.push(radio(effect.display_name(), *effect, selected, Message::EffectSelected))
    });
    controls = controls.push(effects);

    let hashtags = column![
        text_input("#hashtags", &state.hashtags)
            .id(field_id(Field::Hashtags))
            .on_input(Message::HashtagsEdited)
            .on_submit(Message::Submit),
        error_line(state.hashtag_error.as_deref()),
    ]
    .spacing(4);

    let comment = column![
        text_input("Add a comment...", &state.comment)
            .id(field_id(Field::Comment))
            .on_input(Message::CommentEdited)
            .on_submit(Message::Submit),
        error_line(state.comment_error.as_deref()),
    ]
    .spacing(4);

    let submit = button(text(state.submit_label()))
        .padding(10)
        .on_press_maybe(state.submit_enabled().then_some(Message::Submit));

    let form = column![header, preview_box, controls, hashtags, comment, submit]
        .spacing(16)
        .padding(20);

    container(scrollable(form).id(scroll_id()))
        .width(Length::Fixed(PANEL_WIDTH))
        .max_height(760.0)
        .style(container::rounded_box)
        .into()
}

fn error_line<'a>(message: Option<&'a str>) -> Element<'a, Message> {
    match message {
        Some(message) => text(message).size(13).style(text::danger).into(),
        None => Column::new().into(),
    }
}

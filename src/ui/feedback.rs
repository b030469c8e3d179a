use iced::widget::{button, column, container, text};
use iced::{Alignment, Element};

use crate::compose::feedback::{Feedback, FeedbackKind};
use crate::Message;

pub fn view(feedback: &Feedback) -> Element<'_, Message> {
    let title = match feedback.kind {
        FeedbackKind::Success => text(&feedback.title).size(20).style(text::success),
        FeedbackKind::Error => text(&feedback.title).size(20).style(text::danger),
    };

    container(
        column![
            title,
            button(text(feedback.button_label())).on_press(Message::FeedbackPrimary),
        ]
        .spacing(20)
        .align_x(Alignment::Center),
    )
    .padding(30)
    .style(container::rounded_box)
    .into()
}

/// Full-screen photo viewer
use iced::widget::image::Handle;
use iced::widget::{
    button, column, container, horizontal_space, row, scrollable, text, Column, Image,
};
use iced::{Alignment, ContentFit, Element, Length};

use crate::state::viewer::Viewer;
use crate::Message;

pub fn view<'a>(viewer: &'a Viewer, picture: Option<&'a Handle>) -> Element<'a, Message> {
    let photo = viewer.photo();

    let header = row![
        text(format!("♥ {}", photo.likes)),
        horizontal_space(),
        button("Close").on_press(Message::CloseViewer),
    ]
    .align_y(Alignment::Center);

    let picture: Element<'a, Message> = match picture {
        Some(handle) => Image::new(handle.clone())
            .width(Length::Fill)
            .height(Length::Fixed(420.0))
            .content_fit(ContentFit::Contain)
            .into(),
        None => container(text("Loading..."))
            .center_x(Length::Fill)
            .center_y(Length::Fixed(420.0))
            .into(),
    };

    let comments = viewer
        .visible_comments()
        .iter()
        .fold(Column::new().spacing(6), |list, comment| {
            list.push(
                column![
                    text(&comment.name).size(13),
                    text(&comment.message),
                ]
                .spacing(2),
            )
        });

    let mut body = column![
        header,
        picture,
        text(&photo.description),
        text(viewer.counter_text()).size(13),
        comments,
    ]
    .spacing(12)
    .padding(20);

    if viewer.has_more() {
        body = body.push(button("Load more").on_press(Message::ShowMoreComments));
    }

    container(scrollable(body))
        .width(Length::Fixed(720.0))
        .max_height(820.0)
        .style(container::rounded_box)
        .into()
}

use iced::widget::{button, column, container, horizontal_space, row, scrollable, text, Row};
use iced::{Alignment, Element, Length};
use iced_aw::Wrap;

use crate::state::data::Photo;
use crate::state::gallery::{Gallery, SortFilter};
use crate::Message;

const CARD_WIDTH: f32 = 220.0;

pub fn view(gallery: &Gallery, scroll_locked: bool, opening: bool) -> Element<'_, Message> {
    let mut toolbar = Row::new().spacing(8).align_y(Alignment::Center);
    toolbar = toolbar.push(text("Kekstagram").size(26));
    toolbar = toolbar.push(horizontal_space());

    // Filters stay hidden until the photo list arrived
    if gallery.is_loaded() {
        let highlighted = gallery.highlighted();
        for filter in SortFilter::ALL {
            let active = filter == highlighted;
            toolbar = toolbar.push(
                button(text(filter.label()))
                    .style(move |theme, status| {
                        if active {
                            button::primary(theme, status)
                        } else {
                            button::secondary(theme, status)
                        }
                    })
                    .on_press(Message::FilterClicked(filter)),
            );
        }
    }
    // Disabled while a picked file is still being decoded
    let upload = if opening { "Opening..." } else { "Upload" };
    toolbar = toolbar.push(button(upload).on_press_maybe((!opening).then_some(Message::PickFile)));

    let body: Element<'_, Message> = if gallery.is_loaded() {
        let cards: Vec<Element<'_, Message>> = gallery.visible().map(card).collect();
        let grid = container(Wrap::with_elements(cards)).padding(8);
        if scroll_locked {
            grid.into()
        } else {
            scrollable(grid).height(Length::Fill).into()
        }
    } else {
        container(text("Loading photos..."))
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    };

    column![toolbar, body]
        .spacing(12)
        .padding(16)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

fn card(photo: &Photo) -> Element<'_, Message> {
    let stats = row![
        text(format!("♥ {}", photo.likes)),
        text(format!("💬 {}", photo.comments.len())),
    ]
    .spacing(12);

    let body = column![text(&photo.description).size(14), stats].spacing(8);

    container(
        button(body)
            .width(Length::Fill)
            .style(button::text)
            .on_press(Message::OpenPhoto(photo.id)),
    )
    .width(Length::Fixed(CARD_WIDTH))
    .padding(6)
    .style(container::rounded_box)
    .into()
}

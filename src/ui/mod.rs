pub mod help;
pub mod status_bar;

use ratatui::layout::{Constraint, Layout};
use ratatui::Frame;

use crate::app::App;

pub fn render(app: &mut App, frame: &mut Frame) {
    let [body, footer] = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)])
        .areas(frame.area());

    let theme = app.config.theme.clone();
    if let Some(view) = &mut app.view {
        view.render(&theme, frame, body);
    }
    status_bar::render(app, &theme, frame, footer);

    if app.help_visible {
        help::render(&theme, frame, frame.area());
    }
}

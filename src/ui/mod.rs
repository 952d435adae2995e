mod attempt;
mod result;

use ratatui::{prelude::*, widgets::Block, widgets::Paragraph};

use crate::app::{App, Screen};

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    match &app.screen {
        Screen::Loading => render_notice(frame, area, "Loading quiz…", Color::DarkGray),
        Screen::Attempt => attempt::render(frame, area, app),
        Screen::Submitting => render_notice(frame, area, "Submitting…", Color::Yellow),
        Screen::Result(view) => result::render(frame, area, app, view),
        Screen::Failed { message } => render_notice(frame, area, message, Color::Red),
    }
}

fn render_notice(frame: &mut Frame, area: Rect, message: &str, color: Color) {
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(3),
        Constraint::Fill(1),
    ])
    .split(area);

    let content = vec![
        Line::from(Span::styled(message, Style::default().fg(color))),
        Line::from(""),
        Line::from("esc quit".fg(Color::DarkGray)),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center);
    frame.render_widget(widget, chunks[1]);
}

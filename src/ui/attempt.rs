use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::models::Role;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // progress text
        Constraint::Length(1), // progress gauge
        Constraint::Length(2), // pass requirement / guest notice
        Constraint::Length(3), // question text
        Constraint::Fill(1),   // choices or free-text input
        Constraint::Length(2), // error / hint
        Constraint::Length(1), // controls
    ])
    .margin(1)
    .split(area);

    render_progress(frame, chunks[0], chunks[1], app);
    render_notices(frame, chunks[2], app);

    if let Some(question) = app.current_question() {
        render_question_text(frame, chunks[3], app, question.audio_path.is_some());
        if question.has_choices() {
            render_choices(frame, chunks[4], app);
        } else {
            render_text_input(frame, chunks[4], app);
        }
    }

    render_status(frame, chunks[5], app);
    render_controls(frame, chunks[6], app);
}

fn render_progress(frame: &mut Frame, text_area: Rect, gauge_area: Rect, app: &App) {
    let total = app.navigator.len().max(1);
    let current = app.navigator.index() + 1;

    let label = format!("Question {current} of {total}");
    frame.render_widget(
        Paragraph::new(label).alignment(Alignment::Right).fg(Color::DarkGray),
        text_area,
    );

    let gauge = Gauge::default()
        .ratio(current as f64 / total as f64)
        .gauge_style(Style::default().fg(Color::Green).bg(Color::DarkGray))
        .use_unicode(true)
        .label("");
    frame.render_widget(gauge, gauge_area);
}

fn render_notices(frame: &mut Frame, area: Rect, app: &App) {
    let mut lines = Vec::new();
    if let Some(quiz) = &app.quiz {
        lines.push(Line::from(
            format!(
                "Pass requires at least {} points (total: {})",
                quiz.pass_score,
                quiz.total_points()
            )
            .fg(Color::DarkGray),
        ));
    }
    if app.role == Role::Guest {
        lines.push(Line::from(
            "Guest attempt: your result won't be linked to an account".fg(Color::Yellow),
        ));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_question_text(frame: &mut Frame, area: Rect, app: &App, has_audio: bool) {
    let Some(question) = app.current_question() else {
        return;
    };
    let mut lines = vec![Line::from(question.question_text.as_str().bold())];
    if has_audio {
        lines.push(Line::from("(listening question: audio attached)".fg(Color::DarkGray)));
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}

fn render_choices(frame: &mut Frame, area: Rect, app: &App) {
    let Some(question) = app.current_question() else {
        return;
    };
    let Some(choices) = question.choices.as_ref() else {
        return;
    };
    let given = app.answers.get(question.id);

    let mut lines: Vec<Line> = Vec::with_capacity(choices.len() * 2);
    for (index, choice) in choices.iter().enumerate() {
        let highlighted = index == app.cursor;
        let selected = given.is_some_and(|v| v.is_selected(choice));

        let style = if highlighted {
            Style::default().fg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        let marker = if highlighted { ">" } else { " " };
        let check = if selected { "[x]" } else { "[ ]" };

        lines.push(Line::from(vec![
            Span::styled(format!(" {marker} "), style),
            Span::styled(format!("{check} "), style),
            Span::styled(choice.as_str(), style),
        ]));
        lines.push(Line::from(""));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_text_input(frame: &mut Frame, area: Rect, app: &App) {
    let Some(question) = app.current_question() else {
        return;
    };
    let text = app
        .answers
        .get(question.id)
        .map(|v| v.display_form())
        .unwrap_or_default();

    let widget = Paragraph::new(format!("{text}\u{2588}")).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray)
            .padding(Padding::horizontal(1))
            .title(" answer "),
    );
    frame.render_widget(widget, area);
}

fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let mut lines = Vec::new();
    if let Some(error) = &app.submit_error {
        lines.push(Line::from(
            format!("{error} (press enter to retry)").fg(Color::Red),
        ));
    } else if app.navigator.is_last() && !app.answers.all_answered(app.questions()) {
        lines.push(Line::from(
            "Answer all questions before submitting".fg(Color::DarkGray),
        ));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_controls(frame: &mut Frame, area: Rect, app: &App) {
    let submit = if app.can_submit() || app.submit_error.is_some() {
        "enter submit  ·  "
    } else {
        ""
    };
    let widget = Paragraph::new(format!(
        "←/→ prev/next  ·  ↑/↓ move  ·  space toggle  ·  {submit}esc quit"
    ))
    .alignment(Alignment::Center)
    .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::app::{App, ResultView};
use crate::models::Role;
use crate::reconcile::display_correct_answer;

const PROMPT_PREVIEW_LENGTH: usize = 48;

pub fn render(frame: &mut Frame, area: Rect, app: &App, view: &ResultView) {
    let chunks = Layout::vertical([
        Constraint::Length(6),
        Constraint::Fill(1),
        Constraint::Length(2),
    ])
    .margin(1)
    .split(area);

    render_headline(frame, chunks[0], view);

    match view {
        ResultView::Detailed { .. } => render_breakdown(frame, chunks[1], app, view),
        ResultView::Summary(_) => render_guest_nudge(frame, chunks[1], app),
    }

    render_controls(frame, chunks[2]);
}

fn render_headline(frame: &mut Frame, area: Rect, view: &ResultView) {
    // The headline always reflects the server-side aggregate, never the
    // reconciled breakdown below it.
    let summary = view.summary();
    let (verdict, color) = if summary.passed {
        ("You passed!", Color::Green)
    } else {
        ("You did not pass.", Color::Red)
    };

    let content = vec![
        Line::from(""),
        Line::from(Span::styled("RESULTS", Style::default().fg(Color::Cyan).bold())),
        Line::from(""),
        Line::from(Span::styled(
            format!("{verdict} — {} / {}", summary.score, summary.max),
            Style::default().fg(color).bold(),
        )),
        Line::from(""),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, area);
}

fn render_breakdown(frame: &mut Frame, area: Rect, app: &App, view: &ResultView) {
    let ResultView::Detailed {
        quiz,
        answers,
        verdicts,
        ..
    } = view
    else {
        return;
    };

    let mut lines: Vec<Line> = Vec::with_capacity(verdicts.len() * 3);
    for (index, (question, verdict)) in quiz.questions.iter().zip(verdicts.iter()).enumerate() {
        let (symbol, color) = if verdict.correct {
            ("✓", Color::Green)
        } else {
            ("✗", Color::Red)
        };

        let given = answers
            .get(question.id)
            .map(|v| v.display_form())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "(no answer)".to_string());
        let correct = question
            .correct_answer
            .as_deref()
            .map(display_correct_answer)
            .unwrap_or_default();

        lines.push(Line::from(vec![
            Span::styled(format!(" {symbol} "), Style::default().fg(color)),
            Span::styled(
                format!("{:2}. ", index + 1),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(preview(&question.question_text), Style::default().fg(Color::Gray)),
        ]));
        lines.push(Line::from(vec![
            Span::raw("      "),
            Span::styled(format!("yours: {given}"), Style::default().fg(Color::Gray)),
            Span::styled(
                format!("   correct: {correct}"),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        lines.push(Line::from(""));
    }

    let widget = Paragraph::new(lines)
        .block(Block::default().padding(Padding::horizontal(1)))
        .scroll((app.result_scroll as u16, 0));
    frame.render_widget(widget, area);
}

fn render_guest_nudge(frame: &mut Frame, area: Rect, app: &App) {
    let mut lines = Vec::new();
    if app.role == Role::Guest {
        lines.push(Line::from(
            "Register to save your progress and see detailed results.".fg(Color::Yellow),
        ));
    }
    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

fn preview(text: &str) -> String {
    if text.chars().count() > PROMPT_PREVIEW_LENGTH {
        let truncated: String = text.chars().take(PROMPT_PREVIEW_LENGTH).collect();
        format!("{truncated}...")
    } else {
        text.to_string()
    }
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new("j/k scroll  ·  q quit")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

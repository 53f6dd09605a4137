//! Main UI renderer

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::app::{App, Request};
use super::spinner_frame;
use super::theme::Theme;
use crate::core::countdown::Countdown;
use crate::core::session::now_millis;

/// Label of the reveal button
pub const BUTTON_LABEL: &str = "Discover External Truth";

/// Shown in the empty question input
pub const QUESTION_PLACEHOLDER: &str = "Devine Further Clarity";

/// Render the entire UI
pub fn render(frame: &mut Frame, app: &App) {
    render_at(frame, app, now_millis());
}

/// Render with an explicit clock for the countdown
pub fn render_at(frame: &mut Frame, app: &App, now_ms: i64) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Status bar
        ])
        .split(frame.area());

    render_header(frame, chunks[0], app);
    render_content(frame, chunks[1], app, now_ms);
    render_status_bar(frame, chunks[2], app);

    if app.show_help {
        render_help_overlay(frame);
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let title = if app.state_gathered {
        format!(" vibes │ {} │ {} ", app.api_label, app.stage().label())
    } else {
        format!(" vibes │ {} ", app.api_label)
    };

    let header = Paragraph::new(title)
        .style(Theme::header())
        .block(Block::default().borders(Borders::BOTTOM));

    frame.render_widget(header, area);
}

/// Each component is drawn only while its flag is set
fn render_content(frame: &mut Frame, area: Rect, app: &App, now_ms: i64) {
    if !app.state_gathered {
        let waiting = Paragraph::new("\n  Gathering the vibes...").style(Theme::muted());
        frame.render_widget(waiting, area);
        return;
    }

    let session = &app.session;
    let mut constraints = Vec::new();
    if session.is_button_shown {
        constraints.push(Constraint::Length(5));
    }
    if session.is_fortune_shown {
        constraints.push(Constraint::Length(10));
    }
    if session.is_clarity_shown {
        constraints.push(Constraint::Min(10));
    }
    if constraints.is_empty() {
        return;
    }
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let mut slot = 0;
    if session.is_button_shown {
        render_button(frame, chunks[slot]);
        slot += 1;
    }
    if session.is_fortune_shown {
        render_fortune(frame, chunks[slot], app);
        slot += 1;
    }
    if session.is_clarity_shown {
        render_clarity(frame, chunks[slot], app, now_ms);
    }
}

fn render_button(frame: &mut Frame, area: Rect) {
    let width = (BUTTON_LABEL.len() as u16 + 14).min(area.width);
    let button_area = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + 1,
        width,
        area.height.min(3),
    );

    let button = Paragraph::new(Line::from(vec![
        Span::styled(BUTTON_LABEL, Theme::button()),
        Span::styled("  [Enter]", Theme::muted()),
    ]))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).border_style(Theme::input()));

    frame.render_widget(button, button_area);
}

fn render_fortune(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    let fortune = Paragraph::new(app.session.fortune.as_str())
        .style(Theme::fortune())
        .wrap(Wrap { trim: true })
        .block(Block::default().title(" Fortune ").borders(Borders::ALL));
    frame.render_widget(fortune, chunks[0]);

    let input_line = if app.session.question.is_empty() {
        Line::from(vec![
            Span::styled("█", Theme::input()),
            Span::styled(QUESTION_PLACEHOLDER, Theme::muted()),
        ])
    } else {
        Line::from(vec![
            Span::styled(app.session.question.as_str(), Theme::normal()),
            Span::styled("█", Theme::input()),
        ])
    };

    let input = Paragraph::new(input_line).block(
        Block::default()
            .title(" Ask [Enter] ")
            .borders(Borders::ALL)
            .border_style(Theme::input()),
    );
    frame.render_widget(input, chunks[1]);
}

fn render_clarity(frame: &mut Frame, area: Rect, app: &App, now_ms: i64) {
    let session = &app.session;
    let countdown = Countdown::at(session.time_to_next_oracle, now_ms);

    let mut lines = vec![
        Line::from(Span::styled(session.fortune.as_str(), Theme::fortune())),
        Line::from(""),
        Line::from(vec![
            Span::styled("You asked: ", Theme::muted()),
            Span::raw(session.question.as_str()),
        ]),
        Line::from(""),
        Line::from(Span::styled(session.answer.as_str(), Theme::answer())),
        Line::from(""),
    ];

    match countdown {
        Countdown::Unset => {}
        Countdown::Elapsed => {
            lines.push(Line::from(Span::styled(countdown.display(), Theme::countdown())));
            lines.push(Line::from(Span::styled(
                "Press [r] to consult the oracle again",
                Theme::muted(),
            )));
        }
        Countdown::Running(_) => {
            lines.push(Line::from(vec![
                Span::styled("Next fortune in ", Theme::muted()),
                Span::styled(countdown.display(), Theme::countdown()),
            ]));
        }
    }

    let clarity = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().title(" Clarity ").borders(Borders::ALL));
    frame.render_widget(clarity, area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let status_text = match app.pending {
        Some(request) => {
            let what = match request {
                Request::Load => "Gathering the vibes",
                Request::Fortune => "Consulting the oracle",
                Request::Clarity => "Seeking clarity",
            };
            format!(" {} {}... ", spinner_frame(app.tick_counter), what)
        }
        None if app.is_typing() => " Type your question │ Ctrl-C to quit ".to_string(),
        None => " ? for help │ q to quit ".to_string(),
    };

    let status = Paragraph::new(status_text)
        .style(Theme::status_bar())
        .block(Block::default().borders(Borders::TOP));

    frame.render_widget(status, area);
}

fn render_help_overlay(frame: &mut Frame) {
    let area = frame.area();

    let popup_width = (u32::from(area.width) * 60 / 100).min(50) as u16;
    let popup_height = (u32::from(area.height) * 70 / 100).min(11) as u16;
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let text: Vec<Line> = help_content()
        .into_iter()
        .map(|(key, desc)| {
            Line::from(vec![
                Span::styled(format!("  {:12}", key), Style::default().fg(Theme::SECONDARY)),
                Span::raw(desc),
            ])
        })
        .collect();

    let help = Paragraph::new(text)
        .block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .style(Style::default().bg(Color::Black));

    frame.render_widget(help, popup_area);
}

fn help_content() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Enter", "Reveal fortune / ask"),
        ("Backspace", "Delete a character"),
        ("Esc", "Clear the question"),
        ("r", "Reload the session"),
        ("?", "Show this help"),
        ("q", "Quit"),
        ("Ctrl-C", "Quit (always)"),
    ]
}

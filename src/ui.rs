use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};
use crate::analysis::{AnalysisResult, ModelChoice};
use crate::app::{App, Focus};

/// Lines for the result container. Shared with the one-shot CLI output.
pub fn result_lines(result: &AnalysisResult) -> Vec<Line<'static>> {
    let label = Style::default().add_modifier(Modifier::BOLD);

    // Objects show their sentiment block, falling back to a `text` field
    if let Some(sentiment) = result.sentiment() {
        let mut lines = vec![Line::from(vec![
            Span::styled("Sentiment: ", label),
            Span::styled(sentiment, Style::default().fg(sentiment_color(result))),
        ])];
        if let Some(confidence) = result.confidence() {
            lines.push(Line::from(vec![
                Span::styled("Confidence: ", label),
                Span::raw(confidence),
            ]));
        }
        return lines;
    }

    match result.full_text() {
        Some(text) => full_response_lines(text, label),
        None => Vec::new(),
    }
}

fn full_response_lines(text: &str, label: Style) -> Vec<Line<'static>> {
    let mut body = text.lines();
    let first = body.next().unwrap_or_default().to_string();
    let mut lines = vec![Line::from(vec![
        Span::styled("Full Response: ", label),
        Span::raw(first),
    ])];
    lines.extend(body.map(|line| Line::raw(line.to_string())));
    lines
}

fn sentiment_color(result: &AnalysisResult) -> Color {
    match result.sentiment().map(|s| s.to_lowercase()).as_deref() {
        Some("positive") => Color::Green,
        Some("negative") => Color::Red,
        _ => Color::Yellow,
    }
}

pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_body(app, frame, body_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Sentiment Analysis ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(app.client.endpoint().to_string(), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_body(app: &App, frame: &mut Frame, area: Rect) {
    let error_height = if app.error.is_some() { 3 } else { 0 };

    let [input_area, model_area, trigger_area, error_area, result_area] = Layout::vertical([
        Constraint::Length(7),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(error_height),
        Constraint::Min(0),
    ])
    .areas(area);

    render_text_input(app, frame, input_area);
    render_model_selector(app, frame, model_area);
    render_trigger(app, frame, trigger_area);

    if let Some(error) = &app.error {
        let paragraph = Paragraph::new(error.as_str())
            .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
            .wrap(Wrap { trim: false })
            .block(Block::default().padding(Padding::horizontal(1)));
        frame.render_widget(paragraph, error_area);
    }

    if let Some(result) = &app.result {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Analysis Result ");
        let paragraph = Paragraph::new(result_lines(result))
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((app.result_scroll, 0));
        frame.render_widget(paragraph, result_area);
    }
}

fn focus_border(app: &App, focus: Focus) -> Style {
    if app.focus == focus {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn render_text_input(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_border(app, Focus::Text))
        .title(" Text ");
    let inner = block.inner(area);

    let (row, col) = cursor_row_col(&app.text, app.cursor);
    let scroll_y = row.saturating_sub(inner.height.saturating_sub(1));
    let scroll_x = col.saturating_sub(inner.width.saturating_sub(1));

    let paragraph = if app.text.is_empty() {
        Paragraph::new(Span::styled(
            "Enter text to analyze...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Paragraph::new(app.text.as_str()).scroll((scroll_y, scroll_x))
    };
    frame.render_widget(paragraph.block(block), area);

    if app.focus == Focus::Text && inner.width > 0 && inner.height > 0 {
        frame.set_cursor_position((
            inner.x.saturating_add(col - scroll_x),
            inner.y.saturating_add(row - scroll_y),
        ));
    }
}

/// Cursor row/column in the unwrapped text, clamped to the terminal coordinate range.
fn cursor_row_col(text: &str, cursor: usize) -> (u16, u16) {
    let before: String = text.chars().take(cursor).collect();
    let row = before.matches('\n').count();
    let col = before.rsplit('\n').next().map(|l| l.chars().count()).unwrap_or(0);
    (
        u16::try_from(row).unwrap_or(u16::MAX),
        u16::try_from(col).unwrap_or(u16::MAX),
    )
}

fn render_model_selector(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_border(app, Focus::Model))
        .title(" Model ");

    let mut spans = Vec::new();
    for model in ModelChoice::all() {
        let (marker, style) = if model == app.model {
            ("(•) ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        } else {
            ("( ) ", Style::default())
        };
        spans.push(Span::styled(format!(" {}{} ", marker, model.display_name()), style));
        spans.push(Span::raw("  "));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_trigger(app: &App, frame: &mut Frame, area: Rect) {
    let (label, style) = if app.loading {
        (app.busy_label(), Style::default().fg(Color::DarkGray))
    } else if app.focus == Focus::Trigger {
        (
            "Analyze Sentiment".to_string(),
            Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD),
        )
    } else {
        ("Analyze Sentiment".to_string(), Style::default().fg(Color::Blue))
    };

    let border = if app.loading {
        Style::default().fg(Color::DarkGray)
    } else {
        focus_border(app, Focus::Trigger)
    };

    let button = Paragraph::new(Line::from(Span::styled(format!(" {} ", label), style)))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(border));
    frame.render_widget(button, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = if app.loading {
        Style::default().bg(Color::Yellow).fg(Color::Black)
    } else {
        Style::default().bg(Color::Blue).fg(Color::White)
    };
    let mode_text = if app.loading { " BUSY " } else { " READY " };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = match app.focus {
        Focus::Text => vec![
            Span::styled(" Esc ", key_style),
            Span::styled(" done ", label_style),
            Span::styled(" ^U ", key_style),
            Span::styled(" clear ", label_style),
        ],
        Focus::Model => vec![
            Span::styled(" ←/→ ", key_style),
            Span::styled(" switch ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
        Focus::Trigger => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" analyze ", label_style),
            Span::styled(" i ", key_style),
            Span::styled(" edit ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
    };
    hints.extend(vec![
        Span::styled(" Tab ", key_style),
        Span::styled(" focus ", label_style),
        Span::styled(" ^S ", key_style),
        Span::styled(" analyze ", label_style),
        Span::styled(" PgUp/PgDn ", key_style),
        Span::styled(" scroll ", label_style),
    ]);

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

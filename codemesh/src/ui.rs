//! UI rendering for the TUI.

use codemesh_core::types::Grade;
use codemesh_core::DashboardState;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::app::App;

// ========== Dashboard Colors ==========

/// Accent for the title and selected agent
const ACCENT: Color = Color::Rgb(0, 180, 180);
/// Feed-online indicator
const ONLINE: Color = Color::Rgb(50, 205, 50);
/// Feed-stale indicator
const STALE: Color = Color::Rgb(220, 80, 80);
/// A-grade gauge color
const GRADE_A: Color = Color::Rgb(50, 205, 50);
/// B-grade gauge color
const GRADE_B: Color = Color::Rgb(220, 180, 0);
/// Everything below B
const GRADE_LOW: Color = Color::Rgb(255, 127, 80);
/// High-severity queue entries
const SEVERITY_HIGH: Color = Color::Rgb(220, 80, 80);
/// Dim gray for secondary text
const DIM: Color = Color::Rgb(128, 128, 128);
/// Border color for sidebar blocks
const BORDER_SIDEBAR: Color = Color::Rgb(80, 120, 120);
/// Border color for the prompt block
const BORDER_PROMPT: Color = Color::Rgb(100, 180, 180);

/// Render the application UI.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Layout: header, body, footer
    let chunks = Layout::vertical([
        Constraint::Length(2), // Header
        Constraint::Min(10),   // Body
        Constraint::Length(1), // Footer
    ])
    .split(area);

    render_header(frame, &app.dashboard, chunks[0]);
    render_body(frame, app, chunks[1]);
    render_footer(frame, chunks[2]);
}

/// Render the title bar with the feed liveness indicator.
fn render_header(frame: &mut Frame, dashboard: &DashboardState, area: Rect) {
    let (dot_color, feed_label) = if dashboard.feed_live {
        (ONLINE, "feed live")
    } else {
        (STALE, "feed stale")
    };
    let line = Line::from(vec![
        Span::styled("ContextMesh", Style::default().fg(ACCENT).bold()),
        Span::raw("  AI Development Dashboard  "),
        Span::styled("●", Style::default().fg(dot_color)),
        Span::styled(format!(" {feed_label}"), Style::default().fg(DIM)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the two-column body: sidebar panels on the left, prompt and
/// response on the right.
fn render_body(frame: &mut Frame, app: &App, area: Rect) {
    let columns =
        Layout::horizontal([Constraint::Percentage(35), Constraint::Percentage(65)]).split(area);

    let sidebar = Layout::vertical([
        Constraint::Length(2 + app.dashboard.health_scores.len() as u16 * 2), // Health gauges
        Constraint::Length(2 + app.dashboard.refactor_queue.len().max(1) as u16), // Refactor queue
        Constraint::Min(4), // Event feed
    ])
    .split(columns[0]);

    render_health_panel(frame, app, sidebar[0]);
    render_refactor_panel(frame, app, sidebar[1]);
    render_event_feed(frame, app, sidebar[2]);

    let main = Layout::vertical([
        Constraint::Length(3), // Prompt input
        Constraint::Length(1), // Agent selector
        Constraint::Min(4),    // Response
    ])
    .split(columns[1]);

    render_prompt(frame, app, main[0]);
    render_agent_selector(frame, app, main[1]);
    render_response(frame, app, main[2]);
}

/// Render the codebase-health gauges.
fn render_health_panel(frame: &mut Frame, app: &App, area: Rect) {
    let block = sidebar_block("Codebase Health");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::vertical(
        app.dashboard
            .health_scores
            .iter()
            .map(|_| Constraint::Length(2))
            .collect::<Vec<_>>(),
    )
    .split(inner);

    for (metric, row) in app.dashboard.health_scores.iter().zip(rows.iter()) {
        let color = match metric.grade() {
            Grade::A => GRADE_A,
            Grade::B => GRADE_B,
            Grade::Other => GRADE_LOW,
        };
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(color).bg(Color::Rgb(40, 40, 40)))
            .ratio(metric.ratio())
            .label(Span::styled(
                format!("{} {}", metric.metric, metric.score),
                Style::default().fg(Color::White),
            ));
        frame.render_widget(gauge, *row);
    }
}

/// Render the refactor queue with severity coloring.
fn render_refactor_panel(frame: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = if app.dashboard.refactor_queue.is_empty() {
        vec![Line::styled("Queue clear", Style::default().fg(DIM))]
    } else {
        app.dashboard
            .refactor_queue
            .iter()
            .map(|item| {
                let severity_color = if item.is_high_severity() {
                    SEVERITY_HIGH
                } else {
                    DIM
                };
                Line::from(vec![
                    Span::styled(
                        format!("[{}] ", item.severity),
                        Style::default().fg(severity_color),
                    ),
                    Span::styled(&item.file, Style::default().fg(Color::White)),
                    Span::styled(format!(": {}", item.issue), Style::default().fg(DIM)),
                ])
            })
            .collect()
    };

    let paragraph = Paragraph::new(lines).block(sidebar_block("Refactor Queue"));
    frame.render_widget(paragraph, area);
}

/// Render the live event feed, newest first.
fn render_event_feed(frame: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = if app.dashboard.events.is_empty() {
        vec![Line::styled("No events yet", Style::default().fg(DIM))]
    } else {
        app.dashboard
            .events
            .iter()
            .rev()
            .map(|event| {
                Line::from(vec![
                    Span::styled(event.local_time(), Style::default().fg(DIM)),
                    Span::raw(" "),
                    Span::styled(&event.details.title, Style::default().fg(Color::White)),
                    Span::styled(
                        format!(" by {}", event.details.user),
                        Style::default().fg(DIM),
                    ),
                ])
            })
            .collect()
    };

    let paragraph = Paragraph::new(lines).block(sidebar_block("Live Webhooks"));
    frame.render_widget(paragraph, area);
}

/// Render the prompt input box.
fn render_prompt(frame: &mut Frame, app: &App, area: Rect) {
    let paragraph = Paragraph::new(Line::from(vec![
        Span::raw(app.prompt.as_str()),
        Span::styled("▌", Style::default().fg(ACCENT)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(BORDER_PROMPT))
            .title(" Ask the agent "),
    );
    frame.render_widget(paragraph, area);
}

/// Render the agent selector line, with the busy indicator on the right.
fn render_agent_selector(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled("Agent: ", Style::default().fg(DIM))];
    for kind in codemesh_core::types::AgentKind::ALL {
        let style = if kind == app.agent {
            Style::default().fg(ACCENT).bold()
        } else {
            Style::default().fg(DIM)
        };
        spans.push(Span::styled(format!(" {} ", kind.label()), style));
    }
    if app.dashboard.busy {
        spans.push(Span::styled(
            "  analyzing...",
            Style::default().fg(GRADE_B),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the scrollable response panel.
fn render_response(frame: &mut Frame, app: &App, area: Rect) {
    let text = if app.dashboard.narrative.is_empty() && !app.dashboard.busy {
        "Submit a prompt to analyze the repository.".to_string()
    } else {
        app.dashboard.narrative.clone()
    };
    let paragraph = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .scroll((app.scroll_offset, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_SIDEBAR))
                .title(" Analysis "),
        );
    frame.render_widget(paragraph, area);
}

/// Render the key-hint footer.
fn render_footer(frame: &mut Frame, area: Rect) {
    let footer = Paragraph::new(Line::styled(
        "Enter: submit | Tab: switch agent | ↑/↓: scroll | Esc: quit",
        Style::default().fg(DIM),
    ))
    .alignment(Alignment::Center);
    frame.render_widget(footer, area);
}

fn sidebar_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_SIDEBAR))
        .title(format!(" {title} "))
}

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};
use std::io::stdout;
use tracing::warn;

use crate::db::Database;
use crate::models::{ApplicationPatch, JobApplication};
use crate::status::{ApplicationStatus, StatusFilter};

struct AppState {
    filter: StatusFilter,
    ids: Vec<String>,
    selected: usize,
    scroll_offset: u16,
}

impl AppState {
    fn new(filter: StatusFilter) -> Self {
        Self {
            filter,
            ids: Vec::new(),
            selected: 0,
            scroll_offset: 0,
        }
    }

    /// Re-run the tab filter, keeping the selection in range.
    fn refresh(&mut self, db: &Database) {
        self.ids = db
            .applications
            .by_filter(self.filter)
            .into_iter()
            .map(|a| a.id.clone())
            .collect();
        if self.selected >= self.ids.len() {
            self.selected = self.ids.len().saturating_sub(1);
        }
    }

    fn current_id(&self) -> Option<&str> {
        self.ids.get(self.selected).map(String::as_str)
    }

    fn next(&mut self) {
        if !self.ids.is_empty() && self.selected < self.ids.len() - 1 {
            self.selected += 1;
            self.scroll_offset = 0;
        }
    }

    fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.scroll_offset = 0;
        }
    }

    fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(3);
    }

    fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(3);
    }
}

fn status_for_key(code: KeyCode) -> Option<ApplicationStatus> {
    let status = match code {
        KeyCode::Char('i') => ApplicationStatus::Interested,
        KeyCode::Char('a') => ApplicationStatus::Applied,
        KeyCode::Char('p') => ApplicationStatus::PhoneScreen,
        KeyCode::Char('v') => ApplicationStatus::Interview,
        KeyCode::Char('t') => ApplicationStatus::TechnicalAssessment,
        KeyCode::Char('o') => ApplicationStatus::Offer,
        KeyCode::Char('n') => ApplicationStatus::Negotiation,
        KeyCode::Char('y') => ApplicationStatus::Accepted,
        KeyCode::Char('x') => ApplicationStatus::Rejected,
        KeyCode::Char('w') => ApplicationStatus::Withdrawn,
        _ => return None,
    };
    Some(status)
}

pub fn status_color(status: ApplicationStatus) -> Color {
    match status {
        ApplicationStatus::Interested => Color::Gray,
        ApplicationStatus::Applied => Color::Blue,
        ApplicationStatus::PhoneScreen
        | ApplicationStatus::Interview
        | ApplicationStatus::TechnicalAssessment => Color::Magenta,
        ApplicationStatus::Offer | ApplicationStatus::Negotiation => Color::Yellow,
        ApplicationStatus::Accepted => Color::Green,
        ApplicationStatus::Rejected | ApplicationStatus::Withdrawn => Color::Red,
    }
}

pub fn run_browse(db: &mut Database, filter: StatusFilter) -> Result<()> {
    if db.applications.is_empty() {
        println!("No applications found.");
        return Ok(());
    }

    let mut state = AppState::new(filter);
    state.refresh(db);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state, db);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
    db: &mut Database,
) -> Result<()> {
    let mut list_state = ListState::default();
    list_state.select(Some(state.selected));

    loop {
        terminal.draw(|frame| draw(frame, state, db, &mut list_state))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Down | KeyCode::Char('j') => state.next(),
                KeyCode::Up | KeyCode::Char('k') => state.prev(),
                KeyCode::Char('J') | KeyCode::PageDown => state.scroll_down(),
                KeyCode::Char('K') | KeyCode::PageUp => state.scroll_up(),
                KeyCode::Tab => {
                    state.filter = state.filter.next();
                    state.selected = 0;
                    state.scroll_offset = 0;
                    state.refresh(db);
                }
                code => {
                    if let (Some(status), Some(id)) = (status_for_key(code), state.current_id()) {
                        let id = id.to_string();
                        if let Err(e) = db.applications.update(&id, ApplicationPatch::status(status)) {
                            warn!(id = %id, error = %e, "status change refused");
                        }
                        // The application may have left the current tab.
                        state.refresh(db);
                    }
                }
            }
            list_state.select(Some(state.selected));
        }
    }
    Ok(())
}

fn draw(frame: &mut Frame, state: &AppState, db: &Database, list_state: &mut ListState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    // Tabs
    let selected_tab = StatusFilter::TABS
        .iter()
        .position(|t| *t == state.filter)
        .unwrap_or(0);
    let tabs = Tabs::new(StatusFilter::TABS.iter().map(|t| {
        let count = db.applications.by_filter(*t).len();
        format!("{} ({})", t.label(), count)
    }))
    .block(Block::default().borders(Borders::ALL).title(" Applications "))
    .select(selected_tab)
    .highlight_style(Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan));
    frame.render_widget(tabs, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(rows[1]);

    // Left panel: application list
    let items: Vec<ListItem> = state
        .ids
        .iter()
        .filter_map(|id| db.applications.get(id))
        .map(|app| {
            let line = Line::from(vec![
                Span::styled(
                    format!("{:<12} ", truncate(app.status.as_str(), 12)),
                    Style::default().fg(status_color(app.status)),
                ),
                Span::raw(format!("{} | {}", truncate(&app.position, 28), app.company)),
            ]);
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ({}) ", state.filter.label(), state.ids.len())),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, columns[0], list_state);

    // Right panel: application detail
    let detail = match state.current_id().and_then(|id| db.applications.get(id)) {
        Some(app) => build_detail(db, app),
        None => Text::raw("No application selected"),
    };
    let detail_widget = Paragraph::new(detail)
        .block(Block::default().borders(Borders::ALL).title(" Detail "))
        .wrap(Wrap { trim: false })
        .scroll((state.scroll_offset, 0));

    frame.render_widget(detail_widget, columns[1]);

    // Footer help
    let help = Paragraph::new(
        " j/k:navigate  J/K:scroll  tab:filter  i/a/p/v/t:pipeline  o/n/y:offer  x:reject w:withdraw  q:quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, rows[2]);
}

fn build_detail(db: &Database, app: &JobApplication) -> Text<'static> {
    let mut lines: Vec<Line> = Vec::new();
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(Color::DarkGray);

    // Header
    lines.push(Line::from(Span::styled(app.position.clone(), bold)));
    lines.push(Line::from(format!(
        "at {} ({}, {})",
        app.company,
        app.location,
        app.work_mode.as_str()
    )));
    lines.push(Line::from(Span::styled(
        format!("Status: {}", app.status),
        Style::default().fg(status_color(app.status)),
    )));

    if let Some(url) = &app.posting_url {
        lines.push(Line::from(format!("URL: {}", url)));
    }
    lines.push(Line::from(format!("Identified: {}", app.date_identified)));
    if let Some(applied) = app.date_applied {
        lines.push(Line::from(format!("Applied: {}", applied)));
    }

    // Soft references may point at deleted records.
    let role = db
        .role_types
        .get(&app.role_type)
        .map(|r| r.title.clone())
        .unwrap_or_else(|| "(unknown)".to_string());
    let resume = db
        .resumes
        .get(&app.resume_used)
        .map(|r| r.name.clone())
        .unwrap_or_else(|| "(unknown)".to_string());
    lines.push(Line::from(format!("Role type: {}", role)));
    lines.push(Line::from(format!("Resume: {}", resume)));
    lines.push(Line::from(""));

    if !app.interviews.is_empty() {
        lines.push(Line::from(Span::styled("INTERVIEWS", bold)));
        for interview in &app.interviews {
            let follow_up = if interview.follow_up_sent { " (followed up)" } else { "" };
            lines.push(Line::from(format!(
                "  #{} {} on {}{}",
                interview.round, interview.kind, interview.date, follow_up
            )));
        }
        lines.push(Line::from(""));
    }

    if !app.tasks.is_empty() {
        lines.push(Line::from(Span::styled("TASKS", bold)));
        for task in &app.tasks {
            let mark = if task.completed { "x" } else { " " };
            lines.push(Line::from(format!("  [{}] {} (due {})", mark, task.description, task.due_date)));
        }
        lines.push(Line::from(""));
    }

    if app.notes.trim().is_empty() {
        lines.push(Line::from(Span::styled("(No notes)", dim)));
    } else {
        lines.push(Line::from(Span::styled("NOTES", bold)));
        for line in textwrap::fill(&app.notes, 70).lines() {
            lines.push(Line::from(format!("  {}", line)));
        }
    }

    Text::from(lines)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_keys_cover_every_status() {
        let keys = ['i', 'a', 'p', 'v', 't', 'o', 'n', 'y', 'x', 'w'];
        let mapped: Vec<ApplicationStatus> = keys
            .iter()
            .filter_map(|c| status_for_key(KeyCode::Char(*c)))
            .collect();
        assert_eq!(mapped, ApplicationStatus::ALL.to_vec());
        assert_eq!(status_for_key(KeyCode::Char('q')), None);
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate("Zürich office", 20), "Zürich office");
        assert_eq!(truncate("Senior Platform Engineer", 10), "Senior ...");
    }
}

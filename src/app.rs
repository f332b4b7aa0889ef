use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::engine::Engine;
use crate::model::config::AppConfig;
use crate::model::mode::Mode;
use crate::model::note::{MeetingNote, RelatedTodoItem, TagSuggestion};
use crate::msg::Msg;
use crate::vault::FsVault;

/// Which notes the left pane lists.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Scope {
    All,
    Untagged,
    Document(PathBuf),
}

impl Scope {
    fn label(&self) -> String {
        match self {
            Scope::All => "All notes".to_string(),
            Scope::Untagged => "Untagged".to_string(),
            Scope::Document(path) => path.display().to_string(),
        }
    }
}

/// Everything the right pane shows for the selected note.
#[derive(Debug, Default)]
struct NoteDetail {
    related: Vec<MeetingNote>,
    todos: Vec<RelatedTodoItem>,
    suggestions: Vec<TagSuggestion>,
}

pub struct App {
    pub mode: Mode,
    pub config: AppConfig,
    vault: FsVault,
    scope: Scope,
    notes: Vec<MeetingNote>,
    /// Indices into `notes` that pass the fuzzy filter, best match first.
    visible: Vec<usize>,
    selected: usize,
    filter_query: String,
    detail: NoteDetail,
    related_selected: usize,
    command_input: String,
    notifications: VecDeque<String>,
    refresh_due: Option<Instant>,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let vault = FsVault::new(config.vault_path());

        let mut app = Self {
            mode: Mode::Normal,
            config,
            vault,
            scope: Scope::All,
            notes: Vec::new(),
            visible: Vec::new(),
            selected: 0,
            filter_query: String::new(),
            detail: NoteDetail::default(),
            related_selected: 0,
            command_input: String::new(),
            notifications: VecDeque::new(),
            refresh_due: None,
            should_quit: false,
        };
        app.refresh();
        Ok(app)
    }

    fn engine(&self) -> Engine<'_, FsVault> {
        Engine::from_config(&self.vault, &self.config)
    }

    // ── MVU: Update ──────────────────────────────────────────────

    pub fn update(&mut self, msg: Msg) -> Result<()> {
        match msg {
            Msg::Key(key) => self.handle_key(key)?,
            Msg::FileChanged(path) => self.handle_file_changed(path),
            Msg::Tick => self.handle_tick(),
            // The frame is redrawn after every batch.
            Msg::Resize => {}
        }
        Ok(())
    }

    fn push_notification(&mut self, message: String) {
        tracing::info!("{message}");
        self.notifications.push_back(message);
        while self.notifications.len() > 8 {
            self.notifications.pop_front();
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.mode {
            Mode::Normal => self.handle_key_normal(key),
            Mode::Related => self.handle_key_related(key),
            Mode::Filter => self.handle_key_filter(key),
            Mode::Command => self.handle_key_command(key),
        }
        Ok(())
    }

    fn handle_key_normal(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::Char('g') | KeyCode::Home => self.select_index(0),
            KeyCode::Char('G') | KeyCode::End => {
                self.select_index(self.visible.len().saturating_sub(1));
            }
            KeyCode::Char('u') => {
                let next = if self.scope == Scope::Untagged {
                    Scope::All
                } else {
                    Scope::Untagged
                };
                self.set_scope(next);
            }
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char('/') => {
                self.mode = Mode::Filter;
            }
            KeyCode::Char(':') => {
                self.mode = Mode::Command;
                self.command_input.clear();
            }
            KeyCode::Tab => {
                if !self.detail.related.is_empty() {
                    self.related_selected = 0;
                    self.mode = Mode::Related;
                }
            }
            _ => {}
        }
    }

    fn handle_key_related(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Tab => self.mode = Mode::Normal,
            KeyCode::Char('j') | KeyCode::Down => {
                if !self.detail.related.is_empty() {
                    self.related_selected = (self.related_selected + 1)
                        .min(self.detail.related.len().saturating_sub(1));
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.related_selected = self.related_selected.saturating_sub(1);
            }
            KeyCode::Enter => {
                if let Some(target) = self.detail.related.get(self.related_selected).cloned() {
                    self.jump_to(&target);
                }
                self.mode = Mode::Normal;
            }
            _ => {}
        }
    }

    fn handle_key_filter(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.filter_query.clear();
                self.mode = Mode::Normal;
                self.apply_filter();
            }
            KeyCode::Enter => self.mode = Mode::Normal,
            KeyCode::Down => self.move_selection(1),
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Backspace => {
                self.filter_query.pop();
                self.apply_filter();
            }
            KeyCode::Char(ch)
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
            {
                self.filter_query.push(ch);
                self.apply_filter();
            }
            _ => {}
        }
    }

    fn handle_key_command(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.command_input.clear();
            }
            KeyCode::Enter => {
                let command = self.command_input.trim().to_string();
                self.mode = Mode::Normal;
                self.command_input.clear();

                if !command.is_empty() {
                    self.run_command(&command);
                }
            }
            KeyCode::Backspace => {
                self.command_input.pop();
            }
            KeyCode::Char(ch)
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
            {
                self.command_input.push(ch);
            }
            _ => {}
        }
    }

    fn run_command(&mut self, input: &str) {
        let mut words = input.split_whitespace();
        let Some(command) = words.next() else {
            return;
        };
        let args: Vec<&str> = words.collect();

        match (command, args.as_slice()) {
            ("q" | "quit", []) => self.should_quit = true,
            ("refresh", []) => self.refresh(),
            ("all", []) => self.set_scope(Scope::All),
            ("untagged", []) => self.set_scope(Scope::Untagged),
            ("open", [file]) => {
                let doc = self.vault_relative(file);
                self.set_scope(Scope::Document(doc));
            }
            ("at", [file, line]) => match line.parse::<usize>() {
                Ok(line) if line > 0 => self.show_note_at(file, line),
                _ => self.push_notification(format!("at: invalid line number {line}")),
            },
            _ => self.push_notification(format!("unknown command: {input}")),
        }
    }

    /// `line` is 1-based, as an editor shows it.
    fn show_note_at(&mut self, file: &str, line: usize) {
        let doc = self.vault_relative(file);
        let found = self.engine().note_at_position(&doc, line - 1);

        match found {
            Some(note) => {
                self.push_notification(format!(
                    "{}:{line} is in \"{}\"",
                    doc.display(),
                    note.heading
                ));
                self.jump_to(&note);
            }
            None => {
                self.push_notification(format!("no meeting note at {}:{line}", doc.display()));
            }
        }
    }

    fn vault_relative(&self, file: &str) -> PathBuf {
        let path = Path::new(file);
        if path.is_absolute() {
            self.vault
                .relative(path)
                .unwrap_or_else(|| path.to_path_buf())
        } else {
            path.to_path_buf()
        }
    }

    fn handle_file_changed(&mut self, path: PathBuf) {
        if path.extension().and_then(|ext| ext.to_str()) != Some("md") {
            return;
        }
        let debounce = Duration::from_millis(self.config.general.refresh_debounce_ms);
        self.refresh_due = Some(Instant::now() + debounce);
    }

    fn handle_tick(&mut self) {
        if let Some(deadline) = self.refresh_due
            && Instant::now() >= deadline
        {
            self.refresh_due = None;
            self.refresh();
        }
    }

    // ── Queries ──────────────────────────────────────────────────

    fn set_scope(&mut self, scope: Scope) {
        self.scope = scope;
        self.selected = 0;
        self.refresh();
    }

    /// Re-run the listing query and keep the selection on the same note if it survives.
    fn refresh(&mut self) {
        let previous = self.selected_note().cloned();

        self.notes = {
            let engine = self.engine();
            match &self.scope {
                Scope::All => engine.parse_all(),
                Scope::Untagged => engine.untagged(),
                Scope::Document(doc) => engine.parse_document(doc),
            }
        };

        if self.notes.is_empty() && self.scope == Scope::All {
            let message = format!(
                "no meeting notes under \"{}\" in {}/",
                self.config.notes.parent_heading, self.config.notes.folder
            );
            tracing::warn!("{message}");
            if self.notifications.back() != Some(&message) {
                self.push_notification(message);
            }
        }

        self.apply_filter();

        if let Some(previous) = previous {
            self.select_note(&previous);
        }
    }

    fn apply_filter(&mut self) {
        if self.filter_query.is_empty() {
            self.visible = (0..self.notes.len()).collect();
        } else {
            let matcher = SkimMatcherV2::default();
            let mut scored: Vec<(i64, usize)> = self
                .notes
                .iter()
                .enumerate()
                .filter_map(|(idx, note)| {
                    let candidate = format!("{} {} {}", note.date_key, note.heading, note.tags.join(" "));
                    matcher
                        .fuzzy_match(&candidate, &self.filter_query)
                        .map(|score| (score, idx))
                })
                .collect();

            scored.sort_by(|a, b| b.0.cmp(&a.0));
            self.visible = scored.into_iter().map(|(_, idx)| idx).collect();
        }

        self.select_index(self.selected);
    }

    fn refresh_detail(&mut self) {
        self.related_selected = 0;
        self.detail = match self.selected_note() {
            Some(note) => {
                let engine = self.engine();
                NoteDetail {
                    related: engine.related_notes(note),
                    todos: engine.related_todos(note),
                    suggestions: engine.suggest_tags(note),
                }
            }
            None => NoteDetail::default(),
        };
    }

    fn selected_note(&self) -> Option<&MeetingNote> {
        self.visible
            .get(self.selected)
            .and_then(|&idx| self.notes.get(idx))
    }

    fn move_selection(&mut self, delta: isize) {
        let next = (self.selected as isize + delta).max(0) as usize;
        self.select_index(next);
    }

    fn select_index(&mut self, idx: usize) {
        self.selected = idx.min(self.visible.len().saturating_sub(1));
        self.refresh_detail();
    }

    fn select_note(&mut self, target: &MeetingNote) -> bool {
        let position = self
            .visible
            .iter()
            .position(|&idx| self.notes[idx].same_position(target));

        match position {
            Some(pos) => {
                self.select_index(pos);
                true
            }
            None => false,
        }
    }

    /// Select `target`, widening scope and dropping the filter if it is hidden.
    fn jump_to(&mut self, target: &MeetingNote) {
        if self.select_note(target) {
            return;
        }

        self.filter_query.clear();
        self.scope = Scope::All;
        self.refresh();
        if !self.select_note(target) {
            self.push_notification(format!("note \"{}\" is no longer present", target.heading));
        }
    }

    // ── MVU: View ────────────────────────────────────────────────

    pub fn view(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // body
                Constraint::Length(1), // status bar
            ])
            .split(frame.area());

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Min(1)])
            .split(chunks[0]);

        self.render_note_list(frame, body[0]);
        self.render_detail(frame, body[1]);
        self.render_status_bar(frame, chunks[1]);

        if self.mode == Mode::Command {
            self.render_command_overlay(frame);
        }
    }

    fn render_note_list(&self, frame: &mut Frame, area: Rect) {
        let height = area.height.saturating_sub(2) as usize;
        let offset = (self.selected + 1).saturating_sub(height.max(1));

        let lines: Vec<Line> = if self.visible.is_empty() {
            vec![Line::from(Span::styled(
                "No meeting notes",
                Style::default().fg(Color::DarkGray),
            ))]
        } else {
            self.visible
                .iter()
                .enumerate()
                .skip(offset)
                .take(height)
                .map(|(pos, &idx)| {
                    let note = &self.notes[idx];
                    let label = format!("{}  {}", note.date_key, display_heading(note));
                    let (label_style, tag_style) = if pos == self.selected {
                        let style = Style::default().fg(Color::Black).bg(Color::Cyan);
                        (style, style)
                    } else {
                        (
                            Style::default().fg(Color::Gray),
                            Style::default().fg(Color::Magenta),
                        )
                    };

                    let mut spans = vec![Span::styled(label, label_style)];
                    if !note.tags.is_empty() {
                        spans.push(Span::styled(format!("  {}", note.tags.join(" ")), tag_style));
                    }
                    Line::from(spans)
                })
                .collect()
        };

        let title = if self.filter_query.is_empty() {
            format!(" {} ({}) ", self.scope.label(), self.visible.len())
        } else {
            format!(
                " {} ({}/{}) /{} ",
                self.scope.label(),
                self.visible.len(),
                self.notes.len(),
                self.filter_query
            )
        };

        let panel = Paragraph::new(lines).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .style(Style::default().bg(Color::Rgb(12, 12, 18))),
        );
        frame.render_widget(panel, area);
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect) {
        let Some(note) = self.selected_note() else {
            let empty = Paragraph::new(Span::styled(
                "Select a note",
                Style::default().fg(Color::DarkGray),
            ))
            .block(Block::default().borders(Borders::ALL));
            frame.render_widget(empty, area);
            return;
        };

        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Percentage(35),
                Constraint::Percentage(35),
                Constraint::Min(3),
            ])
            .split(area);

        let header = vec![
            Line::from(Span::styled(
                display_heading(note),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!(
                    "{}  lines {}-{}  {}",
                    note.path.display(),
                    note.start_line + 1,
                    note.end_line,
                    if note.tags.is_empty() {
                        "untagged".to_string()
                    } else {
                        note.tags.join(" ")
                    }
                ),
                Style::default().fg(Color::Gray),
            )),
        ];
        frame.render_widget(
            Paragraph::new(header).block(Block::default().borders(Borders::ALL)),
            sections[0],
        );

        self.render_related(frame, sections[1]);
        self.render_todos(frame, sections[2]);
        self.render_suggestions(frame, sections[3]);
    }

    fn render_related(&self, frame: &mut Frame, area: Rect) {
        let lines: Vec<Line> = if self.detail.related.is_empty() {
            vec![placeholder("No related notes")]
        } else {
            self.detail
                .related
                .iter()
                .enumerate()
                .map(|(idx, note)| {
                    let label = format!(
                        "{}  {}  {}",
                        note.date_key,
                        display_heading(note),
                        note.tags.join(" ")
                    );
                    if self.mode == Mode::Related && idx == self.related_selected {
                        Line::from(Span::styled(
                            label,
                            Style::default().fg(Color::Black).bg(Color::Cyan),
                        ))
                    } else {
                        Line::from(Span::styled(label, Style::default().fg(Color::Gray)))
                    }
                })
                .collect()
        };

        frame.render_widget(section(" Related notes ", lines), area);
    }

    fn render_todos(&self, frame: &mut Frame, area: Rect) {
        let lines: Vec<Line> = if self.detail.todos.is_empty() {
            vec![placeholder("No related tasks")]
        } else {
            self.detail
                .todos
                .iter()
                .map(|item| {
                    let file = item
                        .todo
                        .path
                        .file_stem()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "[note]".to_string());
                    let location = match &item.todo.heading {
                        Some(heading) => format!("{file}:{} › {heading}", item.todo.line + 1),
                        None => format!("{file}:{}", item.todo.line + 1),
                    };
                    let why = if item.matching_tags.is_empty() {
                        item.reason.to_string()
                    } else {
                        format!("{}: {}", item.reason, item.matching_tags.join(" "))
                    };

                    Line::from(vec![
                        Span::styled("☐ ", Style::default().fg(Color::Yellow)),
                        Span::styled(item.todo.text.clone(), Style::default().fg(Color::Gray)),
                        Span::styled(
                            format!("  {location}  ({why})"),
                            Style::default().fg(Color::DarkGray),
                        ),
                    ])
                })
                .collect()
        };

        frame.render_widget(section(" Related tasks ", lines), area);
    }

    fn render_suggestions(&self, frame: &mut Frame, area: Rect) {
        let lines: Vec<Line> = if self.detail.suggestions.is_empty() {
            vec![placeholder("No tag suggestions")]
        } else {
            self.detail
                .suggestions
                .iter()
                .map(|s| {
                    Line::from(vec![
                        Span::styled(format!("{:>4} ", s.score), Style::default().fg(Color::Cyan)),
                        Span::styled(s.tag.clone(), Style::default().fg(Color::Magenta)),
                        Span::styled(
                            format!("  {}", s.reason),
                            Style::default().fg(Color::DarkGray),
                        ),
                    ])
                })
                .collect()
        };

        frame.render_widget(section(" Suggested tags ", lines), area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let mode_style = match self.mode {
            Mode::Normal => Style::default()
                .fg(Color::Black)
                .bg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            Mode::Related => Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            _ => Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        };

        let mode_span = Span::styled(format!(" {} ", self.mode.label()), mode_style);

        let suffix = match self.mode {
            Mode::Filter => format!(" | /{}", self.filter_query),
            Mode::Command => format!(" | :{}", self.command_input),
            _ => self
                .notifications
                .back()
                .map(|n| format!(" | {n}"))
                .unwrap_or_default(),
        };

        let info = Span::styled(
            format!(
                " {}  {} notes, {} related, {} tasks{} ",
                self.vault.root().display(),
                self.notes.len(),
                self.detail.related.len(),
                self.detail.todos.len(),
                suffix
            ),
            Style::default().fg(Color::Gray).bg(Color::DarkGray),
        );

        let bar = Line::from(vec![mode_span, info]);
        let status = Paragraph::new(bar).style(Style::default().bg(Color::DarkGray));
        frame.render_widget(status, area);
    }

    fn render_command_overlay(&self, frame: &mut Frame) {
        let area = centered_rect(70, 20, frame.area());
        frame.render_widget(Clear, area);

        let prompt = Paragraph::new(format!(":{}", self.command_input)).block(
            Block::default()
                .title(" Command (all | untagged | open <file> | at <file> <line> | refresh | q) ")
                .borders(Borders::ALL)
                .style(Style::default().bg(Color::Rgb(15, 15, 24))),
        );
        frame.render_widget(prompt, area);

        let cursor_x = area.x + 2 + self.command_input.len() as u16;
        let cursor_y = area.y + 1;
        frame.set_cursor_position((cursor_x, cursor_y));
    }
}

fn display_heading(note: &MeetingNote) -> String {
    if note.heading.is_empty() {
        "(untitled)".to_string()
    } else {
        note.heading.clone()
    }
}

fn placeholder(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(Color::DarkGray),
    ))
}

fn section<'a>(title: &'a str, lines: Vec<Line<'a>>) -> Paragraph<'a> {
    Paragraph::new(lines).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .style(Style::default().bg(Color::Rgb(12, 12, 18))),
    )
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use currency_registry::Currency;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    All,
    IsoOnly,
    CustomOnly,
}

impl Filter {
    pub fn title(&self) -> &str {
        match self {
            Filter::All => "All",
            Filter::IsoOnly => "ISO 4217",
            Filter::CustomOnly => "Custom",
        }
    }
}

pub struct App {
    pub currencies: Vec<Currency>,
    pub filtered: Vec<Currency>,
    pub state: TableState,
    pub filter: Filter,
    pub show_detail: bool,
}

impl App {
    pub fn new(currencies: Vec<Currency>) -> Self {
        let mut state = TableState::default();
        if !currencies.is_empty() {
            state.select(Some(0));
        }

        let filtered = currencies.clone();

        Self {
            currencies,
            filtered,
            state,
            filter: Filter::All,
            show_detail: false,
        }
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn selected_currency(&self) -> Option<&Currency> {
        self.state.selected().and_then(|i| self.filtered.get(i))
    }

    pub fn apply_filter(&mut self, filter: Filter) {
        self.filter = filter;

        self.filtered = match filter {
            Filter::All => self.currencies.clone(),
            Filter::IsoOnly => self
                .currencies
                .iter()
                .filter(|c| c.is_iso())
                .cloned()
                .collect(),
            Filter::CustomOnly => self
                .currencies
                .iter()
                .filter(|c| !c.is_iso())
                .cloned()
                .collect(),
        };

        // Reset selection to first item
        if !self.filtered.is_empty() {
            self.state.select(Some(0));
        } else {
            self.state.select(None);
        }
    }

    pub fn next(&mut self) {
        let len = self.filtered.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.filtered.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.filtered.len();
        if len == 0 {
            return;
        }
        let i = self.state.selected().unwrap_or(0);
        self.state.select(Some((i + 10).min(len - 1)));
    }

    pub fn page_up(&mut self) {
        let i = self.state.selected().unwrap_or(0);
        self.state.select(Some(i.saturating_sub(10)));
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Enter | KeyCode::Char('d') => app.toggle_detail(),
                KeyCode::Char('a') => app.apply_filter(Filter::All),
                KeyCode::Char('i') => app.apply_filter(Filter::IsoOnly),
                KeyCode::Char('c') => app.apply_filter(Filter::CustomOnly),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::PageDown => app.page_down(),
                KeyCode::PageUp => app.page_up(),
                KeyCode::Home => app.state.select(Some(0)),
                KeyCode::End => {
                    if !app.filtered.is_empty() {
                        app.state.select(Some(app.filtered.len() - 1));
                    }
                }
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with filter state
            Constraint::Min(0),    // Currency table
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    if app.show_detail {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(60), // Currency list
                Constraint::Percentage(40), // Detail panel
            ])
            .split(chunks[1]);

        render_table(f, content_chunks[0], app);
        render_detail_panel(f, content_chunks[1], app);
    } else {
        render_table(f, chunks[1], app);
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let filters = [Filter::All, Filter::IsoOnly, Filter::CustomOnly];

    let mut tab_spans = vec![];
    for (i, filter) in filters.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *filter == app.filter {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(filter.title(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Registered: {}", app.currencies.len()),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Shown: {}", app.filtered.len()),
        Style::default().fg(Color::Green),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["Code", "Name", "Symbol", "Numeric", "Subunit", "Exp"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.filtered.iter().map(|currency| {
        let color = if currency.is_iso() {
            Color::White
        } else {
            Color::Magenta
        };

        let numeric = currency
            .iso_numeric()
            .map(|n| format!("{:03}", n))
            .unwrap_or_else(|_| "-".to_string());

        let cells = vec![
            Cell::from(currency.to_string()).style(Style::default().fg(color)),
            Cell::from(truncate(&currency.name().unwrap_or_default(), 28)),
            Cell::from(currency.symbol().unwrap_or_default()),
            Cell::from(numeric),
            Cell::from(truncate(&currency.subunit().unwrap_or_default(), 14)),
            Cell::from(currency.exponent().to_string()),
        ];

        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(30),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(16),
            Constraint::Length(4),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(format!(" Currencies — {} ", app.filter.title())),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let lines = match app.selected_currency() {
        Some(currency) => {
            let optional = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());
            vec![
                detail_line("id", currency.id().to_string()),
                detail_line("name", optional(currency.name())),
                detail_line(
                    "iso_code",
                    currency.iso_code().unwrap_or_else(|_| "-".to_string()),
                ),
                detail_line(
                    "iso_numeric",
                    currency
                        .iso_numeric()
                        .map(|n| format!("{:03}", n))
                        .unwrap_or_else(|_| "-".to_string()),
                ),
                detail_line("symbol", optional(currency.symbol())),
                detail_line("disambiguate", optional(currency.disambiguate_symbol())),
                detail_line("html_entity", optional(currency.html_entity())),
                detail_line("subunit", optional(currency.subunit())),
                detail_line("subunit_to_unit", currency.subunit_to_unit().to_string()),
                detail_line("exponent", currency.exponent().to_string()),
                detail_line("symbol_first", currency.symbol_first().to_string()),
                detail_line("decimal_mark", optional(currency.decimal_mark())),
                detail_line("thousands_sep", optional(currency.thousands_separator())),
                detail_line(
                    "smallest_denom",
                    currency
                        .smallest_denomination()
                        .map(|d| d.to_string())
                        .unwrap_or_else(|_| "-".to_string()),
                ),
                detail_line("format", optional(currency.format())),
            ]
        }
        None => vec![Line::from("No currency selected")],
    };

    let title = app
        .selected_currency()
        .map(|c| format!(" {} ", c))
        .unwrap_or_else(|| " Detail ".to_string());

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(title),
    );

    f.render_widget(panel, area);
}

fn detail_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{:<16}", label),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(value),
    ])
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let hints = vec![
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::raw(" quit  "),
        Span::styled("↑↓/jk", Style::default().fg(Color::Yellow)),
        Span::raw(" move  "),
        Span::styled("⏎/d", Style::default().fg(Color::Yellow)),
        Span::raw(if app.show_detail {
            " hide detail  "
        } else {
            " detail  "
        }),
        Span::styled("a", Style::default().fg(Color::Yellow)),
        Span::raw(" all  "),
        Span::styled("i", Style::default().fg(Color::Yellow)),
        Span::raw(" iso  "),
        Span::styled("c", Style::default().fg(Color::Yellow)),
        Span::raw(" custom"),
    ];

    let bar = Paragraph::new(vec![Line::from(hints)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(bar, area);
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}

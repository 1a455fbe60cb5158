use anyhow::{Context, Result};
use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use finance_tracker::{
    category_totals, filter_by_category, filter_by_date_range, filter_by_kind, parse_date, Kind,
    Transaction, TransactionInput, TransactionStore, DATE_FORMAT,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    TransactionLedger,
    Summary,
    Views,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterType {
    None,
    Income,
    Expenses,
    ByCategory(String),
    ByDateRange(NaiveDate, NaiveDate),
}

impl FilterType {
    fn describe(&self) -> String {
        match self {
            FilterType::None => "All".to_string(),
            FilterType::Income => "Income".to_string(),
            FilterType::Expenses => "Expenses".to_string(),
            FilterType::ByCategory(category) => format!("Category = {}", category),
            FilterType::ByDateRange(start, end) => format!(
                "{} .. {}",
                start.format(DATE_FORMAT),
                end.format(DATE_FORMAT)
            ),
        }
    }
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::TransactionLedger => Page::Summary,
            Page::Summary => Page::Views,
            Page::Views => Page::TransactionLedger,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::TransactionLedger => Page::Views,
            Page::Summary => Page::TransactionLedger,
            Page::Views => Page::Summary,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::TransactionLedger => "Transaction Ledger",
            Page::Summary => "Summary",
            Page::Views => "Views",
        }
    }
}

const FORM_LABELS: [&str; 5] = [
    "Description",
    "Amount",
    "Type (income/expense)",
    "Category",
    "Date (YYYY-MM-DD)",
];

/// The add-transaction form. Field order follows `FORM_LABELS`.
#[derive(Debug, Clone, PartialEq)]
pub struct AddForm {
    pub input: TransactionInput,
    pub focus: usize,
}

impl AddForm {
    fn new(today: NaiveDate) -> Self {
        AddForm {
            input: TransactionInput::dated(today),
            focus: 0,
        }
    }

    fn field(&self, index: usize) -> &str {
        match index {
            0 => &self.input.description,
            1 => &self.input.amount,
            2 => &self.input.kind,
            3 => &self.input.category,
            _ => &self.input.date,
        }
    }

    fn field_mut(&mut self, index: usize) -> &mut String {
        match index {
            0 => &mut self.input.description,
            1 => &mut self.input.amount,
            2 => &mut self.input.kind,
            3 => &mut self.input.category,
            _ => &mut self.input.date,
        }
    }

    fn next_field(&mut self) {
        self.focus = (self.focus + 1) % FORM_LABELS.len();
    }

    fn previous_field(&mut self) {
        self.focus = (self.focus + FORM_LABELS.len() - 1) % FORM_LABELS.len();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    CategoryPrompt(String),
    DateRangePrompt(String),
    Adding(AddForm),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Info(String),
    Error(String),
}

pub struct App {
    pub store: TransactionStore,
    pub data_file: PathBuf,
    pub today: NaiveDate,
    pub filtered_transactions: Vec<Transaction>,
    pub state: TableState,
    pub current_page: Page,
    pub categories_state: TableState,
    pub show_detail: bool,
    pub active_filter: FilterType,
    pub input_mode: InputMode,
    pub status: Option<Status>,
    pub dirty: bool,
    pub unsaved_changes: usize,
    pending_quit: bool,
}

impl App {
    pub fn new(store: TransactionStore, data_file: PathBuf, today: NaiveDate) -> Self {
        let mut categories_state = TableState::default();
        categories_state.select(Some(0));

        let mut app = Self {
            store,
            data_file,
            today,
            filtered_transactions: Vec::new(),
            state: TableState::default(),
            current_page: Page::TransactionLedger,
            categories_state,
            show_detail: false,
            active_filter: FilterType::None,
            input_mode: InputMode::Normal,
            status: None,
            dirty: false,
            unsaved_changes: 0,
            pending_quit: false,
        };
        app.apply_filter(FilterType::None);
        app
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn selected_transaction(&self) -> Option<&Transaction> {
        self.state.selected().and_then(|i| self.filtered_transactions.get(i))
    }

    pub fn apply_filter(&mut self, filter: FilterType) {
        let all = self.store.list();

        let matches: Vec<&Transaction> = match &filter {
            FilterType::None => all.iter().collect(),
            FilterType::Income => filter_by_kind(all, Kind::Income),
            FilterType::Expenses => filter_by_kind(all, Kind::Expense),
            FilterType::ByCategory(category) => filter_by_category(all, category),
            FilterType::ByDateRange(start, end) => filter_by_date_range(all, *start, *end),
        };

        self.filtered_transactions = matches.into_iter().cloned().collect();
        self.active_filter = filter;

        // Reset selection to first item
        if !self.filtered_transactions.is_empty() {
            self.state.select(Some(0));
        } else {
            self.state.select(None);
        }
    }

    pub fn clear_filter(&mut self) {
        self.apply_filter(FilterType::None);
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    pub fn next(&mut self) {
        let len = self.filtered_transactions.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.filtered_transactions.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) => len - 1,
            Some(i) => i - 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    /// Move the Summary page's category highlight down one row, wrapping.
    pub fn next_category(&mut self) {
        let len = category_totals(self.store.list()).len();
        if len == 0 {
            self.categories_state.select(None);
            return;
        }
        let i = match self.categories_state.selected() {
            Some(i) if i + 1 >= len => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.categories_state.select(Some(i));
    }

    pub fn previous_category(&mut self) {
        let len = category_totals(self.store.list()).len();
        if len == 0 {
            self.categories_state.select(None);
            return;
        }
        let i = match self.categories_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => (i - 1).min(len - 1),
        };
        self.categories_state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.filtered_transactions.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => (i + 20).min(len - 1),
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        if self.filtered_transactions.is_empty() {
            return;
        }
        let i = self.state.selected().map(|i| i.saturating_sub(20)).unwrap_or(0);
        self.state.select(Some(i));
    }

    // ========================================================================
    // PROMPTS
    // ========================================================================

    /// Apply the typed category. A blank entry means no filter was requested.
    pub fn submit_category(&mut self, text: &str) {
        let category = text.trim();
        if category.is_empty() {
            return;
        }

        self.apply_filter(FilterType::ByCategory(category.to_string()));
        self.current_page = Page::TransactionLedger;
        self.status = Some(Status::Info(format!(
            "{} transaction(s) in category {}",
            self.filtered_transactions.len(),
            category
        )));
    }

    /// Apply a "START END" date range typed as two YYYY-MM-DD dates
    pub fn submit_date_range(&mut self, text: &str) {
        let parts: Vec<&str> = text.split_whitespace().collect();
        let range = match parts[..] {
            [start, end] => parse_date(start).and_then(|s| parse_date(end).map(|e| (s, e))),
            _ => {
                self.status = Some(Status::Error(
                    "Enter two dates: START END (YYYY-MM-DD)".to_string(),
                ));
                return;
            }
        };

        match range {
            Ok((start, end)) => {
                self.apply_filter(FilterType::ByDateRange(start, end));
                self.current_page = Page::TransactionLedger;
                self.status = Some(Status::Info(format!(
                    "{} transaction(s) in range",
                    self.filtered_transactions.len()
                )));
            }
            Err(_) => {
                self.status = Some(Status::Error(
                    "Invalid date format. Please use YYYY-MM-DD.".to_string(),
                ));
            }
        }
    }

    /// Try to add the form's transaction. Returns true when it was stored.
    pub fn submit_add_form(&mut self, form: &AddForm) -> bool {
        match self.store.add_input(&form.input) {
            Ok(tx) => {
                let message = format!(
                    "Added {} {} ({})",
                    tx.kind().label().to_lowercase(),
                    tx.display_amount(),
                    tx.description()
                );
                self.status = Some(Status::Info(message));
                self.dirty = true;
                self.unsaved_changes += 1;

                let filter = self.active_filter.clone();
                self.apply_filter(filter);
                true
            }
            Err(err) => {
                self.status = Some(Status::Error(format!("Input error: {}", err)));
                false
            }
        }
    }

    pub fn save(&mut self) {
        match self.store.save(&self.data_file) {
            Ok(()) => {
                self.dirty = false;
                self.unsaved_changes = 0;
                self.status = Some(Status::Info(format!(
                    "Transactions saved to {}",
                    self.data_file.display()
                )));
            }
            Err(err) => {
                self.status = Some(Status::Error(format!("Error saving transactions: {}", err)));
            }
        }
    }

    // ========================================================================
    // KEY HANDLING
    // ========================================================================

    /// Handle one key press. Returns true when the app should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let mode = std::mem::replace(&mut self.input_mode, InputMode::Normal);

        match mode {
            InputMode::Normal => return self.handle_normal_key(key),
            InputMode::CategoryPrompt(mut text) => match key.code {
                KeyCode::Enter => self.submit_category(&text),
                KeyCode::Esc => {}
                KeyCode::Backspace => {
                    text.pop();
                    self.input_mode = InputMode::CategoryPrompt(text);
                }
                KeyCode::Char(c) => {
                    text.push(c);
                    self.input_mode = InputMode::CategoryPrompt(text);
                }
                _ => self.input_mode = InputMode::CategoryPrompt(text),
            },
            InputMode::DateRangePrompt(mut text) => match key.code {
                KeyCode::Enter => self.submit_date_range(&text),
                KeyCode::Esc => {}
                KeyCode::Backspace => {
                    text.pop();
                    self.input_mode = InputMode::DateRangePrompt(text);
                }
                KeyCode::Char(c) => {
                    text.push(c);
                    self.input_mode = InputMode::DateRangePrompt(text);
                }
                _ => self.input_mode = InputMode::DateRangePrompt(text),
            },
            InputMode::Adding(mut form) => {
                match key.code {
                    KeyCode::Esc => return false,
                    KeyCode::Enter => {
                        if self.submit_add_form(&form) {
                            return false;
                        }
                    }
                    KeyCode::Tab | KeyCode::Down => form.next_field(),
                    KeyCode::BackTab | KeyCode::Up => form.previous_field(),
                    KeyCode::Backspace => {
                        form.field_mut(form.focus).pop();
                    }
                    KeyCode::Char(c) => form.field_mut(form.focus).push(c),
                    _ => {}
                }
                self.input_mode = InputMode::Adding(form);
            }
        }

        false
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        if !matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
            self.pending_quit = false;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                if self.dirty && !self.pending_quit {
                    self.pending_quit = true;
                    self.status = Some(Status::Error(
                        "Unsaved changes! Press s to save, or q again to quit without saving"
                            .to_string(),
                    ));
                    return false;
                }
                return true;
            }
            KeyCode::Enter => self.toggle_detail(),
            KeyCode::Tab => self.next_page(),
            KeyCode::BackTab => self.previous_page(),
            KeyCode::Char('c') => {
                self.clear_filter();
                self.current_page = Page::TransactionLedger;
                self.status = None;
            }
            KeyCode::Char('/') => self.input_mode = InputMode::CategoryPrompt(String::new()),
            KeyCode::Char('d') => {
                let today = self.today.format(DATE_FORMAT);
                self.input_mode = InputMode::DateRangePrompt(format!("{} {}", today, today));
            }
            KeyCode::Char('a') => self.input_mode = InputMode::Adding(AddForm::new(self.today)),
            KeyCode::Char('s') => self.save(),
            KeyCode::Char('1') if self.current_page == Page::Views => {
                self.apply_filter(FilterType::None);
                self.current_page = Page::TransactionLedger;
            }
            KeyCode::Char('2') if self.current_page == Page::Views => {
                self.apply_filter(FilterType::Income);
                self.current_page = Page::TransactionLedger;
            }
            KeyCode::Char('3') if self.current_page == Page::Views => {
                self.apply_filter(FilterType::Expenses);
                self.current_page = Page::TransactionLedger;
            }
            KeyCode::Down | KeyCode::Char('j') if self.current_page == Page::Summary => {
                self.next_category()
            }
            KeyCode::Up | KeyCode::Char('k') if self.current_page == Page::Summary => {
                self.previous_category()
            }
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::PageDown => self.page_down(),
            KeyCode::PageUp => self.page_up(),
            KeyCode::Home => {
                if !self.filtered_transactions.is_empty() {
                    self.state.select(Some(0));
                }
            }
            KeyCode::End => {
                if !self.filtered_transactions.is_empty() {
                    self.state.select(Some(self.filtered_transactions.len() - 1));
                }
            }
            _ => {}
        }

        false
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

    res.context("Terminal UI failed")
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar / prompt
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    if app.show_detail && app.current_page == Page::TransactionLedger {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(60), // Transaction list
                Constraint::Percentage(40), // Detail panel
            ])
            .split(chunks[1]);

        render_table(f, content_chunks[0], app);
        render_detail_panel(f, content_chunks[1], app);
    } else {
        match app.current_page {
            Page::TransactionLedger => render_table(f, chunks[1], app),
            Page::Summary => render_summary(f, chunks[1], app),
            Page::Views => render_views(f, chunks[1], app),
        }
    }

    render_status_bar(f, chunks[2], app);

    if let InputMode::Adding(form) = &app.input_mode {
        render_add_form(f, f.size(), form);
    }
}

fn kind_color(kind: Kind) -> Color {
    match kind {
        Kind::Income => Color::Green,
        Kind::Expense => Color::Red,
    }
}

fn money_color(amount: f64) -> Color {
    if amount < 0.0 {
        Color::Red
    } else {
        Color::Green
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let summary = app.store.summary();
    let pages = [Page::TransactionLedger, Page::Summary, Page::Views];

    let mut tab_spans = vec![];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }
        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Total: {}", app.store.len()),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Balance: ${:.2}", summary.balance),
        Style::default().fg(money_color(summary.balance)),
    ));
    if app.dirty {
        tab_spans.push(Span::raw("  "));
        tab_spans.push(Span::styled("● unsaved", Style::default().fg(Color::Yellow)));
    }

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn header_row(titles: &[&'static str]) -> Row<'static> {
    let cells = titles.iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });

    Row::new(cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1)
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header = header_row(&["Date", "Description", "Amount ($)", "Type", "Category"]);

    let rows = app.filtered_transactions.iter().map(|tx| {
        let color = kind_color(tx.kind());

        let cells = vec![
            Cell::from(tx.display_date()),
            Cell::from(truncate(tx.description(), 30)),
            Cell::from(tx.display_amount()).style(Style::default().fg(color)),
            Cell::from(tx.kind().as_str()).style(Style::default().fg(color)),
            Cell::from(truncate(tx.category(), 20)),
        ];

        Row::new(cells).height(1)
    });

    let title = match app.active_filter {
        FilterType::None => " Transactions ".to_string(),
        ref filter => format!(" Transactions ({}) ", filter.describe()),
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Length(32),
            Constraint::Length(12),
            Constraint::Length(9),
            Constraint::Length(22),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let prompt = match &app.input_mode {
        InputMode::CategoryPrompt(text) => Some(("Enter category to filter by: ", text)),
        InputMode::DateRangePrompt(text) => Some(("Date range (START END): ", text)),
        _ => None,
    };

    if let Some((label, text)) = prompt {
        let line = Line::from(vec![
            Span::styled(label, Style::default().fg(Color::Cyan)),
            Span::raw(text.as_str()),
            Span::styled("█", Style::default().fg(Color::Yellow)),
            Span::styled("   Enter apply | Esc cancel", Style::default().fg(Color::DarkGray)),
        ]);
        let prompt_bar = Paragraph::new(vec![line]).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        );
        f.render_widget(prompt_bar, area);
        return;
    }

    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);
    let total = app.filtered_transactions.len();

    let mut status_spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, total),
        Style::default().fg(Color::Cyan),
    )];

    match &app.status {
        Some(Status::Info(message)) => {
            status_spans.push(Span::raw(" | "));
            status_spans.push(Span::styled(message.clone(), Style::default().fg(Color::Green)));
        }
        Some(Status::Error(message)) => {
            status_spans.push(Span::raw(" | "));
            status_spans.push(Span::styled(message.clone(), Style::default().fg(Color::Red)));
        }
        None => {}
    }

    if app.active_filter != FilterType::None {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(
            format!("Filter: {}", app.active_filter.describe()),
            Style::default().fg(Color::Green),
        ));
        status_spans.push(Span::raw(" ("));
        status_spans.push(Span::styled("c", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" clear)"));
    }

    for (key, action) in [
        ("a", " Add"),
        ("s", " Save"),
        ("/", " Category"),
        ("d", " Dates"),
        ("Tab", " Page"),
        ("Enter", " Details"),
    ] {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(key, Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(action));
    }
    status_spans.push(Span::raw(" | "));
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}

fn render_summary(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(0)])
        .split(area);

    let summary = app.store.summary();
    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);

    let totals = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Total Income:    ", label),
            Span::styled(
                format!("${:>12.2}", summary.total_income),
                Style::default().fg(Color::Green),
            ),
        ]),
        Line::from(vec![
            Span::styled("  Total Expenses:  ", label),
            Span::styled(
                format!("${:>12.2}", summary.total_expenses),
                Style::default().fg(Color::Red),
            ),
        ]),
        Line::from(vec![
            Span::styled("  Current Balance: ", label),
            Span::styled(
                format!("${:>12.2}", summary.balance),
                Style::default()
                    .fg(money_color(summary.balance))
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
    ];

    let totals_panel = Paragraph::new(totals).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Financial Summary "),
    );
    f.render_widget(totals_panel, chunks[0]);

    let header = header_row(&["Category", "Transactions", "Income", "Expenses", "Net"]);

    let rows: Vec<Row> = category_totals(app.store.list())
        .into_iter()
        .map(|total| {
            let net = total.net();
            Row::new(vec![
                Cell::from(truncate(&total.category, 24)),
                Cell::from(total.count.to_string()),
                Cell::from(format!("{:.2}", total.income)),
                Cell::from(format!("{:.2}", total.expenses)),
                Cell::from(format!("{:.2}", net)).style(Style::default().fg(money_color(net))),
            ])
            .height(1)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(26),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" By Category "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    );

    f.render_stateful_widget(table, chunks[1], &mut app.categories_state);
}

fn render_views(f: &mut Frame, area: Rect, app: &App) {
    let all = app.store.list();
    let income_count = filter_by_kind(all, Kind::Income).len();
    let expense_count = filter_by_kind(all, Kind::Expense).len();

    let active = &app.active_filter;
    let hint = Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::ITALIC);

    let content = vec![
        Line::from(""),
        Line::from(vec![Span::styled(
            "  Quick Views & Filters",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        view_line(active, FilterType::None, "1", ". All Transactions    ", all.len()),
        view_line(active, FilterType::Income, "2", ". Income              ", income_count),
        view_line(active, FilterType::Expenses, "3", ". Expenses            ", expense_count),
        Line::from(""),
        Line::from(vec![
            Span::raw("    "),
            Span::styled("/", Style::default().fg(Color::Yellow)),
            Span::raw(". By Category...       "),
            Span::styled("Custom", Style::default().fg(Color::White)),
        ]),
        Line::from(vec![
            Span::raw("    "),
            Span::styled("d", Style::default().fg(Color::Yellow)),
            Span::raw(". By Date Range...     "),
            Span::styled("Custom", Style::default().fg(Color::White)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Hint: ", hint.fg(Color::Yellow)),
            Span::styled("Press ", hint),
            Span::styled("1-3", hint.fg(Color::Yellow)),
            Span::styled(" to filter, ", hint),
            Span::styled("c", hint.fg(Color::Yellow)),
            Span::styled(" to clear", hint),
        ]),
    ];

    let paragraph = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Views - Quick Access Filters "),
    );

    f.render_widget(paragraph, area);
}

/// One quick-filter entry on the Views page, arrowed when it is active
fn view_line(
    active: &FilterType,
    filter: FilterType,
    key: &'static str,
    label: &'static str,
    count: usize,
) -> Line<'static> {
    let marker = if *active == filter {
        Span::styled("→", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
    } else {
        Span::raw(" ")
    };
    let color = match filter {
        FilterType::Income => Color::Green,
        FilterType::Expenses => Color::Red,
        _ => Color::White,
    };

    Line::from(vec![
        Span::raw("   "),
        marker,
        Span::styled(key, Style::default().fg(Color::Yellow)),
        Span::raw(label),
        Span::styled(format!("{:>5} txs", count), Style::default().fg(color)),
    ])
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Transaction Details ");

    let tx = match app.selected_transaction() {
        Some(t) => t,
        None => {
            f.render_widget(Paragraph::new("No transaction selected").block(block), area);
            return;
        }
    };

    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let color = kind_color(tx.kind());

    let content = vec![
        Line::from(""),
        Line::from(vec![Span::styled("  Date: ", label), Span::raw(tx.display_date())]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Amount: ", label),
            Span::styled(format!("{:.2}", tx.signed_amount()), Style::default().fg(color)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Type: ", label),
            Span::styled(tx.kind().label(), Style::default().fg(color)),
        ]),
        Line::from(""),
        Line::from(vec![Span::styled("  Category: ", label), Span::raw(tx.category())]),
        Line::from(""),
        Line::from("  ─────────────────────────────────────"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "  DESCRIPTION",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )]),
        Line::from(""),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(
                wrap_text(tx.description(), 35),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ),
        ]),
        Line::from(""),
        Line::from(vec![Span::styled(
            "  Press Enter to close",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )]),
    ];

    f.render_widget(Paragraph::new(content).block(block), area);
}

fn render_add_form(f: &mut Frame, screen: Rect, form: &AddForm) {
    let area = centered_rect(60, 13, screen);

    let mut lines = vec![Line::from("")];
    for (i, label) in FORM_LABELS.iter().enumerate() {
        let focused = i == form.focus;
        let label_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };

        let mut spans = vec![
            Span::styled(format!("  {:<22} ", label), label_style),
            Span::raw(form.field(i).to_string()),
        ];
        if focused {
            spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
        }
        lines.push(Line::from(spans));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![Span::styled(
        "  Tab next field | Enter add | Esc cancel",
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    )]));

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Add Transaction "),
    );

    f.render_widget(Clear, area);
    f.render_widget(panel, area);
}

/// Rectangle of `width` percent of the screen and `height` rows, centered
fn centered_rect(width: u16, height: u16, screen: Rect) -> Rect {
    let w = (u32::from(screen.width) * u32::from(width.min(100)) / 100) as u16;
    let h = height.min(screen.height);
    Rect {
        x: screen.x + (screen.width - w) / 2,
        y: screen.y + (screen.height - h) / 2,
        width: w,
        height: h,
    }
}

fn wrap_text(text: &str, width: usize) -> String {
    if text.len() <= width {
        return text.to_string();
    }

    let mut result = String::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if current_line.len() + word.len() + 1 <= width {
            if !current_line.is_empty() {
                current_line.push(' ');
            }
            current_line.push_str(word);
        } else {
            if !result.is_empty() {
                result.push_str("\n  ");
            }
            result.push_str(&current_line);
            current_line = word.to_string();
        }
    }

    if !current_line.is_empty() {
        if !result.is_empty() {
            result.push_str("\n  ");
        }
        result.push_str(&current_line);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use tempfile::TempDir;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn create_test_app(dir: &TempDir) -> App {
        let mut store = TransactionStore::new();
        store
            .add("Paycheck", 2500.0, Kind::Income, "Salary", date("2024-01-15"))
            .unwrap();
        store
            .add("Groceries", 54.32, Kind::Expense, "Food", date("2024-01-16"))
            .unwrap();
        store
            .add("Bus", 2.5, Kind::Expense, "Transport", date("2024-02-01"))
            .unwrap();

        App::new(store, dir.path().join("transactions.csv"), date("2024-02-10"))
    }

    #[test]
    fn test_new_app_shows_everything() {
        let dir = TempDir::new().unwrap();
        let app = create_test_app(&dir);

        assert_eq!(app.filtered_transactions.len(), 3);
        assert_eq!(app.state.selected(), Some(0));
        assert_eq!(app.current_page, Page::TransactionLedger);
    }

    #[test]
    fn test_category_prompt_filters() {
        let dir = TempDir::new().unwrap();
        let mut app = create_test_app(&dir);

        app.handle_key(key(KeyCode::Char('/')));
        type_text(&mut app, "food");
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.active_filter, FilterType::ByCategory("food".to_string()));
        assert_eq!(app.filtered_transactions.len(), 1);
        assert_eq!(app.filtered_transactions[0].category(), "Food");
    }

    #[test]
    fn test_blank_category_is_no_filter() {
        let dir = TempDir::new().unwrap();
        let mut app = create_test_app(&dir);

        app.submit_category("   ");

        assert_eq!(app.active_filter, FilterType::None);
        assert_eq!(app.filtered_transactions.len(), 3);
    }

    #[test]
    fn test_date_range_prompt() {
        let dir = TempDir::new().unwrap();
        let mut app = create_test_app(&dir);

        app.submit_date_range("2024-01-01 2024-01-31");
        assert_eq!(app.filtered_transactions.len(), 2);

        app.submit_date_range("2024-01-01 tomorrow");
        assert!(matches!(app.status, Some(Status::Error(_))));
        // Previous filter is kept on bad input
        assert_eq!(app.filtered_transactions.len(), 2);

        app.handle_key(key(KeyCode::Char('c')));
        assert_eq!(app.filtered_transactions.len(), 3);
    }

    #[test]
    fn test_date_prompt_prefills_today() {
        let dir = TempDir::new().unwrap();
        let mut app = create_test_app(&dir);

        app.handle_key(key(KeyCode::Char('d')));

        assert_eq!(
            app.input_mode,
            InputMode::DateRangePrompt("2024-02-10 2024-02-10".to_string())
        );
    }

    #[test]
    fn test_add_form_adds_and_marks_dirty() {
        let dir = TempDir::new().unwrap();
        let mut app = create_test_app(&dir);

        app.handle_key(key(KeyCode::Char('a')));
        type_text(&mut app, "Coffee");
        app.handle_key(key(KeyCode::Tab));
        type_text(&mut app, "3.75");
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Tab));
        type_text(&mut app, "Food");
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.store.len(), 4);
        assert!(app.dirty);

        let added = app.store.list().last().unwrap();
        assert_eq!(added.description(), "Coffee");
        assert_eq!(added.kind(), Kind::Expense);
        assert_eq!(added.date(), date("2024-02-10"));
    }

    #[test]
    fn test_add_form_keeps_open_on_error() {
        let dir = TempDir::new().unwrap();
        let mut app = create_test_app(&dir);

        app.handle_key(key(KeyCode::Char('a')));
        app.handle_key(key(KeyCode::Tab));
        type_text(&mut app, "3.75");
        app.handle_key(key(KeyCode::Enter));

        assert!(matches!(app.input_mode, InputMode::Adding(_)));
        assert!(matches!(app.status, Some(Status::Error(_))));
        assert_eq!(app.store.len(), 3);
    }

    #[test]
    fn test_quit_asks_again_when_dirty() {
        let dir = TempDir::new().unwrap();
        let mut app = create_test_app(&dir);
        app.dirty = true;

        assert!(!app.handle_key(key(KeyCode::Char('q'))));
        assert!(app.handle_key(key(KeyCode::Char('q'))));
    }

    #[test]
    fn test_save_writes_file_and_clears_dirty() {
        let dir = TempDir::new().unwrap();
        let mut app = create_test_app(&dir);
        app.dirty = true;

        app.handle_key(key(KeyCode::Char('s')));

        assert!(!app.dirty);
        let text = std::fs::read_to_string(dir.path().join("transactions.csv")).unwrap();
        assert!(text.starts_with("date,description,amount,type,category\n"));
        assert_eq!(text.lines().count(), 4);
        assert!(app.handle_key(key(KeyCode::Char('q'))));
    }

    #[test]
    fn test_views_shortcuts() {
        let dir = TempDir::new().unwrap();
        let mut app = create_test_app(&dir);

        app.current_page = Page::Views;
        app.handle_key(key(KeyCode::Char('3')));

        assert_eq!(app.current_page, Page::TransactionLedger);
        assert_eq!(app.active_filter, FilterType::Expenses);
        assert_eq!(app.filtered_transactions.len(), 2);
    }

    #[test]
    fn test_navigation_wraps() {
        let dir = TempDir::new().unwrap();
        let mut app = create_test_app(&dir);

        app.previous();
        assert_eq!(app.state.selected(), Some(2));
        app.next();
        assert_eq!(app.state.selected(), Some(0));
        app.page_down();
        assert_eq!(app.state.selected(), Some(2));
        app.page_up();
        assert_eq!(app.state.selected(), Some(0));
    }

    #[test]
    fn test_summary_page_moves_category_highlight() {
        let dir = TempDir::new().unwrap();
        let mut app = create_test_app(&dir);
        app.current_page = Page::Summary;

        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.categories_state.selected(), Some(1));
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.categories_state.selected(), Some(0));
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.categories_state.selected(), Some(2));

        // Ledger selection is left alone
        assert_eq!(app.state.selected(), Some(0));
    }

    #[test]
    fn test_centered_rect_on_wide_terminal() {
        let screen = Rect {
            x: 0,
            y: 0,
            width: 2000,
            height: 50,
        };

        let area = centered_rect(60, 13, screen);

        assert_eq!(area.width, 1200);
        assert_eq!(area.x, 400);
        assert_eq!(area.height, 13);
        assert_eq!(area.y, 18);
    }

    #[test]
    fn test_truncate_and_wrap() {
        assert_eq!(truncate("Groceries", 20), "Groceries");
        assert_eq!(truncate("A very long description indeed", 10), "A very ...");
        assert_eq!(wrap_text("short", 35), "short");
        assert_eq!(wrap_text("one two three", 7), "one two\n  three");
    }
}

use std::io;
use std::sync::Arc;

use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::model::{ActivityField, Record, RecordId, UiConfig};
use crate::store::RecordStore;

use super::event::{EventQueue, InputReader};
use super::form::FieldForm;
use super::input;
use super::list::ListBrowser;
use super::render;
use super::scheduler::{Operation, Scheduler, Ticket};
use super::theme::Theme;
use super::viewport::DetailViewport;

/// A record picked from the list: the index is a hint, the id is authoritative
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub index: usize,
    pub id: RecordId,
}

/// Where an edit was started from, and so where cancel returns to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOrigin {
    Browsing,
    Viewing,
}

/// A form in progress, owned by the mode that shows it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSession {
    pub form: FieldForm,
    /// Ticket of the store operation this session is waiting on
    pub pending: Option<Ticket>,
    /// Validation or store error shown inside the form
    pub error: Option<String>,
    /// Commit opens a running activity instead of logging a finished one
    pub open: bool,
}

impl FormSession {
    pub fn new() -> Self {
        FormSession::default()
    }

    /// An Adding session that starts a running activity
    pub fn for_start() -> Self {
        let mut form = FieldForm::activity();
        form.set_value(ActivityField::Duration.index(), "0");
        FormSession {
            form,
            open: true,
            ..FormSession::default()
        }
    }

    pub fn for_record(record: &Record) -> Self {
        let mut form = FieldForm::activity();
        form.populate(record);
        FormSession {
            form,
            ..FormSession::default()
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// True when this session issued the operation carrying `ticket`
    pub fn awaits(&self, ticket: Ticket) -> bool {
        self.pending == Some(ticket)
    }
}

/// Current interaction mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Browsing,
    Adding(FormSession),
    Viewing(Selection),
    Editing {
        selection: Selection,
        origin: EditOrigin,
        session: FormSession,
    },
}

/// Discriminant of [`Mode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    Browsing,
    Adding,
    Viewing,
    Editing,
}

impl Mode {
    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::Browsing => ModeKind::Browsing,
            Mode::Adding(_) => ModeKind::Adding,
            Mode::Viewing(_) => ModeKind::Viewing,
            Mode::Editing { .. } => ModeKind::Editing,
        }
    }

    /// The form session of Adding or Editing
    pub fn session(&self) -> Option<&FormSession> {
        match self {
            Mode::Adding(session) | Mode::Editing { session, .. } => Some(session),
            _ => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut FormSession> {
        match self {
            Mode::Adding(session) | Mode::Editing { session, .. } => Some(session),
            _ => None,
        }
    }
}

impl ModeKind {
    pub fn label(self) -> &'static str {
        match self {
            ModeKind::Browsing => "BROWSE",
            ModeKind::Adding => "ADD",
            ModeKind::Viewing => "VIEW",
            ModeKind::Editing => "EDIT",
        }
    }
}

/// Main application state. Owned and mutated only by the event loop thread.
pub struct App {
    pub mode: Mode,
    /// Last fetched record set, most recent first
    pub records: Vec<Record>,
    pub list: ListBrowser,
    pub viewport: DetailViewport,
    pub theme: Theme,
    pub show_key_hints: bool,
    /// Operations scheduled whose completion has not arrived yet
    pub in_flight: usize,
    /// Last store failure; shown in place of the list until the next success
    pub error: Option<String>,
    /// One-shot feedback for the status row
    pub status: Option<String>,
    /// Operations requested by handlers, drained by the event loop
    pub commands: Vec<Operation>,
    /// Last ticket handed to a form commit
    pub last_ticket: Ticket,
    pub should_quit: bool,
    /// Set when terminal input broke; the loop exits with it as the error
    pub input_failure: Option<io::Error>,
    /// Terminal size
    pub width: u16,
    pub height: u16,
}

impl App {
    pub fn new(ui: &UiConfig) -> Self {
        App {
            mode: Mode::Browsing,
            records: Vec::new(),
            list: ListBrowser::default(),
            viewport: DetailViewport::default(),
            theme: Theme::from_config(ui),
            show_key_hints: ui.show_key_hints,
            in_flight: 0,
            error: None,
            status: None,
            commands: Vec::new(),
            last_ticket: Ticket::default(),
            should_quit: false,
            input_failure: None,
            width: 0,
            height: 0,
        }
    }

    /// Initial state: Browsing with a Fetch scheduled
    pub fn start(&mut self) {
        self.schedule(Operation::Fetch);
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    /// Queue a store operation for the event loop to hand to the scheduler
    pub fn schedule(&mut self, op: Operation) {
        self.in_flight += 1;
        self.commands.push(op);
    }

    /// Hand out the ticket for the next form commit
    pub fn issue_ticket(&mut self) -> Ticket {
        self.last_ticket = self.last_ticket.next();
        self.last_ticket
    }

    pub fn take_commands(&mut self) -> Vec<Operation> {
        std::mem::take(&mut self.commands)
    }

    /// The list cursor as a selection, if there is one
    pub fn list_selection(&self) -> Option<Selection> {
        let index = self.list.selected_index()?;
        let id = self.list.selected()?.id;
        Some(Selection { index, id })
    }

    /// Position of a selection in the current record set, by id
    pub fn resolve_index(&self, selection: &Selection) -> Option<usize> {
        if self
            .records
            .get(selection.index)
            .is_some_and(|r| r.id == selection.id)
        {
            return Some(selection.index);
        }
        self.records.iter().position(|r| r.id == selection.id)
    }

    /// Look a selection up in the current record set
    pub fn resolve(&self, selection: &Selection) -> Option<&Record> {
        self.resolve_index(selection).map(|i| &self.records[i])
    }

    /// Recompute page size and viewport size for a new terminal size
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let content = render::content_rect(width, height);
        self.list.set_page_height(render::list_view::item_rows(content.height));
        let (vw, vh) = render::detail_view::viewport_size(content);
        self.viewport.set_size(vw, vh);
    }
}

/// Run the TUI until the user quits
pub fn run(store: Arc<dyn RecordStore>, ui: &UiConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new(ui);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableBracketedPaste, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app, store);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    store: Arc<dyn RecordStore>,
) -> Result<(), Box<dyn std::error::Error>> {
    let queue = EventQueue::new();
    let scheduler = Scheduler::new(store, queue.sender());
    let reader = InputReader::spawn(queue.sender())?;

    let size = terminal.size()?;
    app.resize(size.width, size.height);
    app.start();
    tracing::info!(width = size.width, height = size.height, "session started");

    let result = loop {
        for op in app.take_commands() {
            scheduler.schedule(op);
        }
        if let Err(e) = terminal.draw(|frame| render::render(frame, app)) {
            break Err(e.into());
        }
        if let Some(e) = app.input_failure.take() {
            break Err(e.into());
        }
        if app.should_quit {
            break Ok(());
        }
        let Some(event) = queue.next() else {
            break Ok(());
        };
        input::handle_event(app, event);
    };

    reader.stop();
    tracing::info!(in_flight = app.in_flight, "session ended");
    result
}

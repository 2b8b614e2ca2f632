//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).

use crate::config::AppConfig;
use crate::core::form::FormField;
use crate::core::session::{CreateTicket, DialogSession, SearchTicket};
use crate::host::terminal::TerminalHost;

/// Fields of the provider's requirement creation form, used when the
/// command line does not name any.
pub const DEFAULT_CREATE_FIELDS: &[&str] = &[
    "specification_id",
    "title",
    "description",
    "author",
    "product",
    "subject",
    "source",
    "category",
];

/// Which view / overlay is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Dialog,
    CreateForm,
}

/// Which part of the dialog receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Query,
    Results,
}

/// Editable create form.
#[derive(Debug, Clone, Default)]
pub struct CreateFormState {
    pub fields: Vec<FormField>,
    /// Field being edited.
    pub selected: usize,
}

impl CreateFormState {
    pub fn new(fields: Vec<FormField>) -> Self {
        Self {
            fields,
            selected: 0,
        }
    }

    pub fn selected_value_mut(&mut self) -> Option<&mut String> {
        self.fields.get_mut(self.selected).map(|f| &mut f.value)
    }
}

/// A request the handler decided to issue; the event loop dispatches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingRequest {
    Search(SearchTicket),
    Create(CreateTicket),
}

/// Top-level application state.
pub struct AppState {
    pub session: DialogSession,
    pub host: TerminalHost,
    /// Selector URL the search base URL is composed from.
    pub selector_url: String,
    pub creator_url: Option<String>,
    pub resource_type: Option<String>,
    /// Search terms being typed.
    pub query: String,
    pub focus: Focus,
    /// Highlighted row in the results list.
    pub cursor: usize,
    pub active_view: ActiveView,
    pub form: CreateFormState,
    pub config: AppConfig,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
    /// Requests queued by the handler, drained by the event loop.
    pub pending_requests: Vec<PendingRequest>,
    /// Drives the loading spinner.
    pub tick: u64,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(
        session: DialogSession,
        host: TerminalHost,
        selector_url: String,
        config: AppConfig,
    ) -> Self {
        Self {
            session,
            host,
            selector_url,
            creator_url: None,
            resource_type: None,
            query: String::new(),
            focus: Focus::default(),
            cursor: 0,
            active_view: ActiveView::default(),
            form: CreateFormState::default(),
            config,
            status_message: None,
            pending_requests: Vec::new(),
            tick: 0,
            should_quit: false,
        }
    }

    /// Keep the cursor inside the results list after it changes size.
    pub fn clamp_cursor(&mut self) {
        let len = self.session.results().len();
        if len == 0 {
            self.cursor = 0;
        } else if self.cursor >= len {
            self.cursor = len - 1;
        }
    }
}

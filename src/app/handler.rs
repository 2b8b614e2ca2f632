//! Input handling — maps key events and network completions to state
//! mutations.
//!
//! Handlers never wait on the network.  A search or create is started on the
//! session and its ticket queued in `state.pending_requests`; the event loop
//! dispatches it and later feeds the completion back through
//! [`apply_net_update`].

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::Action;
use crate::core::catalog::selector_query_url;
use crate::core::error::DialogError;
use crate::core::session::{CreateOutcome, SearchOutcome, SessionState};
use crate::core::transport::Delivery;

use super::net_runtime::NetUpdate;
use super::state::{ActiveView, AppState, Focus, PendingRequest};

/// Process a key event, dispatching on the active view.
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    // Ctrl+c always leaves, without responding.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    match state.active_view {
        ActiveView::Dialog => handle_dialog_key(state, key),
        ActiveView::CreateForm => handle_form_key(state, key),
    }
}

// ── Dialog view ─────────────────────────────────────────────────

fn handle_dialog_key(state: &mut AppState, key: KeyEvent) {
    match state.focus {
        Focus::Query => handle_query_key(state, key),
        Focus::Results => {
            if key.code == KeyCode::Tab {
                state.focus = Focus::Query;
                return;
            }
            if let Some(action) = state.config.match_key(key) {
                apply_action(state, action);
            }
        }
    }
}

/// The query line takes printable input; everything else falls through to
/// the configured bindings.
fn handle_query_key(state: &mut AppState, key: KeyEvent) {
    let typing = !key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
    match key.code {
        KeyCode::Enter => start_search(state),
        KeyCode::Tab | KeyCode::Down => state.focus = Focus::Results,
        KeyCode::Esc => cancel(state),
        KeyCode::Backspace => {
            state.query.pop();
        }
        KeyCode::Char(c) if typing => state.query.push(c),
        _ => {
            if let Some(action) = state.config.match_key(key) {
                apply_action(state, action);
            }
        }
    }
}

fn apply_action(state: &mut AppState, action: Action) {
    match action {
        Action::MoveUp => {
            state.cursor = state.cursor.saturating_sub(1);
        }
        Action::MoveDown => {
            state.cursor = state.cursor.saturating_add(1);
            state.clamp_cursor();
        }
        Action::ToggleSelect => {
            let cursor = state.cursor;
            state.session.results_mut().toggle(cursor);
        }
        Action::Confirm => confirm_selection(state),
        Action::Cancel => cancel(state),
        Action::FocusQuery => state.focus = Focus::Query,
        Action::OpenCreate => open_create_form(state),
        Action::Quit => state.should_quit = true,
    }
}

fn start_search(state: &mut AppState) {
    let base_url = selector_query_url(
        &state.selector_url,
        state.resource_type.as_deref(),
        &state.query,
    );
    match state.session.begin_search(&base_url) {
        Ok(ticket) => {
            state.pending_requests.push(PendingRequest::Search(ticket));
            state.cursor = 0;
            state.status_message = None;
        }
        Err(err) => report(state, &err),
    }
}

/// Confirm resends a created resource that never reached the opener before
/// it looks at the selection.
fn confirm_selection(state: &mut AppState) {
    if state.session.has_undelivered() {
        match state.session.retry_delivery(&mut state.host) {
            Ok(Some(delivery)) => finish(state, delivery),
            Ok(None) => {}
            Err(err) => report(state, &err),
        }
        return;
    }
    match state.session.select(&mut state.host) {
        Ok(Some(delivery)) => finish(state, delivery),
        Ok(None) => state.status_message = Some("Nothing selected".into()),
        Err(err) => report(state, &err),
    }
}

fn cancel(state: &mut AppState) {
    match state.session.cancel(&mut state.host) {
        Ok(delivery) => finish(state, delivery),
        Err(err) => report(state, &err),
    }
}

/// A delivered response closes the dialog.  A dropped one leaves it open,
/// like a page whose opener never negotiated a transport.
fn finish(state: &mut AppState, delivery: Delivery) {
    match delivery {
        Delivery::Dropped => {
            state.status_message = Some("No response transport negotiated".into());
        }
        _ => {
            tracing::info!(?delivery, "dialog responded");
            state.should_quit = true;
        }
    }
}

fn report(state: &mut AppState, err: &DialogError) {
    tracing::warn!(error = %err, "dialog action failed");
    state.status_message = Some(err.to_string());
}

// ── Create form ─────────────────────────────────────────────────

fn open_create_form(state: &mut AppState) {
    if state.creator_url.is_none() {
        state.status_message = Some("No creation URL configured".into());
        return;
    }
    state.active_view = ActiveView::CreateForm;
}

fn handle_form_key(state: &mut AppState, key: KeyEvent) {
    let field_count = state.form.fields.len();
    match key.code {
        KeyCode::Esc => state.active_view = ActiveView::Dialog,
        KeyCode::Up | KeyCode::BackTab => {
            state.form.selected = state.form.selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Tab => {
            if state.form.selected + 1 < field_count {
                state.form.selected += 1;
            }
        }
        KeyCode::Backspace => {
            if let Some(value) = state.form.selected_value_mut() {
                value.pop();
            }
        }
        KeyCode::Enter => submit_create(state),
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            if let Some(value) = state.form.selected_value_mut() {
                value.push(c);
            }
        }
        _ => {}
    }
}

fn submit_create(state: &mut AppState) {
    let Some(creator_url) = state.creator_url.clone() else {
        return;
    };
    match state.session.begin_create(&creator_url, &state.form.fields) {
        Ok(ticket) => {
            state.pending_requests.push(PendingRequest::Create(ticket));
            state.active_view = ActiveView::Dialog;
            state.status_message = Some("Creating…".into());
        }
        Err(err) => report(state, &err),
    }
}

// ── Network completions ─────────────────────────────────────────

pub fn apply_net_update(state: &mut AppState, update: NetUpdate) {
    match update {
        NetUpdate::Searched { generation, reply } => {
            match state.session.complete_search(generation, reply) {
                SearchOutcome::Populated(0) => {
                    state.status_message = Some("No matches.".into());
                }
                SearchOutcome::Populated(_) => {
                    state.status_message = None;
                    state.focus = Focus::Results;
                }
                SearchOutcome::Failed => show_failure(state),
                SearchOutcome::Pending | SearchOutcome::Ignored => {}
            }
            state.clamp_cursor();
        }
        NetUpdate::Created { generation, reply } => {
            match state.session.complete_create(generation, reply, &mut state.host) {
                Ok(CreateOutcome::Responded(delivery)) => finish(state, delivery),
                Ok(CreateOutcome::Failed) => show_failure(state),
                Ok(CreateOutcome::Pending | CreateOutcome::Ignored) => {}
                Err(err) => report(state, &err),
            }
        }
    }
}

fn show_failure(state: &mut AppState) {
    if let SessionState::Failed { reason } = state.session.state() {
        state.status_message = Some(reason.clone());
    }
}

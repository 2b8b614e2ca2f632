//! Events consumed by the UI loop.
//!
//! Terminal input and network completions share one channel, so the loop
//! handles them strictly one at a time on its own thread.

use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};
use tokio::sync::mpsc;

use super::net_runtime::NetUpdate;

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    /// The terminal changed size; the next draw picks up the new area.
    Resize,
    Tick,
    Net(NetUpdate),
}

/// Create the UI channel.  The sender is cloned into the terminal reader
/// and every network task.
pub fn channel() -> (mpsc::UnboundedSender<AppEvent>, mpsc::UnboundedReceiver<AppEvent>) {
    mpsc::unbounded_channel()
}

/// Poll the terminal on a blocking thread and forward what it sees.  A
/// `Tick` goes out whenever `tick_rate` passes without input.
pub fn spawn_terminal_reader(tx: mpsc::UnboundedSender<AppEvent>, tick_rate: Duration) {
    tokio::task::spawn_blocking(move || loop {
        let next = match event::poll(tick_rate) {
            Ok(true) => match event::read() {
                Ok(ev) => match translate(ev) {
                    Some(next) => next,
                    None => continue,
                },
                Err(err) => {
                    tracing::warn!(error = %err, "terminal read failed");
                    break;
                }
            },
            Ok(false) => AppEvent::Tick,
            Err(err) => {
                tracing::warn!(error = %err, "terminal poll failed");
                break;
            }
        };
        if tx.send(next).is_err() {
            break; // receiver dropped
        }
    });
}

/// Terminal events the loop cares about.  Key releases and repeats are
/// dropped so each press acts once.
fn translate(ev: CtEvent) -> Option<AppEvent> {
    match ev {
        CtEvent::Key(k) if k.kind == KeyEventKind::Press => Some(AppEvent::Key(k)),
        CtEvent::Resize(_, _) => Some(AppEvent::Resize),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;

    #[test]
    fn presses_and_resizes_are_forwarded() {
        let press = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        assert!(matches!(
            translate(CtEvent::Key(press)),
            Some(AppEvent::Key(k)) if k.code == KeyCode::Char('a')
        ));
        assert!(matches!(translate(CtEvent::Resize(80, 24)), Some(AppEvent::Resize)));
    }

    #[test]
    fn releases_and_focus_changes_are_dropped() {
        let release =
            KeyEvent::new_with_kind(KeyCode::Enter, KeyModifiers::NONE, KeyEventKind::Release);
        assert!(translate(CtEvent::Key(release)).is_none());
        assert!(translate(CtEvent::FocusGained).is_none());
    }
}

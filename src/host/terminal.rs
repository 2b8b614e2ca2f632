//! Terminal-backed host window.
//!
//! A terminal has no window name slot or message bus, so the host keeps them
//! in memory and, once the TUI is torn down, prints what happened to stdout
//! for the wrapping process to act on.

use std::io::{self, Write};

use crate::core::error::DialogError;
use crate::core::resource::RESPONSE_PREFIX;
use crate::core::transport::{HostWindow, MessageTarget};

const NAME_PREFIX: &str = "__OSLC_WINDOW_NAME__=";
const NAVIGATE_PREFIX: &str = "__OSLC_NAVIGATE__=";
const MESSAGE_PREFIX: &str = "__OSLC_POST_MESSAGE__=";

/// A message posted through the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    pub target: MessageTarget,
    pub target_origin: String,
    pub message: String,
}

#[derive(Debug)]
pub struct TerminalHost {
    name: String,
    initial_name: String,
    has_parent: bool,
    navigated_to: Option<String>,
    posted: Vec<PostedMessage>,
}

impl TerminalHost {
    /// `name` is the window name the opener gave the dialog (the return
    /// address under the window-name convention).
    pub fn new(name: impl Into<String>, has_parent: bool) -> Self {
        let name = name.into();
        Self {
            initial_name: name.clone(),
            name,
            has_parent,
            navigated_to: None,
            posted: Vec::new(),
        }
    }

    pub fn navigated_to(&self) -> Option<&str> {
        self.navigated_to.as_deref()
    }

    pub fn posted(&self) -> &[PostedMessage] {
        &self.posted
    }

    /// Write the machine-readable exit lines.  Only slots that changed are
    /// reported.
    pub fn write_exit_payload<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if self.name != self.initial_name {
            writeln!(out, "{NAME_PREFIX}{}", one_line(&self.name))?;
        }
        if let Some(address) = self.navigated_to() {
            writeln!(out, "{NAVIGATE_PREFIX}{address}")?;
        }
        for posted in self.posted() {
            writeln!(
                out,
                "{MESSAGE_PREFIX}{} {} {}",
                posted.target.label(),
                posted.target_origin,
                one_line(&posted.message)
            )?;
        }
        Ok(())
    }

    pub fn print_exit_payload(&self) -> io::Result<()> {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        self.write_exit_payload(&mut lock)?;
        lock.flush()
    }
}

impl HostWindow for TerminalHost {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    fn navigate(&mut self, address: &str) -> Result<(), DialogError> {
        if address.is_empty() {
            return Err(DialogError::Host(
                "no return address: the window name was empty".into(),
            ));
        }
        self.navigated_to = Some(address.to_string());
        Ok(())
    }

    fn has_parent(&self) -> bool {
        self.has_parent
    }

    fn post_message(
        &mut self,
        target: MessageTarget,
        message: &str,
        target_origin: &str,
    ) -> Result<(), DialogError> {
        self.posted.push(PostedMessage {
            target,
            target_origin: target_origin.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }
}

/// Pretty-printed payloads span lines; collapse them so each exit record
/// stays on a single line.  JSON whitespace between tokens is insignificant.
fn one_line(s: &str) -> String {
    if !s.contains('\n') {
        return s.to_string();
    }
    let (prefix, json) = match s.strip_prefix(RESPONSE_PREFIX) {
        Some(json) => (RESPONSE_PREFIX, json),
        None => ("", s),
    };
    match serde_json::from_str::<serde_json::Value>(json) {
        Ok(value) => format!("{prefix}{value}"),
        Err(_) => s.replace('\n', " "),
    }
}

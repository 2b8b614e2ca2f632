//! Response transport — how an encoded response reaches the opener.
//!
//! The opener picks the convention through the dialog URL's fragment.  The
//! fragment is resolved once into a [`TransportMode`] when the session
//! starts and never looked at again.

use super::error::DialogError;
use super::resource::ResponsePayload;

pub const WINDOW_NAME_FRAGMENT: &str = "#oslc-core-windowName-1.0";
pub const POST_MESSAGE_FRAGMENT: &str = "#oslc-core-postMessage-1.0";

/// Target origin used when none is configured: any listener matches.
pub const ANY_ORIGIN: &str = "*";

// ───────────────────────────────────────── host window ───────

/// Which window a posted message goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageTarget {
    Parent,
    SelfWindow,
}

impl MessageTarget {
    pub fn label(self) -> &'static str {
        match self {
            Self::Parent => "parent",
            Self::SelfWindow => "self",
        }
    }
}

/// The page-level primitives a transport needs from the dialog's window.
pub trait HostWindow {
    /// Current value of the window's name slot.
    fn name(&self) -> String;
    fn set_name(&mut self, name: &str);
    fn navigate(&mut self, address: &str) -> Result<(), DialogError>;
    fn has_parent(&self) -> bool;
    fn post_message(
        &mut self,
        target: MessageTarget,
        message: &str,
        target_origin: &str,
    ) -> Result<(), DialogError>;
}

// ───────────────────────────────────────── mode ──────────────

/// Delivery convention negotiated by the fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    WindowName,
    PostMessage,
    /// The fragment matched nothing; responses are dropped.
    None,
}

impl TransportMode {
    /// Exact match against the two protocol fragments.  The leading `#` is
    /// optional so both `location.hash` and bare fragment values resolve.
    pub fn from_fragment(fragment: Option<&str>) -> Self {
        let Some(raw) = fragment else {
            return Self::None;
        };
        let hash = raw.strip_prefix('#').unwrap_or(raw);
        if WINDOW_NAME_FRAGMENT.strip_prefix('#') == Some(hash) {
            Self::WindowName
        } else if POST_MESSAGE_FRAGMENT.strip_prefix('#') == Some(hash) {
            Self::PostMessage
        } else {
            Self::None
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::WindowName => "window-name",
            Self::PostMessage => "post-message",
            Self::None => "none",
        }
    }
}

/// What a `send` actually did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    WindowName { return_address: String },
    PostMessage { target: MessageTarget, target_origin: String },
    Dropped,
}

// ───────────────────────────────────────── transport ─────────

/// Encodes payloads and hands them to the host through the session's mode.
#[derive(Debug, Clone)]
pub struct ResponseTransport {
    mode: TransportMode,
    fragment: Option<String>,
    target_origin: String,
    strict: bool,
}

impl ResponseTransport {
    pub fn new(fragment: Option<&str>) -> Self {
        Self {
            mode: TransportMode::from_fragment(fragment),
            fragment: fragment.map(str::to_owned),
            target_origin: ANY_ORIGIN.to_string(),
            strict: false,
        }
    }

    /// Restrict post-message delivery to one origin instead of `*`.
    pub fn with_target_origin(mut self, origin: impl Into<String>) -> Self {
        self.target_origin = origin.into();
        self
    }

    /// Turn an unmatched fragment into an error instead of a silent drop.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn mode(&self) -> TransportMode {
        self.mode
    }

    pub fn send<H: HostWindow + ?Sized>(
        &self,
        host: &mut H,
        payload: &ResponsePayload,
    ) -> Result<Delivery, DialogError> {
        let response = payload.encode()?;
        match self.mode {
            TransportMode::WindowName => {
                let return_address = host.name();
                host.set_name(&response);
                if let Err(err) = host.navigate(&return_address) {
                    // The slot is the return address again; a retry must see it.
                    host.set_name(&return_address);
                    return Err(err);
                }
                tracing::info!(%return_address, "responded via window name");
                Ok(Delivery::WindowName { return_address })
            }
            TransportMode::PostMessage => {
                let target = if host.has_parent() {
                    MessageTarget::Parent
                } else {
                    MessageTarget::SelfWindow
                };
                host.post_message(target, &response, &self.target_origin)?;
                tracing::info!(
                    window = target.label(),
                    origin = %self.target_origin,
                    "responded via post message"
                );
                Ok(Delivery::PostMessage {
                    target,
                    target_origin: self.target_origin.clone(),
                })
            }
            TransportMode::None if self.strict => Err(DialogError::UnknownTransport {
                fragment: self.fragment.clone(),
            }),
            TransportMode::None => {
                tracing::warn!(fragment = ?self.fragment, "no transport negotiated, response dropped");
                Ok(Delivery::Dropped)
            }
        }
    }
}

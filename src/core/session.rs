//! Per-dialog session: results list, indicators, transport and lifecycle.
//!
//! Network-driven operations are split in two halves.  `begin_*` performs
//! the synchronous side effects and hands back a ticket describing the
//! request to issue; `complete_*` applies the finished exchange.  Whoever
//! owns the event loop decides how the request is awaited in between.
//!
//! ```text
//! Idle ─search─▶ Searching ─200─▶ ResultsShown ─select─▶ Responded
//!  │                                                        ▲
//!  └──create──▶ Creating ─201──────────────────────────────┘
//!  any non-terminal state ─cancel─▶ Responded
//! ```

use super::catalog::{search_url, HttpReply};
use super::error::DialogError;
use super::form::{encode_form_body, FormField};
use super::resource::{ResponsePayload, SelectionPayload};
use super::results::{collect_selection, ResultList};
use super::transport::{Delivery, HostWindow, ResponseTransport, TransportMode};

const SEARCH_OK: u16 = 200;
const CREATE_OK: u16 = 201;

// ───────────────────────────────────────── policy ────────────

/// What an unsuccessful request does to the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Leave the dialog as it was while the request was pending: the loading
    /// indicator stays up and nothing is reported.
    #[default]
    Legacy,
    /// Hide the loading indicator and move to [`SessionState::Failed`].
    Surface,
}

impl FailurePolicy {
    pub fn label(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Surface => "surface",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "legacy" => Some(Self::Legacy),
            "surface" => Some(Self::Surface),
            _ => None,
        }
    }
}

// ───────────────────────────────────────── state ─────────────

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Searching,
    ResultsShown,
    Creating,
    Failed { reason: String },
    Responded,
}

/// Visibility of the two status indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Indicators {
    pub loading: bool,
    pub ready: bool,
}

/// A search the caller must now issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub generation: u64,
    pub url: String,
}

/// A create the caller must now issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTicket {
    pub generation: u64,
    pub url: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The list now holds this many entries.
    Populated(usize),
    /// The request failed and the legacy policy keeps the dialog waiting.
    Pending,
    Failed,
    /// Stale generation, or the session already responded.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Responded(Delivery),
    Pending,
    Failed,
    Ignored,
}

// ───────────────────────────────────────── session ───────────

/// Everything one dialog needs between opening and responding.
#[derive(Debug)]
pub struct DialogSession {
    results: ResultList,
    indicators: Indicators,
    state: SessionState,
    transport: ResponseTransport,
    failure_policy: FailurePolicy,
    search_generation: u64,
    create_generation: u64,
    /// Created resource whose delivery to the opener failed.
    undelivered: Option<ResponsePayload>,
}

impl DialogSession {
    pub fn new(transport: ResponseTransport, failure_policy: FailurePolicy) -> Self {
        tracing::debug!(
            mode = transport.mode().label(),
            policy = failure_policy.label(),
            "dialog session started"
        );
        Self {
            results: ResultList::new(),
            indicators: Indicators::default(),
            state: SessionState::Idle,
            transport,
            failure_policy,
            search_generation: 0,
            create_generation: 0,
            undelivered: None,
        }
    }

    pub fn results(&self) -> &ResultList {
        &self.results
    }

    /// Mutable access for selection toggling.
    pub fn results_mut(&mut self) -> &mut ResultList {
        &mut self.results
    }

    pub fn indicators(&self) -> Indicators {
        self.indicators
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn transport_mode(&self) -> TransportMode {
        self.transport.mode()
    }

    pub fn has_responded(&self) -> bool {
        self.state == SessionState::Responded
    }

    /// A created resource is waiting for [`Self::retry_delivery`].
    pub fn has_undelivered(&self) -> bool {
        self.undelivered.is_some()
    }

    fn ensure_open(&self) -> Result<(), DialogError> {
        if self.has_responded() {
            Err(DialogError::AlreadyResponded)
        } else {
            Ok(())
        }
    }

    // ── search ──────────────────────────────────────────────────

    /// Reset the list, flip the indicators to loading and describe the
    /// request to issue.
    pub fn begin_search(&mut self, base_url: &str) -> Result<SearchTicket, DialogError> {
        self.ensure_open()?;
        self.results.clear();
        self.indicators = Indicators {
            loading: true,
            ready: false,
        };
        self.state = SessionState::Searching;
        self.search_generation = self.search_generation.wrapping_add(1);
        let url = search_url(base_url);
        tracing::debug!(generation = self.search_generation, %url, "search started");
        Ok(SearchTicket {
            generation: self.search_generation,
            url,
        })
    }

    pub fn complete_search(
        &mut self,
        generation: u64,
        reply: Result<HttpReply, DialogError>,
    ) -> SearchOutcome {
        if self.has_responded() || generation != self.search_generation {
            tracing::debug!(generation, current = self.search_generation, "search completion ignored");
            return SearchOutcome::Ignored;
        }

        let reply = match reply {
            Ok(reply) if reply.status == SEARCH_OK => reply,
            Ok(reply) => {
                return self.search_failed(DialogError::RemoteRequestFailed {
                    status: reply.status,
                })
            }
            Err(err) => return self.search_failed(err),
        };

        let payload = match SelectionPayload::from_json(&reply.body) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(error = %err, "search reply could not be parsed");
                self.fail(&err);
                return SearchOutcome::Failed;
            }
        };

        for resource in payload.results {
            self.results.insert_option(resource);
        }
        self.indicators = Indicators {
            loading: false,
            ready: true,
        };
        if self.state == SessionState::Searching {
            self.state = SessionState::ResultsShown;
        }
        tracing::debug!(count = self.results.len(), "search populated");
        SearchOutcome::Populated(self.results.len())
    }

    fn search_failed(&mut self, err: DialogError) -> SearchOutcome {
        tracing::warn!(error = %err, "search failed");
        match self.failure_policy {
            FailurePolicy::Legacy => SearchOutcome::Pending,
            FailurePolicy::Surface => {
                self.fail(&err);
                SearchOutcome::Failed
            }
        }
    }

    // ── create ──────────────────────────────────────────────────

    pub fn begin_create(
        &mut self,
        base_url: &str,
        fields: &[FormField],
    ) -> Result<CreateTicket, DialogError> {
        self.ensure_open()?;
        self.state = SessionState::Creating;
        self.create_generation = self.create_generation.wrapping_add(1);
        tracing::debug!(generation = self.create_generation, url = base_url, "create started");
        Ok(CreateTicket {
            generation: self.create_generation,
            url: base_url.to_string(),
            body: encode_form_body(fields),
        })
    }

    /// Apply a finished create.  On 201 the body goes straight to the
    /// opener, untouched.
    pub fn complete_create<H: HostWindow + ?Sized>(
        &mut self,
        generation: u64,
        reply: Result<HttpReply, DialogError>,
        host: &mut H,
    ) -> Result<CreateOutcome, DialogError> {
        if self.has_responded() || generation != self.create_generation {
            tracing::debug!(generation, current = self.create_generation, "create completion ignored");
            return Ok(CreateOutcome::Ignored);
        }

        let reply = match reply {
            Ok(reply) if reply.status == CREATE_OK => reply,
            Ok(reply) => {
                return Ok(self.create_failed(DialogError::RemoteRequestFailed {
                    status: reply.status,
                }))
            }
            Err(err) => return Ok(self.create_failed(err)),
        };

        let created: serde_json::Value = match serde_json::from_str(&reply.body) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, "create reply could not be parsed");
                self.fail(&DialogError::from(err));
                return Ok(CreateOutcome::Failed);
            }
        };

        // The catalog has created the resource by now; it must not be lost
        // if the opener cannot be reached.
        let payload = ResponsePayload::Raw(created);
        match self.respond(host, &payload) {
            Ok(delivery) => Ok(CreateOutcome::Responded(delivery)),
            Err(err) => {
                tracing::warn!(error = %err, "created resource could not be delivered");
                self.fail(&err);
                self.undelivered = Some(payload);
                Err(err)
            }
        }
    }

    /// Send a created resource whose earlier delivery failed.  `Ok(None)`
    /// when nothing is waiting.
    pub fn retry_delivery<H: HostWindow + ?Sized>(
        &mut self,
        host: &mut H,
    ) -> Result<Option<Delivery>, DialogError> {
        self.ensure_open()?;
        let Some(payload) = self.undelivered.take() else {
            return Ok(None);
        };
        match self.respond(host, &payload) {
            Ok(delivery) => Ok(Some(delivery)),
            Err(err) => {
                self.undelivered = Some(payload);
                Err(err)
            }
        }
    }

    fn create_failed(&mut self, err: DialogError) -> CreateOutcome {
        tracing::warn!(error = %err, "create failed");
        match self.failure_policy {
            FailurePolicy::Legacy => CreateOutcome::Pending,
            FailurePolicy::Surface => {
                self.fail(&err);
                CreateOutcome::Failed
            }
        }
    }

    // ── select / cancel ─────────────────────────────────────────

    /// Send the selected entries.  `Ok(None)` when nothing is selected.
    pub fn select<H: HostWindow + ?Sized>(
        &mut self,
        host: &mut H,
    ) -> Result<Option<Delivery>, DialogError> {
        self.ensure_open()?;
        let Some(selection) = collect_selection(&self.results) else {
            tracing::debug!("select with nothing selected");
            return Ok(None);
        };
        self.respond(host, &selection.into()).map(Some)
    }

    /// Send an empty result set, whatever is in flight.
    pub fn cancel<H: HostWindow + ?Sized>(&mut self, host: &mut H) -> Result<Delivery, DialogError> {
        self.ensure_open()?;
        self.respond(host, &ResponsePayload::Cancel)
    }

    fn respond<H: HostWindow + ?Sized>(
        &mut self,
        host: &mut H,
        payload: &ResponsePayload,
    ) -> Result<Delivery, DialogError> {
        let delivery = self.transport.send(host, payload)?;
        if delivery != Delivery::Dropped {
            self.state = SessionState::Responded;
            self.indicators.loading = false;
        }
        Ok(delivery)
    }

    fn fail(&mut self, err: &DialogError) {
        self.indicators.loading = false;
        self.state = SessionState::Failed {
            reason: err.to_string(),
        };
    }
}

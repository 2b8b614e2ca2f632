//! Delegated resource-selection dialog for OSLC providers.
//!
//! Opens a terminal dialog against a provider's selector URL, lets the user
//! search, pick or create resources, and reports the result to the opener
//! through the transport negotiated by `--fragment`.  The opener-side effects
//! (window name, navigation, posted messages) are printed to stdout on exit.

mod app;
mod config;
mod core;
mod host;
mod ui;

use std::io::{self, stderr};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

use crate::app::{
    event::{self, AppEvent},
    handler, net_runtime,
    state::{ActiveView, AppState, CreateFormState, Focus, PendingRequest, DEFAULT_CREATE_FIELDS},
};
use crate::config::AppConfig;
use crate::core::{
    catalog::{selector_query_url, CatalogClient, HttpCatalog},
    controller,
    form::FormField,
    session::{CreateOutcome, DialogSession, FailurePolicy, SearchOutcome, SessionState},
    transport::{HostWindow, ResponseTransport},
};
use crate::host::terminal::TerminalHost;
use crate::ui::{
    dialog::{QueryBar, ResultsList},
    layout::AppLayout,
    popup::CreateFormPopup,
    spinner::StatusIndicator,
    theme::Theme,
};

// ───────────────────────────────────────── CLI ───────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FailureArg {
    /// Keep showing "loading" when a request fails.
    Legacy,
    /// Show the failure and let the user retry.
    Surface,
}

impl From<FailureArg> for FailurePolicy {
    fn from(arg: FailureArg) -> Self {
        match arg {
            FailureArg::Legacy => FailurePolicy::Legacy,
            FailureArg::Surface => FailurePolicy::Surface,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Delegated OSLC resource selection dialog")]
struct Cli {
    /// Selector URL of the service provider (search requests go here).
    selector: String,

    /// Creation URL; enables the create form.
    #[arg(long)]
    creator: Option<String>,

    /// Dialog URL fragment choosing the response transport, e.g.
    /// `#oslc-core-postMessage-1.0`.
    #[arg(long, allow_hyphen_values = true)]
    fragment: Option<String>,

    /// Initial window name; the return address for the window-name transport.
    #[arg(long, default_value = "")]
    window_name: String,

    /// The dialog has no parent window; post-message targets itself.
    #[arg(long)]
    no_parent: bool,

    /// Resource type passed to the selector as `type=`.
    #[arg(long = "type")]
    resource_type: Option<String>,

    /// Target origin for post-message responses (overrides the config file).
    #[arg(long)]
    target_origin: Option<String>,

    /// What a failed request does to the dialog (overrides the config file).
    #[arg(long, value_enum)]
    failure: Option<FailureArg>,

    /// Fail loudly when the fragment names no known transport.
    #[arg(long)]
    strict_transport: bool,

    /// Create-form field as NAME=VALUE; repeatable.
    #[arg(long = "field", value_name = "NAME=VALUE")]
    fields: Vec<String>,

    /// Search once for these terms without opening the TUI.
    #[arg(long, conflicts_with = "batch_create")]
    batch_terms: Option<String>,

    /// Zero-based result rows to select in batch mode; none means cancel.
    #[arg(long, value_delimiter = ',', requires = "batch_terms")]
    pick: Vec<usize>,

    /// Submit the create form once without opening the TUI.
    #[arg(long, requires = "creator")]
    batch_create: bool,

    /// Write the effective configuration (file + flags) to the config file
    /// and exit.
    #[arg(long)]
    init_config: bool,
}

fn form_fields(cli: &Cli) -> Vec<FormField> {
    if cli.fields.is_empty() {
        DEFAULT_CREATE_FIELDS
            .iter()
            .map(|name| FormField::named(*name, ""))
            .collect()
    } else {
        cli.fields.iter().map(|arg| FormField::from_arg(arg)).collect()
    }
}

// ───────────────────────────────────────── batch ─────────────

fn open_session(cli: &Cli, config: &AppConfig) -> DialogSession {
    let transport = ResponseTransport::new(cli.fragment.as_deref())
        .with_target_origin(config.target_origin.clone())
        .strict(config.strict_transport);
    DialogSession::new(transport, config.failure_policy)
}

/// Error out unless the request finished.  Batch mode has nothing to wait
/// for, so a request the legacy policy leaves pending counts as failed too.
fn ensure_completed(session: &DialogSession, completed: bool, what: &str) -> Result<()> {
    if completed {
        return Ok(());
    }
    match session.state() {
        SessionState::Failed { reason } => bail!("{what} failed: {reason}"),
        _ => bail!("{what} failed"),
    }
}

/// Headless run: one request, one response, no terminal UI.  Nothing is
/// sent to the opener unless the request succeeded.
async fn run_batch<C: CatalogClient, H: HostWindow>(
    cli: &Cli,
    session: &mut DialogSession,
    host: &mut H,
    client: &C,
) -> Result<()> {
    if cli.batch_create {
        let creator = cli.creator.as_deref().context("--batch-create needs --creator")?;
        let outcome = controller::create(session, client, host, creator, &form_fields(cli)).await?;
        tracing::info!(?outcome, "batch create finished");
        ensure_completed(session, matches!(outcome, CreateOutcome::Responded(_)), "create")?;
    } else if let Some(terms) = &cli.batch_terms {
        let base_url = selector_query_url(&cli.selector, cli.resource_type.as_deref(), terms);
        let outcome = controller::search(session, client, &base_url).await?;
        tracing::info!(?outcome, "batch search finished");
        ensure_completed(session, matches!(outcome, SearchOutcome::Populated(_)), "search")?;
        for (i, entry) in session.results().entries().iter().enumerate() {
            eprintln!("{i:>3}  {}  {}", entry.resource.label, entry.resource.uri);
        }
        controller::respond_with_rows(session, host, &cli.pick)?;
    }
    Ok(())
}

// ───────────────────────────────────────── drawing ───────────

fn draw(frame: &mut Frame, state: &AppState) {
    let layout = AppLayout::from_area(frame.area());

    let border = |focused: bool| {
        if focused {
            Theme::focused_border_style()
        } else {
            Theme::border_style()
        }
    };

    let query_focused = state.active_view == ActiveView::Dialog && state.focus == Focus::Query;
    frame.render_widget(
        QueryBar {
            block: Block::default()
                .title(format!(
                    " {} [{}] ",
                    state.selector_url,
                    state.session.transport_mode().label()
                ))
                .title_style(Theme::title_style())
                .borders(Borders::ALL)
                .border_style(border(query_focused)),
            query: &state.query,
            has_focus: query_focused,
        },
        layout.query_area,
    );

    let results_focused =
        state.active_view == ActiveView::Dialog && state.focus == Focus::Results;
    let results = state.session.results();
    let title = format!(" Results ({} selected) ", results.selected_count());
    let empty_hint = match state.session.state() {
        SessionState::Idle => "Type terms and press Enter to search.",
        SessionState::Searching => "",
        _ => "No results.",
    };
    frame.render_widget(
        ResultsList {
            block: Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border(results_focused)),
            entries: results.entries(),
            cursor: state.cursor,
            has_focus: results_focused,
            empty_hint,
        },
        layout.results_area,
    );
    frame.render_widget(
        StatusIndicator {
            indicators: state.session.indicators(),
            state: state.session.state(),
            tick: state.tick,
        },
        layout.results_area,
    );

    let hint = state.config.status_bar_hint();
    let status_text = state.status_message.as_deref().unwrap_or(&hint);
    frame.render_widget(
        Paragraph::new(status_text).style(Theme::status_bar_style()),
        layout.status_area,
    );

    if state.active_view == ActiveView::CreateForm {
        frame.render_widget(
            CreateFormPopup {
                form: &state.form,
                creator_url: state.creator_url.as_deref().unwrap_or(""),
            },
            frame.area(),
        );
    }
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    // stderr only: stdout carries the exit payload.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load();
    if let Some(origin) = &cli.target_origin {
        config.target_origin = origin.clone();
    }
    if let Some(failure) = cli.failure {
        config.failure_policy = failure.into();
    }
    config.strict_transport |= cli.strict_transport;

    if cli.init_config {
        config.save()?;
        eprintln!("wrote {}", config::config_path().display());
        return Ok(());
    }

    let mut session = open_session(&cli, &config);
    let mut host = TerminalHost::new(cli.window_name.clone(), !cli.no_parent);
    let client = HttpCatalog::new(config.request_timeout())?;

    // ── headless mode ─────────────────────────────────────────
    if cli.batch_create || cli.batch_terms.is_some() {
        let result = run_batch(&cli, &mut session, &mut host, &client).await;
        host.print_exit_payload()?;
        return result;
    }

    let mut state = AppState::new(session, host, cli.selector.clone(), config);
    state.creator_url = cli.creator.clone();
    state.resource_type = cli.resource_type.clone();
    state.form = CreateFormState::new(form_fields(&cli));

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    execute!(stderr(), EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    let (tx, mut events) = event::channel();
    event::spawn_terminal_reader(tx.clone(), Duration::from_millis(100));

    // ── event loop ────────────────────────────────────────────
    let run = async {
        loop {
            terminal.draw(|frame| draw(frame, &state))?;

            for request in state.pending_requests.drain(..) {
                match request {
                    PendingRequest::Search(ticket) => {
                        net_runtime::spawn_search(tx.clone(), client.clone(), ticket)
                    }
                    PendingRequest::Create(ticket) => {
                        net_runtime::spawn_create(tx.clone(), client.clone(), ticket)
                    }
                }
            }

            let Some(event) = events.recv().await else {
                break;
            };
            match event {
                AppEvent::Key(k) => handler::handle_key(&mut state, k),
                AppEvent::Net(update) => handler::apply_net_update(&mut state, update),
                AppEvent::Tick => state.tick = state.tick.wrapping_add(1),
                AppEvent::Resize => {}
            }

            if state.should_quit {
                break;
            }
        }
        anyhow::Ok(())
    };
    let outcome = run.await;

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    outcome?;

    state.host.print_exit_payload()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::core::catalog::testing::CannedCatalog;
    use crate::core::resource::CANCEL_RESPONSE;
    use crate::core::transport::testing::RecordingHost;

    const SELECTOR: &str = "http://host/sp/1/selector";
    const POST_MESSAGE: &str = "#oslc-core-postMessage-1.0";

    fn cli(extra: &[&str]) -> Cli {
        let mut args = vec!["oslc-dialog", SELECTOR, "--fragment", POST_MESSAGE];
        args.extend_from_slice(extra);
        Cli::parse_from(args)
    }

    fn two_results() -> CannedCatalog {
        let body = json!({"oslc:results": [
            {"oslc:label": "S-1", "rdf:resource": "http://host/req/1"},
            {"oslc:label": "S-2", "rdf:resource": "http://host/req/2"},
        ]})
        .to_string();
        CannedCatalog::new(200, &body)
    }

    async fn batch(
        cli: &Cli,
        policy: FailurePolicy,
        catalog: &CannedCatalog,
        host: &mut RecordingHost,
    ) -> Result<()> {
        let config = AppConfig {
            failure_policy: policy,
            ..AppConfig::default()
        };
        let mut session = open_session(cli, &config);
        run_batch(cli, &mut session, host, catalog).await
    }

    #[tokio::test]
    async fn batch_pick_selects_rows() {
        let cli = cli(&["--batch-terms", "door", "--type", "Spec", "--pick", "1"]);
        let catalog = two_results();
        let mut host = RecordingHost::named("ret");

        batch(&cli, FailurePolicy::Legacy, &catalog, &mut host).await.unwrap();

        assert_eq!(
            catalog.requests(),
            vec![(format!("{SELECTOR}?type=Spec&terms=door&stream=data"), None)]
        );
        assert_eq!(
            host.posts[0].1,
            r#"oslc-response:{"oslc:results":[{"oslc:label":"S-2","rdf:resource":"http://host/req/2"}]}"#
        );
    }

    #[tokio::test]
    async fn batch_without_pick_cancels() {
        let cli = cli(&["--batch-terms", "door"]);
        let catalog = two_results();
        let mut host = RecordingHost::named("ret");

        batch(&cli, FailurePolicy::Legacy, &catalog, &mut host).await.unwrap();

        assert_eq!(host.posts.len(), 1);
        assert_eq!(host.posts[0].1, CANCEL_RESPONSE);
    }

    #[tokio::test]
    async fn batch_pick_out_of_range_sends_nothing() {
        let cli = cli(&["--batch-terms", "door", "--pick", "0,5"]);
        let catalog = two_results();
        let mut host = RecordingHost::named("ret");

        let err = batch(&cli, FailurePolicy::Legacy, &catalog, &mut host)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("no result row 5"));
        assert_eq!(host.side_effects(), 0);
    }

    #[tokio::test]
    async fn batch_search_failure_is_an_error_under_both_policies() {
        for policy in [FailurePolicy::Legacy, FailurePolicy::Surface] {
            let cli = cli(&["--batch-terms", "door"]);
            let catalog = CannedCatalog::new(500, "");
            let mut host = RecordingHost::named("ret");

            let err = batch(&cli, policy, &catalog, &mut host).await.unwrap_err();

            assert!(err.to_string().starts_with("search failed"));
            assert_eq!(host.side_effects(), 0);
        }
    }

    #[tokio::test]
    async fn batch_create_posts_fields_and_forwards_reply() {
        let cli = cli(&[
            "--creator",
            "http://host/sp/1/creator",
            "--batch-create",
            "--field",
            "title=Hinge",
            "--field",
            "author=ann",
        ]);
        let catalog = CannedCatalog::new(201, r#"{"id":7}"#);
        let mut host = RecordingHost::named("ret");

        batch(&cli, FailurePolicy::Legacy, &catalog, &mut host).await.unwrap();

        assert_eq!(
            catalog.requests(),
            vec![(
                "http://host/sp/1/creator".to_string(),
                Some("&title=Hinge&author=ann".to_string())
            )]
        );
        assert_eq!(host.posts[0].1, "oslc-response:{\n  \"id\": 7\n}");
    }

    #[tokio::test]
    async fn batch_create_rejection_is_an_error() {
        let cli = cli(&["--creator", "http://host/c", "--batch-create"]);
        let catalog = CannedCatalog::new(400, "");
        let mut host = RecordingHost::named("ret");

        let err = batch(&cli, FailurePolicy::Surface, &catalog, &mut host)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("400"));
        assert_eq!(host.side_effects(), 0);
    }

    #[test]
    fn pick_needs_batch_terms() {
        assert!(Cli::try_parse_from(["oslc-dialog", SELECTOR, "--pick", "1"]).is_err());
    }

    #[test]
    fn default_form_fields_follow_the_provider_form() {
        let fields = form_fields(&cli(&[]));
        let names: Vec<_> = fields.iter().filter_map(|f| f.name.as_deref()).collect();
        assert_eq!(names, DEFAULT_CREATE_FIELDS);
        assert!(fields.iter().all(|f| f.value.is_empty()));
    }
}

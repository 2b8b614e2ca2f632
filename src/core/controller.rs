//! Awaitable dialog operations.
//!
//! Each network-backed operation suspends exactly once, on its request.
//! The terminal dialog drives the same session halves through its event
//! channel instead (see `app::net_runtime`).

use super::catalog::CatalogClient;
use super::error::DialogError;
use super::form::FormField;
use super::session::{CreateOutcome, DialogSession, SearchOutcome};
use super::transport::{Delivery, HostWindow};

/// Query the catalog and populate the session's results list.
pub async fn search<C: CatalogClient>(
    session: &mut DialogSession,
    client: &C,
    base_url: &str,
) -> Result<SearchOutcome, DialogError> {
    let ticket = session.begin_search(base_url)?;
    let reply = client.get(&ticket.url).await;
    Ok(session.complete_search(ticket.generation, reply))
}

/// Submit the create form; a created resource is sent to the opener
/// immediately.
pub async fn create<C: CatalogClient, H: HostWindow>(
    session: &mut DialogSession,
    client: &C,
    host: &mut H,
    base_url: &str,
    fields: &[FormField],
) -> Result<CreateOutcome, DialogError> {
    let ticket = session.begin_create(base_url, fields)?;
    let reply = client.post_form(&ticket.url, ticket.body).await;
    session.complete_create(ticket.generation, reply, host)
}

pub fn select<H: HostWindow>(
    session: &mut DialogSession,
    host: &mut H,
) -> Result<Option<Delivery>, DialogError> {
    session.select(host)
}

pub fn cancel<H: HostWindow>(
    session: &mut DialogSession,
    host: &mut H,
) -> Result<Delivery, DialogError> {
    session.cancel(host)
}

/// Respond with the given result rows, or cancel when there are none.
///
/// Every row is checked before anything is selected, so a bad index leaves
/// the list untouched and sends nothing.
pub fn respond_with_rows<H: HostWindow>(
    session: &mut DialogSession,
    host: &mut H,
    rows: &[usize],
) -> Result<Option<Delivery>, DialogError> {
    if rows.is_empty() {
        return cancel(session, host).map(Some);
    }
    let len = session.results().len();
    if let Some(&row) = rows.iter().find(|&&row| row >= len) {
        return Err(DialogError::NoSuchRow { row, len });
    }
    for &row in rows {
        session.results_mut().set_selected(row, true);
    }
    select(session, host)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::core::catalog::testing::CannedCatalog;
    use crate::core::resource::{CANCEL_RESPONSE, RESPONSE_PREFIX};
    use crate::core::session::{FailurePolicy, Indicators};
    use crate::core::transport::testing::RecordingHost;
    use crate::core::transport::{ResponseTransport, POST_MESSAGE_FRAGMENT, WINDOW_NAME_FRAGMENT};

    fn session(fragment: &str) -> DialogSession {
        DialogSession::new(ResponseTransport::new(Some(fragment)), FailurePolicy::Legacy)
    }

    #[tokio::test]
    async fn search_then_select_round_trip() {
        let body = json!({"oslc:results": [
            {"oslc:label": "REQ-1 / Lights", "rdf:resource": "http://host/req/1"},
            {"oslc:label": "REQ-2 / Brakes", "rdf:resource": "http://host/req/2"},
        ]})
        .to_string();
        let catalog = CannedCatalog::new(200, &body);
        let mut host = RecordingHost::named("ret");
        let mut s = session(POST_MESSAGE_FRAGMENT);

        let outcome = search(&mut s, &catalog, "http://host/selector?terms=").await.unwrap();
        assert_eq!(outcome, SearchOutcome::Populated(2));
        assert_eq!(s.indicators(), Indicators { loading: false, ready: true });
        assert_eq!(
            catalog.requests(),
            vec![("http://host/selector?terms=&stream=data".to_string(), None)]
        );

        s.results_mut().set_selected(1, true);
        select(&mut s, &mut host).unwrap();
        assert_eq!(
            host.posts[0].1,
            r#"oslc-response:{"oslc:results":[{"oslc:label":"REQ-2 / Brakes","rdf:resource":"http://host/req/2"}]}"#
        );
    }

    #[tokio::test]
    async fn failed_search_leaves_loading_visible() {
        let catalog = CannedCatalog::new(503, "");
        let mut s = session(POST_MESSAGE_FRAGMENT);
        let outcome = search(&mut s, &catalog, "http://host/s?x=1").await.unwrap();
        assert_eq!(outcome, SearchOutcome::Pending);
        assert!(s.results().is_empty());
        assert_eq!(s.indicators(), Indicators { loading: true, ready: false });
    }

    #[tokio::test]
    async fn create_posts_form_and_forwards_reply() {
        let created = r#"{"rdf:resource":"http://host/requirement/7","oslc:label":"7"}"#;
        let catalog = CannedCatalog::new(201, created);
        let mut host = RecordingHost::named("http://opener/cb");
        let mut s = session(WINDOW_NAME_FRAGMENT);
        let fields = [
            FormField::named("identifier", "7"),
            FormField::named("title", "Door lock"),
        ];

        let outcome = create(&mut s, &catalog, &mut host, "http://host/creator", &fields)
            .await
            .unwrap();

        assert!(matches!(outcome, CreateOutcome::Responded(Delivery::WindowName { .. })));
        assert_eq!(
            catalog.requests(),
            vec![(
                "http://host/creator".to_string(),
                Some("&identifier=7&title=Door+lock".to_string())
            )]
        );
        let json = host.name.strip_prefix(RESPONSE_PREFIX).unwrap();
        let forwarded: serde_json::Value = serde_json::from_str(json).unwrap();
        assert_eq!(forwarded, serde_json::from_str::<serde_json::Value>(created).unwrap());
        assert_eq!(host.navigations, vec!["http://opener/cb".to_string()]);
    }

    #[tokio::test]
    async fn cancel_after_results_still_sends_empty() {
        let body = json!({"oslc:results": [{"oslc:label": "a", "rdf:resource": "b"}]}).to_string();
        let catalog = CannedCatalog::new(200, &body);
        let mut host = RecordingHost::named("ret");
        let mut s = session(POST_MESSAGE_FRAGMENT);
        search(&mut s, &catalog, "http://host/s?t=").await.unwrap();
        s.results_mut().set_selected(0, true);

        cancel(&mut s, &mut host).unwrap();

        assert_eq!(host.posts[0].1, CANCEL_RESPONSE);
        assert!(matches!(
            search(&mut s, &catalog, "http://host/s?t=").await,
            Err(DialogError::AlreadyResponded)
        ));
    }

    #[tokio::test]
    async fn rows_are_selected_in_display_order() {
        let body = json!({"oslc:results": [
            {"oslc:label": "a", "rdf:resource": "http://r/a"},
            {"oslc:label": "b", "rdf:resource": "http://r/b"},
            {"oslc:label": "c", "rdf:resource": "http://r/c"},
        ]})
        .to_string();
        let catalog = CannedCatalog::new(200, &body);
        let mut host = RecordingHost::named("ret");
        let mut s = session(POST_MESSAGE_FRAGMENT);
        search(&mut s, &catalog, "http://host/s?t=").await.unwrap();

        respond_with_rows(&mut s, &mut host, &[2, 0]).unwrap();

        assert_eq!(
            host.posts[0].1,
            r#"oslc-response:{"oslc:results":[{"oslc:label":"a","rdf:resource":"http://r/a"},{"oslc:label":"c","rdf:resource":"http://r/c"}]}"#
        );
    }

    #[tokio::test]
    async fn no_rows_means_cancel() {
        let body = json!({"oslc:results": [{"oslc:label": "a", "rdf:resource": "b"}]}).to_string();
        let catalog = CannedCatalog::new(200, &body);
        let mut host = RecordingHost::named("ret");
        let mut s = session(POST_MESSAGE_FRAGMENT);
        search(&mut s, &catalog, "http://host/s?t=").await.unwrap();

        respond_with_rows(&mut s, &mut host, &[]).unwrap();

        assert_eq!(host.posts[0].1, CANCEL_RESPONSE);
        assert!(s.has_responded());
    }

    #[tokio::test]
    async fn out_of_range_row_sends_nothing() {
        let body = json!({"oslc:results": [{"oslc:label": "a", "rdf:resource": "b"}]}).to_string();
        let catalog = CannedCatalog::new(200, &body);
        let mut host = RecordingHost::named("ret");
        let mut s = session(POST_MESSAGE_FRAGMENT);
        search(&mut s, &catalog, "http://host/s?t=").await.unwrap();

        let err = respond_with_rows(&mut s, &mut host, &[0, 1]).unwrap_err();

        assert!(matches!(err, DialogError::NoSuchRow { row: 1, len: 1 }));
        assert_eq!(host.side_effects(), 0);
        assert_eq!(s.results().selected_count(), 0);
        assert!(!s.has_responded());
    }
}

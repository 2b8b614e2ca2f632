//! Background catalog requests that keep the UI thread responsive.
//!
//! Each request runs as its own tokio task and reports back as an
//! [`AppEvent::Net`] on the UI channel.  Nothing here touches the session;
//! the event loop applies completions in arrival order.

use tokio::sync::mpsc;

use super::event::AppEvent;
use crate::core::catalog::{CatalogClient, HttpReply};
use crate::core::error::DialogError;
use crate::core::session::{CreateTicket, SearchTicket};

#[derive(Debug)]
pub enum NetUpdate {
    Searched {
        generation: u64,
        reply: Result<HttpReply, DialogError>,
    },
    Created {
        generation: u64,
        reply: Result<HttpReply, DialogError>,
    },
}

pub fn spawn_search<C>(tx: mpsc::UnboundedSender<AppEvent>, client: C, ticket: SearchTicket)
where
    C: CatalogClient + Send + Sync + 'static,
{
    tokio::spawn(async move {
        tracing::debug!(url = %ticket.url, "GET");
        let reply = client.get(&ticket.url).await;
        let _ = tx.send(AppEvent::Net(NetUpdate::Searched {
            generation: ticket.generation,
            reply,
        }));
    });
}

pub fn spawn_create<C>(tx: mpsc::UnboundedSender<AppEvent>, client: C, ticket: CreateTicket)
where
    C: CatalogClient + Send + Sync + 'static,
{
    tokio::spawn(async move {
        tracing::debug!(url = %ticket.url, "POST");
        let reply = client.post_form(&ticket.url, ticket.body).await;
        let _ = tx.send(AppEvent::Net(NetUpdate::Created {
            generation: ticket.generation,
            reply,
        }));
    });
}

#[cfg(test)]
mod tests {
    use std::future::Future;

    use super::*;

    #[derive(Clone)]
    struct EchoCatalog;

    impl CatalogClient for EchoCatalog {
        fn get(&self, url: &str) -> impl Future<Output = Result<HttpReply, DialogError>> + Send {
            let body = url.to_string();
            async move { Ok(HttpReply::new(200, body)) }
        }

        fn post_form(
            &self,
            _url: &str,
            body: String,
        ) -> impl Future<Output = Result<HttpReply, DialogError>> + Send {
            async move { Ok(HttpReply::new(201, body)) }
        }
    }

    #[tokio::test]
    async fn search_completion_arrives_as_event() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_search(
            tx,
            EchoCatalog,
            SearchTicket {
                generation: 4,
                url: "http://x/s?t=&stream=data".into(),
            },
        );

        match rx.recv().await {
            Some(AppEvent::Net(NetUpdate::Searched { generation, reply })) => {
                assert_eq!(generation, 4);
                assert_eq!(reply.unwrap().body, "http://x/s?t=&stream=data");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_completion_carries_generation() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_create(
            tx,
            EchoCatalog,
            CreateTicket {
                generation: 2,
                url: "http://x/c".into(),
                body: "&title=a".into(),
            },
        );

        match rx.recv().await {
            Some(AppEvent::Net(NetUpdate::Created { generation, reply })) => {
                assert_eq!(generation, 2);
                assert_eq!(reply.unwrap(), HttpReply::new(201, "&title=a"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}

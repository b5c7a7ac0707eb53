//! Client-level flows over a stub transport: de-duplication, seeding, and
//! isolated option fetches.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use gridq_client::{OptionsResolver, TableClient, Transport, TransportError};
use gridq_core::binding::TableBinding;
use gridq_core::error::QueryError;
use gridq_core::request::QueryRequest;
use gridq_core::resolve::TableData;
use gridq_core::state::TableState;
use pretty_assertions::assert_eq;
use serde_json::json;

type Handler =
    Box<dyn Fn(&QueryRequest) -> Result<serde_json::Value, TransportError> + Send + Sync>;

struct StubTransport {
    calls: AtomicUsize,
    delay: Duration,
    handler: Handler,
}

impl StubTransport {
    fn new(handler: Handler) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay: Duration::from_millis(10),
            handler,
        })
    }

    fn ok_rows(rows: serde_json::Value) -> Arc<Self> {
        Self::new(Box::new(move |_| {
            Ok(json!({ "success": true, "data": { "rows": rows.clone(), "total": 1 } }))
        }))
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Transport for StubTransport {
    fn execute(
        &self,
        request: QueryRequest,
    ) -> BoxFuture<'_, Result<serde_json::Value, TransportError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = (self.handler)(&request);
        let delay = self.delay;
        async move {
            tokio::time::sleep(delay).await;
            outcome
        }
        .boxed()
    }
}

fn rpc_binding() -> TableBinding {
    serde_json::from_value(json!({
        "tableName": "orders",
        "columnOrder": ["id", "status", "region"],
        "dataRequest": {
            "url": "/api/rpc/frontbase_get_rows",
            "method": "POST",
            "queryConfig": { "useRpc": true, "tableName": "orders", "columns": ["id", "status"] }
        },
        "frontendFilters": [
            {
                "id": "status",
                "column": "status",
                "filterType": "dropdown",
                "optionsRequest": {}
            },
            {
                "id": "region",
                "column": "region",
                "filterType": "dropdown",
                "optionsRequest": {}
            },
            {
                "id": "owner",
                "column": "owner",
                "filterType": "dropdown",
                "optionsRequest": {}
            }
        ]
    }))
    .unwrap()
}

#[tokio::test]
async fn concurrent_fetches_for_one_key_share_one_call() {
    let transport = StubTransport::ok_rows(json!([{ "id": 1 }]));
    let client = TableClient::new(transport.clone());
    let binding = rpc_binding();
    let state = TableState::new();

    let (first, second) = tokio::join!(
        client.fetch(&binding, &state),
        client.fetch(&binding, &state)
    );
    assert_eq!(first, second);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn different_keys_fetch_independently() {
    let transport = StubTransport::ok_rows(json!([{ "id": 1 }]));
    let client = TableClient::new(transport.clone());
    let binding = rpc_binding();

    let state0 = TableState::new();
    let state1 = TableState::new().with_page(1);
    let (page0, page1) = tokio::join!(
        client.fetch(&binding, &state0),
        client.fetch(&binding, &state1)
    );
    assert!(page0.is_ok());
    assert!(page1.is_ok());
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn seed_answers_only_the_default_key() {
    let transport = StubTransport::ok_rows(json!([{ "id": 9 }]));
    let client = TableClient::new(transport.clone());
    let binding = rpc_binding();
    let seeded = TableData {
        rows: vec![json!({ "id": 1 })],
        total: 1,
    };

    assert!(client.seed(&binding, seeded.clone()));

    // Default state is answered by the seed, no network attempt.
    let data = client.fetch(&binding, &TableState::new()).await.unwrap();
    assert_eq!(data, seeded);
    assert_eq!(transport.calls(), 0);

    // Any other key goes to the network.
    let data = client
        .fetch(&binding, &TableState::new().with_page(2))
        .await
        .unwrap();
    assert_eq!(data.rows, vec![json!({ "id": 9 })]);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn unconfigured_binding_never_reaches_the_transport() {
    let transport = StubTransport::ok_rows(json!([]));
    let client = TableClient::new(transport.clone());

    let outcome = client
        .fetch(&TableBinding::default(), &TableState::new())
        .await;
    assert_eq!(outcome, Err(QueryError::Unconfigured));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn transport_failure_is_a_cached_outcome_until_invalidated() {
    let transport = StubTransport::new(Box::new(|_| {
        Err(TransportError::Network("connection refused".into()))
    }));
    let client = TableClient::new(transport.clone());
    let binding = rpc_binding();
    let state = TableState::new();

    let first = client.fetch(&binding, &state).await;
    assert!(matches!(first, Err(QueryError::Transport(_))));
    // The error is served from cache; retry is explicit.
    let second = client.fetch(&binding, &state).await;
    assert_eq!(first, second);
    assert_eq!(transport.calls(), 1);

    client.invalidate(&binding, &state);
    let _ = client.fetch(&binding, &state).await;
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn one_failing_filter_does_not_block_its_siblings() {
    let transport = StubTransport::new(Box::new(|request| match request {
        QueryRequest::Rpc { body, .. } if body.column.as_deref() == Some("region") => {
            Err(TransportError::Status(500))
        }
        _ => Ok(json!({ "success": true, "data": { "rows": ["open", "closed"] } })),
    }));
    let resolver = OptionsResolver::new(transport.clone());
    let binding = rpc_binding();

    let lists = resolver.resolve(&binding, &TableState::new()).await;
    assert_eq!(transport.calls(), 3);
    assert_eq!(lists["status"].len(), 2);
    assert_eq!(lists["owner"].len(), 2);
    assert!(lists["region"].is_empty());
    assert_eq!(lists["status"][0].value, "open");
}

#[tokio::test]
async fn unchanged_dependencies_reuse_resolved_options() {
    let transport = StubTransport::new(Box::new(|_| {
        Ok(json!({ "success": true, "data": { "rows": ["a"] } }))
    }));
    let resolver = OptionsResolver::new(transport.clone());
    let binding = rpc_binding();
    let state = TableState::new();

    resolver.resolve(&binding, &state).await;
    assert_eq!(transport.calls(), 3);

    // Same dependency set: nothing refetches.
    resolver.resolve(&binding, &state).await;
    assert_eq!(transport.calls(), 3);

    // A search changes every filter's dependency set.
    resolver
        .resolve(&binding, &TableState::new().with_search("fr"))
        .await;
    assert_eq!(transport.calls(), 6);
}

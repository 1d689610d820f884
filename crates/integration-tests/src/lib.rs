//! End-to-end test harness for Flowrite.
//!
//! [`TestServer::spawn`] boots the full router on an ephemeral port with the
//! in-memory store, so the tests need no database:
//!
//! ```bash
//! cargo test -p flowrite-integration-tests
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::NaiveDate;
use secrecy::SecretString;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use flowrite_client::{ApiClient, ClientError};
use flowrite_core::SubmissionInput;
use flowrite_server::app;
use flowrite_server::config::ServerConfig;
use flowrite_server::db::MemoryStore;
use flowrite_server::state::AppState;

/// Signing secret used by every test server.
pub const TEST_SECRET: &str = "Xq7mR2vLp9Tz4Kw8Nd3Hs6Jb1Fc5Gy0e";

/// A server running in the background for one test.
pub struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<std::io::Result<()>>>,
}

impl TestServer {
    /// Start a server with a fresh in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn spawn() -> std::io::Result<Self> {
        let config = ServerConfig::in_memory(SecretString::from(TEST_SECRET));
        let state = AppState::new(config, Arc::new(MemoryStore::new()));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (tx, rx) = oneshot::channel();

        let handle = tokio::spawn(app::serve(listener, state, async {
            rx.await.ok();
        }));

        Ok(Self {
            addr,
            shutdown: Some(tx),
            handle: Some(handle),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// An unauthenticated API client pointed at this server.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidUrl` if the address cannot form a URL.
    pub fn client(&self) -> Result<ApiClient, ClientError> {
        ApiClient::new(&self.base_url())
    }

    /// A client signed in as a freshly registered account.
    ///
    /// # Errors
    ///
    /// Returns the registration failure.
    pub async fn account(&self, email: &str) -> Result<ApiClient, ClientError> {
        let mut client = self.client()?;
        client.register(email, "hunter22").await?;
        Ok(client)
    }

    /// Stop the server and wait for it to drain.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            tx.send(()).ok();
        }
        if let Some(handle) = self.handle.take() {
            handle.await.ok();
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            tx.send(()).ok();
        }
    }
}

/// Parse a `YYYY-MM-DD` literal in tests.
///
/// # Panics
///
/// Panics on a malformed literal.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// A valid submission body.
#[must_use]
pub fn submission(customer: &str, date: &str, time: &str, amount: f64) -> SubmissionInput {
    SubmissionInput {
        customer_name: Some(customer.to_owned()),
        date: Some(date.to_owned()),
        time: Some(time.to_owned()),
        address: Some("1 Quarry Rd".to_owned()),
        order: Some("Road Base".to_owned()),
        amount: Some(json!(amount)),
        rego: Some("ABC123".to_owned()),
        ..Default::default()
    }
}

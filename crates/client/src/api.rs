//! Typed bindings for the `/api` endpoints.

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use flowrite_core::input::MAX_LIMIT;
use flowrite_core::{
    Account, Customer, CustomerId, CustomerInput, Docket, Envelope, Item, ItemId, ItemInput,
    LineItemOrder, Submission, SubmissionId, SubmissionInput, SubmissionStats,
};

use crate::error::ClientError;

/// Token and account returned by register and login.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: Account,
}

/// `GET /api/health` body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub store: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeletedCustomer {
    deleted_submissions: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeletedCount {
    deleted_count: u64,
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// HTTP client for one Flowrite server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client for the server at `base_url` (e.g. `http://localhost:3000`).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidUrl` if the URL does not parse or cannot
    /// carry a path.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(format!("{base_url} cannot be a base")));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base,
            token: None,
        })
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// `/api/<segments...>`, each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ClientError> {
        let builder = self.http.request(method, self.url(segments)?);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Send and unwrap the envelope, mapping failures to `ClientError::Api`.
    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<Envelope<T>, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<Envelope<Value>>(&bytes)
                .ok()
                .and_then(|envelope| envelope.message)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Request failed")
                        .to_owned()
                });
            tracing::debug!(status = status.as_u16(), %message, "API request failed");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn data<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        self.send(builder).await?.data.ok_or(ClientError::MissingData)
    }

    async fn list_page<T: DeserializeOwned>(
        &self,
        resource: &str,
        limit: u32,
        offset: usize,
    ) -> Result<Vec<T>, ClientError> {
        let builder = self
            .request(Method::GET, &[resource])?
            .query(&[("limit", limit.to_string()), ("offset", offset.to_string())]);
        self.data(builder).await
    }

    /// Every record of a listing, fetched page by page.
    async fn list_all<T: DeserializeOwned>(&self, resource: &str) -> Result<Vec<T>, ClientError> {
        let mut all = Vec::new();
        loop {
            let page: Vec<T> = self.list_page(resource, MAX_LIMIT, all.len()).await?;
            let last = page.len() < MAX_LIMIT as usize;
            all.extend(page);
            if last {
                return Ok(all);
            }
        }
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Register and keep the returned token.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with the server's message on rejection.
    pub async fn register(&mut self, email: &str, password: &str) -> Result<Account, ClientError> {
        let builder = self
            .request(Method::POST, &["auth", "register"])?
            .json(&Credentials { email, password });
        let session: AuthSession = self.data(builder).await?;
        self.token = Some(session.token);
        Ok(session.user)
    }

    /// Log in and keep the returned token.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` (401) for bad credentials.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<Account, ClientError> {
        let builder = self
            .request(Method::POST, &["auth", "login"])?
            .json(&Credentials { email, password });
        let session: AuthSession = self.data(builder).await?;
        self.token = Some(session.token);
        Ok(session.user)
    }

    pub async fn me(&self) -> Result<Account, ClientError> {
        self.data(self.request(Method::GET, &["auth", "me"])?).await
    }

    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let response = self.request(Method::GET, &["health"])?.send().await?;
        Ok(response.error_for_status()?.json().await?)
    }

    // =========================================================================
    // Customers
    // =========================================================================

    pub async fn list_customers(&self) -> Result<Vec<Customer>, ClientError> {
        self.list_all("customers").await
    }

    pub async fn search_customers(&self, query: &str) -> Result<Vec<Customer>, ClientError> {
        let builder = self
            .request(Method::GET, &["customers", "search"])?
            .query(&[("q", query)]);
        self.data(builder).await
    }

    pub async fn get_customer(&self, id: CustomerId) -> Result<Customer, ClientError> {
        let id = id.to_string();
        self.data(self.request(Method::GET, &["customers", &id])?).await
    }

    pub async fn create_customer(&self, input: &CustomerInput) -> Result<Customer, ClientError> {
        let builder = self.request(Method::POST, &["customers"])?.json(input);
        self.data(builder).await
    }

    pub async fn update_customer(
        &self,
        id: CustomerId,
        input: &CustomerInput,
    ) -> Result<Customer, ClientError> {
        let id = id.to_string();
        let builder = self.request(Method::PUT, &["customers", &id])?.json(input);
        self.data(builder).await
    }

    /// Delete a customer; returns how many submissions were removed with it.
    pub async fn delete_customer(&self, id: CustomerId, cascade: bool) -> Result<u64, ClientError> {
        let id = id.to_string();
        let mut builder = self.request(Method::DELETE, &["customers", &id])?;
        if cascade {
            builder = builder.query(&[("cascade", "true")]);
        }
        let deleted: DeletedCustomer = self.data(builder).await?;
        Ok(deleted.deleted_submissions)
    }

    // =========================================================================
    // Submissions
    // =========================================================================

    pub async fn list_submissions(&self) -> Result<Vec<Submission>, ClientError> {
        self.list_all("submissions").await
    }

    pub async fn submission_stats(&self) -> Result<SubmissionStats, ClientError> {
        self.data(self.request(Method::GET, &["submissions", "stats"])?)
            .await
    }

    pub async fn submissions_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Submission>, ClientError> {
        let builder = self
            .request(Method::GET, &["submissions", "date-range"])?
            .query(&[("startDate", iso(start)), ("endDate", iso(end))]);
        self.data(builder).await
    }

    pub async fn submissions_for_customer(&self, name: &str) -> Result<Vec<Submission>, ClientError> {
        self.data(self.request(Method::GET, &["submissions", "customer", name])?)
            .await
    }

    pub async fn delete_submissions_for_customer(&self, name: &str) -> Result<u64, ClientError> {
        let builder = self.request(Method::DELETE, &["submissions", "customer", name])?;
        let deleted: DeletedCount = self.data(builder).await?;
        Ok(deleted.deleted_count)
    }

    pub async fn get_submission(&self, id: SubmissionId) -> Result<Submission, ClientError> {
        let id = id.to_string();
        self.data(self.request(Method::GET, &["submissions", &id])?)
            .await
    }

    pub async fn create_submission(
        &self,
        input: &SubmissionInput,
    ) -> Result<Submission, ClientError> {
        let builder = self.request(Method::POST, &["submissions"])?.json(input);
        self.data(builder).await
    }

    pub async fn update_submission(
        &self,
        id: SubmissionId,
        input: &SubmissionInput,
    ) -> Result<Submission, ClientError> {
        let id = id.to_string();
        let builder = self.request(Method::PUT, &["submissions", &id])?.json(input);
        self.data(builder).await
    }

    pub async fn delete_submission(&self, id: SubmissionId) -> Result<(), ClientError> {
        let id = id.to_string();
        self.send::<Value>(self.request(Method::DELETE, &["submissions", &id])?)
            .await?;
        Ok(())
    }

    // =========================================================================
    // Items
    // =========================================================================

    pub async fn list_items(&self) -> Result<Vec<Item>, ClientError> {
        self.list_all("items").await
    }

    pub async fn create_item(&self, input: &ItemInput) -> Result<Item, ClientError> {
        let builder = self.request(Method::POST, &["items"])?.json(input);
        self.data(builder).await
    }

    pub async fn update_item(&self, id: ItemId, input: &ItemInput) -> Result<Item, ClientError> {
        let id = id.to_string();
        let builder = self.request(Method::PUT, &["items", &id])?.json(input);
        self.data(builder).await
    }

    pub async fn delete_item(&self, id: ItemId) -> Result<(), ClientError> {
        let id = id.to_string();
        self.send::<Value>(self.request(Method::DELETE, &["items", &id])?)
            .await?;
        Ok(())
    }

    // =========================================================================
    // Dockets
    // =========================================================================

    /// Server-generated docket.
    pub async fn docket(
        &self,
        customer_name: &str,
        start: NaiveDate,
        end: NaiveDate,
        order: LineItemOrder,
    ) -> Result<Docket, ClientError> {
        let order = match order {
            LineItemOrder::Chronological => "asc",
            LineItemOrder::MostRecentFirst => "desc",
        };
        let builder = self.request(Method::GET, &["dockets"])?.query(&[
            ("customerName", customer_name.to_owned()),
            ("startDate", iso(start)),
            ("endDate", iso(end)),
            ("order", order.to_owned()),
        ]);
        self.data(builder).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_url_encodes_segments() {
        let client = ApiClient::new("http://localhost:3000/").unwrap();
        let url = client.url(&["submissions", "customer", "Acme Ltd/North"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/api/submissions/customer/Acme%20Ltd%2FNorth"
        );
    }

    #[test]
    fn test_url_keeps_base_path() {
        let client = ApiClient::new("https://example.com/flowrite").unwrap();
        assert_eq!(
            client.url(&["customers"]).unwrap().as_str(),
            "https://example.com/flowrite/api/customers"
        );
    }

    #[test]
    fn test_rejects_unusable_base() {
        assert!(matches!(
            ApiClient::new("mailto:someone@example.com"),
            Err(ClientError::InvalidUrl(_))
        ));
    }
}

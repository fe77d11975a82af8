//! Shared request plumbing for PostgREST tables.
//!
//! Every call is a single request. Failures are logged at `error` with the
//! endpoint and status, then returned unchanged.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;

/// Query-string pairs in PostgREST filter syntax, e.g. `("date", "gte.2026-01-01")`.
pub(crate) type Query = Vec<(&'static str, String)>;

const PREFER: &str = "Prefer";
const RETURN_ROWS: &str = "return=representation";
const UPSERT_RETURN_ROWS: &str = "resolution=merge-duplicates,return=representation";

/// `eq.` filter value.
pub(crate) fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{value}")
}

/// Handle on one table.
#[derive(Debug, Clone)]
pub(crate) struct Table {
    http: reqwest::Client,
    url: String,
    name: &'static str,
}

impl Table {
    pub(crate) fn new(http: reqwest::Client, url: String, name: &'static str) -> Self {
        Self { http, url, name }
    }

    pub(crate) async fn select<T: DeserializeOwned>(&self, query: &Query) -> Result<Vec<T>, StoreError> {
        let endpoint = self.endpoint("GET");
        let request = self.http.get(&self.url).query(&[("select", "*")]).query(query);
        let resp = send(&endpoint, request).await?;
        decode(&endpoint, resp).await
    }

    /// Zero or one row; more than one is an error.
    pub(crate) async fn maybe_single<T: DeserializeOwned>(
        &self,
        query: &Query,
    ) -> Result<Option<T>, StoreError> {
        let endpoint = self.endpoint("GET");
        let mut rows: Vec<T> = self.select(query).await?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.pop()),
            count => {
                tracing::error!(%endpoint, count, "expected at most one row");
                Err(StoreError::MultipleRows { endpoint, count })
            }
        }
    }

    pub(crate) async fn insert<T, B>(&self, body: &B) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let endpoint = self.endpoint("POST");
        let request = self
            .http
            .post(&self.url)
            .header(PREFER, RETURN_ROWS)
            .json(body);
        let resp = send(&endpoint, request).await?;
        first_row(endpoint.clone(), decode(&endpoint, resp).await?)
    }

    /// Insert, merging into the existing row on `on_conflict`.
    pub(crate) async fn upsert<T, B>(&self, body: &B, on_conflict: &str) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let endpoint = self.endpoint("POST");
        let request = self
            .http
            .post(&self.url)
            .query(&[("on_conflict", on_conflict)])
            .header(PREFER, UPSERT_RETURN_ROWS)
            .json(body);
        let resp = send(&endpoint, request).await?;
        first_row(endpoint.clone(), decode(&endpoint, resp).await?)
    }

    pub(crate) async fn update<T, B>(&self, query: &Query, body: &B) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let endpoint = self.endpoint("PATCH");
        let request = self
            .http
            .patch(&self.url)
            .query(query)
            .header(PREFER, RETURN_ROWS)
            .json(body);
        let resp = send(&endpoint, request).await?;
        first_row(endpoint.clone(), decode(&endpoint, resp).await?)
    }

    pub(crate) async fn delete(&self, query: &Query) -> Result<(), StoreError> {
        let endpoint = self.endpoint("DELETE");
        send(&endpoint, self.http.delete(&self.url).query(query)).await?;
        Ok(())
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{method} /{}", self.name)
    }
}

async fn send(
    endpoint: &str,
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response, StoreError> {
    let resp = request.send().await.map_err(|e| {
        tracing::error!(%endpoint, error = %e, "store request failed");
        StoreError::Http {
            endpoint: endpoint.to_string(),
            source: e,
        }
    })?;

    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        tracing::error!(%endpoint, status, %body, "store rejected request");
        return Err(StoreError::Api {
            endpoint: endpoint.to_string(),
            status,
            body,
        });
    }

    Ok(resp)
}

async fn decode<T: DeserializeOwned>(
    endpoint: &str,
    resp: reqwest::Response,
) -> Result<Vec<T>, StoreError> {
    resp.json().await.map_err(|e| {
        tracing::error!(%endpoint, error = %e, "store response did not decode");
        StoreError::Deserialization {
            endpoint: endpoint.to_string(),
            source: e,
        }
    })
}

fn first_row<T>(endpoint: String, rows: Vec<T>) -> Result<T, StoreError> {
    match rows.into_iter().next() {
        Some(row) => Ok(row),
        None => {
            tracing::error!(%endpoint, "write returned no rows");
            Err(StoreError::EmptyResponse { endpoint })
        }
    }
}

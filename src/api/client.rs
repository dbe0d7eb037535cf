//! REST client for the HR backend.
//!
//! Fetches the three dashboard collections concurrently. Each collection
//! degrades independently: a failed fetch becomes an empty collection with
//! the failure recorded on the snapshot, so partial data still produces a
//! best-effort report instead of blocking entirely.

use crate::models::{Employee, EmployeeLink, KnowledgeItem};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Endpoint paths, relative to the configured base URL.
const KNOWLEDGE_PATH: &str = "/conhecimentos";
const EMPLOYEES_PATH: &str = "/funcionarios";
const LINKS_PATH: &str = "/funcionario-conhecimentos";

/// Errors from the backend API layer.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected status {status} from {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("invalid response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// One of the three dashboard collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Knowledge,
    Employees,
    Links,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collection::Knowledge => write!(f, "knowledge"),
            Collection::Employees => write!(f, "employees"),
            Collection::Links => write!(f, "links"),
        }
    }
}

/// One fetched snapshot of the dashboard data.
#[derive(Debug, Clone, Default)]
pub struct DataSnapshot {
    pub knowledge: Vec<KnowledgeItem>,
    pub employees: Vec<Employee>,
    pub links: Vec<EmployeeLink>,
    /// Collections the backend failed to deliver.
    pub unavailable: Vec<Collection>,
}

impl DataSnapshot {
    /// True when at least one collection could not be fetched.
    pub fn is_partial(&self) -> bool {
        !self.unavailable.is_empty()
    }

    /// Names of the unavailable collections, for report metadata.
    pub fn unavailable_names(&self) -> Vec<String> {
        self.unavailable.iter().map(|c| c.to_string()).collect()
    }
}

/// Configuration for the API client.
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub retries: usize,
    /// Bearer token attached to every request, if set.
    pub token: Option<String>,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_seconds: 30,
            retries: 3,
            token: None,
        }
    }
}

/// The HR backend client.
pub struct ApiClient {
    config: ApiClientConfig,
    http_client: reqwest::Client,
}

impl ApiClient {
    /// Create a new client for the configured backend.
    pub fn new(mut config: ApiClientConfig) -> Self {
        config.base_url = config.base_url.trim_end_matches('/').to_string();

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            http_client,
        }
    }

    /// Full URL for an endpoint path.
    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Fetch the knowledge catalog.
    pub async fn fetch_knowledge(&self) -> Result<Vec<KnowledgeItem>, ApiError> {
        self.get_collection(KNOWLEDGE_PATH).await
    }

    /// Fetch the employee records.
    pub async fn fetch_employees(&self) -> Result<Vec<Employee>, ApiError> {
        self.get_collection(EMPLOYEES_PATH).await
    }

    /// Fetch the employee-knowledge links.
    pub async fn fetch_links(&self) -> Result<Vec<EmployeeLink>, ApiError> {
        self.get_collection(LINKS_PATH).await
    }

    /// Fetch all three collections concurrently.
    ///
    /// A collection that fails after all retries becomes an empty one and
    /// is recorded as unavailable; the other collections are preserved.
    pub async fn fetch_snapshot(&self) -> DataSnapshot {
        let (knowledge, employees, links) = futures::join!(
            self.fetch_knowledge(),
            self.fetch_employees(),
            self.fetch_links()
        );

        let mut unavailable = Vec::new();
        let knowledge = degrade(knowledge, Collection::Knowledge, &mut unavailable);
        let employees = degrade(employees, Collection::Employees, &mut unavailable);
        let links = degrade(links, Collection::Links, &mut unavailable);

        DataSnapshot {
            knowledge,
            employees,
            links,
            unavailable,
        }
    }

    /// GET a JSON array, retrying failed attempts.
    async fn get_collection<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let attempts = self.config.retries.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.try_get(path).await {
                Ok(records) => return Ok(records),
                Err(error) if attempt < attempts => {
                    warn!(
                        "Attempt {}/{} for {} failed: {}",
                        attempt, attempts, path, error
                    );
                }
                Err(error) => return Err(error),
            }
        }
    }

    async fn try_get<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let url = self.endpoint(path);
        debug!("GET {}", url);

        let mut request = self.http_client.get(&url);
        if let Some(ref token) = self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|source| ApiError::Request {
            url: url.clone(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { url, status });
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|source| ApiError::Decode { url, source })
    }
}

/// Unwrap a fetch result, degrading failure to an empty collection.
fn degrade<T>(
    result: Result<Vec<T>, ApiError>,
    collection: Collection,
    unavailable: &mut Vec<Collection>,
) -> Vec<T> {
    match result {
        Ok(records) => records,
        Err(error) => {
            warn!(
                "Collection '{}' unavailable, continuing with empty data: {}",
                collection, error
            );
            unavailable.push(collection);
            Vec::new()
        }
    }
}

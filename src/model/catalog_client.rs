//! Catalog service client: the same five operations for every collection

use std::marker::PhantomData;
use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use super::entities::{Album, Artist, CatalogEntity, EntityPayload, Song};
use super::types::EntityId;
use crate::error::{detail_message, CatalogError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Operation {
    List,
    Create,
    Update,
    Delete,
    Search,
}

impl Operation {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Search => "search",
        }
    }
}

/// Acknowledgement returned by a delete; its shape belongs to the server.
#[derive(Clone, Debug, PartialEq)]
pub struct DeleteAck(pub serde_json::Value);

impl DeleteAck {
    pub fn message(&self) -> Option<&str> {
        self.0.get("message").and_then(|m| m.as_str())
    }
}

/// Stateless request factory for one collection of the catalog service.
///
/// Each call is a single request/response cycle: nothing is cached, nothing is
/// retried, and concurrent calls are not serialized against each other.
pub struct ResourceClient<T> {
    http: Client,
    base: Arc<str>,
    _entity: PhantomData<fn() -> T>,
}

// Manual impl: a derive would demand `T: Clone`.
impl<T> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            base: Arc::clone(&self.base),
            _entity: PhantomData,
        }
    }
}

impl<T: CatalogEntity> ResourceClient<T> {
    pub fn new(http: Client, api_base: &str) -> Self {
        let base = format!("{}/{}", api_base.trim_end_matches('/'), T::COLLECTION);
        Self {
            http,
            base: base.into(),
            _entity: PhantomData,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// Every entity of the collection, in server order.
    pub async fn list(&self) -> Result<Vec<T>> {
        crate::log_api_request!(Operation::List.name(), collection = T::COLLECTION);
        let request = self.http.get(format!("{}/all", self.base));
        let result = self.execute(Operation::List, request, Vec::new).await;
        crate::log_api_result!(Operation::List.name(), T::COLLECTION, result);
        result
    }

    pub async fn create(&self, payload: impl Into<EntityPayload>) -> Result<T> {
        let payload = payload.into();
        crate::log_api_request!(
            Operation::Create.name(),
            collection = T::COLLECTION,
            fields = payload.fields().len(),
            attachments = payload.attachments().len()
        );
        let form = to_form(&payload)?;
        let request = self
            .http
            .post(format!("{}/create", self.base))
            .multipart(form);
        let result = self
            .execute(Operation::Create, request, || payload.fields().to_vec())
            .await;
        crate::log_api_result!(Operation::Create.name(), T::COLLECTION, result);
        result
    }

    pub async fn update(&self, id: EntityId, payload: impl Into<EntityPayload>) -> Result<T> {
        let payload = payload.into();
        crate::log_api_request!(
            Operation::Update.name(),
            collection = T::COLLECTION,
            id = id.0,
            attachments = payload.attachments().len()
        );
        let form = to_form(&payload)?;
        let request = self
            .http
            .put(format!("{}/{}", self.base, id))
            .multipart(form);
        let result = self
            .execute(Operation::Update, request, || payload.fields().to_vec())
            .await;
        crate::log_api_result!(Operation::Update.name(), T::COLLECTION, result);
        result
    }

    pub async fn delete(&self, id: EntityId) -> Result<DeleteAck> {
        crate::log_api_request!(Operation::Delete.name(), collection = T::COLLECTION, id = id.0);
        let request = self.http.delete(format!("{}/{}", self.base, id));
        let result = self
            .execute::<serde_json::Value>(Operation::Delete, request, Vec::new)
            .await
            .map(DeleteAck);
        crate::log_api_result!(Operation::Delete.name(), T::COLLECTION, result);
        result
    }

    /// Entities matching `query`. An empty query is passed through untouched;
    /// whether it matches everything is up to the server.
    pub async fn search(&self, query: &str) -> Result<Vec<T>> {
        crate::log_api_request!(Operation::Search.name(), collection = T::COLLECTION, query);
        let request = self
            .http
            .get(format!("{}/search", self.base))
            .query(&[("query", query)]);
        let result = self.execute(Operation::Search, request, Vec::new).await;
        crate::log_api_result!(Operation::Search.name(), T::COLLECTION, result);
        result
    }

    async fn execute<R: DeserializeOwned>(
        &self,
        operation: Operation,
        request: RequestBuilder,
        echoed: impl FnOnce() -> Vec<(String, String)>,
    ) -> Result<R> {
        let response = request.send().await.map_err(CatalogError::Network)?;
        let status = response.status();
        if status.is_success() {
            let body = response.text().await.map_err(CatalogError::Network)?;
            return serde_json::from_str(&body)
                .map_err(|e| CatalogError::undecodable(status.as_u16(), &e));
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(
            operation = operation.name(),
            collection = T::COLLECTION,
            status = status.as_u16(),
            body = %body,
            "Catalog service rejected request"
        );
        Err(classify_failure(operation, T::LABEL, status, &body, echoed()))
    }
}

/// Map a non-2xx response onto the error taxonomy.
pub(crate) fn classify_failure(
    operation: Operation,
    label: &str,
    status: StatusCode,
    body: &str,
    echoed: Vec<(String, String)>,
) -> CatalogError {
    let detail = detail_message(body);
    match operation {
        Operation::Update | Operation::Delete if status == StatusCode::NOT_FOUND => {
            CatalogError::NotFound {
                message: detail.unwrap_or_else(|| format!("{label} not found")),
            }
        }
        Operation::Create | Operation::Update if status.is_client_error() => {
            CatalogError::Validation {
                message: detail.unwrap_or_else(|| format!("{label} was rejected by the server")),
                echoed,
            }
        }
        _ => CatalogError::Server {
            status: status.as_u16(),
            message: detail.unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected response")
                    .to_string()
            }),
        },
    }
}

fn to_form(payload: &EntityPayload) -> Result<Form> {
    let mut form = Form::new();
    for (name, value) in payload.fields() {
        form = form.text(name.clone(), value.clone());
    }
    for attachment in payload.attachments() {
        let mut part = Part::bytes(attachment.bytes.clone()).file_name(attachment.file_name.clone());
        if let Some(mime) = &attachment.mime {
            part = part.mime_str(mime).map_err(|_| {
                CatalogError::validation(format!(
                    "Invalid content type `{mime}` for {}",
                    attachment.file_name
                ))
            })?;
        }
        form = form.part(attachment.field.clone(), part);
    }
    Ok(form)
}

/// One client per collection, sharing a single HTTP connection pool
#[derive(Clone)]
pub struct CatalogClients {
    pub artists: ResourceClient<Artist>,
    pub albums: ResourceClient<Album>,
    pub songs: ResourceClient<Song>,
}

impl CatalogClients {
    pub fn new(http: Client, api_base: &str) -> Self {
        Self {
            artists: ResourceClient::new(http.clone(), api_base),
            albums: ResourceClient::new(http.clone(), api_base),
            songs: ResourceClient::new(http, api_base),
        }
    }
}

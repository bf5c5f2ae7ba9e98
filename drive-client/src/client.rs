//! Drive operation façade
//!
//! [`DriveClient`] wraps the Drive API v3 surface the client needs: file
//! retrieval and search, creation, copy, update and delete, parent
//! relationship edits, permission lifecycle and custom property merges.
//! Every operation builds one request from its parameters and hands it to
//! the retry engine; listings additionally run through the pager. Streaming
//! downloads live in the `download` module.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde::de::DeserializeOwned;
use tracing::instrument;

use drive_transport::{HttpClient, HttpMethod, HttpRequest};

use crate::error::{self, DriveError, Result};
use crate::pager::{self, Page};
use crate::params::{AddPermissionParams, CopyParams, CreateFileParams, ListParams, UpdatePermissionParams};
use crate::retry::{
    classify_permission_guarded, classify_transient, execute_with_retry, ErrorClass, RetryConfig,
    RetryPolicy,
};
use crate::types::{
    About, DriveFile, FileCopyBody, FileCreateBody, FileList, Permission, PermissionCreateBody,
    PermissionList, PermissionUpdateBody, PropertiesBody,
};

/// Drive API base URL
pub(crate) const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Per-request timeout for metadata calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Append `key=value` to a URL, URL-encoding the value.
fn push_param(url: &mut String, key: &str, value: &str) {
    url.push(if url.contains('?') { '&' } else { '?' });
    url.push_str(key);
    url.push('=');
    url.push_str(&urlencoding::encode(value));
}

/// Resilient Drive API client
///
/// Holds the injected transport and authentication context; both are
/// read-only after construction, so one client can serve any number of
/// concurrent operations.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use drive_client::DriveClient;
/// use drive_transport_reqwest::ReqwestTransport;
///
/// let client = DriveClient::new(Arc::new(ReqwestTransport::new()), access_token);
/// let files = client.get_files(Default::default()).await?;
/// ```
pub struct DriveClient {
    pub(crate) http: Arc<dyn HttpClient>,
    pub(crate) access_token: String,
    pub(crate) retries: RetryConfig,
}

impl DriveClient {
    /// Create a client with the default retry configuration.
    ///
    /// `access_token` is an OAuth 2.0 token with Drive scope; token refresh
    /// is the caller's concern.
    pub fn new(http: Arc<dyn HttpClient>, access_token: String) -> Self {
        Self::with_retry_config(http, access_token, RetryConfig::default())
    }

    /// Create a client with custom retry policies.
    pub fn with_retry_config(
        http: Arc<dyn HttpClient>,
        access_token: String,
        retries: RetryConfig,
    ) -> Self {
        Self {
            http,
            access_token,
            retries,
        }
    }

    pub(crate) fn base_request(&self, method: HttpMethod, url: String) -> HttpRequest {
        HttpRequest::new(method, url)
            .bearer_token(self.access_token.as_str())
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT)
    }

    /// One network attempt: execute the request and decode a JSON body.
    async fn send_json<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T> {
        let response = self.http.execute(request).await?;
        if response.is_success() {
            serde_json::from_slice(&response.body).map_err(|e| DriveError::Parse(e.to_string()))
        } else {
            Err(error::api_error(response.status, &response.body))
        }
    }

    /// One network attempt for calls whose success body is empty.
    async fn send_empty(&self, request: HttpRequest) -> Result<()> {
        let response = self.http.execute(request).await?;
        if response.is_success() {
            Ok(())
        } else {
            Err(error::api_error(response.status, &response.body))
        }
    }

    /// Retry-wrapped JSON request with per-operation error classification.
    async fn execute_json<T: DeserializeOwned + Send>(
        &self,
        policy: &RetryPolicy,
        classify: fn(&DriveError) -> ErrorClass,
        request: HttpRequest,
    ) -> Result<T> {
        execute_with_retry(policy, classify, |_| {
            let request = request.clone();
            async move { self.send_json(request).await }.boxed()
        })
        .await
    }

    /// Fetch the authenticated identity (permission id of the current user).
    #[instrument(skip(self))]
    pub async fn about(&self) -> Result<About> {
        let mut url = format!("{}/about", DRIVE_API_BASE);
        push_param(&mut url, "fields", "user(permissionId)");

        let request = self.base_request(HttpMethod::Get, url);
        self.execute_json(&self.retries.standard, classify_transient, request)
            .await
    }

    /// Fetch metadata for one file.
    #[instrument(skip(self), fields(file_id = %file_id))]
    pub async fn get_file(&self, file_id: &str, fields: Option<&str>) -> Result<DriveFile> {
        let mut url = format!("{}/files/{}", DRIVE_API_BASE, file_id);
        if let Some(fields) = fields {
            push_param(&mut url, "fields", fields);
        }

        let request = self.base_request(HttpMethod::Get, url);
        self.execute_json(&self.retries.standard, classify_transient, request)
            .await
    }

    /// List files matching an optional query, aggregating every page.
    ///
    /// The result is all-or-nothing: a page that fails terminally aborts the
    /// listing and no partial sequence is returned.
    #[instrument(skip(self))]
    pub async fn get_files(&self, params: ListParams) -> Result<Vec<DriveFile>> {
        let ListParams { q, fields } = params;

        pager::fetch_all(move |page_token| {
            let mut url = format!("{}/files?pageSize={}", DRIVE_API_BASE, pager::PAGE_SIZE);
            if let Some(q) = &q {
                push_param(&mut url, "q", q);
            }
            if let Some(fields) = &fields {
                push_param(&mut url, "fields", fields);
            }
            if let Some(token) = &page_token {
                push_param(&mut url, "pageToken", token);
            }

            let request = self.base_request(HttpMethod::Get, url);
            async move {
                let list: FileList = self
                    .execute_json(&self.retries.standard, classify_transient, request)
                    .await?;
                Ok(Page {
                    items: list.files,
                    next_page_token: list.next_page_token,
                })
            }
            .boxed()
        })
        .await
    }

    /// ID of the root folder of the authenticated user's Drive.
    #[instrument(skip(self))]
    pub async fn get_root_folder_id(&self) -> Result<String> {
        let mut url = format!("{}/files/root", DRIVE_API_BASE);
        push_param(&mut url, "fields", "id");

        let request = self.base_request(HttpMethod::Get, url);
        let file: DriveFile = self
            .execute_json(&self.retries.standard, classify_transient, request)
            .await?;
        Ok(file.id)
    }

    /// Files owned by `owner` sitting directly under the root folder.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn get_root_files(
        &self,
        owner: &str,
        fields: Option<&str>,
    ) -> Result<Vec<DriveFile>> {
        let q = format!("'{}' in owners and 'root' in parents", owner);
        self.get_files(ListParams {
            q: Some(q),
            fields: fields.map(Into::into),
        })
        .await
    }

    /// Create a file or folder.
    #[instrument(skip(self))]
    pub async fn create_file(&self, params: CreateFileParams) -> Result<DriveFile> {
        let mut url = format!("{}/files", DRIVE_API_BASE);
        if let Some(fields) = &params.fields {
            push_param(&mut url, "fields", fields);
        }

        let body = FileCreateBody {
            name: params.name,
            mime_type: params.mime_type,
            parents: params.parents,
        };

        let request = self.base_request(HttpMethod::Post, url).json(&body)?;
        self.execute_json(&self.retries.standard, classify_transient, request)
            .await
    }

    /// Copy a file, optionally renaming it and placing the copy elsewhere.
    #[instrument(skip(self), fields(file_id = %file_id))]
    pub async fn copy(&self, file_id: &str, params: CopyParams) -> Result<DriveFile> {
        let mut url = format!("{}/files/{}/copy", DRIVE_API_BASE, file_id);
        if let Some(fields) = &params.fields {
            push_param(&mut url, "fields", fields);
        }

        let body = FileCopyBody {
            name: params.name,
            parents: params.parents,
        };

        let request = self.base_request(HttpMethod::Post, url).json(&body)?;
        self.execute_json(&self.retries.extended, classify_transient, request)
            .await
    }

    /// Merge `metadata` into a file's resource.
    ///
    /// A missing file is not an error: the call resolves with `None`,
    /// mirroring idempotent-delete semantics for update-on-missing. A 403
    /// carrying the insufficient-permissions message is surfaced without
    /// retrying.
    #[instrument(skip(self, metadata), fields(file_id = %file_id))]
    pub async fn update(
        &self,
        file_id: &str,
        metadata: serde_json::Value,
        fields: Option<&str>,
    ) -> Result<Option<DriveFile>> {
        let mut url = format!("{}/files/{}", DRIVE_API_BASE, file_id);
        if let Some(fields) = fields {
            push_param(&mut url, "fields", fields);
        }

        let request = self
            .base_request(HttpMethod::Patch, url)
            .json(&metadata)?;

        execute_with_retry(&self.retries.standard, classify_permission_guarded, |_| {
            let request = request.clone();
            async move {
                match self.send_json::<DriveFile>(request).await {
                    Ok(file) => Ok(Some(file)),
                    Err(err) if err.is_not_found() => Ok(None),
                    Err(err) => Err(err),
                }
            }
            .boxed()
        })
        .await
    }

    /// Delete a file. A file that is already gone counts as success.
    #[instrument(skip(self), fields(file_id = %file_id))]
    pub async fn delete_file(&self, file_id: &str) -> Result<()> {
        let url = format!("{}/files/{}", DRIVE_API_BASE, file_id);
        let request = self.base_request(HttpMethod::Delete, url);

        execute_with_retry(&self.retries.standard, classify_permission_guarded, |_| {
            let request = request.clone();
            async move {
                match self.send_empty(request).await {
                    Err(err) if err.is_not_found() => Ok(()),
                    other => other,
                }
            }
            .boxed()
        })
        .await
    }

    /// Add the file to `new_parents`, optionally leaving `remove_parents`
    /// in the same call.
    #[instrument(skip(self), fields(file_id = %file_id))]
    pub async fn add_parents(
        &self,
        file_id: &str,
        new_parents: &[String],
        remove_parents: Option<&[String]>,
        fields: Option<&str>,
    ) -> Result<DriveFile> {
        if new_parents.is_empty() {
            return Err(DriveError::InvalidRequest(
                "no parents to add".to_string(),
            ));
        }

        let mut url = format!("{}/files/{}", DRIVE_API_BASE, file_id);
        push_param(&mut url, "addParents", &new_parents.join(","));
        if let Some(remove) = remove_parents.filter(|p| !p.is_empty()) {
            push_param(&mut url, "removeParents", &remove.join(","));
        }
        if let Some(fields) = fields {
            push_param(&mut url, "fields", fields);
        }

        let request = self.base_request(HttpMethod::Patch, url);
        self.execute_json(&self.retries.standard, classify_transient, request)
            .await
    }

    /// Remove the file from `parents`.
    #[instrument(skip(self), fields(file_id = %file_id))]
    pub async fn delete_parents(
        &self,
        file_id: &str,
        parents: &[String],
        fields: Option<&str>,
    ) -> Result<DriveFile> {
        if parents.is_empty() {
            return Err(DriveError::InvalidRequest(
                "no parents to remove".to_string(),
            ));
        }

        let mut url = format!("{}/files/{}", DRIVE_API_BASE, file_id);
        push_param(&mut url, "removeParents", &parents.join(","));
        if let Some(fields) = fields {
            push_param(&mut url, "fields", fields);
        }

        let request = self.base_request(HttpMethod::Patch, url);
        self.execute_json(&self.retries.standard, classify_transient, request)
            .await
    }

    /// List a file's permissions, aggregating every page.
    #[instrument(skip(self), fields(file_id = %file_id))]
    pub async fn get_permissions(
        &self,
        file_id: &str,
        fields: Option<&str>,
    ) -> Result<Vec<Permission>> {
        pager::fetch_all(move |page_token| {
            let mut url = format!("{}/files/{}/permissions", DRIVE_API_BASE, file_id);
            if let Some(fields) = fields {
                push_param(&mut url, "fields", fields);
            }
            if let Some(token) = &page_token {
                push_param(&mut url, "pageToken", token);
            }

            let request = self.base_request(HttpMethod::Get, url);
            async move {
                let list: PermissionList = self
                    .execute_json(&self.retries.extended, classify_permission_guarded, request)
                    .await?;
                Ok(Page {
                    items: list.permissions,
                    next_page_token: list.next_page_token,
                })
            }
            .boxed()
        })
        .await
    }

    /// Grant a permission on a file.
    ///
    /// `role` and `permission_type` are required and validated before any
    /// network attempt.
    #[instrument(skip(self), fields(file_id = %file_id))]
    pub async fn add_permission(
        &self,
        file_id: &str,
        params: AddPermissionParams,
    ) -> Result<Permission> {
        let role = params
            .role
            .ok_or_else(|| DriveError::InvalidRequest("missing a role for the new permission".to_string()))?;
        let permission_type = params
            .permission_type
            .ok_or_else(|| DriveError::InvalidRequest("missing a permission type".to_string()))?;

        let mut url = format!("{}/files/{}/permissions", DRIVE_API_BASE, file_id);
        if params.transfer_ownership == Some(true) {
            push_param(&mut url, "transferOwnership", "true");
        }
        if let Some(fields) = &params.fields {
            push_param(&mut url, "fields", fields);
        }

        let body = PermissionCreateBody {
            role,
            permission_type,
            email_address: params.email_address,
        };

        let request = self.base_request(HttpMethod::Post, url).json(&body)?;
        self.execute_json(&self.retries.standard, classify_permission_guarded, request)
            .await
    }

    /// Change an existing permission's role.
    ///
    /// Fails before any network attempt when `permission_id` is absent.
    #[instrument(skip(self), fields(file_id = %file_id))]
    pub async fn update_permission(
        &self,
        file_id: &str,
        params: UpdatePermissionParams,
    ) -> Result<Permission> {
        let permission_id = params
            .permission_id
            .ok_or(DriveError::MissingPermissionId)?;

        let mut url = format!(
            "{}/files/{}/permissions/{}",
            DRIVE_API_BASE, file_id, permission_id
        );
        if params.transfer_ownership == Some(true) {
            push_param(&mut url, "transferOwnership", "true");
        }
        if let Some(fields) = &params.fields {
            push_param(&mut url, "fields", fields);
        }

        let body = PermissionUpdateBody { role: params.role };

        let request = self.base_request(HttpMethod::Patch, url).json(&body)?;
        self.execute_json(&self.retries.extended, classify_permission_guarded, request)
            .await
    }

    /// Revoke a permission.
    ///
    /// Fails before any network attempt when `permission_id` is absent; a
    /// permission that is already gone counts as success.
    #[instrument(skip(self), fields(file_id = %file_id))]
    pub async fn delete_permission(
        &self,
        file_id: &str,
        permission_id: Option<&str>,
    ) -> Result<()> {
        let permission_id = permission_id.ok_or(DriveError::MissingPermissionId)?;

        let url = format!(
            "{}/files/{}/permissions/{}",
            DRIVE_API_BASE, file_id, permission_id
        );
        let request = self.base_request(HttpMethod::Delete, url);

        execute_with_retry(&self.retries.standard, classify_permission_guarded, |_| {
            let request = request.clone();
            async move {
                match self.send_empty(request).await {
                    Err(err) if err.is_not_found() => Ok(()),
                    other => other,
                }
            }
            .boxed()
        })
        .await
    }

    /// Merge custom properties into a file, requesting back only the id,
    /// parent list and properties.
    #[instrument(skip(self, properties), fields(file_id = %file_id))]
    pub async fn set_properties(
        &self,
        file_id: &str,
        properties: HashMap<String, String>,
    ) -> Result<DriveFile> {
        let url = format!(
            "{}/files/{}?fields=id,parents,properties",
            DRIVE_API_BASE, file_id
        );

        let body = PropertiesBody { properties };

        let request = self.base_request(HttpMethod::Patch, url).json(&body)?;
        self.execute_json(&self.retries.extended, classify_transient, request)
            .await
    }
}

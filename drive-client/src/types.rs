//! Drive API v3 resource types
//!
//! Deserialization targets for API responses and serialization bodies for
//! mutations. Metadata is passed through as the API returns it; fields that
//! a caller's field mask can omit are optional or defaulted.
//!
//! See: https://developers.google.com/drive/api/v3/reference

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Drive file resource
///
/// See: https://developers.google.com/drive/api/v3/reference/files#resource
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    /// File ID
    #[serde(default)]
    pub id: String,

    /// File name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// MIME type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// File size in bytes, as a decimal string (omitted for folders)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    /// Creation time (RFC 3339)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,

    /// Modification time (RFC 3339)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,

    /// MD5 checksum (binary content only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5_checksum: Option<String>,

    /// Parent folder IDs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,

    /// Whether the file is trashed
    #[serde(default)]
    pub trashed: bool,

    /// Custom key-value properties
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<HashMap<String, String>>,
}

/// files.list response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,

    pub next_page_token: Option<String>,
}

/// Permission resource
///
/// See: https://developers.google.com/drive/api/v3/reference/permissions#resource
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    #[serde(default)]
    pub id: String,

    /// Granted role (owner, organizer, writer, commenter, reader)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Grantee type (user, group, domain, anyone)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub permission_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// permissions.list response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionList {
    #[serde(default)]
    pub permissions: Vec<Permission>,

    pub next_page_token: Option<String>,
}

/// about.get response, narrowed to the identity fields the client requests
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct About {
    pub user: Option<AboutUser>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutUser {
    pub permission_id: Option<String>,

    pub email_address: Option<String>,

    pub display_name: Option<String>,
}

/// files.create request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FileCreateBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<String>>,
}

/// files.copy request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FileCopyBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<String>>,
}

/// permissions.create request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PermissionCreateBody {
    pub role: String,

    #[serde(rename = "type")]
    pub permission_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
}

/// permissions.update request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PermissionUpdateBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// files.update body carrying only a properties merge
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PropertiesBody {
    pub properties: HashMap<String, String>,
}

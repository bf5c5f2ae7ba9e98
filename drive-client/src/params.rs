//! Caller-facing parameter objects
//!
//! Optional parameters are bundled per operation; required identifiers are
//! plain arguments on the [`DriveClient`](crate::client::DriveClient)
//! methods. `fields` is a Drive field mask passed through verbatim.

/// Parameters for [`get_files`](crate::client::DriveClient::get_files).
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    /// Server-side query expression, e.g. `"'folder1' in parents"`
    pub q: Option<String>,
    pub fields: Option<String>,
}

/// Parameters for [`create_file`](crate::client::DriveClient::create_file).
#[derive(Debug, Clone, Default)]
pub struct CreateFileParams {
    pub name: Option<String>,
    pub mime_type: Option<String>,
    pub parents: Option<Vec<String>>,
    pub fields: Option<String>,
}

/// Parameters for [`copy`](crate::client::DriveClient::copy).
#[derive(Debug, Clone, Default)]
pub struct CopyParams {
    /// Name for the copy; the source name is kept when absent
    pub name: Option<String>,
    pub parents: Option<Vec<String>>,
    pub fields: Option<String>,
}

/// Parameters for [`add_permission`](crate::client::DriveClient::add_permission).
#[derive(Debug, Clone, Default)]
pub struct AddPermissionParams {
    /// Role to grant (required)
    pub role: Option<String>,
    /// Grantee type: user, group, domain or anyone (required)
    pub permission_type: Option<String>,
    /// Grantee address; required for user and group grants
    pub email_address: Option<String>,
    pub transfer_ownership: Option<bool>,
    pub fields: Option<String>,
}

/// Parameters for [`update_permission`](crate::client::DriveClient::update_permission).
#[derive(Debug, Clone, Default)]
pub struct UpdatePermissionParams {
    /// Permission to update; the call fails before any network attempt
    /// when absent
    pub permission_id: Option<String>,
    pub role: Option<String>,
    pub transfer_ownership: Option<bool>,
    pub fields: Option<String>,
}

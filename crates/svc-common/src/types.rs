//! Wire data model shared by the registry and its clients.
//!
//! JSON field names follow the registry's established wire format
//! (`ServiceName`, `ServiceURL`, `Added`, ...), so the Rust field names are
//! mapped with `serde(rename)` rather than used verbatim.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Name of a class of service, e.g. `"LogService"`.
///
/// Not unique per instance: several registrations may share a name.
///
/// # Example
/// ```
/// use svc_common::ServiceName;
///
/// let name = ServiceName::from("LogService");
/// assert_eq!(name.as_str(), "LogService");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceName(String);

impl ServiceName {
    /// Creates a new ServiceName from a string.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ServiceName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ServiceName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A service's declared presence, identity, dependencies and update callback.
///
/// # Rust Learning Note
///
/// ## Values, not references
///
/// `Registration` is `Clone` and is handed around by value. The registry
/// stores its own copy and every notification works on snapshots, so no
/// mutable state is ever shared with a request handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    #[serde(rename = "ServiceName")]
    pub service_name: ServiceName,

    /// Unique key of the registration.
    #[serde(rename = "ServiceURL")]
    pub service_url: String,

    /// Names this service wants availability updates about.
    #[serde(
        rename = "RequiredServices",
        default,
        deserialize_with = "nullable_vec"
    )]
    pub required_services: Vec<ServiceName>,

    /// Endpoint the registry POSTs patches to.
    #[serde(rename = "ServiceUpdateURL")]
    pub service_update_url: String,
}

impl Registration {
    pub fn new(
        service_name: impl Into<ServiceName>,
        service_url: impl Into<String>,
        required_services: Vec<ServiceName>,
        service_update_url: impl Into<String>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            service_url: service_url.into(),
            required_services,
            service_update_url: service_update_url.into(),
        }
    }

    /// Decodes a registration from its JSON wire form.
    pub fn from_json(bytes: &[u8]) -> crate::Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| crate::Error::Decode(format!("Invalid registration: {}", e)))
    }

    /// Returns true if this service declared `name` as a dependency.
    pub fn requires(&self, name: &ServiceName) -> bool {
        self.required_services.contains(name)
    }

    /// The availability fact describing this registration.
    pub fn entry(&self) -> PatchEntry {
        PatchEntry {
            name: self.service_name.clone(),
            url: self.service_url.clone(),
        }
    }

    /// Checks that every identifying field is populated.
    pub fn validate(&self) -> crate::Result<()> {
        if self.service_name.as_str().is_empty() {
            return Err(crate::Error::validation("ServiceName cannot be empty"));
        }
        if self.service_url.is_empty() {
            return Err(crate::Error::validation("ServiceURL cannot be empty"));
        }
        if self.service_update_url.is_empty() {
            return Err(crate::Error::validation(format!(
                "ServiceUpdateURL cannot be empty (service {})",
                self.service_url
            )));
        }
        Ok(())
    }
}

/// One fact about one service's availability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchEntry {
    #[serde(rename = "Name")]
    pub name: ServiceName,

    #[serde(rename = "URL")]
    pub url: String,
}

impl PatchEntry {
    pub fn new(name: impl Into<ServiceName>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A delta of added and removed services.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    #[serde(rename = "Added", default, deserialize_with = "nullable_vec")]
    pub added: Vec<PatchEntry>,

    #[serde(rename = "Removed", default, deserialize_with = "nullable_vec")]
    pub removed: Vec<PatchEntry>,
}

impl Patch {
    /// A patch announcing new providers.
    pub fn added(entries: Vec<PatchEntry>) -> Self {
        Self {
            added: entries,
            removed: Vec::new(),
        }
    }

    /// A patch announcing providers that went away.
    pub fn removed(entries: Vec<PatchEntry>) -> Self {
        Self {
            added: Vec::new(),
            removed: entries,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Decodes a patch from its JSON wire form.
    pub fn from_json(bytes: &[u8]) -> crate::Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| crate::Error::Decode(format!("Invalid patch: {}", e)))
    }

    /// Returns the part of this patch a consumer depending on `required`
    /// cares about. Entry order is preserved.
    pub fn filter_for(&self, required: &[ServiceName]) -> Patch {
        let relevant = |entry: &&PatchEntry| required.contains(&entry.name);

        Patch {
            added: self.added.iter().filter(relevant).cloned().collect(),
            removed: self.removed.iter().filter(relevant).cloned().collect(),
        }
    }
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// Peers may send `null` for an empty list.
fn nullable_vec<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

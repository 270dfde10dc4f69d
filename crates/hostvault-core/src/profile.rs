// SPDX-FileCopyrightText: 2026 Hostvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection profile model.
//!
//! A [`ConnectionProfile`] owns its identity (`id`, `created_at`) and refreshes
//! `updated_at` on every edit. The editable part lives in [`ProfileFields`].
//! On the wire a profile is a flat JSON object (see [`ProfileRecord`]) whose
//! unknown keys are ignored and whose missing keys take their defaults.

use std::fmt;

use chrono::{Local, NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::HostvaultError;

/// Default SSH port for new profiles.
pub const DEFAULT_PORT: u16 = 22;

/// Wire format for timestamps: sortable ISO-8601 local time. Microseconds
/// are written as six digits, and left off entirely when zero.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const TIMESTAMP_FORMAT_MICROS: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Current local time truncated to the precision that survives serialization.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(6)
}

/// Opaque unique profile identifier (a v4 UUID string for new profiles).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(String);

impl ProfileId {
    /// Mint a fresh identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ProfileId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// How the launched session authenticates.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AuthType {
    #[default]
    Password,
    PublicKey,
}

impl AuthType {
    /// Short label for list views.
    pub fn label(self) -> &'static str {
        match self {
            AuthType::Password => "PW",
            AuthType::PublicKey => "key",
        }
    }
}

/// The caller-editable fields of a profile.
#[derive(Clone, PartialEq, Eq)]
pub struct ProfileFields {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub auth_type: AuthType,
    pub username: String,
    /// Plaintext login password, used when `auth_type` is `Password`.
    pub password: String,
    /// Key file path, used when `auth_type` is `PublicKey`.
    pub key_path: String,
    /// Prompt to wait for after login.
    pub prompt: String,
    /// Command sent once the prompt appears.
    pub post_login_command: String,
}

impl Default for ProfileFields {
    fn default() -> Self {
        Self {
            name: String::new(),
            host: String::new(),
            port: DEFAULT_PORT,
            auth_type: AuthType::default(),
            username: String::new(),
            password: String::new(),
            key_path: String::new(),
            prompt: String::new(),
            post_login_command: String::new(),
        }
    }
}

impl fmt::Debug for ProfileFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileFields")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("auth_type", &self.auth_type)
            .field("username", &self.username)
            .field("password", &redacted(&self.password))
            .field("key_path", &self.key_path)
            .field("prompt", &self.prompt)
            .field("post_login_command", &self.post_login_command)
            .finish()
    }
}

fn redacted(value: &str) -> &'static str {
    if value.is_empty() { "" } else { "[REDACTED]" }
}

impl ProfileFields {
    /// Check the rules a host application enforces before handing profiles
    /// to the vault. The vault itself never calls this.
    pub fn validate(&self) -> Result<(), HostvaultError> {
        if self.name.trim().is_empty() {
            return Err(HostvaultError::Validation("name must not be empty".to_string()));
        }
        if self.host.trim().is_empty() {
            return Err(HostvaultError::Validation("host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(HostvaultError::Validation(
                "port must be between 1 and 65535".to_string(),
            ));
        }
        if self.auth_type == AuthType::PublicKey && self.key_path.trim().is_empty() {
            return Err(HostvaultError::Validation(
                "publickey authentication requires a key file path".to_string(),
            ));
        }
        Ok(())
    }
}

/// A saved connection target.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ProfileRecord", into = "ProfileRecord")]
pub struct ConnectionProfile {
    id: ProfileId,
    fields: ProfileFields,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl ConnectionProfile {
    /// Create a profile with a fresh id and `created_at == updated_at == now`.
    pub fn new(fields: ProfileFields) -> Self {
        let now = now();
        Self {
            id: ProfileId::generate(),
            fields,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &ProfileId {
        &self.id
    }

    pub fn fields(&self) -> &ProfileFields {
        &self.fields
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn updated_at(&self) -> NaiveDateTime {
        self.updated_at
    }

    /// Replace every editable field. Keeps `id` and `created_at`.
    pub fn edit(&mut self, fields: ProfileFields) {
        self.fields = fields;
        self.updated_at = now();
    }

    /// Mutate editable fields in place. Keeps `id` and `created_at`.
    pub fn update(&mut self, f: impl FnOnce(&mut ProfileFields)) {
        f(&mut self.fields);
        self.updated_at = now();
    }

    /// Copy every editable field into a new profile with a fresh id and
    /// both timestamps set to now.
    pub fn duplicate(&self) -> Self {
        Self::new(self.fields.clone())
    }

    pub fn validate(&self) -> Result<(), HostvaultError> {
        self.fields.validate()
    }

    /// `host:port`, as shown in list views.
    pub fn display_host(&self) -> String {
        format!("{}:{}", self.fields.host, self.fields.port)
    }
}

impl fmt::Debug for ConnectionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionProfile")
            .field("id", &self.id)
            .field("fields", &self.fields)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Column to order a profile list by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SortKey {
    Name,
    Host,
    Port,
    Auth,
    User,
}

/// Stable sort of `profiles` by one column.
pub fn sort_profiles(profiles: &mut [ConnectionProfile], key: SortKey, reverse: bool) {
    profiles.sort_by(|a, b| {
        let (a, b) = (&a.fields, &b.fields);
        let ord = match key {
            SortKey::Name => a.name.cmp(&b.name),
            SortKey::Host => a.host.cmp(&b.host),
            SortKey::Port => a.port.cmp(&b.port),
            SortKey::Auth => a.auth_type.cmp(&b.auth_type),
            SortKey::User => a.username.cmp(&b.username),
        };
        if reverse { ord.reverse() } else { ord }
    });
}

/// Flat on-disk shape of a profile.
///
/// Field names and order are fixed for compatibility with existing stores.
/// Missing keys fall back to [`Default`], which mints a fresh id and
/// timestamps; unknown keys are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileRecord {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub auth_type: AuthType,
    pub username: String,
    pub password: String,
    pub key_path: String,
    pub prompt: String,
    pub sendln_param: String,
    pub id: ProfileId,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(with = "timestamp")]
    pub updated_at: NaiveDateTime,
}

impl Default for ProfileRecord {
    fn default() -> Self {
        ConnectionProfile::new(ProfileFields::default()).into()
    }
}

impl From<ProfileRecord> for ConnectionProfile {
    fn from(r: ProfileRecord) -> Self {
        Self {
            id: r.id,
            fields: ProfileFields {
                name: r.name,
                host: r.host,
                port: r.port,
                auth_type: r.auth_type,
                username: r.username,
                password: r.password,
                key_path: r.key_path,
                prompt: r.prompt,
                post_login_command: r.sendln_param,
            },
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

impl From<ConnectionProfile> for ProfileRecord {
    fn from(p: ConnectionProfile) -> Self {
        let f = p.fields;
        Self {
            name: f.name,
            host: f.host,
            port: f.port,
            auth_type: f.auth_type,
            username: f.username,
            password: f.password,
            key_path: f.key_path,
            prompt: f.prompt,
            sendln_param: f.post_login_command,
            id: p.id,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

mod timestamp {
    use chrono::{NaiveDateTime, Timelike};
    use serde::{Deserialize, Deserializer, Serializer, de};

    use super::{TIMESTAMP_FORMAT, TIMESTAMP_FORMAT_MICROS};

    pub fn serialize<S: Serializer>(t: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        let format = if t.nanosecond() / 1_000 == 0 {
            TIMESTAMP_FORMAT
        } else {
            TIMESTAMP_FORMAT_MICROS
        };
        s.collect_str(&t.format(format))
    }

    // Accepts any fractional precision, or none.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(d)?;
        s.parse::<NaiveDateTime>().map_err(de::Error::custom)
    }
}

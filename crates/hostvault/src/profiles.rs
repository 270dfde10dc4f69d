// SPDX-FileCopyrightText: 2026 Hostvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Profile commands over an unlocked vault.

use std::io::{self, Write};

use clap::Args;
use hostvault_core::{
    AuthType, ConnectionProfile, HostvaultError, ProfileFields, ProfileId, SortKey, sort_profiles,
};
use hostvault_vault::{CredentialVault, VaultKey};
use tracing::info;

/// Editable profile fields as command-line options. Unset options leave
/// the field as it is.
#[derive(Args, Debug, Default, Clone)]
pub struct ProfileArgs {
    /// Display name.
    #[arg(long)]
    pub name: Option<String>,
    /// Host name or address.
    #[arg(long)]
    pub host: Option<String>,
    #[arg(long)]
    pub port: Option<u16>,
    /// `password` or `publickey`.
    #[arg(long = "auth")]
    pub auth_type: Option<AuthType>,
    #[arg(long = "user")]
    pub username: Option<String>,
    /// Path to the private key file for publickey auth.
    #[arg(long)]
    pub key_path: Option<String>,
    /// Prompt to wait for after login.
    #[arg(long)]
    pub prompt: Option<String>,
    /// Command to send once the prompt appears.
    #[arg(long = "command")]
    pub post_login_command: Option<String>,
}

impl ProfileArgs {
    pub fn apply(&self, fields: &mut ProfileFields) {
        let ProfileArgs {
            name,
            host,
            port,
            auth_type,
            username,
            key_path,
            prompt,
            post_login_command,
        } = self.clone();
        if let Some(v) = name {
            fields.name = v;
        }
        if let Some(v) = host {
            fields.host = v;
        }
        if let Some(v) = port {
            fields.port = v;
        }
        if let Some(v) = auth_type {
            fields.auth_type = v;
        }
        if let Some(v) = username {
            fields.username = v;
        }
        if let Some(v) = key_path {
            fields.key_path = v;
        }
        if let Some(v) = prompt {
            fields.prompt = v;
        }
        if let Some(v) = post_login_command {
            fields.post_login_command = v;
        }
    }
}

/// An unlocked vault and its profile list.
pub struct Session {
    vault: CredentialVault,
    key: VaultKey,
    profiles: Vec<ConnectionProfile>,
    writable: bool,
}

impl Session {
    /// Load the profiles of a vault unlocked with `key` for viewing.
    ///
    /// An unreadable store shows as empty. The session cannot save.
    pub fn read_only(vault: CredentialVault, key: VaultKey) -> Result<Self, HostvaultError> {
        let profiles = vault.load(&key)?;
        Ok(Self {
            vault,
            key,
            profiles,
            writable: false,
        })
    }

    /// Load the profiles of a vault unlocked with `key` for changing.
    ///
    /// An unreadable store is an error here, so a later save can never
    /// replace profiles that were not loaded.
    pub fn for_update(vault: CredentialVault, key: VaultKey) -> Result<Self, HostvaultError> {
        let profiles = vault.try_load(&key)?;
        Ok(Self {
            vault,
            key,
            profiles,
            writable: true,
        })
    }

    pub fn profiles(&self) -> &[ConnectionProfile] {
        &self.profiles
    }

    fn save(&self) -> Result<(), HostvaultError> {
        if !self.writable {
            return Err(HostvaultError::Internal(
                "profile session was opened read-only".to_string(),
            ));
        }
        self.vault.save(&self.profiles, &self.key)
    }

    /// Position of the profile matching `selector`: an exact id, a unique
    /// id prefix, or an exact name.
    pub fn find(&self, selector: &str) -> Result<usize, HostvaultError> {
        if selector.trim().is_empty() {
            return Err(HostvaultError::Validation(
                "profile selector must not be empty".to_string(),
            ));
        }

        if let Some(i) = self.profiles.iter().position(|p| p.id().as_str() == selector) {
            return Ok(i);
        }

        let by_prefix: Vec<usize> = self
            .profiles
            .iter()
            .enumerate()
            .filter(|(_, p)| p.id().as_str().starts_with(selector))
            .map(|(i, _)| i)
            .collect();
        let by_name: Vec<usize> = self
            .profiles
            .iter()
            .enumerate()
            .filter(|(_, p)| p.fields().name == selector)
            .map(|(i, _)| i)
            .collect();

        match (by_prefix.as_slice(), by_name.as_slice()) {
            ([i], _) | ([], [i]) => Ok(*i),
            ([], []) => Err(HostvaultError::Validation(format!(
                "no profile matches `{selector}`"
            ))),
            _ => Err(HostvaultError::Validation(format!(
                "`{selector}` matches more than one profile; use a longer id"
            ))),
        }
    }

    pub fn add(&mut self, fields: ProfileFields) -> Result<ProfileId, HostvaultError> {
        let profile = ConnectionProfile::new(fields);
        profile.validate()?;
        let id = profile.id().clone();
        self.profiles.push(profile);
        self.save()?;
        info!(%id, "profile added");
        Ok(id)
    }

    pub fn edit(
        &mut self,
        selector: &str,
        changes: &ProfileArgs,
        password: Option<String>,
    ) -> Result<ProfileId, HostvaultError> {
        let index = self.find(selector)?;
        let mut fields = self.profiles[index].fields().clone();
        changes.apply(&mut fields);
        if let Some(password) = password {
            fields.password = password;
        }
        fields.validate()?;

        let profile = &mut self.profiles[index];
        profile.edit(fields);
        let id = profile.id().clone();
        self.save()?;
        info!(%id, "profile updated");
        Ok(id)
    }

    pub fn duplicate(&mut self, selector: &str) -> Result<ProfileId, HostvaultError> {
        let index = self.find(selector)?;
        let copy = self.profiles[index].duplicate();
        let id = copy.id().clone();
        self.profiles.push(copy);
        self.save()?;
        info!(%id, "profile duplicated");
        Ok(id)
    }

    pub fn remove(&mut self, selector: &str) -> Result<ConnectionProfile, HostvaultError> {
        let index = self.find(selector)?;
        let removed = self.profiles.remove(index);
        self.save()?;
        info!(id = %removed.id(), "profile removed");
        Ok(removed)
    }
}

/// Print profiles as an aligned table.
pub fn render_list(
    out: &mut impl Write,
    profiles: &[ConnectionProfile],
    sort: SortKey,
    reverse: bool,
) -> io::Result<()> {
    if profiles.is_empty() {
        return writeln!(out, "No saved connections.");
    }

    let mut sorted = profiles.to_vec();
    sort_profiles(&mut sorted, sort, reverse);

    let name_width = sorted
        .iter()
        .map(|p| p.fields().name.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);
    let host_width = sorted
        .iter()
        .map(|p| p.display_host().chars().count())
        .max()
        .unwrap_or(0)
        .max(4);

    writeln!(
        out,
        "{:<8}  {:<name_width$}  {:<host_width$}  {:<4}  USER",
        "ID", "NAME", "HOST", "AUTH"
    )?;
    for profile in &sorted {
        let f = profile.fields();
        writeln!(
            out,
            "{:<8}  {:<name_width$}  {:<host_width$}  {:<4}  {}",
            short_id(profile.id()),
            f.name,
            profile.display_host(),
            f.auth_type.label(),
            f.username
        )?;
    }
    Ok(())
}

/// Print one profile. The password is masked unless `reveal` is set.
pub fn render_details(
    out: &mut impl Write,
    profile: &ConnectionProfile,
    reveal: bool,
) -> io::Result<()> {
    let f = profile.fields();
    let password = match (reveal, f.password.is_empty()) {
        (_, true) => "",
        (true, false) => f.password.as_str(),
        (false, false) => "********",
    };

    writeln!(out, "id:         {}", profile.id())?;
    writeln!(out, "name:       {}", f.name)?;
    writeln!(out, "host:       {}", profile.display_host())?;
    writeln!(out, "auth:       {}", f.auth_type)?;
    writeln!(out, "user:       {}", f.username)?;
    match f.auth_type {
        AuthType::Password => writeln!(out, "password:   {password}")?,
        AuthType::PublicKey => writeln!(out, "key path:   {}", f.key_path)?,
    }
    writeln!(out, "prompt:     {}", f.prompt)?;
    writeln!(out, "command:    {}", f.post_login_command)?;
    writeln!(out, "created:    {}", profile.created_at().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out, "updated:    {}", profile.updated_at().format("%Y-%m-%d %H:%M:%S"))?;
    Ok(())
}

fn short_id(id: &ProfileId) -> &str {
    let s = id.as_str();
    s.get(..8).unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use hostvault_config::VaultConfig;
    use hostvault_test_utils::{
        MemoryBlobStore, TEST_KDF_ITERATIONS, key_profile, password_profile, sample_profiles,
    };
    use secrecy::SecretString;

    use super::*;

    const STORE_FILE: &str = "connections.enc";

    fn vault_with(profiles: &[ConnectionProfile]) -> (Arc<MemoryBlobStore>, CredentialVault, VaultKey) {
        let store = Arc::new(MemoryBlobStore::new());
        let vault = CredentialVault::with_store(
            store.clone(),
            &VaultConfig::in_dir("unused"),
            TEST_KDF_ITERATIONS,
        );
        let key = vault.initialize(&SecretString::from("pw")).unwrap();
        vault.save(profiles, &key).unwrap();
        (store, vault, key)
    }

    fn session_with(profiles: &[ConnectionProfile]) -> Session {
        let (_, vault, key) = vault_with(profiles);
        Session::for_update(vault, key).unwrap()
    }

    /// A vault holding `count` profiles whose store then had one bit flipped.
    fn damaged_vault(count: usize) -> (Arc<MemoryBlobStore>, CredentialVault, VaultKey) {
        let (store, vault, key) = vault_with(&sample_profiles(count));
        let mut blob = store.get(STORE_FILE).unwrap();
        blob[40] ^= 0x01;
        store.insert(STORE_FILE, &blob);
        (store, vault, key)
    }

    fn reload(session: &Session) -> Vec<ConnectionProfile> {
        session.vault.load(&session.key).unwrap()
    }

    #[test]
    fn add_validates_and_persists() {
        let mut session = session_with(&[]);
        assert!(matches!(
            session.add(ProfileFields::default()),
            Err(HostvaultError::Validation(_))
        ));

        let id = session
            .add(ProfileFields {
                name: "web".to_string(),
                host: "web.example".to_string(),
                ..ProfileFields::default()
            })
            .unwrap();
        let stored = reload(&session);
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id(), &id);
    }

    #[test]
    fn find_by_id_prefix_or_name() {
        let a = password_profile("alpha");
        let b = key_profile("beta");
        let session = session_with(&[a.clone(), b.clone()]);

        assert_eq!(session.find(a.id().as_str()).unwrap(), 0);
        assert_eq!(session.find(&b.id().as_str()[..12]).unwrap(), 1);
        assert_eq!(session.find("beta").unwrap(), 1);
        assert!(session.find("gamma").is_err());
    }

    #[test]
    fn empty_selector_matches_nothing() {
        let mut session = session_with(&[password_profile("only")]);
        for selector in ["", "  "] {
            assert!(matches!(session.find(selector), Err(HostvaultError::Validation(_))));
            assert!(session.remove(selector).is_err());
        }
        assert_eq!(reload(&session).len(), 1);
    }

    #[test]
    fn unreadable_store_blocks_changes() {
        let (store, vault, key) = damaged_vault(5);
        let before = store.get(STORE_FILE).unwrap();

        let result = Session::for_update(vault.clone(), key.clone());
        assert!(matches!(result, Err(HostvaultError::Corrupted(_))));
        assert_eq!(store.get(STORE_FILE).unwrap(), before);

        let session = Session::read_only(vault, key).unwrap();
        assert!(session.profiles().is_empty());
    }

    #[test]
    fn read_only_session_never_writes() {
        let (store, vault, key) = damaged_vault(3);
        let before = store.get(STORE_FILE).unwrap();

        let mut session = Session::read_only(vault, key).unwrap();
        let result = session.add(ProfileFields {
            name: "new".to_string(),
            host: "new.example".to_string(),
            ..ProfileFields::default()
        });
        assert!(matches!(result, Err(HostvaultError::Internal(_))));
        assert_eq!(store.get(STORE_FILE).unwrap(), before);
    }

    #[test]
    fn ambiguous_name_is_rejected() {
        let a = password_profile("same");
        let b = password_profile("same");
        let session = session_with(&[a, b]);
        assert!(matches!(session.find("same"), Err(HostvaultError::Validation(_))));
    }

    #[test]
    fn edit_keeps_identity_and_applies_changes() {
        let original = password_profile("db");
        let mut session = session_with(std::slice::from_ref(&original));

        let changes = ProfileArgs {
            port: Some(2200),
            username: Some("root".to_string()),
            ..ProfileArgs::default()
        };
        session.edit("db", &changes, Some("new-secret".to_string())).unwrap();

        let stored = &reload(&session)[0];
        assert_eq!(stored.id(), original.id());
        assert_eq!(stored.created_at(), original.created_at());
        assert_eq!(stored.fields().port, 2200);
        assert_eq!(stored.fields().username, "root");
        assert_eq!(stored.fields().password, "new-secret");
        assert_eq!(stored.fields().host, original.fields().host);
    }

    #[test]
    fn edit_rejects_publickey_without_key_path() {
        let mut session = session_with(&[password_profile("db")]);
        let changes = ProfileArgs {
            auth_type: Some(AuthType::PublicKey),
            ..ProfileArgs::default()
        };
        assert!(session.edit("db", &changes, None).is_err());
        assert_eq!(reload(&session)[0].fields().auth_type, AuthType::Password);
    }

    #[test]
    fn duplicate_and_remove() {
        let original = key_profile("bastion");
        let mut session = session_with(std::slice::from_ref(&original));

        let copy_id = session.duplicate(original.id().as_str()).unwrap();
        let stored = reload(&session);
        assert_eq!(stored.len(), 2);
        assert_ne!(copy_id, *original.id());
        assert_eq!(stored[1].fields(), original.fields());

        let removed = session.remove(original.id().as_str()).unwrap();
        assert_eq!(removed.id(), original.id());
        let stored = reload(&session);
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id(), &copy_id);
    }

    #[test]
    fn list_is_sorted_and_aligned() {
        let profiles = [password_profile("zeta"), key_profile("alpha")];
        let mut out = Vec::new();
        render_list(&mut out, &profiles, SortKey::Name, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID"));
        assert!(lines[1].contains("alpha") && lines[1].contains("192.0.2.10:2222"));
        assert!(lines[1].contains("key"));
        assert!(lines[2].contains("zeta") && lines[2].contains("PW"));
    }

    #[test]
    fn empty_list_message() {
        let mut out = Vec::new();
        render_list(&mut out, &[], SortKey::Name, false).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No saved connections.\n");
    }

    #[test]
    fn details_mask_password_unless_revealed() {
        let profile = password_profile("db");
        let mut masked = Vec::new();
        render_details(&mut masked, &profile, false).unwrap();
        let masked = String::from_utf8(masked).unwrap();
        assert!(masked.contains("********"));
        assert!(!masked.contains("p@ss"));

        let mut shown = Vec::new();
        render_details(&mut shown, &profile, true).unwrap();
        assert!(String::from_utf8(shown).unwrap().contains("p@ss wörd"));
    }
}

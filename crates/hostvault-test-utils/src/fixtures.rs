// SPDX-FileCopyrightText: 2026 Hostvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection profile fixtures.

use hostvault_core::{AuthType, ConnectionProfile, ProfileFields};

/// A password-auth profile for `name`.
pub fn password_profile(name: &str) -> ConnectionProfile {
    ConnectionProfile::new(ProfileFields {
        name: name.to_string(),
        host: format!("{name}.example.internal"),
        username: "admin".to_string(),
        password: "p@ss wörd".to_string(),
        prompt: "$ ".to_string(),
        ..ProfileFields::default()
    })
}

/// A publickey-auth profile for `name`.
pub fn key_profile(name: &str) -> ConnectionProfile {
    ConnectionProfile::new(ProfileFields {
        name: name.to_string(),
        host: "192.0.2.10".to_string(),
        port: 2222,
        auth_type: AuthType::PublicKey,
        username: "deploy".to_string(),
        key_path: "/home/deploy/.ssh/id_ed25519".to_string(),
        post_login_command: "cd /srv && ls".to_string(),
        ..ProfileFields::default()
    })
}

/// `count` distinct profiles alternating between the two auth types.
pub fn sample_profiles(count: usize) -> Vec<ConnectionProfile> {
    (0..count)
        .map(|i| {
            let name = format!("server-{i:02}");
            if i % 2 == 0 {
                password_profile(&name)
            } else {
                key_profile(&name)
            }
        })
        .collect()
}

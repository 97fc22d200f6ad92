//! Stub sign-in. There are no credentials; a stored `true` under the auth key
//! is all it takes.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::common::storage::{LocalStore, Storable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthFlag(pub bool);

impl Storable for AuthFlag {
    const KEY: &'static str = "nucleo_auth";
}

pub fn login(store: &LocalStore) -> Result<()> {
    store.save(&AuthFlag(true))
}

pub fn logout(store: &LocalStore) -> Result<()> {
    store.remove::<AuthFlag>()
}

/// Unreadable or missing flags count as logged out.
pub fn is_logged_in(store: &LocalStore) -> bool {
    match store.load::<AuthFlag>() {
        Ok(flag) => flag.is_some_and(|f| f.0),
        Err(e) => {
            log::warn!("ignoring unreadable auth flag: {e:#}");
            false
        }
    }
}

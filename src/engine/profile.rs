use anyhow::Result;

use crate::common::storage::{LocalStore, Storable};
use crate::engine::model::BusinessProfile;

impl Storable for BusinessProfile {
    const KEY: &'static str = "nucleo_biz_profile";
}

/// The stored profile, or an empty one.
pub fn load(store: &LocalStore) -> Result<BusinessProfile> {
    Ok(store.load::<BusinessProfile>()?.unwrap_or_default())
}

pub fn save(store: &LocalStore, profile: &BusinessProfile) -> Result<()> {
    store.save(profile)
}

pub fn clear(store: &LocalStore) -> Result<()> {
    store.remove::<BusinessProfile>()
}

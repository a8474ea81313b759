use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::checklist::ChecklistDefinition;

/// A checklist definition as last fetched from the remote
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedChecklist {
    pub fetched_at: DateTime<Utc>,
    pub definition: ChecklistDefinition,
}

/// Get the platform-appropriate cache directory for fetched checklists
pub fn get_cache_path() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("checklist-engine/checklists"))
        .unwrap_or_else(|| crate::config::get_config_dir().join("cache"))
}

fn cache_key(checklist_id: &str) -> String {
    format!("checklist:{}", checklist_id)
}

/// Read a cached checklist; missing or unreadable entries are `None`
pub fn read_cached_checklist(cache_path: &Path, checklist_id: &str) -> Option<CachedChecklist> {
    let bytes = cacache::read_sync(cache_path, cache_key(checklist_id)).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Store a freshly fetched checklist
pub fn write_cached_checklist(cache_path: &Path, definition: &ChecklistDefinition) -> Result<()> {
    let entry = CachedChecklist {
        fetched_at: Utc::now(),
        definition: definition.clone(),
    };
    let json = serde_json::to_vec(&entry)?;
    cacache::write_sync(cache_path, cache_key(&definition.id), &json)?;
    Ok(())
}

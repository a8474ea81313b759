use super::types::{Draft, DRAFT_VERSION};
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Draft file for a checklist inside `drafts_dir` (`<drafts_dir>/<checklist-id>.json`)
pub fn draft_path(drafts_dir: &Path, checklist_id: &str) -> PathBuf {
    let file_name: String = checklist_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    drafts_dir.join(format!("{}.json", file_name))
}

/// Load a draft from a JSON file
///
/// If the file doesn't exist, returns a new empty draft for `checklist_id`.
/// A draft written for another checklist or with an unsupported version is an error.
pub fn load_draft(path: &Path, checklist_id: &str) -> Result<Draft> {
    if !path.exists() {
        return Ok(Draft::new(checklist_id));
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open draft at {}", path.display()))?;

    let draft: Draft = serde_json::from_reader(file).context("Failed to load draft")?;

    // Version check
    if draft.version != DRAFT_VERSION {
        anyhow::bail!("Unsupported draft version: {}", draft.version);
    }
    if draft.checklist_id != checklist_id {
        anyhow::bail!(
            "Draft at {} belongs to checklist '{}', not '{}'",
            path.display(),
            draft.checklist_id,
            checklist_id
        );
    }

    Ok(draft)
}

/// Save a draft atomically so an interrupted write never loses earlier answers.
pub fn save_draft(path: &Path, draft: &Draft) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create draft directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, draft).context("Failed to serialize draft")?;

    file.commit().context("Failed to save draft")?;

    Ok(())
}

/// Remove a draft after its checklist has been submitted
pub fn discard_draft(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove draft {}", path.display())),
    }
}

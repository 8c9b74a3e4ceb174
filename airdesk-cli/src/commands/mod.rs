pub mod agents;
pub mod appointments;
pub mod config;
pub mod contacts;

use anyhow::Result;
use dialoguer::Confirm;

/// Ask before destroying a record unless `--yes` was given.
pub fn confirm_delete(kind: &str, id: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    Ok(Confirm::new()
        .with_prompt(format!("Delete {kind} {id}?"))
        .default(false)
        .interact()?)
}

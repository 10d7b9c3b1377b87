//! User administration commands

use anyhow::Result;

use super::output::Output;
use crate::storage::{add_user_with, Workspace};

/// Adds a user, hashing the password at the workspace's `[auth] bcrypt_cost`
pub fn add(output: &Output, id: &str, password: &str) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let hasher = workspace.config().hasher()?;
    output.verbose_ctx("add-user", &format!("bcrypt cost {}", hasher.cost));

    let mut conn = workspace.connect()?;
    add_user_with(&mut conn, id, password, &hasher)?;

    output.success(&format!("Added user {}", id));
    Ok(())
}

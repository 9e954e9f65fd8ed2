//! Hooks that close the presentation editor before the edit and reopen the
//! slideshow afterwards. Any failure here is a warning only.

use crate::config::EditorConfig;
use tokio::process::Command;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct EditorHooks {
    close: Vec<String>,
    open: Vec<String>,
}

impl EditorHooks {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            close: config.close_command.clone(),
            open: config.open_command.clone(),
        }
    }

    /// Run the close command and wait for it.
    pub async fn close(&self) -> bool {
        let Some((program, args)) = self.close.split_first() else {
            return true;
        };
        debug!(program = %program, ?args, "closing editor");
        match Command::new(program).args(args).status().await {
            Ok(status) if status.success() => {
                info!("editor closed");
                true
            },
            Ok(status) => {
                warn!(program = %program, %status, "editor close command failed");
                false
            },
            Err(e) => {
                warn!(program = %program, error = %e, "cannot run editor close command");
                false
            },
        }
    }

    /// Start the open command without waiting for it to exit.
    ///
    /// Must be called from within the runtime. The child is detached: it
    /// outlives the run and the runtime reaps it if it exits first.
    pub fn open(&self) -> bool {
        let Some((program, args)) = self.open.split_first() else {
            return true;
        };
        debug!(program = %program, ?args, "reopening editor");
        match Command::new(program).args(args).kill_on_drop(false).spawn() {
            Ok(child) => {
                info!(pid = child.id(), "editor started");
                drop(child);
                true
            },
            Err(e) => {
                warn!(program = %program, error = %e, "cannot run editor open command");
                false
            },
        }
    }
}

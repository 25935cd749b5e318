// Group Membership Helper - access to the global npm prefix is granted via a group
use std::sync::Arc;

use tracing::{debug, error, warn};

use super::outcome::{run_checked, stderr_of};
use crate::domain::{contains_word, NpmCommandBuilder, NpmSettings};
use crate::error::{NpmError, Result};
use crate::port::CommandRunner;

pub struct GroupMembership {
    runner: Arc<dyn CommandRunner>,
    settings: Arc<NpmSettings>,
}

impl GroupMembership {
    pub fn new(runner: Arc<dyn CommandRunner>, settings: Arc<NpmSettings>) -> Self {
        Self { runner, settings }
    }

    pub fn group(&self) -> &str {
        &self.settings.group
    }

    /// True if `groups <user>` lists the configured group. Never fails.
    pub async fn user_in_group(&self, user: &str) -> bool {
        let spec = NpmCommandBuilder::new(&self.settings).groups(user);

        let stdout = match self.runner.run(&spec).await {
            Ok(output) => output.stdout_lossy().into_owned(),
            Err(e) => {
                warn!(command = %spec, error = %e, "Group listing failed");
                return false;
            }
        };

        let member = contains_word(&stdout, &self.settings.group);
        debug!(
            user = %user,
            group = %self.settings.group,
            member = %member,
            "Group check completed"
        );
        member
    }

    /// Add `user` to the configured group (privileged)
    ///
    /// # Errors
    /// - NpmError::GroupAdd on nonzero exit or spawn failure
    pub async fn add_user_to_group(&self, user: &str) -> Result<()> {
        let spec = NpmCommandBuilder::new(&self.settings).group_add(user);

        if let Err((cause, output)) = run_checked(self.runner.as_ref(), &spec).await {
            error!(
                command = %spec,
                cause = %cause,
                "NPM group add for {} failed; log output follows:\n{}",
                user,
                stderr_of(&output)
            );
            return Err(NpmError::GroupAdd {
                user: user.to_string(),
                cause,
            });
        }

        Ok(())
    }
}

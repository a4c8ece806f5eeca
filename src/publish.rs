use crate::config::Config;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::process::Output;
use thiserror::Error;
use tokio::process::Command;
use tracing::{info, warn};

/// Result of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PublishOutcome {
    Published { commit_message: String },
    NothingToPublish,
}

impl PublishOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            PublishOutcome::Published { .. } => "Changes committed and pushed successfully",
            PublishOutcome::NothingToPublish => "No changes to deploy",
        }
    }
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to run git {step}: {source}")]
    Spawn {
        step: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("git {step} failed: {stderr}")]
    CommandFailed { step: &'static str, stderr: String },
}

/// Commits and pushes whatever the content store has persisted.
#[async_trait]
pub trait PublishTrigger: Send + Sync {
    async fn publish(&self) -> Result<PublishOutcome, PublishError>;
}

/// Publishes by shelling out to `git` in a working tree.
#[derive(Debug, Clone)]
pub struct GitPublisher {
    repo_dir: PathBuf,
    remote: String,
    branch: String,
}

impl GitPublisher {
    pub fn new(repo_dir: impl Into<PathBuf>, remote: &str, branch: &str) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            remote: remote.to_string(),
            branch: branch.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.publish_repo_dir,
            &config.publish_remote,
            &config.publish_branch,
        )
    }

    /// Run git and hand back its output without judging the exit status.
    async fn git(&self, step: &'static str, args: &[&str]) -> Result<Output, PublishError> {
        Command::new("git")
            .args(args)
            .current_dir(&self.repo_dir)
            .output()
            .await
            .map_err(|source| PublishError::Spawn { step, source })
    }

    /// Run git and fail on a non-zero exit.
    async fn run(&self, step: &'static str, args: &[&str]) -> Result<(), PublishError> {
        let output = self.git(step, args).await?;
        if !output.status.success() {
            return Err(command_failed(step, &output));
        }
        Ok(())
    }
}

#[async_trait]
impl PublishTrigger for GitPublisher {
    async fn publish(&self) -> Result<PublishOutcome, PublishError> {
        self.run("add", &["add", "--all"]).await?;

        // Exit code 0 means the index matches HEAD.
        let staged = self
            .git("diff", &["diff", "--cached", "--quiet"])
            .await?;
        match staged.status.code() {
            Some(0) => {
                info!("Publish requested with nothing staged");
                return Ok(PublishOutcome::NothingToPublish);
            }
            Some(1) => {}
            _ => return Err(command_failed("diff", &staged)),
        }

        let commit_message = format!(
            "Update content via admin panel - {}",
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
        );
        let commit = self
            .git("commit", &["commit", "-m", &commit_message])
            .await?;
        if !commit.status.success() {
            let stdout = String::from_utf8_lossy(&commit.stdout);
            if stdout.contains("nothing to commit") {
                info!("git commit reported nothing to commit");
                return Ok(PublishOutcome::NothingToPublish);
            }
            return Err(command_failed("commit", &commit));
        }

        if let Err(e) = self
            .run("push", &["push", &self.remote, &self.branch])
            .await
        {
            warn!(
                "Committed locally but push to {}/{} failed",
                self.remote, self.branch
            );
            return Err(e);
        }

        info!(
            "Published content to {}/{}: {}",
            self.remote, self.branch, commit_message
        );
        Ok(PublishOutcome::Published { commit_message })
    }
}

fn command_failed(step: &'static str, output: &Output) -> PublishError {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let stderr = if stderr.is_empty() {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    } else {
        stderr
    };
    PublishError::CommandFailed { step, stderr }
}

// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use anyhow::{Context, bail};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Receives the ledger path after every successful write.
///
/// Publishing is a notification: callers log failures and carry on.
#[async_trait]
pub trait LedgerPublisher: Send + Sync {
    async fn publish(&self, ledger_path: &Path) -> anyhow::Result<()>;
}

/// Keeps the ledger local.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPublisher;

#[async_trait]
impl LedgerPublisher for NoopPublisher {
    async fn publish(&self, ledger_path: &Path) -> anyhow::Result<()> {
        tracing::debug!(target: "publish", path = %ledger_path.display(), "Publishing disabled");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct GitIdentity {
    pub name: String,
    pub email: String,
}

/// Stages, commits and pushes the ledger from the checkout containing it.
#[derive(Debug, Clone)]
pub struct GitPublisher {
    identity: GitIdentity,
    commit_message: String,
}

impl GitPublisher {
    pub fn new(identity: GitIdentity, commit_message: impl Into<String>) -> Self {
        Self {
            identity,
            commit_message: commit_message.into(),
        }
    }

    fn work_dir(ledger_path: &Path) -> PathBuf {
        ledger_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    async fn git(&self, work_dir: &Path, args: &[&str]) -> anyhow::Result<std::process::Output> {
        Command::new("git")
            .arg("-C")
            .arg(work_dir)
            .arg("-c")
            .arg(format!("user.name={}", self.identity.name))
            .arg("-c")
            .arg(format!("user.email={}", self.identity.email))
            .args(args)
            .output()
            .await
            .with_context(|| format!("spawning git {}", args.join(" ")))
    }

    async fn git_checked(&self, work_dir: &Path, args: &[&str]) -> anyhow::Result<()> {
        let output = self.git(work_dir, args).await?;
        if !output.status.success() {
            bail!(
                "git {} exited with {}: {}",
                args.join(" "),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerPublisher for GitPublisher {
    async fn publish(&self, ledger_path: &Path) -> anyhow::Result<()> {
        let work_dir = Self::work_dir(ledger_path);
        let file = ledger_path
            .file_name()
            .and_then(|n| n.to_str())
            .context("ledger path has no file name")?;

        self.git_checked(&work_dir, &["add", file]).await?;

        // Exit 0 means nothing staged.
        let diff = self
            .git(&work_dir, &["diff", "--cached", "--quiet", "--", file])
            .await?;
        if diff.status.success() {
            tracing::info!(target: "publish", file, "Ledger unchanged; nothing to commit");
            return Ok(());
        }

        self.git_checked(&work_dir, &["commit", "-m", &self.commit_message, "--", file])
            .await?;
        self.git_checked(&work_dir, &["push"]).await?;
        tracing::info!(target: "publish", file, "Ledger committed and pushed");
        Ok(())
    }
}

/// Run the publisher and swallow its failure after logging it.
pub async fn publish_best_effort(publisher: &dyn LedgerPublisher, ledger_path: &Path) {
    if let Err(e) = publisher.publish(ledger_path).await {
        tracing::warn!(
            target: "publish",
            path = %ledger_path.display(),
            error = %format!("{e:#}"),
            "Ledger publish failed; continuing"
        );
    }
}

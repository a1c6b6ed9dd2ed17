use chrono::{DateTime, FixedOffset};
use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{BranchType, Commit, Oid, Repository, Sort};
use log::{info, warn};
use std::collections::HashSet;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tokio::task::spawn_blocking;

use super::cache::{ReportCache, ReportPaths};
use super::scc::{CodeCounter, OutputFormat};
use crate::app::config::Config;
use crate::error::{Error, Result};
use crate::types::DateToken;

const CLONE_PREFIX: &str = "scc_temp_";

/// Counts gathered over one extraction run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    /// Commits reachable from the branch
    pub commits: usize,
    /// Commits checked out and counted during this run
    pub analysed: usize,
    /// Commits whose report already existed
    pub skipped: usize,
    /// Commits whose date token was already taken by a newer commit
    pub collisions: usize,
}

/// Walks a branch history and writes one scc report pair per commit.
///
/// The repository is cloned into a temporary directory that is removed when
/// the run ends, whether it succeeded or not. Commits are checked out in place
/// one after the other, newest first.
pub struct HistoryExtractor {
    repo_url: String,
    branch: String,
    cache: ReportCache,
    counter: Arc<dyn CodeCounter>,
}

impl HistoryExtractor {
    pub fn new(
        repo_url: impl Into<String>,
        branch: impl Into<String>,
        report_dir: impl Into<std::path::PathBuf>,
        counter: Arc<dyn CodeCounter>,
    ) -> Self {
        Self {
            repo_url: repo_url.into(),
            branch: branch.into(),
            cache: ReportCache::new(report_dir),
            counter,
        }
    }

    pub fn from_config(config: &Config, counter: Arc<dyn CodeCounter>) -> Self {
        Self::new(
            &config.repo_url,
            &config.branch,
            &config.report_dir,
            counter,
        )
    }

    /// Run the extraction, blocking until every commit is handled.
    pub fn run(&self) -> Result<ExtractionSummary> {
        self.cache.initialize()?;

        let workspace = tempfile::Builder::new().prefix(CLONE_PREFIX).tempdir()?;
        info!("Cloning {} into {}", self.repo_url, workspace.path().display());

        let outcome = self.extract_into(workspace.path());

        info!("Removing temporary clone {}", workspace.path().display());
        if let Err(e) = workspace.close() {
            warn!("Could not fully remove temporary clone: {}", e);
        }

        if let Ok(summary) = &outcome {
            info!(
                "Extraction finished: {} analysed, {} already present, reports in {}",
                summary.analysed,
                summary.skipped,
                self.cache.root().display()
            );
        }
        outcome
    }

    fn extract_into(&self, workdir: &Path) -> Result<ExtractionSummary> {
        let repo = clone_without_checkout(&self.repo_url, &self.branch, workdir)?;
        let commits = list_commits(&repo, &self.branch)?;

        let mut summary = ExtractionSummary {
            commits: commits.len(),
            ..Default::default()
        };
        let mut seen = HashSet::new();

        for oid in commits {
            let commit = repo.find_commit(oid)?;
            let token = DateToken::from_commit_date(&commit_date(&commit)?);

            if !seen.insert(token.clone()) {
                warn!(
                    "Commit {} has the same date token {} as a newer commit, skipping",
                    oid, token
                );
                summary.collisions += 1;
                continue;
            }

            if self.cache.contains(&token) {
                info!("Commit {} from {} already analysed, skipping", oid, token);
                summary.skipped += 1;
                continue;
            }

            info!("Analysing {} from {}", oid, token);
            checkout(&repo, &commit)?;

            let paths = self.cache.paths(&token);
            if let Err(e) = self.count(workdir, &paths) {
                paths.discard();
                return Err(e);
            }
            summary.analysed += 1;
        }

        Ok(summary)
    }

    fn count(&self, workdir: &Path, paths: &ReportPaths) -> Result<()> {
        self.counter.count(workdir, OutputFormat::Json, &paths.json)?;
        self.counter.count(workdir, OutputFormat::Text, &paths.summary)
    }
}

/// Run an extraction on the blocking thread pool.
pub async fn extract_history_async(extractor: HistoryExtractor) -> Result<ExtractionSummary> {
    spawn_blocking(move || extractor.run())
        .await
        .map_err(|e| Error::Io(io::Error::other(e)))?
}

/// Clone `branch` of `url` into `into` without populating the working tree.
fn clone_without_checkout(url: &str, branch: &str, into: &Path) -> Result<Repository> {
    let mut checkout = CheckoutBuilder::new();
    checkout.dry_run();

    let repo = RepoBuilder::new()
        .branch(branch)
        .with_checkout(checkout)
        .clone(url, into)?;
    Ok(repo)
}

/// All commits reachable from the local branch, most recent first.
fn list_commits(repo: &Repository, branch: &str) -> Result<Vec<Oid>> {
    let reference = repo.find_branch(branch, BranchType::Local)?.into_reference();
    let target = reference
        .target()
        .ok_or_else(|| git2::Error::from_str(&format!("branch {branch} has no target")))?;

    let mut revwalk = repo.revwalk()?;
    revwalk.set_sorting(Sort::TIME)?;
    revwalk.push(target)?;

    Ok(revwalk.collect::<std::result::Result<Vec<_>, _>>()?)
}

/// Committer date in git's `%ci` layout, e.g. `2024-01-08 10:00:00 +0100`.
fn commit_date(commit: &Commit) -> Result<String> {
    let when = commit.committer().when();
    let offset = FixedOffset::east_opt(when.offset_minutes() * 60)
        .ok_or_else(|| git2::Error::from_str("commit has an invalid timezone offset"))?;
    let instant = DateTime::from_timestamp(when.seconds(), 0)
        .ok_or_else(|| git2::Error::from_str("commit timestamp out of range"))?;

    Ok(instant
        .with_timezone(&offset)
        .format("%Y-%m-%d %H:%M:%S %z")
        .to_string())
}

/// Replace the working tree with the commit's tree and detach HEAD on it.
fn checkout(repo: &Repository, commit: &Commit) -> Result<()> {
    let mut options = CheckoutBuilder::new();
    options.force().remove_untracked(true);

    repo.checkout_tree(commit.as_object(), Some(&mut options))?;
    repo.set_head_detached(commit.id())?;
    Ok(())
}

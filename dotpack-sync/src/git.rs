//! [`Vcs`] implementation over libgit2 (`git2`).
//!
//! Network operations use the host's credentials: an ssh-agent for SSH
//! remotes and the configured git credential helper for HTTPS. dotpack
//! never stores credentials itself.

use std::path::{Path, PathBuf};

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{
    AnnotatedCommit, Cred, CredentialType, ErrorCode, FetchOptions, IndexAddOption, Oid,
    PushOptions, RemoteCallbacks, Repository, ResetType, Signature, Status, StatusOptions,
};

use dotpack_core::Identity;

use crate::error::{io_err, VcsError};
use crate::vcs::{CommitId, TreeStatus, Vcs};

/// libgit2-backed provider. Commits and merge commits are authored by
/// `identity`.
#[derive(Debug, Clone, Default)]
pub struct Git2Vcs {
    identity: Identity,
}

impl Git2Vcs {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    fn signature(&self) -> Result<Signature<'static>, VcsError> {
        Ok(Signature::now(&self.identity.name, &self.identity.email)?)
    }

    fn fetch_repo(&self, repo: &Repository, branch: &str) -> Result<(), VcsError> {
        let remote_name = remote_for(repo, branch)?;
        let mut remote = repo.find_remote(&remote_name)?;
        let config = repo.config()?;
        let mut fo = FetchOptions::new();
        fo.remote_callbacks(remote_callbacks(&config));
        remote.fetch(&[] as &[&str], Some(&mut fo), None)?;
        tracing::debug!(remote = %remote_name, branch, "fetched");
        Ok(())
    }

    fn merge_upstream(
        &self,
        repo: &Repository,
        branch: &str,
        upstream_name: &str,
        upstream: &AnnotatedCommit<'_>,
    ) -> Result<(), VcsError> {
        repo.merge(&[upstream], None, None)?;
        let mut index = repo.index()?;
        if index.has_conflicts() {
            let paths = conflict_paths(&index)?;
            abort_merge(repo)?;
            return Err(VcsError::Conflict {
                upstream: upstream_name.to_owned(),
                paths,
            });
        }

        let tree = repo.find_tree(index.write_tree()?)?;
        let local = repo.head()?.peel_to_commit()?;
        let remote = repo.find_commit(upstream.id())?;
        let signature = self.signature()?;
        let message = format!("Merge {upstream_name} into {branch}");
        let merged = repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            &message,
            &tree,
            &[&local, &remote],
        )?;
        repo.cleanup_state()?;
        tracing::info!(branch, commit = %merged, "merged upstream");
        Ok(())
    }
}

impl Vcs for Git2Vcs {
    fn is_repository(&self, path: &Path) -> bool {
        Repository::open(path)
            .map(|repo| !repo.is_bare())
            .unwrap_or(false)
    }

    fn list_remotes(&self, path: &Path) -> Result<Vec<String>, VcsError> {
        let repo = open(path)?;
        let remotes = repo.remotes()?;
        Ok(remotes.iter().flatten().map(str::to_owned).collect())
    }

    fn status(&self, path: &Path) -> Result<TreeStatus, VcsError> {
        let repo = open(path)?;
        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);
        let statuses = repo.statuses(Some(&mut opts))?;

        let mut status = TreeStatus::default();
        for entry in statuses.iter() {
            let s = entry.status();
            if s.intersects(
                Status::INDEX_NEW
                    | Status::INDEX_MODIFIED
                    | Status::INDEX_DELETED
                    | Status::INDEX_RENAMED
                    | Status::INDEX_TYPECHANGE,
            ) {
                status.staged += 1;
            }
            if s.contains(Status::WT_NEW) {
                status.untracked += 1;
            } else if s.intersects(
                Status::WT_MODIFIED
                    | Status::WT_DELETED
                    | Status::WT_RENAMED
                    | Status::WT_TYPECHANGE
                    | Status::CONFLICTED,
            ) {
                status.unstaged += 1;
            }
        }
        Ok(status)
    }

    fn current_branch(&self, path: &Path) -> Result<String, VcsError> {
        head_branch(&open(path)?)
    }

    fn fetch(&self, path: &Path, branch: &str) -> Result<(), VcsError> {
        self.fetch_repo(&open(path)?, branch)
    }

    fn resolve_head(&self, path: &Path) -> Result<CommitId, VcsError> {
        let repo = open(path)?;
        let commit = repo.head()?.peel_to_commit()?;
        Ok(commit_id(commit.id()))
    }

    fn resolve_remote_head(&self, path: &Path, branch: &str) -> Result<CommitId, VcsError> {
        let repo = open(path)?;
        let (_, oid) = remote_head(&repo, branch)?;
        Ok(commit_id(oid))
    }

    fn pull(&self, path: &Path, branch: &str) -> Result<(), VcsError> {
        let repo = open(path)?;
        ensure_checked_out(&repo, branch)?;
        self.fetch_repo(&repo, branch)?;
        let (upstream_name, upstream_oid) = remote_head(&repo, branch)?;
        let upstream = repo.find_annotated_commit(upstream_oid)?;
        let (analysis, _) = repo.merge_analysis(&[&upstream])?;

        if analysis.is_up_to_date() {
            tracing::debug!(branch, "already up to date");
            return Ok(());
        }

        if analysis.is_fast_forward() || analysis.is_unborn() {
            let refname = format!("refs/heads/{branch}");
            let message = format!("dotpack: fast-forward {branch} to {upstream_oid}");
            match repo.find_reference(&refname) {
                Ok(mut reference) => {
                    reference.set_target(upstream_oid, &message)?;
                }
                Err(e) if e.code() == ErrorCode::NotFound => {
                    repo.reference(&refname, upstream_oid, true, &message)?;
                }
                Err(e) => return Err(e.into()),
            }
            repo.set_head(&refname)?;
            repo.checkout_head(Some(CheckoutBuilder::new().force()))?;
            tracing::info!(branch, commit = %upstream_oid, "fast-forwarded");
            return Ok(());
        }

        self.merge_upstream(&repo, branch, &upstream_name, &upstream)
    }

    fn hard_reset(&self, path: &Path, branch: &str, commit: &CommitId) -> Result<(), VcsError> {
        let repo = open(path)?;
        ensure_checked_out(&repo, branch)?;
        let oid = Oid::from_str(&commit.0)?;
        let target = repo.find_commit(oid)?;
        let mut checkout = CheckoutBuilder::new();
        checkout.force().remove_untracked(true);
        repo.reset(target.as_object(), ResetType::Hard, Some(&mut checkout))?;
        remove_untracked(&repo)?;
        tracing::info!(path = %path.display(), branch, commit = %commit.short(), "hard reset");
        Ok(())
    }

    fn add_all(&self, path: &Path) -> Result<(), VcsError> {
        let repo = open(path)?;
        let mut index = repo.index()?;
        index.add_all(["*"], IndexAddOption::DEFAULT, None)?;
        // add_all does not stage removals of tracked files.
        index.update_all(["*"], None)?;
        index.write()?;
        Ok(())
    }

    fn commit(&self, path: &Path, message: &str) -> Result<CommitId, VcsError> {
        let repo = open(path)?;
        let mut index = repo.index()?;
        let tree = repo.find_tree(index.write_tree()?)?;
        let signature = self.signature()?;

        let parent = match repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if e.code() == ErrorCode::UnbornBranch => None,
            Err(e) => return Err(e.into()),
        };
        let parents: Vec<_> = parent.iter().collect();

        let oid = repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parents,
        )?;
        Ok(commit_id(oid))
    }

    fn push(&self, path: &Path, branch: &str) -> Result<(), VcsError> {
        let repo = open(path)?;
        let remote_name = remote_for(&repo, branch)?;
        let mut remote = repo.find_remote(&remote_name)?;
        // String getters only work on a snapshot.
        let config = repo.config()?.snapshot()?;

        let destination = config
            .get_string(&format!("branch.{branch}.merge"))
            .unwrap_or_else(|_| format!("refs/heads/{branch}"));
        let refspec = format!("refs/heads/{branch}:{destination}");

        let mut rejection: Option<(String, String)> = None;
        {
            let mut callbacks = remote_callbacks(&config);
            callbacks.push_update_reference(|refname, status| {
                if let Some(message) = status {
                    rejection = Some((refname.to_owned(), message.to_owned()));
                }
                Ok(())
            });
            let mut po = PushOptions::new();
            po.remote_callbacks(callbacks);
            remote.push(&[refspec.as_str()], Some(&mut po))?;
        }

        if let Some((refname, message)) = rejection {
            return Err(VcsError::PushRejected { refname, message });
        }
        tracing::info!(remote = %remote_name, %refspec, "pushed");
        Ok(())
    }

    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), VcsError> {
        let config = git2::Config::open_default()?;
        let mut fo = FetchOptions::new();
        fo.remote_callbacks(remote_callbacks(&config));
        RepoBuilder::new().fetch_options(fo).clone(url, dest)?;
        tracing::info!(url, dest = %dest.display(), "cloned");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<Repository, VcsError> {
    match Repository::open(path) {
        Ok(repo) if !repo.is_bare() => Ok(repo),
        Ok(_) => Err(VcsError::NotARepository {
            path: path.to_path_buf(),
        }),
        Err(e) if e.code() == ErrorCode::NotFound => Err(VcsError::NotARepository {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(e.into()),
    }
}

fn commit_id(oid: Oid) -> CommitId {
    CommitId(oid.to_string())
}

fn head_branch(repo: &Repository) -> Result<String, VcsError> {
    if repo.head_detached()? {
        return Err(VcsError::DetachedHead);
    }
    let head = match repo.head() {
        Ok(head) => head,
        Err(e) if e.code() == ErrorCode::UnbornBranch => {
            // Unborn: HEAD still names the branch symbolically.
            let head = repo.find_reference("HEAD")?;
            let target = head
                .symbolic_target()
                .ok_or(VcsError::DetachedHead)?
                .to_owned();
            return Ok(target
                .strip_prefix("refs/heads/")
                .unwrap_or(&target)
                .to_owned());
        }
        Err(e) => return Err(e.into()),
    };
    head.shorthand()
        .map(str::to_owned)
        .ok_or_else(|| VcsError::Other("branch name is not valid UTF-8".to_owned()))
}

/// Pull and reset only ever move the checked-out branch.
fn ensure_checked_out(repo: &Repository, branch: &str) -> Result<(), VcsError> {
    let head = head_branch(repo)?;
    if head != branch {
        return Err(VcsError::BranchNotCheckedOut {
            branch: branch.to_owned(),
            head,
        });
    }
    Ok(())
}

/// Remote that `branch` tracks; otherwise `origin`, otherwise the first remote.
fn remote_for(repo: &Repository, branch: &str) -> Result<String, VcsError> {
    if let Ok(buf) = repo.branch_upstream_remote(&format!("refs/heads/{branch}")) {
        if let Some(name) = buf.as_str() {
            return Ok(name.to_owned());
        }
    }
    let remotes = repo.remotes()?;
    let names: Vec<&str> = remotes.iter().flatten().collect();
    if names.contains(&"origin") {
        return Ok("origin".to_owned());
    }
    names
        .first()
        .map(|name| (*name).to_owned())
        .ok_or_else(|| VcsError::NoRemote {
            path: repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf(),
        })
}

/// Resolution order:
/// 1. the configured upstream of `branch` (must exist, no fallback);
/// 2. `refs/remotes/<remote>/<branch>`;
/// 3. `refs/remotes/<remote>/HEAD`, the remote's default branch.
///
/// Returns the short name of the reference used alongside its commit.
fn remote_head(repo: &Repository, branch: &str) -> Result<(String, Oid), VcsError> {
    let remote = remote_for(repo, branch)?;
    let missing = || VcsError::MissingRemoteBranch {
        remote: remote.clone(),
        branch: branch.to_owned(),
    };

    if let Ok(upstream) = repo.branch_upstream_name(&format!("refs/heads/{branch}")) {
        let upstream = upstream.as_str().ok_or_else(missing)?;
        return match repo.find_reference(upstream) {
            Ok(reference) => Ok((short_ref(upstream), reference.peel_to_commit()?.id())),
            Err(e) if e.code() == ErrorCode::NotFound => Err(missing()),
            Err(e) => Err(e.into()),
        };
    }

    for candidate in [
        format!("refs/remotes/{remote}/{branch}"),
        format!("refs/remotes/{remote}/HEAD"),
    ] {
        match repo.find_reference(&candidate) {
            Ok(reference) => {
                let resolved = reference.resolve()?;
                let name = resolved.name().map(short_ref).unwrap_or_else(|| short_ref(&candidate));
                return Ok((name, resolved.peel_to_commit()?.id()));
            }
            Err(e) if e.code() == ErrorCode::NotFound => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(missing())
}

fn short_ref(name: &str) -> String {
    name.strip_prefix("refs/remotes/")
        .or_else(|| name.strip_prefix("refs/heads/"))
        .unwrap_or(name)
        .to_owned()
}

fn conflict_paths(index: &git2::Index) -> Result<Vec<PathBuf>, VcsError> {
    let mut paths = Vec::new();
    for conflict in index.conflicts()? {
        let conflict = conflict?;
        if let Some(entry) = conflict.our.or(conflict.their).or(conflict.ancestor) {
            paths.push(PathBuf::from(
                String::from_utf8_lossy(&entry.path).into_owned(),
            ));
        }
    }
    paths.sort();
    paths.dedup();
    Ok(paths)
}

/// Drop merge state and restore index and tree to HEAD.
fn abort_merge(repo: &Repository) -> Result<(), VcsError> {
    repo.cleanup_state()?;
    let head = repo.head()?.peel_to_commit()?;
    let mut checkout = CheckoutBuilder::new();
    checkout.force();
    repo.reset(head.as_object(), ResetType::Hard, Some(&mut checkout))?;
    Ok(())
}

/// Delete untracked (not ignored) files left behind by a reset.
fn remove_untracked(repo: &Repository) -> Result<(), VcsError> {
    let Some(workdir) = repo.workdir() else {
        return Ok(());
    };
    let mut opts = StatusOptions::new();
    opts.include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false);
    let statuses = repo.statuses(Some(&mut opts))?;

    for entry in statuses.iter() {
        if !entry.status().contains(Status::WT_NEW) {
            continue;
        }
        let Some(rel) = entry.path() else { continue };
        let path = workdir.join(rel);
        std::fs::remove_file(&path).map_err(|e| io_err(&path, e))?;
        prune_empty_parents(workdir, &path);
    }
    Ok(())
}

fn prune_empty_parents(workdir: &Path, file: &Path) {
    let mut dir = file.parent();
    while let Some(current) = dir {
        if current == workdir || !current.starts_with(workdir) {
            break;
        }
        // Fails on non-empty directories, which ends the walk.
        if std::fs::remove_dir(current).is_err() {
            break;
        }
        dir = current.parent();
    }
}

fn remote_callbacks(config: &git2::Config) -> RemoteCallbacks<'_> {
    let mut callbacks = RemoteCallbacks::new();
    let mut tried_agent = false;
    let mut tried_helper = false;
    callbacks.credentials(move |url, username, allowed| {
        if allowed.contains(CredentialType::SSH_KEY) && !tried_agent {
            tried_agent = true;
            return Cred::ssh_key_from_agent(username.unwrap_or("git"));
        }
        if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) && !tried_helper {
            tried_helper = true;
            return Cred::credential_helper(config, url, username);
        }
        if allowed.contains(CredentialType::DEFAULT) {
            return Cred::default();
        }
        Err(git2::Error::from_str(
            "no usable credentials; configure an ssh-agent or a git credential helper",
        ))
    });
    callbacks
}

//! In-memory [`Vcs`] used by unit tests.
//!
//! Commits are modelled as message lists; a commit id is `<index>-<message>`,
//! so a local and a remote history that share a prefix share ids.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::VcsError;
use crate::vcs::{CommitId, TreeStatus, Vcs};

#[derive(Debug, Clone)]
pub(crate) struct FakeRepo {
    remotes: Vec<String>,
    branch: Option<String>,
    staged: usize,
    modified: usize,
    untracked: usize,
    local: Vec<String>,
    remote: Vec<String>,
    fail_on: Vec<&'static str>,
    calls: Vec<String>,
}

impl Default for FakeRepo {
    fn default() -> Self {
        Self {
            remotes: vec!["origin".to_owned()],
            branch: Some("main".to_owned()),
            staged: 0,
            modified: 0,
            untracked: 0,
            local: vec!["init".to_owned()],
            remote: vec!["init".to_owned()],
            fail_on: vec![],
            calls: vec![],
        }
    }
}

impl FakeRepo {
    pub(crate) fn modified(mut self, n: usize) -> Self {
        self.modified += n;
        self
    }

    pub(crate) fn untracked(mut self, n: usize) -> Self {
        self.untracked += n;
        self
    }

    pub(crate) fn remote_ahead(mut self, n: usize) -> Self {
        for i in 0..n {
            self.remote.push(format!("remote-{i}"));
        }
        self
    }

    pub(crate) fn local_ahead(mut self, n: usize) -> Self {
        for i in 0..n {
            self.local.push(format!("local-{i}"));
        }
        self
    }

    pub(crate) fn detached(mut self) -> Self {
        self.branch = None;
        self
    }

    pub(crate) fn no_remotes(mut self) -> Self {
        self.remotes.clear();
        self
    }

    pub(crate) fn fail_on(mut self, op: &'static str) -> Self {
        self.fail_on.push(op);
        self
    }

    fn require_remote(&self, path: &Path) -> Result<(), VcsError> {
        if self.remotes.is_empty() {
            return Err(VcsError::NoRemote {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }
}

fn id(history: &[String]) -> CommitId {
    let last = history.len() - 1;
    CommitId(format!("{last}-{}", history[last]))
}

#[derive(Debug, Default)]
pub(crate) struct FakeVcs {
    repos: RefCell<BTreeMap<PathBuf, FakeRepo>>,
}

impl FakeVcs {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_repo(
        self,
        path: impl Into<PathBuf>,
        build: impl FnOnce(FakeRepo) -> FakeRepo,
    ) -> Self {
        self.repos
            .borrow_mut()
            .insert(path.into(), build(FakeRepo::default()));
        self
    }

    pub(crate) fn calls(&self, path: impl AsRef<Path>) -> Vec<String> {
        self.snapshot(path).calls
    }

    pub(crate) fn local_log(&self, path: impl AsRef<Path>) -> Vec<String> {
        self.snapshot(path).local
    }

    pub(crate) fn remote_log(&self, path: impl AsRef<Path>) -> Vec<String> {
        self.snapshot(path).remote
    }

    fn snapshot(&self, path: impl AsRef<Path>) -> FakeRepo {
        self.repos
            .borrow()
            .get(path.as_ref())
            .cloned()
            .unwrap_or_else(|| panic!("no fake repo at {}", path.as_ref().display()))
    }

    fn op<T>(
        &self,
        path: &Path,
        name: &'static str,
        f: impl FnOnce(&mut FakeRepo) -> Result<T, VcsError>,
    ) -> Result<T, VcsError> {
        let mut repos = self.repos.borrow_mut();
        let repo = repos.get_mut(path).ok_or_else(|| VcsError::NotARepository {
            path: path.to_path_buf(),
        })?;
        repo.calls.push(name.to_owned());
        if repo.fail_on.contains(&name) {
            return Err(VcsError::Other(format!("{name} failed")));
        }
        f(repo)
    }
}

impl Vcs for FakeVcs {
    fn is_repository(&self, path: &Path) -> bool {
        self.repos.borrow().contains_key(path)
    }

    fn list_remotes(&self, path: &Path) -> Result<Vec<String>, VcsError> {
        self.op(path, "list_remotes", |r| Ok(r.remotes.clone()))
    }

    fn status(&self, path: &Path) -> Result<TreeStatus, VcsError> {
        self.op(path, "status", |r| {
            Ok(TreeStatus {
                staged: r.staged,
                unstaged: r.modified,
                untracked: r.untracked,
            })
        })
    }

    fn current_branch(&self, path: &Path) -> Result<String, VcsError> {
        self.op(path, "current_branch", |r| {
            r.branch.clone().ok_or(VcsError::DetachedHead)
        })
    }

    fn fetch(&self, path: &Path, _branch: &str) -> Result<(), VcsError> {
        self.op(path, "fetch", |r| r.require_remote(path))
    }

    fn resolve_head(&self, path: &Path) -> Result<CommitId, VcsError> {
        self.op(path, "resolve_head", |r| Ok(id(&r.local)))
    }

    fn resolve_remote_head(&self, path: &Path, _branch: &str) -> Result<CommitId, VcsError> {
        self.op(path, "resolve_remote_head", |r| {
            r.require_remote(path)?;
            Ok(id(&r.remote))
        })
    }

    fn pull(&self, path: &Path, _branch: &str) -> Result<(), VcsError> {
        self.op(path, "pull", |r| {
            r.require_remote(path)?;
            if r.remote.starts_with(&r.local) {
                r.local = r.remote.clone();
            } else if !r.local.starts_with(&r.remote) {
                let extra: Vec<_> = r
                    .remote
                    .iter()
                    .filter(|c| !r.local.contains(*c))
                    .cloned()
                    .collect();
                r.local.extend(extra);
                r.local.push("merge".to_owned());
            }
            Ok(())
        })
    }

    fn hard_reset(&self, path: &Path, branch: &str, commit: &CommitId) -> Result<(), VcsError> {
        self.op(path, "hard_reset", |r| {
            match &r.branch {
                None => return Err(VcsError::DetachedHead),
                Some(head) if head != branch => {
                    return Err(VcsError::BranchNotCheckedOut {
                        branch: branch.to_owned(),
                        head: head.clone(),
                    })
                }
                Some(_) => {}
            }
            let end = (0..r.remote.len())
                .find(|i| id(&r.remote[..=*i]) == *commit)
                .ok_or_else(|| VcsError::Other(format!("unknown commit {commit}")))?;
            r.local = r.remote[..=end].to_vec();
            r.staged = 0;
            r.modified = 0;
            r.untracked = 0;
            Ok(())
        })
    }

    fn add_all(&self, path: &Path) -> Result<(), VcsError> {
        self.op(path, "add_all", |r| {
            r.staged += r.modified + r.untracked;
            r.modified = 0;
            r.untracked = 0;
            Ok(())
        })
    }

    fn commit(&self, path: &Path, message: &str) -> Result<CommitId, VcsError> {
        self.op(path, "commit", |r| {
            if r.staged == 0 {
                return Err(VcsError::Other("nothing to commit".to_owned()));
            }
            r.staged = 0;
            r.local.push(message.to_owned());
            Ok(id(&r.local))
        })
    }

    fn push(&self, path: &Path, branch: &str) -> Result<(), VcsError> {
        self.op(path, "push", |r| {
            r.require_remote(path)?;
            if !r.local.starts_with(&r.remote) {
                return Err(VcsError::PushRejected {
                    refname: format!("refs/heads/{branch}"),
                    message: "non-fast-forward".to_owned(),
                });
            }
            r.remote = r.local.clone();
            Ok(())
        })
    }

    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), VcsError> {
        if url.is_empty() {
            return Err(VcsError::Other("empty url".to_owned()));
        }
        let mut repos = self.repos.borrow_mut();
        let mut repo = FakeRepo::default();
        repo.calls.push("clone".to_owned());
        repos.insert(dest.to_path_buf(), repo);
        Ok(())
    }
}

//! Real-repository fixtures: a bare remote on `main`, and package clones in
//! a store directory, all inside one temp dir.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use dotpack_core::{Identity, PackageName};
use dotpack_sync::{Git2Vcs, RepoRef};
use git2::{Oid, Repository, RepositoryInitOptions, Signature};
use tempfile::TempDir;

pub struct Fixture {
    tmp: TempDir,
    pub remote: PathBuf,
    pub base: PathBuf,
    scratch: AtomicUsize,
}

impl Fixture {
    /// Bare remote seeded with one commit containing `config`.
    pub fn new() -> Self {
        init_tracing();
        let tmp = TempDir::new().expect("tmp");
        let remote = tmp.path().join("remote.git");
        let base = tmp.path().join("packages");
        fs::create_dir_all(&base).expect("store dir");

        let mut opts = RepositoryInitOptions::new();
        opts.bare(true).initial_head("main");
        Repository::init_opts(&remote, &opts).expect("init bare remote");

        let seed = tmp.path().join("seed");
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts(&seed, &opts).expect("init seed");
        repo.remote("origin", remote.to_str().expect("utf-8 path"))
            .expect("add origin");
        commit_file(&seed, "config", "initial\n", "initial");
        push_main(&seed);

        Self {
            tmp,
            remote,
            base,
            scratch: AtomicUsize::new(0),
        }
    }

    pub fn vcs(&self) -> Git2Vcs {
        Git2Vcs::new(Identity::default())
    }

    /// Clone the remote into the store as package `name`.
    pub fn package(&self, name: &str) -> RepoRef {
        let path = self.base.join(name);
        Repository::clone(self.remote.to_str().expect("utf-8 path"), &path).expect("clone");
        RepoRef {
            name: PackageName::from(name),
            path,
        }
    }

    /// Commit `file` on the remote's `main` from a throwaway clone.
    pub fn remote_commit(&self, file: &str, content: &str, message: &str) -> Oid {
        let n = self.scratch.fetch_add(1, Ordering::SeqCst);
        let work = self.tmp.path().join(format!("upstream-{n}"));
        Repository::clone(self.remote.to_str().expect("utf-8 path"), &work).expect("clone");
        let oid = commit_file(&work, file, content, message);
        push_main(&work);
        oid
    }

    /// Commit `file` on a new remote branch forked from `main`.
    pub fn remote_branch_commit(&self, branch: &str, file: &str, content: &str, message: &str) -> Oid {
        let n = self.scratch.fetch_add(1, Ordering::SeqCst);
        let work = self.tmp.path().join(format!("upstream-{n}"));
        let repo = Repository::clone(self.remote.to_str().expect("utf-8 path"), &work)
            .expect("clone");
        let base = repo.head().expect("head").peel_to_commit().expect("head commit");
        repo.branch(branch, &base, false).expect("create branch");
        repo.set_head(&format!("refs/heads/{branch}")).expect("switch branch");
        let oid = commit_file(&work, file, content, message);
        let refspec = format!("refs/heads/{branch}:refs/heads/{branch}");
        repo.find_remote("origin")
            .expect("origin")
            .push(&[refspec.as_str()], None)
            .expect("push branch");
        oid
    }

    pub fn remote_head(&self) -> Oid {
        Repository::open_bare(&self.remote)
            .expect("open remote")
            .refname_to_id("refs/heads/main")
            .expect("remote main")
    }
}

pub fn signature() -> Signature<'static> {
    Signature::now("tester", "tester@example.com").expect("signature")
}

/// Write `file`, stage it and commit on HEAD.
pub fn commit_file(workdir: &Path, file: &str, content: &str, message: &str) -> Oid {
    let path = workdir.join(file);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("parent dir");
    }
    fs::write(&path, content).expect("write file");

    let repo = Repository::open(workdir).expect("open");
    let mut index = repo.index().expect("index");
    index.add_path(Path::new(file)).expect("stage");
    index.write().expect("write index");
    let tree = repo
        .find_tree(index.write_tree().expect("write tree"))
        .expect("tree");
    let sig = signature();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<_> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .expect("commit")
}

pub fn push_main(workdir: &Path) {
    let repo = Repository::open(workdir).expect("open");
    let mut remote = repo.find_remote("origin").expect("origin");
    remote
        .push(&["refs/heads/main:refs/heads/main"], None)
        .expect("push");
}

pub fn head(workdir: &Path) -> Oid {
    Repository::open(workdir)
        .expect("open")
        .head()
        .expect("head")
        .peel_to_commit()
        .expect("head commit")
        .id()
}

/// Commit messages reachable from HEAD, newest first.
pub fn log(workdir: &Path) -> Vec<String> {
    let repo = Repository::open(workdir).expect("open");
    let mut walk = repo.revwalk().expect("revwalk");
    walk.push_head().expect("push head");
    walk.map(|oid| {
        let commit = repo.find_commit(oid.expect("oid")).expect("commit");
        commit.message().unwrap_or_default().trim_end().to_owned()
    })
    .collect()
}

pub fn read(workdir: &Path, file: &str) -> String {
    fs::read_to_string(workdir.join(file)).expect("read file")
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

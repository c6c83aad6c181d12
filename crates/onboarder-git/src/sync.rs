// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Clone, fetch and checkout
//!
//! The working copy is brought to the tip of `origin/<branch>` before
//! analysis starts. Pulling is a fast-forward of the local branch to the
//! fetched remote tip followed by a forced checkout.

use crate::error::GitError;
use crate::repo::GitRepo;
use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{Cred, FetchOptions, FetchPrune, RemoteCallbacks};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Name of the remote every clone is created with
pub const ORIGIN: &str = "origin";

/// Username paired with a token when none is configured
pub const DEFAULT_USERNAME: &str = "x-access-token";

/// Username and token for authenticated clones
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Username sent with the token
    pub username: String,
    /// Access token or password
    pub token: String,
}

impl Credentials {
    /// Token credentials with the default username
    #[must_use]
    pub fn token(token: impl Into<String>) -> Self {
        Self {
            username: DEFAULT_USERNAME.to_string(),
            token: token.into(),
        }
    }

    /// Replace the username
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

fn fetch_options(credentials: Option<&Credentials>) -> FetchOptions<'static> {
    let mut callbacks = RemoteCallbacks::new();
    if let Some(creds) = credentials.cloned() {
        let mut attempted = false;
        callbacks.credentials(move |_url, _username, _allowed| {
            // libgit2 keeps asking after a rejected credential
            if attempted {
                return Err(git2::Error::from_str("credentials rejected by remote"));
            }
            attempted = true;
            Cred::userpass_plaintext(&creds.username, &creds.token)
        });
    }

    let mut options = FetchOptions::new();
    options.remote_callbacks(callbacks);
    options.prune(FetchPrune::On);
    options
}

impl GitRepo {
    /// Clone `url` into `dest`, checking out `branch` when given
    ///
    /// # Errors
    ///
    /// Returns `GitError::Clone` if the remote cannot be cloned.
    pub fn clone_from(
        url: &str,
        dest: &Path,
        branch: Option<&str>,
        credentials: Option<&Credentials>,
    ) -> Result<Self, GitError> {
        info!(url, dest = %dest.display(), "Cloning repository");

        let mut builder = RepoBuilder::new();
        builder.fetch_options(fetch_options(credentials));
        if let Some(branch) = branch {
            builder.branch(branch);
        }

        let repo = builder.clone(url, dest).map_err(|source| GitError::Clone {
            url: url.to_string(),
            source,
        })?;
        Ok(Self { repo })
    }

    /// Open the clone at `dest` if one exists, otherwise clone `url` into it
    ///
    /// # Errors
    ///
    /// Returns `GitError` if opening or cloning fails.
    pub fn open_or_clone(
        url: &str,
        dest: &Path,
        branch: Option<&str>,
        credentials: Option<&Credentials>,
    ) -> Result<Self, GitError> {
        if dest.join(".git").exists() {
            debug!(dest = %dest.display(), "Reusing existing clone");
            return Self::open(dest);
        }
        std::fs::create_dir_all(dest)?;
        Self::clone_from(url, dest, branch, credentials)
    }

    /// Fetch `origin`, check out `branch` and fast-forward it to the remote tip
    ///
    /// A missing local branch is created from `origin/<branch>` with its
    /// upstream set.
    ///
    /// # Errors
    ///
    /// Returns `GitError::BranchNotFound` if the branch exists neither
    /// locally nor on the remote, or `GitError::Git2` for fetch and
    /// checkout failures.
    pub fn fetch_checkout_pull(
        &self,
        branch: &str,
        credentials: Option<&Credentials>,
    ) -> Result<(), GitError> {
        let mut remote = self.repo.find_remote(ORIGIN)?;
        let mut options = fetch_options(credentials);
        remote.fetch(&[] as &[&str], Some(&mut options), None)?;
        debug!(remote = ORIGIN, "Fetched remote");

        let local_ref = format!("refs/heads/{branch}");
        let remote_tip = self
            .repo
            .find_reference(&format!("refs/remotes/{ORIGIN}/{branch}"))
            .ok()
            .and_then(|reference| reference.target());
        let has_local = self.repo.find_reference(&local_ref).is_ok();

        match (has_local, remote_tip) {
            (false, None) => {
                return Err(GitError::BranchNotFound {
                    branch: branch.to_string(),
                });
            }
            (false, Some(oid)) => {
                let commit = self.repo.find_commit(oid)?;
                let mut created = self.repo.branch(branch, &commit, false)?;
                created.set_upstream(Some(&format!("{ORIGIN}/{branch}")))?;
                debug!(branch, "Created tracking branch");
            }
            (true, _) => {}
        }

        if let Some(oid) = remote_tip {
            let mut local = self.repo.find_reference(&local_ref)?;
            if local.target() != Some(oid) {
                local.set_target(oid, "onboarder: fast-forward to origin")?;
            }
        }

        self.repo.set_head(&local_ref)?;
        self.repo
            .checkout_head(Some(CheckoutBuilder::new().force()))?;

        info!(branch, "Checked out branch");
        Ok(())
    }
}

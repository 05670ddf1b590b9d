use std::path::Path;

use log::{debug, info, warn};

use crate::git::Vcs;
use crate::github::{RemoteRepo, RepoHost};
use crate::ui::prompt::{Prompter, RemoteChoice};
use crate::Result;

/// Upper bound on the `base, base-1, base-2, ...` candidates probed while
/// looking for a free repository name.
pub const NAME_PROBE_LIMIT: usize = 10;

/// Canonical branch name the notes repository publishes.
pub const DEFAULT_BRANCH: &str = "main";

const ORIGIN: &str = "origin";

/// Outcome of a provisioning run.
#[derive(Debug)]
pub struct ProvisionSummary {
    pub repo: RemoteRepo,
    pub reused: bool,
    pub pushed: bool,
}

#[derive(Debug, Default)]
struct NameProbe {
    /// Most recently probed candidate that exists under the account
    existing: Option<RemoteRepo>,
    /// First candidate confirmed free
    free: Option<String>,
}

#[derive(Debug)]
enum ProvisionTarget {
    Reuse(RemoteRepo),
    Create(String),
}

/// Probe candidate names in increasing order, stopping at the first free
/// one. The loop favors finding a confirmed-free slot over classifying
/// every candidate.
async fn probe_names<H: RepoHost + ?Sized>(
    host: &H,
    owner: &str,
    base: &str,
    limit: usize,
) -> Result<NameProbe> {
    let mut probe = NameProbe::default();

    for i in 0..limit {
        let candidate = if i == 0 {
            base.to_string()
        } else {
            format!("{}-{}", base, i)
        };

        match host.repo_exists(owner, &candidate).await? {
            Some(repo) => {
                debug!("candidate '{}' already exists", candidate);
                probe.existing = Some(repo);
            }
            None => {
                debug!("candidate '{}' is free", candidate);
                probe.free = Some(candidate);
                break;
            }
        }
    }

    Ok(probe)
}

/// Pick the repository to use: reuse an existing one (operator's choice)
/// or create at a free name. Reuse is favored over proliferating
/// near-duplicate repositories, but an existing one is never taken over
/// silently.
async fn resolve_target<H: RepoHost + ?Sized, P: Prompter>(
    host: &H,
    prompter: &P,
    owner: &str,
    base: &str,
    limit: usize,
) -> Result<ProvisionTarget> {
    let probe = probe_names(host, owner, base, limit).await?;

    match probe.existing {
        Some(existing) => {
            let candidate = probe.free.unwrap_or_else(|| fallback_name(base));
            match prompter.reuse_or_create(&existing.name, &candidate)? {
                RemoteChoice::UseExisting => Ok(ProvisionTarget::Reuse(existing)),
                RemoteChoice::CreateNew => Ok(ProvisionTarget::Create(candidate)),
            }
        }
        None => Ok(ProvisionTarget::Create(
            probe.free.unwrap_or_else(|| base.to_string()),
        )),
    }
}

/// Synthesized last-resort name when every probed candidate was taken.
fn fallback_name(base: &str) -> String {
    let suffix = petname::petname(2, "-").unwrap_or_else(|| "backup".to_string());
    format!("{}-{}", base, suffix)
}

/// Ensure a private repository exists on the hosted service and is wired
/// as the local `origin`, then attempt the first publish.
///
/// Authentication happened when `host` was constructed, and name probing
/// and creation both precede the remote wiring, so an auth failure never
/// leaves a partially configured remote behind.
pub async fn provision<H: RepoHost + ?Sized, V: Vcs, P: Prompter>(
    host: &H,
    vcs: &V,
    prompter: &P,
    root: &Path,
    base_name: &str,
    description: &str,
) -> Result<ProvisionSummary> {
    let owner = host.login();

    let (repo, reused) = match resolve_target(host, prompter, owner, base_name, NAME_PROBE_LIMIT)
        .await?
    {
        ProvisionTarget::Reuse(repo) => {
            info!("reusing existing repository {}/{}", owner, repo.name);
            (repo, true)
        }
        ProvisionTarget::Create(name) => {
            info!("creating private repository {}/{}", owner, name);
            let repo = host.create_private(&name, description).await?;
            (repo, false)
        }
    };

    // Wire origin: update the URL if the remote exists, add it otherwise
    if vcs.remote_url(root, ORIGIN)?.is_some() {
        vcs.set_remote_url(root, ORIGIN, &repo.clone_url)?;
    } else {
        vcs.add_remote(root, ORIGIN, &repo.clone_url)?;
    }

    // Canonical branch name before the first publish
    if let Err(e) = vcs.rename_branch(root, DEFAULT_BRANCH) {
        warn!("could not rename branch to {}: {}", DEFAULT_BRANCH, e);
    }

    // First push with tracking; the remote and local history are valid
    // even if this fails, only the initial publish needs a manual retry
    let pushed = match vcs.push_set_upstream(root, ORIGIN, DEFAULT_BRANCH) {
        Ok(()) => true,
        Err(e) => {
            warn!("initial push failed: {}", e);
            false
        }
    };

    Ok(ProvisionSummary { repo, reused, pushed })
}

use std::path::PathBuf;

use crate::config::Settings;
use crate::git::{find_repo_root, CommitOutcome, GitCli, Vcs};
use crate::github::{GithubClient, RepoHost};
use crate::provision::provision;
use crate::ui::{create_spinner, TerminalPrompter};
use crate::Result;

const REPO_DESCRIPTION: &str = "Personal notes, synchronized by notes-sync";

pub async fn execute(path: Option<PathBuf>, name: Option<String>) -> Result<()> {
    let notes_dir = match path {
        Some(p) => p,
        None => std::env::current_dir()?,
    };
    std::fs::create_dir_all(&notes_dir)?;
    let notes_dir = notes_dir.canonicalize()?;

    println!("Initializing notes repository at {}...", notes_dir.display());

    let vcs = GitCli;

    // Local bootstrap: reuse an enclosing repository, or initialize one
    // here and commit whatever notes already exist
    let root = match find_repo_root(&notes_dir) {
        Some(root) => {
            println!("  Using existing repository: {}", root.display());
            root
        }
        None => {
            vcs.init(&notes_dir)?;
            vcs.stage_all(&notes_dir)?;
            match vcs.commit(&notes_dir, "notes: initial import")? {
                CommitOutcome::Created => println!("  Created repository with initial commit"),
                CommitOutcome::NothingToCommit => println!("  Created empty repository"),
            }
            notes_dir.clone()
        }
    };

    let base_name = name
        .or_else(|| root.file_name().map(|n| n.to_string_lossy().to_string()))
        .unwrap_or_else(|| "notes".to_string());

    let mut settings = Settings::load()?;
    let token = settings.resolve_token()?;

    let spinner = create_spinner("Connecting to GitHub...");
    let client = GithubClient::connect(token).await?;
    spinner.finish_with_message(format!("Authenticated as {}", client.login()));

    let summary = provision(
        &client,
        &vcs,
        &TerminalPrompter,
        &root,
        &base_name,
        REPO_DESCRIPTION,
    )
    .await?;

    settings.notes_dir = Some(root.clone());
    settings.save()?;

    println!();
    if summary.reused {
        println!("Wired origin to existing repository '{}'", summary.repo.name);
    } else {
        println!("Created private repository '{}'", summary.repo.name);
    }
    if !summary.repo.html_url.is_empty() {
        println!("  {}", summary.repo.html_url);
    }
    if summary.pushed {
        println!("Initial push complete.");
    } else {
        println!("Initial push failed; run 'notes-sync sync' to retry once the cause is fixed.");
    }
    println!();
    println!("Enable automatic syncing with 'notes-sync config set auto-sync true',");
    println!("then run 'notes-sync watch' to keep this directory synchronized.");

    Ok(())
}

pub mod divergence;
pub mod locate;
pub mod runner;
pub mod vcs;

pub use divergence::Divergence;
pub use locate::find_repo_root;
pub use vcs::{CommitOutcome, GitCli, Vcs};

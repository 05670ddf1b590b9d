pub mod client;

pub use client::{GithubClient, RemoteRepo, RepoHost};

pub mod prompt;
pub mod spinner;

pub use prompt::{Prompter, PullChoice, RemoteChoice, TerminalPrompter};
pub use spinner::create_spinner;

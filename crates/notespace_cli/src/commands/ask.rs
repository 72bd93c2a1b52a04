//! `notespace ask`: placeholder assistant.

use clap::Args;
use notespace_core::FileApp;

use super::owner_session;

#[derive(Debug, Args)]
pub struct AskArgs {
    /// Prompt text; multiple words are joined with spaces.
    #[arg(required = true, num_args = 1..)]
    prompt: Vec<String>,

    /// Model to answer with instead of the configured default.
    #[arg(long)]
    model: Option<String>,
}

pub fn run(app: &FileApp, args: AskArgs) -> anyhow::Result<()> {
    let session = owner_session(app)?;
    let prompt = args.prompt.join(" ");
    let answer = app.ask_assistant(session, args.model.as_deref(), &prompt)?;
    println!("{answer}");
    Ok(())
}

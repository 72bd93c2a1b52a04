//! CLI subcommand dispatch.

use anyhow::Context;
use clap::Subcommand;
use notespace_core::{FileApp, SessionId};

pub mod account;
pub mod ask;
pub mod pages;
pub mod rows;
pub mod settings;

/// Principal recorded for commands run by whoever owns the data directory.
const LOCAL_OWNER: &str = "local-owner";

#[derive(Subcommand)]
pub enum Command {
    /// Print the page tree with ids
    Tree,
    /// Show one page
    Show(pages::ShowArgs),
    /// Search page titles and content
    Search(pages::SearchArgs),
    /// Create a page
    Add(pages::AddArgs),
    /// Replace a page's title and content
    Edit(pages::EditArgs),
    /// Delete a page and everything under it
    Delete(pages::DeleteArgs),
    /// Print a page table
    Rows(rows::RowsArgs),
    /// Append a row to a page table
    AddRow(rows::AddRowArgs),
    /// Show model and theme
    Settings,
    /// Choose the default assistant model
    SetModel(settings::SetModelArgs),
    /// Switch between light and dark theme
    ToggleTheme,
    /// Register an account with the identity provider
    Signup(account::SignupArgs),
    /// Check credentials against the identity provider
    Login(account::LoginArgs),
    /// Ask the assistant
    Ask(ask::AskArgs),
}

pub async fn run(app: &FileApp, cmd: Command) -> anyhow::Result<()> {
    match cmd {
        Command::Tree => pages::tree(app),
        Command::Show(args) => pages::show(app, args),
        Command::Search(args) => pages::search(app, args),
        Command::Add(args) => pages::add(app, args),
        Command::Edit(args) => pages::edit(app, args),
        Command::Delete(args) => pages::delete(app, args),
        Command::Rows(args) => rows::rows(app, args),
        Command::AddRow(args) => rows::add_row(app, args),
        Command::Settings => settings::show(app),
        Command::SetModel(args) => settings::set_model(app, args),
        Command::ToggleTheme => settings::toggle_theme(app),
        Command::Signup(args) => account::signup(app, args).await,
        Command::Login(args) => account::login(app, args).await,
        Command::Ask(args) => ask::run(app, args),
    }
}

/// Session under which mutating commands run.
///
/// Sessions live in memory and each invocation is its own process, so the
/// owner session is opened locally instead of through the identity provider.
/// Only granted when the operator passed `--local` or set
/// `NOTESPACE_LOCAL_OWNER`.
fn owner_session(app: &FileApp) -> anyhow::Result<SessionId> {
    app.local_session(LOCAL_OWNER)
        .context("this command changes the workspace; rerun with --local to act as its owner")
}

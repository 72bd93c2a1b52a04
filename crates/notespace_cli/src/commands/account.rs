//! `notespace signup|login`: identity provider round trips.

use clap::Args;
use notespace_core::FileApp;

#[derive(Debug, Args)]
pub struct SignupArgs {
    #[arg(long)]
    email: String,

    #[arg(long)]
    password: String,

    /// Repeat of the password; defaults to --password.
    #[arg(long)]
    confirm: Option<String>,
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    #[arg(long)]
    email: String,

    #[arg(long)]
    password: String,
}

pub async fn signup(app: &FileApp, args: SignupArgs) -> anyhow::Result<()> {
    let confirm = args.confirm.as_deref().unwrap_or(&args.password);
    match app.sign_up(&args.email, &args.password, confirm).await {
        Ok(()) => {
            println!("Sign-up successful! Please log in.");
            Ok(())
        }
        Err(err) => anyhow::bail!("Sign-up failed: {err}"),
    }
}

pub async fn login(app: &FileApp, args: LoginArgs) -> anyhow::Result<()> {
    match app.sign_in(&args.email, &args.password).await {
        Ok(session) => {
            let user = app.current_user(Some(session)).unwrap_or_default();
            println!("Signed in as {user}.");
            app.sign_out(session);
            Ok(())
        }
        Err(err) => anyhow::bail!("Login failed: {err}"),
    }
}

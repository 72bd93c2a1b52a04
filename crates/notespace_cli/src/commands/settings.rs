//! `notespace settings|set-model|toggle-theme`.

use clap::Args;
use notespace_core::FileApp;

use super::owner_session;

#[derive(Debug, Args)]
pub struct SetModelArgs {
    /// Model name, e.g. "Claude".
    pub model: String,
}

pub fn show(app: &FileApp) -> anyhow::Result<()> {
    let settings = app.settings();
    println!("model: {}", settings.model);
    println!("theme: {}", settings.theme);
    println!("available models: {}", app.available_models().join(", "));
    Ok(())
}

pub fn set_model(app: &FileApp, args: SetModelArgs) -> anyhow::Result<()> {
    let session = owner_session(app)?;
    if app.set_model(session, &args.model)? {
        println!("model: {}", app.settings().model);
    } else {
        println!("model unchanged: blank selection");
    }
    Ok(())
}

pub fn toggle_theme(app: &FileApp) -> anyhow::Result<()> {
    let theme = app.toggle_theme()?;
    println!("theme: {theme}");
    Ok(())
}

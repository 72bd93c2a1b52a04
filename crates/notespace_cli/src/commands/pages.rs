//! `notespace tree|show|search|add|edit|delete`: page tree commands.

use anyhow::{bail, Context};
use clap::Args;
use notespace_core::{FileApp, PageId, PageNode};
use std::path::PathBuf;

use super::owner_session;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Page id.
    pub id: PageId,

    /// Print rendered markup instead of raw content.
    #[arg(long)]
    html: bool,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Text to look for, case-insensitive.
    pub query: String,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Page title; blank becomes "Untitled".
    pub title: String,

    /// Nest under this page.
    #[arg(long, value_name = "ID")]
    parent: Option<PageId>,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Page id.
    pub id: PageId,

    /// New title.
    #[arg(long)]
    title: String,

    /// New content. Existing content is kept when neither content option
    /// is given.
    #[arg(long, conflicts_with = "content_file")]
    content: Option<String>,

    /// Read new content from a file.
    #[arg(long, value_name = "FILE")]
    content_file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Page id.
    pub id: PageId,
}

pub fn tree(app: &FileApp) -> anyhow::Result<()> {
    let forest = app.forest();
    if forest.is_empty() {
        println!("(no pages)");
        return Ok(());
    }
    let mut lines = Vec::new();
    for node in &forest {
        format_node(node, 0, &mut lines);
    }
    println!("{}", lines.join("\n"));
    Ok(())
}

fn format_node(node: &PageNode, depth: usize, lines: &mut Vec<String>) {
    lines.push(format!("{}{}  [{}]", "  ".repeat(depth), node.title, node.id));
    for child in &node.children {
        format_node(child, depth + 1, lines);
    }
}

pub fn show(app: &FileApp, args: ShowArgs) -> anyhow::Result<()> {
    if args.html {
        let Some(rendered) = app.render_page(&args.id) else {
            bail!("page not found: {}", args.id);
        };
        println!("{}", rendered.html);
        return Ok(());
    }

    let Some(page) = app.page(&args.id) else {
        bail!("page not found: {}", args.id);
    };
    println!("# {}", page.title);
    println!("id: {}", args.id);
    println!("children: {}", page.children.len());
    println!("rows: {}", page.rows.len());
    if !page.content.is_empty() {
        println!();
        println!("{}", page.content);
    }
    Ok(())
}

pub fn search(app: &FileApp, args: SearchArgs) -> anyhow::Result<()> {
    let hits = app.search(&args.query);
    if hits.is_empty() {
        println!("No results for \"{}\".", args.query);
        return Ok(());
    }
    println!("{} result(s) for \"{}\":", hits.len(), args.query);
    for hit in hits {
        println!("  {}  [{}]", hit.title, hit.id);
    }
    Ok(())
}

pub fn add(app: &FileApp, args: AddArgs) -> anyhow::Result<()> {
    let session = owner_session(app)?;
    let id = app.create_page(session, &args.title, args.parent.as_ref())?;
    if let Some(parent) = &args.parent {
        if app.page(parent).is_none() {
            eprintln!("warning: parent {parent} not found; page created at top level");
        }
    }
    println!("{id}");
    Ok(())
}

pub fn edit(app: &FileApp, args: EditArgs) -> anyhow::Result<()> {
    let Some(current) = app.page(&args.id) else {
        bail!("page not found: {}", args.id);
    };
    let content = match (args.content, args.content_file) {
        (Some(content), _) => content,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => current.content,
    };

    let session = owner_session(app)?;
    app.update_page(session, &args.id, &args.title, &content)?;
    println!("updated {}", args.id);
    Ok(())
}

pub fn delete(app: &FileApp, args: DeleteArgs) -> anyhow::Result<()> {
    let session = owner_session(app)?;
    let removed = app.delete_page(session, &args.id)?;
    if removed.is_empty() {
        println!("nothing to delete: {}", args.id);
    } else {
        println!("deleted {} page(s)", removed.len());
    }
    Ok(())
}

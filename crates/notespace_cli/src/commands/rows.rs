//! `notespace rows|add-row`: per-page table commands.

use anyhow::bail;
use clap::Args;
use notespace_core::{FileApp, PageId, RowInput};

use super::owner_session;

#[derive(Debug, Args)]
pub struct RowsArgs {
    /// Page id.
    pub id: PageId,
}

#[derive(Debug, Args)]
pub struct AddRowArgs {
    /// Page id.
    pub id: PageId,

    /// Cell values as COLUMN=VALUE.
    #[arg(value_name = "COLUMN=VALUE", value_parser = parse_cell)]
    cells: Vec<(String, String)>,

    /// Introduce a new column with this row.
    #[arg(long, value_name = "COLUMN")]
    new_col: Option<String>,

    /// Value for --new-col.
    #[arg(long, value_name = "VALUE", requires = "new_col")]
    new_val: Option<String>,
}

fn parse_cell(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(column, value)| (column.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected COLUMN=VALUE, got `{raw}`"))
}

pub fn rows(app: &FileApp, args: RowsArgs) -> anyhow::Result<()> {
    let (Some(rows), Some(columns)) = (app.rows(&args.id), app.table_columns(&args.id)) else {
        bail!("page not found: {}", args.id);
    };
    if rows.is_empty() {
        println!("(no rows)");
        return Ok(());
    }

    println!("{}", columns.join("\t"));
    for row in &rows {
        let cells: Vec<&str> = columns
            .iter()
            .map(|column| row.get(column).map(String::as_str).unwrap_or(""))
            .collect();
        println!("{}", cells.join("\t"));
    }
    Ok(())
}

pub fn add_row(app: &FileApp, args: AddRowArgs) -> anyhow::Result<()> {
    let mut input = args
        .cells
        .into_iter()
        .fold(RowInput::new(), |input, (column, value)| input.field(column, value));
    if let Some(column) = args.new_col {
        input = input.new_column(column, args.new_val.unwrap_or_default());
    }

    let session = owner_session(app)?;
    app.add_row(session, &args.id, input)?;
    println!("row added to {}", args.id);
    Ok(())
}

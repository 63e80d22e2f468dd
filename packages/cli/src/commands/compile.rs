use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

use mailcraft_document::{from_saved_json, is_editor_payload, Document};
use mailcraft_markup::document_to_markup;

#[derive(Debug, Args)]
pub struct CompileArgs {
    /// Document payload (or bare document JSON) to compile
    pub input: PathBuf,

    /// Output markup file; stdout when omitted
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

pub fn compile(args: CompileArgs, cwd: &str) -> Result<()> {
    let input_path = PathBuf::from(cwd).join(&args.input);
    let json = fs::read_to_string(&input_path)?;
    let document = read_document(&json)?;
    let markup = document_to_markup(&document);

    match &args.out {
        Some(out) => {
            let out_path = PathBuf::from(cwd).join(out);
            fs::write(&out_path, &markup)?;
            println!(
                "  {} {} → {} ({} elements)",
                "✓".green(),
                args.input.display(),
                out.display(),
                document.node_count()
            );
        }
        None => print!("{markup}"),
    }

    Ok(())
}

/// Accepts both the saved payload envelope and a bare document.
fn read_document(json: &str) -> Result<Document> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if is_editor_payload(&value) {
        return Ok(from_saved_json(json)?);
    }
    serde_json::from_value(value).map_err(|e| anyhow!("Not a document payload: {e}"))
}

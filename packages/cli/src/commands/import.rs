use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

use mailcraft_document::to_saved_json;
use mailcraft_markup::markup_to_document;

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Markup file to import
    pub input: PathBuf,

    /// Output payload file; stdout when omitted
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

pub fn import(args: ImportArgs, cwd: &str) -> Result<()> {
    let input_path = PathBuf::from(cwd).join(&args.input);
    let markup = fs::read_to_string(&input_path)?;

    // Import never fails: malformed markup degrades to whatever legal
    // document could be salvaged from it.
    let document = markup_to_document(&markup);
    let payload = to_saved_json(&document)?;

    match &args.out {
        Some(out) => {
            let out_path = PathBuf::from(cwd).join(out);
            fs::write(&out_path, &payload)?;
            println!(
                "  {} {} → {} ({} elements)",
                "✓".green(),
                args.input.display(),
                out.display(),
                document.node_count()
            );
        }
        None => println!("{payload}"),
    }

    Ok(())
}

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

use mailcraft_document::to_saved_json;
use mailcraft_recovery::recover_document;

#[derive(Debug, Args)]
pub struct RecoverArgs {
    /// Raw response transcript to dig a document out of
    pub input: PathBuf,

    /// Output payload file; stdout when omitted
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

pub fn recover(args: RecoverArgs, cwd: &str) -> Result<()> {
    let input_path = PathBuf::from(cwd).join(&args.input);
    let raw = fs::read_to_string(&input_path)?;

    let document = recover_document(&raw)?;
    let payload = to_saved_json(&document)?;

    match &args.out {
        Some(out) => {
            let out_path = PathBuf::from(cwd).join(out);
            fs::write(&out_path, &payload)?;
            println!(
                "  {} Recovered {} elements → {}",
                "✓".green(),
                document.node_count(),
                out.display()
            );
        }
        None => println!("{payload}"),
    }

    Ok(())
}

use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

use mailcraft_document::{to_saved_json, StarterTemplate};

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Where to write the document payload
    pub out: PathBuf,

    /// Starter layout (default, newsletter, announcement)
    #[arg(short, long, default_value = "default")]
    pub template: String,

    /// Overwrite an existing file
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let template = StarterTemplate::from_name(&args.template).ok_or_else(|| {
        let known: Vec<&str> = StarterTemplate::ALL.iter().map(|t| t.name()).collect();
        anyhow!(
            "Unknown template: {}. Use one of: {}",
            args.template,
            known.join(", ")
        )
    })?;

    let out_path = PathBuf::from(cwd).join(&args.out);
    if out_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            args.out.display().to_string().bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let document = template.build();
    fs::write(&out_path, to_saved_json(&document)?)?;

    println!(
        "  {} Created {} ({} template, {} elements)",
        "✓".green(),
        args.out.display(),
        template.name(),
        document.node_count()
    );
    println!();
    println!("Next steps:");
    println!("  1. Edit {} in the editor", args.out.display());
    println!("  2. Run: mailcraft compile {}", args.out.display());

    Ok(())
}

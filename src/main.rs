use anyhow::Result;
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

use guideline_builder::{BuildConfig, BuildStats, GuidelineBuilder};

#[derive(Parser, Debug)]
#[command(author, version, about = "Build the clinical guidelines web app from Word documents")]
struct Cli {
    /// Project directory containing guidelines/, template.html and categories.json
    #[arg(short, long, default_value = ".")]
    project_dir: PathBuf,

    /// YAML build configuration, relative to the project directory
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory of .docx guideline documents
    #[arg(long)]
    guidelines: Option<PathBuf>,

    /// Page template file
    #[arg(long)]
    template: Option<PathBuf>,

    /// Category configuration file
    #[arg(long)]
    categories: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of parallel jobs
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Escape HTML in document text
    #[arg(long)]
    escape_html: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn build_config(&self) -> Result<BuildConfig> {
        let mut config = match &self.config {
            Some(path) => BuildConfig::from_file(&self.project_dir.join(path))?,
            None => BuildConfig::default(),
        };

        if let Some(dir) = &self.guidelines {
            config.guidelines_dir = dir.clone();
        }
        if let Some(template) = &self.template {
            config.template = template.clone();
        }
        if let Some(categories) = &self.categories {
            config.categories = categories.clone();
        }
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if self.jobs.is_some() {
            config.parallel_jobs = self.jobs;
        }
        if self.escape_html {
            config.escape_html = true;
        }

        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    ExitCode::from(exit_status(run(&cli)))
}

/// Report the build outcome. Any error, including an empty guidelines
/// folder or every document failing, exits with 1.
fn exit_status(result: Result<BuildStats>) -> u8 {
    match result {
        Ok(stats) => {
            print_summary(&stats);
            0
        }
        Err(e) => {
            error!("Build failed: {:#}", e);
            1
        }
    }
}

fn run(cli: &Cli) -> Result<BuildStats> {
    let config = cli.build_config()?;
    info!("Clinical Guidelines Builder");

    let builder = GuidelineBuilder::new(config, cli.project_dir.clone())?;
    builder.build()
}

fn print_summary(stats: &BuildStats) {
    println!("{}", "=".repeat(50));
    println!("Build completed successfully!");
    println!("Output: {}", stats.output_path.display());
    println!("Guidelines: {}", stats.guidelines_processed);
    println!("Categories: {}", stats.categories_populated);
    if !stats.failures.is_empty() {
        println!("Skipped documents: {}", stats.failures.len());
        for failure in &stats.failures {
            println!("  - {}: {}", failure.path.display(), failure.reason);
        }
    }

    println!("\nGuidelines by category:");
    for (category, titles) in &stats.summary {
        println!("  {}:", category);
        for title in titles {
            println!("    - {}", title);
        }
    }
}

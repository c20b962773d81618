//! floating-toc: drive the table of contents against a described page layout.
#![allow(clippy::multiple_crate_versions)]

use clap::Parser;
use floating_toc::animation::TICK_MS;
use floating_toc::layout::Layout;
use floating_toc::page::Page;
use floating_toc::{config, Options, Overrides, Result, TableOfContents};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "floating-toc")]
#[command(about = "Simulate a floating table of contents over a page layout", long_about = None)]
struct Args {
    /// Layout TOML describing the root, box and sections
    #[arg(value_name = "LAYOUT")]
    layout: PathBuf,

    /// Widget config TOML (defaults to ./floating-toc.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON overrides using the script option names
    #[arg(long, value_name = "JSON")]
    options: Option<String>,

    /// Apply the documentation page's overrides
    #[arg(long)]
    page_defaults: bool,

    /// First scroll offset of the sweep
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    from: f64,

    /// Last scroll offset of the sweep (defaults to the bottom of the page)
    #[arg(long)]
    to: Option<f64>,

    /// Distance between sweep samples
    #[arg(long, default_value_t = 50.0)]
    step: f64,

    /// Navigate to this section instead of sweeping, printing each animation frame
    #[arg(long, value_name = "INDEX")]
    goto: Option<usize>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let mut cfg = match &args.config {
        Some(path) => config::Config::from_path(path)?,
        None => config::Config::load(),
    };
    if args.page_defaults {
        cfg = cfg.merged(&Overrides::page_defaults());
    }
    if let Some(json) = &args.options {
        cfg = cfg.merged(&Overrides::from_json(json)?);
    }

    let layout = Layout::from_path(&args.layout)?;
    let (page, root) = layout.mount(&cfg);
    let mut toc = TableOfContents::new(&page, root, Options::new(cfg))?;

    if let Some(index) = args.goto {
        let destination = toc.navigate(index)?;
        print_json(&serde_json::json!({
            "tick": 0,
            "scroll_top": page.scroll_top(),
            "destination": destination,
        }))?;
        let mut tick = 0;
        while toc.is_animating() {
            toc.tick(TICK_MS);
            tick += 1;
            print_json(&serde_json::json!({
                "tick": tick,
                "scroll_top": page.scroll_top(),
            }))?;
        }
        print_json(&toc.on_scroll()?)?;
        return Ok(());
    }

    if args.step <= 0.0 {
        return Err(floating_toc::TocError::InvalidOption {
            option: "step",
            reason: "must be positive".to_string(),
        });
    }
    let to = args.to.unwrap_or_else(|| page.max_scroll());
    let mut top = args.from;
    while top <= to {
        page.set_scroll_top(top);
        print_json(&toc.on_scroll()?)?;
        top += args.step;
    }
    Ok(())
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

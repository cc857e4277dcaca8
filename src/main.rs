//! # Pitchpad - Pitch Editor Core Demo
//!
//! Loads a pitch template, applies role/rate substitutions, and prints an
//! annotated rendering of the tracked and derived highlights.
//!
//! ## Quick Start
//!
//! ```bash
//! # Run against the built-in sample
//! cargo run -- --role "Partner" --rate 395
//!
//! # Run against a template file, JSON snapshot out
//! cargo run -- path/to/pitch.txt --rate 250 --json
//! ```

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pitchpad_core::event::EventHandler;
use pitchpad_core::render::MarkupRenderer;
use pitchpad_core::{Config, Editor, OverlaySink, SubstitutionValues};

/// A pitch template grounded in the firm's quick-compose scenarios.
const SAMPLE: &str = "Thank you for your enquiry. I am a [ROLE] and my hourly rate is [RATE]. \
Here you will need to budget [INSERT] for an initial review and advice.

Next steps:
1. Verify your identity
2. Provide the key documents
3. Provide funds on account

Please confirm your instructions by clicking [[Confirm your instructions::https://instruct.example/start]].

Kind regards,
[NAME]
";

/// Pitchpad - editable pitch-text core demo
#[derive(Parser, Debug)]
#[command(name = "pitchpad")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Template file to load (built-in sample if omitted)
    #[arg(value_name = "FILE")]
    template: Option<PathBuf>,

    /// Fee earner role substituted for the role token
    #[arg(long)]
    role: Option<String>,

    /// Raw hourly rate substituted for the rate token
    #[arg(long)]
    rate: Option<String>,

    /// Emit the render snapshot as JSON instead of annotated markup
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    tracing::info!("Starting pitchpad v{}", env!("CARGO_PKG_VERSION"));

    let template = match &args.template {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?,
        None => SAMPLE.to_string(),
    };

    let mut editor = Editor::with_config(template, Config::load());

    // Log editor events as they fire
    let mut handler = EventHandler::new(editor.subscribe());
    let logger = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            tracing::info!(?event, "editor event");
        }
    });

    editor.set_values(SubstitutionValues {
        role: args.role.clone(),
        rate: args.rate.clone(),
    });

    let snapshot = editor.snapshot();
    let metrics = editor.metrics();
    drop(editor);
    logger.await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        let mut sink = MarkupRenderer;
        println!("{}", sink.render(&snapshot, &metrics));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["pitchpad"]);
        assert!(args.template.is_none());
        assert!(!args.json);
    }

    #[test]
    fn test_args_with_values() {
        let args =
            Args::parse_from(["pitchpad", "pitch.txt", "--role", "Partner", "--rate", "395"]);
        assert_eq!(args.template, Some(PathBuf::from("pitch.txt")));
        assert_eq!(args.role.as_deref(), Some("Partner"));
        assert_eq!(args.rate.as_deref(), Some("395"));
    }

    #[test]
    fn test_sample_template_has_tokens() {
        let scan = pitchpad_scan::scan(SAMPLE);
        assert!(!scan.placeholders.is_empty());
        assert_eq!(scan.links.len(), 1);
        assert_eq!(scan.numbered_lines.len(), 3);
    }
}

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use mission_content::{load_content, load_map};
use mission_control::{EventSource, RunReport, ScriptedPlayer, Session, SkirmishPlayer};
use mission_core::{Effect, EffectEnvelope, LabelTarget};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "mission_cli", about = "Campaign mission progression runner")]
struct Cli {
    /// Log filter directive. `MISSION_LOG` takes precedence when set.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a mission in the sandbox until it resolves or time runs out.
    Run {
        #[arg(long, default_value = "./content/cam1a")]
        content_dir: String,
        /// Replay a JSON action script. Mutually exclusive with --seed.
        #[arg(long, conflicts_with = "seed")]
        script: Option<String>,
        /// Autoplay with this seed. Random when neither flag is given.
        #[arg(long, conflicts_with = "script")]
        seed: Option<u64>,
        #[arg(long, default_value_t = 1000)]
        step_ms: u64,
        /// Give up after this much mission time.
        #[arg(long, default_value_t = 1_800_000)]
        max_ms: u64,
        /// Print every effect as it is emitted, not just the milestones.
        #[arg(long)]
        all_effects: bool,
        /// Print the final report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Load a content directory and check its cross-references.
    Validate {
        #[arg(long, default_value = "./content/cam1a")]
        content_dir: String,
    },
}

fn init_logging(directive: &str) {
    let filter =
        EnvFilter::try_from_env("MISSION_LOG").unwrap_or_else(|_| EnvFilter::new(directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

struct RunOptions {
    step_ms: u64,
    max_ms: u64,
    all_effects: bool,
    json: bool,
}

fn run(content_dir: &str, source: &mut impl EventSource, options: &RunOptions) -> Result<()> {
    if options.step_ms == 0 {
        bail!("--step-ms must be greater than zero");
    }
    let content = load_content(content_dir)
        .with_context(|| format!("loading mission content from {content_dir}"))?;
    let map = load_map(content_dir, &content)
        .with_context(|| format!("loading map from {content_dir}"))?;
    let mut session = Session::start(content, &map).context("starting mission")?;
    tracing::debug!(step_ms = options.step_ms, max_ms = options.max_ms, "running mission");

    println!(
        "Starting mission {} (content_version={}) bases={} artifacts={}",
        session.content.mission,
        session.content.content_version,
        session.content.bases.len(),
        session.content.artifacts.items.len(),
    );
    println!("{}", "-".repeat(80));

    let mut print_step = |envelopes: &[EffectEnvelope]| {
        for envelope in envelopes {
            if options.all_effects || is_milestone(&envelope.effect) {
                print_effect(envelope);
            }
        }
    };
    print_step(&session.log);
    let report = session.run_with(source, options.step_ms, options.max_ms, &mut print_step);

    println!("{}", "-".repeat(80));
    if options.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serializing run report")?
        );
    } else {
        print_report(&report);
    }
    Ok(())
}

fn is_milestone(effect: &Effect) -> bool {
    matches!(
        effect,
        Effect::AddMessage { .. }
            | Effect::RemoveMessage { .. }
            | Effect::EnableResearch { .. }
            | Effect::DebugPrint { .. }
            | Effect::LoadLevel { .. }
            | Effect::GameOver { .. }
    )
}

fn print_effect(envelope: &EffectEnvelope) {
    let secs = envelope.time_ms / 1000;
    let millis = envelope.time_ms % 1000;
    let detail = serde_json::to_string(&envelope.effect)
        .unwrap_or_else(|_| format!("{:?}", envelope.effect));
    println!("[t={secs:4}.{millis:03}s  {}]  {detail}", envelope.id);
}

fn print_report(report: &RunReport) {
    let outcome = match report.outcome {
        Some(outcome) => format!("{outcome:?}"),
        None => "unresolved".to_string(),
    };
    let ended = report
        .ended_ms
        .map_or_else(|| "-".to_string(), |ms| format!("{}.{:03}s", ms / 1000, ms % 1000));
    println!(
        "Outcome: {outcome}  ended={ended}  stage={}  artifacts={}  ticks={}  effects={}",
        report.stage, report.artifacts, report.ticks, report.effects_emitted,
    );
}

// ---------------------------------------------------------------------------
// Validate
// ---------------------------------------------------------------------------

fn validate(content_dir: &str) -> Result<()> {
    let content = load_content(content_dir)
        .with_context(|| format!("loading mission content from {content_dir}"))?;
    let map = load_map(content_dir, &content)
        .with_context(|| format!("loading map from {content_dir}"))?;
    let groups = map
        .labels
        .values()
        .filter(|t| matches!(t, LabelTarget::Group { .. }))
        .count();
    println!(
        "{} ({}) OK: {} bases, {} artifacts, {} labels ({groups} groups), {} objects",
        content.mission,
        content.content_version,
        content.bases.len(),
        content.artifacts.items.len(),
        map.labels.len(),
        map.objects.len(),
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);
    match cli.command {
        Commands::Run {
            content_dir,
            script,
            seed,
            step_ms,
            max_ms,
            all_effects,
            json,
        } => {
            let options = RunOptions {
                step_ms,
                max_ms,
                all_effects,
                json,
            };
            if let Some(path) = script {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading script: {path}"))?;
                let mut player = ScriptedPlayer::from_json(&text)
                    .with_context(|| format!("parsing script: {path}"))?;
                run(&content_dir, &mut player, &options)?;
            } else {
                let seed = seed.unwrap_or_else(rand::random);
                println!("Autoplay seed: {seed}");
                run(&content_dir, &mut SkirmishPlayer::new(seed), &options)?;
            }
        }
        Commands::Validate { content_dir } => validate(&content_dir)?,
    }
    Ok(())
}

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use episode_matcher::host::{FolderPicker, FsDirectoryLister, StdinFolderPicker};
use episode_matcher::{
    JobQueue, MatchProfile, MatchSession, Matcher, RuleSet, SequentialIdGenerator,
};

/// Pair reference videos with foreign videos by normalized filename
#[derive(Parser, Debug)]
#[command(name = "episode-matcher")]
#[command(version)]
struct Args {
    /// Folder with the reference videos (output files are named after these)
    #[arg(short, long, env = "EPISODE_MATCHER_REFERENCE")]
    reference: Option<PathBuf>,

    /// Folder with the foreign videos
    #[arg(short, long, env = "EPISODE_MATCHER_FOREIGN")]
    foreign: Option<PathBuf>,

    /// Folder the processed videos are written to
    #[arg(short, long, env = "EPISODE_MATCHER_OUTPUT")]
    output: Option<PathBuf>,

    /// JSON profile with folders, rules and options
    #[arg(short, long)]
    profile: Option<PathBuf>,

    /// Replace the rule list; repeat to add more rules in order
    #[arg(long = "rule")]
    rules: Vec<String>,

    /// Timing adjustment for the first segment, in seconds
    #[arg(long, allow_hyphen_values = true)]
    first_adjust: Option<f64>,

    /// Timing adjustment for the last segment, in seconds
    #[arg(long, allow_hyphen_values = true)]
    last_adjust: Option<f64>,

    /// Do not carry subtitles over to the output
    #[arg(long)]
    skip_subtitles: bool,

    /// Use sequential job ids (job-1, job-2, ...) instead of random UUIDs
    #[arg(long)]
    sequential_ids: bool,

    /// Print the queued work items as JSON
    #[arg(long)]
    json: bool,

    /// Open the interactive terminal UI
    #[arg(long)]
    tui: bool,
}

impl Args {
    fn into_profile(self) -> Result<MatchProfile> {
        let mut profile = match &self.profile {
            Some(path) => MatchProfile::load(path)?,
            None => MatchProfile::default(),
        };

        if let Some(dir) = self.reference {
            profile.folders.reference = Some(dir);
        }
        if let Some(dir) = self.foreign {
            profile.folders.foreign = Some(dir);
        }
        if let Some(dir) = self.output {
            profile.folders.output = Some(dir);
        }
        if !self.rules.is_empty() {
            profile.rules = RuleSet::new(self.rules);
        }
        if self.first_adjust.is_some() {
            profile.options.first_segment_adjust = self.first_adjust;
        }
        if self.last_adjust.is_some() {
            profile.options.last_segment_adjust = self.last_adjust;
        }
        if self.skip_subtitles {
            profile.options.skip_subtitles = Some(true);
        }

        Ok(profile)
    }
}

fn init_tracing(tui: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "episode_matcher=info".into());

    if tui {
        // Keep log lines off the alternate screen.
        let path = std::env::temp_dir().join("episode-matcher.log");
        let file = File::create(&path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.tui)?;

    let tui = args.tui;
    let json = args.json;
    let sequential_ids = args.sequential_ids;
    let mut profile = args.into_profile()?;

    if tui {
        return episode_matcher::tui::run_tui(profile).await;
    }

    let picker = StdinFolderPicker;
    for role in profile.folders.missing() {
        profile.folders.set(role, picker.select_directory(role));
    }

    let matcher = if sequential_ids {
        Matcher::with_id_generator(Box::new(SequentialIdGenerator::new()))
    } else {
        Matcher::new()
    };

    let mut session = MatchSession::with_matcher(FsDirectoryLister, matcher);
    session.folders = profile.folders;
    session.rules = profile.rules;
    session.options = profile.options;

    let outcome = match session.run_match_pass().await {
        Ok(outcome) => outcome,
        Err(e) => {
            println!("✗ {}", e);
            std::process::exit(1);
        }
    };

    println!("Episode Matcher");
    println!("===============");
    for row in &outcome.preview {
        match &row.foreign_name {
            Some(foreign) => println!("✓ {} <- {}  [{}]", row.reference_name, foreign, row.key),
            None => println!("✗ {}  [{}] no match", row.reference_name, row.key),
        }
    }
    println!("===============");
    println!(
        "Summary: {} of {} reference videos matched",
        outcome.matched_count(),
        outcome.preview.len()
    );

    let mut queue = JobQueue::new();
    session.queue_pending(&mut queue);

    if json {
        println!("{}", serde_json::to_string_pretty(queue.items())?);
    } else {
        for item in queue.items() {
            println!(
                "{} [{}] {} + {} -> {}",
                item.id,
                item.status,
                item.reference_video.display(),
                item.foreign_video.display(),
                item.output_video.display()
            );
        }
    }

    if queue.is_empty() {
        println!("ℹ No pairs to queue.");
    }

    Ok(())
}

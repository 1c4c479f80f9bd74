use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use game_core::run_log::load_run_log;
use game_core::snapshot_file::format_hash;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the JSONL run log to replay
    #[arg(short, long)]
    journal: PathBuf,
    /// Fail unless the replay ends on this fingerprint (hex, `0x` prefix optional)
    #[arg(short, long)]
    expect: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log = load_run_log(&args.journal)
        .with_context(|| format!("Failed to load run log: {}", args.journal.display()))?;
    println!(
        "Replaying {} inputs (seed {}, build {})",
        log.journal.inputs.len(),
        log.journal.seed(),
        log.journal.build_id
    );

    let engine = log.verify().context("Replay did not reproduce the recorded run")?;

    let fingerprint = format_hash(engine.snapshot_hash());
    println!("Replay complete; every checkpoint matched.");
    println!("Inputs applied: {}", log.journal.inputs.len());
    println!("Final level: {}", engine.level());
    println!("Outcome: {:?}", engine.outcome());
    println!("Snapshot hash: {fingerprint}");

    if let Some(expected) = args.expect {
        let expected = u64::from_str_radix(expected.trim_start_matches("0x"), 16)
            .with_context(|| format!("--expect is not a hex fingerprint: {expected}"))?;
        ensure!(
            engine.snapshot_hash() == expected,
            "fingerprint mismatch: expected {}, replay produced {fingerprint}",
            format_hash(expected)
        );
    }

    Ok(())
}

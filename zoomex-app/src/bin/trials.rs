//! Headless batch runner: drives automated trials with the always-converge
//! policy and writes one CSV record per completed trial to stdout, ready to
//! pipe into `zoomex-analyze`.

use anyhow::Result;
use zoomex_core::TrialRecord;
use zoomex_experiment::{ExperimentConfig, driver, run_batch};

fn main() -> Result<()> {
    let config = ExperimentConfig::default();
    let mut trials = config.batch_trials;
    let mut json = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--trials" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--trials requires a count"))?;
                trials = value.parse()?;
            }
            "--json" => json = true,
            other => anyhow::bail!("unknown argument {other:?}; expected --trials <n> or --json"),
        }
    }

    eprintln!("Running {trials} automated trials...");
    let records = run_batch(trials, config, rand::rng());
    eprintln!("All trials completed ({} recorded).", records.len());

    if json {
        println!("{}", driver::records_to_json(&records)?);
    } else {
        println!("{}", TrialRecord::CSV_HEADER);
        for record in &records {
            println!("{}", record.to_csv_row());
        }
    }

    Ok(())
}

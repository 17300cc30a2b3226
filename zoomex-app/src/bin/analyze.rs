//! Analysis step: reads trial CSV from stdin and prints descriptive
//! statistics, the move-count histogram, and the Fitts's-Law difficulty
//! table. Usage: `zoomex-trials | zoomex-analyze`.

use anyhow::{Result, bail};
use std::io::Read;
use zoomex_analysis::{parse_records, render_report};

fn main() -> Result<()> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;

    if input.trim().is_empty() {
        bail!("no data on stdin; pipe the trial results: zoomex-trials | zoomex-analyze");
    }

    let records = parse_records(&input);
    if records.is_empty() {
        bail!("failed to parse any trial records");
    }

    eprintln!("Parsed {} trial records.", records.len());
    print!("{}", render_report(&records));
    Ok(())
}

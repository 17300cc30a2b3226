pub mod fitts;
pub mod stats;

pub use fitts::{DifficultyGroup, difficulty_table, index_of_difficulty};
pub use stats::{DescriptiveStats, frequency_distribution};

use zoomex_core::TrialRecord;

/// Parses trial records out of CSV text. The first line is the header;
/// columns are matched by name, so column order does not matter. Lines that
/// do not yield a `moves` value are skipped.
pub fn parse_records(csv: &str) -> Vec<TrialRecord> {
    let mut lines = csv.trim().lines();
    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let header: Vec<&str> = header_line.split(',').map(str::trim).collect();

    let column = |name: &str| header.iter().position(|h| *h == name);
    let trial_col = column("trial");
    let moves_col = column("moves");
    let distance_col = column("initial_distance");
    let width_col = column("target_width");
    let moved_col = column("percentage_moved");

    let mut records = Vec::new();
    for (line_number, line) in lines.enumerate() {
        let values: Vec<&str> = line.split(',').map(str::trim).collect();
        let float_at = |col: Option<usize>| {
            col.and_then(|i| values.get(i))
                .and_then(|v| v.parse::<f64>().ok())
        };

        let Some(moves) = float_at(moves_col) else {
            continue;
        };

        records.push(TrialRecord {
            trial: float_at(trial_col).map(|t| t as usize).unwrap_or(line_number + 1),
            moves: moves as u32,
            initial_distance: float_at(distance_col).unwrap_or(0.0),
            target_width: float_at(width_col).unwrap_or(0.0),
            percentage_moved: float_at(moved_col).unwrap_or(0.0),
        });
    }

    records
}

/// Renders the full plain-text report: descriptive statistics, the
/// frequency-distribution histogram, and the Fitts's-Law difficulty table.
pub fn render_report(records: &[TrialRecord]) -> String {
    let mut out = String::new();
    let moves: Vec<u32> = records.iter().map(|r| r.moves).collect();

    out.push_str("--- Descriptive Statistics (Moves) ---\n");
    match DescriptiveStats::from_moves(&moves) {
        Some(stats) => {
            out.push_str(&format!("Total Trials:   {}\n", stats.count));
            out.push_str(&format!("Mean:           {:.2}\n", stats.mean));
            out.push_str(&format!("Median:         {}\n", stats.median));
            let modes: Vec<String> = stats.modes.iter().map(u32::to_string).collect();
            out.push_str(&format!("Mode(s):        {}\n", modes.join(", ")));
            out.push_str(&format!("Min:            {}\n", stats.min));
            out.push_str(&format!("Max:            {}\n", stats.max));
            out.push_str(&format!("Std. Deviation: {:.2}\n", stats.std_dev));
        }
        None => out.push_str("(no trials)\n"),
    }

    out.push_str("\n--- Frequency Distribution (Moves) ---\n");
    out.push_str(&render_histogram(&moves));

    out.push_str("\n--- Fitts's Law Analysis (ID vs. Avg. Moves) ---\n");
    let groups = difficulty_table(records);
    if groups.is_empty() {
        out.push_str("(no records with distance/width data)\n");
    } else {
        out.push_str("ID | Trials | Avg. Moves\n");
        for group in groups {
            out.push_str(&format!(
                "{:>2} | {:>6} | {:>10.2}\n",
                group.id, group.trials, group.avg_moves
            ));
        }
    }

    out
}

const MAX_BAR_LENGTH: usize = 40;

fn render_histogram(moves: &[u32]) -> String {
    let frequencies = frequency_distribution(moves);
    let Some(max_count) = frequencies.values().copied().max() else {
        return "(no trials)\n".to_string();
    };

    let mut out = String::new();
    for (value, count) in frequencies {
        let bar_length =
            ((count as f64 / max_count as f64) * MAX_BAR_LENGTH as f64).round() as usize;
        out.push_str(&format!(
            "{:>2} | {} ({})\n",
            value,
            "\u{2588}".repeat(bar_length),
            count
        ));
    }
    out
}

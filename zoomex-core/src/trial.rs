use serde::{Deserialize, Serialize};

/// Recorded result per completed trial. This is the record format the
/// analysis side consumes: `moves` for the performance measure,
/// `initial_distance` and `target_width` for Index-of-Difficulty grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub trial: usize,
    pub moves: u32,
    pub initial_distance: f64,
    pub target_width: f64,
    pub percentage_moved: f64,
}

impl TrialRecord {
    pub const CSV_HEADER: &'static str = "trial,moves,initial_distance,target_width,percentage_moved";

    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{:.4},{:.4},{:.4}",
            self.trial, self.moves, self.initial_distance, self.target_width, self.percentage_moved
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_row_matches_header_arity() {
        let record = TrialRecord {
            trial: 7,
            moves: 4,
            initial_distance: 512.5,
            target_width: 51.2,
            percentage_moved: 42.1234,
        };

        let row = record.to_csv_row();
        assert_eq!(
            row.split(',').count(),
            TrialRecord::CSV_HEADER.split(',').count()
        );
        assert!(row.starts_with("7,4,512.5000,51.2000,"));
    }
}

use std::collections::BTreeMap;

use zoomex_core::TrialRecord;

/// Shannon formulation of the Index of Difficulty: `log2(D / W + 1)`.
pub fn index_of_difficulty(distance: f64, width: f64) -> f64 {
    (distance / width + 1.0).log2()
}

/// One row of the difficulty table: trials grouped by rounded ID.
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyGroup {
    pub id: i64,
    pub trials: usize,
    pub avg_moves: f64,
}

/// Groups trials by their Index of Difficulty rounded to the nearest
/// integer and averages each group's move counts. Records without
/// distance/width data are left out.
pub fn difficulty_table(records: &[TrialRecord]) -> Vec<DifficultyGroup> {
    let mut grouped: BTreeMap<i64, Vec<u32>> = BTreeMap::new();

    for record in records {
        if record.target_width <= 0.0 {
            continue;
        }
        let id = index_of_difficulty(record.initial_distance, record.target_width);
        grouped.entry(id.round() as i64).or_default().push(record.moves);
    }

    grouped
        .into_iter()
        .map(|(id, moves)| DifficultyGroup {
            id,
            trials: moves.len(),
            avg_moves: moves.iter().map(|&m| m as f64).sum::<f64>() / moves.len() as f64,
        })
        .collect()
}

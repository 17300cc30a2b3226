use std::collections::BTreeMap;

/// Descriptive statistics over the per-trial move counts.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// All values sharing the highest frequency, ascending.
    pub modes: Vec<u32>,
    pub min: u32,
    pub max: u32,
    /// Population standard deviation.
    pub std_dev: f64,
}

impl DescriptiveStats {
    pub fn from_moves(moves: &[u32]) -> Option<Self> {
        if moves.is_empty() {
            return None;
        }

        let mut sorted = moves.to_vec();
        sorted.sort_unstable();
        let n = sorted.len();

        let mean = sorted.iter().map(|&m| m as f64).sum::<f64>() / n as f64;

        let mid = n / 2;
        let median = if n % 2 == 0 {
            (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
        } else {
            sorted[mid] as f64
        };

        let frequencies = frequency_distribution(&sorted);
        let max_frequency = frequencies.values().copied().max().unwrap_or(0);
        let modes: Vec<u32> = frequencies
            .iter()
            .filter(|&(_, &count)| count == max_frequency)
            .map(|(&value, _)| value)
            .collect();

        let variance = sorted
            .iter()
            .map(|&m| (m as f64 - mean).powi(2))
            .sum::<f64>()
            / n as f64;

        Some(Self {
            count: n,
            mean,
            median,
            modes,
            min: sorted[0],
            max: sorted[n - 1],
            std_dev: variance.sqrt(),
        })
    }
}

/// Move-count frequencies in ascending value order.
pub fn frequency_distribution(moves: &[u32]) -> BTreeMap<u32, usize> {
    let mut frequencies = BTreeMap::new();
    for &value in moves {
        *frequencies.entry(value).or_insert(0) += 1;
    }
    frequencies
}

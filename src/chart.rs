//! Observed-versus-ideal distribution for bar charts.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdealRounding {
    #[default]
    Exact,
    Ceil,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub value: u32,
    pub count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ideal: Option<f64>,
}

/// One point per face `1..=sides`. `ideal` is absent when there are no rolls.
pub fn distribution(rolls: &[u32], sides: u32, rounding: IdealRounding) -> Vec<ChartPoint> {
    let mut counts = vec![0u64; sides as usize];
    for &r in rolls {
        if let Some(c) = (r as usize).checked_sub(1).and_then(|i| counts.get_mut(i)) {
            *c += 1;
        }
    }

    let total: u64 = counts.iter().sum();
    let ideal = (total > 0 && sides > 0).then(|| {
        let f = total as f64 / sides as f64;
        match rounding {
            IdealRounding::Exact => f,
            IdealRounding::Ceil => f.ceil(),
        }
    });

    (1..=sides)
        .zip(counts)
        .map(|(value, count)| ChartPoint {
            value,
            count,
            ideal,
        })
        .collect()
}

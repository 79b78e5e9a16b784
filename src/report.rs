use crate::{
    bias::{self, BiasReport},
    chart::{self, ChartPoint},
    config::Config,
    dice_set::{DiceSet, Die},
    rolls,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DieReport {
    pub die: String,
    pub sides: u32,
    pub total_rolls: usize,
    pub skipped_out_of_range: usize,
    pub distribution: Vec<ChartPoint>,
    /// `None` when there are no in-range rolls to test.
    pub bias: Option<BiasReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetReport {
    pub set: String,
    pub generated_at: String,
    pub dice: Vec<DieReport>,
}

impl DieReport {
    pub fn build(name: &str, sides: u32, raw: &[i64], cfg: &Config) -> Result<Self> {
        let filtered = rolls::filter_in_range(raw, sides);
        let distribution = chart::distribution(&filtered.rolls, sides, cfg.chart.ideal_rounding);
        let bias = bias::analyze_with(&filtered.rolls, sides, &cfg.analysis.thresholds())
            .with_context(|| format!("analyzing die {name}"))?;

        Ok(Self {
            die: name.to_string(),
            sides,
            total_rolls: filtered.rolls.len(),
            skipped_out_of_range: filtered.out_of_range,
            distribution,
            bias,
        })
    }

    pub fn for_die(die: &Die, cfg: &Config) -> Result<Self> {
        Self::build(&die.name, die.sides, &die.rolls, cfg)
    }
}

impl SetReport {
    pub fn build(set: &DiceSet, only: Option<&str>, cfg: &Config) -> Result<Self> {
        let dice = match only {
            Some(name) => vec![DieReport::for_die(set.die(name)?, cfg)?],
            None => set
                .dice_by_sides()
                .into_iter()
                .map(|d| DieReport::for_die(d, cfg))
                .collect::<Result<Vec<_>>>()?,
        };

        Ok(Self {
            set: set.name.clone(),
            generated_at: crate::util::now_rfc3339(),
            dice,
        })
    }
}

pub fn to_json<T: Serialize>(value: &T, cfg: &Config) -> Result<String> {
    let s = if cfg.output.pretty_json {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(s)
}

pub fn render_set_text(report: &SetReport, bar_width: usize) -> String {
    let mut out = format!("Set: {} ({})\n", report.set, report.generated_at);
    for die in &report.dice {
        out.push('\n');
        out.push_str(&render_text(die, bar_width));
    }
    out
}

pub fn render_text(report: &DieReport, bar_width: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} (d{}): {} rolls",
        report.die, report.sides, report.total_rolls
    );
    if report.skipped_out_of_range > 0 {
        let _ = writeln!(
            out,
            "  ignored {} out-of-range values",
            report.skipped_out_of_range
        );
    }

    let max = report
        .distribution
        .iter()
        .map(|p| p.count)
        .max()
        .unwrap_or(0)
        .max(1);
    let width = report.sides.to_string().len();
    for p in &report.distribution {
        let len = (p.count as f64 / max as f64 * bar_width as f64).round() as usize;
        let _ = write!(out, "  {:>width$} | {:<bar_width$} {}", p.value, "#".repeat(len), p.count);
        if let Some(ideal) = p.ideal {
            let _ = write!(out, " (ideal {ideal:.2})");
        }
        out.push('\n');
    }

    let Some(bias) = &report.bias else {
        out.push_str("  no statistics available\n");
        return out;
    };

    let _ = writeln!(
        out,
        "  chi-squared {:.4}  p-value {:.6}  Cramér's V {:.4}  TVD {:.4}",
        bias.chi_squared, bias.p_value, bias.cramers_v, bias.total_variation_distance
    );
    let verdict = if bias.small_sample_warning {
        "inconclusive (sample too small)"
    } else if bias.is_biased {
        "BIASED"
    } else {
        "no evidence of bias"
    };
    let _ = writeln!(out, "  verdict: {verdict}");

    let _ = writeln!(
        out,
        "  {:>width$}  {:>8}  {:>9}  {:>7}  {:>8}",
        "face", "observed", "expected", "p(face)", "residual"
    );
    for f in &bias.per_face_stats {
        let _ = writeln!(
            out,
            "  {:>width$}  {:>8}  {:>9.2}  {:>7.4}  {:>+8.3}",
            f.face,
            f.observed_frequency,
            f.expected_frequency,
            f.estimated_probability,
            f.standardized_residual
        );
    }
    out
}

//! Formatted terminal output.
//!
//! Formatting lives in one place so the solver and evaluation code stay free
//! of presentation concerns.

use crate::domain::{DataConfig, DataKind, Dataset, SelectionSummary};
use crate::fit::{SweepEntry, Termination};
use crate::math::snr_db;
use crate::report::{BaselineReport, IhtReport, summarize};

/// Dataset header: shape, sparsity, and SNR.
pub fn format_dataset_summary(dataset: &Dataset, config: &DataConfig) -> String {
    let mut out = String::new();

    out.push_str("=== fes - sparse feature selection ===\n");
    let kind = match config.kind {
        DataKind::Sparse => "sparse".to_string(),
        DataKind::Grouped => format!("grouped ({} groups)", config.num_groups.unwrap_or(0)),
    };
    out.push_str(&format!("Data: {kind} | fill={:?}", config.fill));
    if let Some(d) = config.poly_degree {
        out.push_str(&format!(" | poly_degree={d}"));
    }
    out.push('\n');
    out.push_str(&format!(
        "Shape: n={} m={} | informative={} | noise_std={:.3} | SNR={:.2} dB\n",
        dataset.n(),
        dataset.m(),
        dataset.informative_count(),
        config.noise_std,
        snr_db(&dataset.y_true, config.noise_std),
    ));
    out
}

/// Solver outcome followed by the selection quality.
pub fn format_iht_report(report: &IhtReport) -> String {
    let mut out = String::new();
    let fit = &report.fit;
    let cfg = &report.config;

    out.push_str("\nIHT:\n");
    out.push_str(&format!(
        "- k={} tol={:.1e} max_iter={} max_backtrack={}\n",
        cfg.k, cfg.tol, cfg.max_iter, cfg.max_backtrack
    ));
    let how = match fit.termination {
        Termination::Converged => "converged",
        Termination::Stationary => "stationary (gradient vanished on the support)",
    };
    out.push_str(&format!("- {how} after {} iterations, loss={:.4}\n", fit.iterations, fit.loss));
    if fit.exhausted_backtracks > 0 {
        out.push_str(&format!(
            "- backtracking budget exhausted in {} iterations\n",
            fit.exhausted_backtracks
        ));
    }
    out.push_str(&format!("- support: {}\n", fmt_indices(&fit.support_indices())));
    out.push('\n');
    out.push_str(&format_summaries(std::slice::from_ref(&report.summary)));
    out
}

/// Baseline selections next to the noise floor.
pub fn format_baseline_report(report: &BaselineReport) -> String {
    let mut out = String::new();
    out.push_str("\nOLS + permutation importance:\n");
    out.push_str(&format!(
        "- explanation rate {:.3} keeps {} features\n",
        report.explanation_rate, report.explained.n_features
    ));
    out.push('\n');
    out.push_str(&format_summaries(&[
        report.noise_floor.clone(),
        report.top.clone(),
        report.explained.clone(),
    ]));
    out
}

/// One row per selection.
pub fn format_summaries(rows: &[SelectionSummary]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<24} {:>12} {:>8} {:>6} {:>6} {:>6}",
            "selection", "mse", "r2", "feat", "tp", "fp"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(&format!(
        "{:-<24} {:-<12} {:-<8} {:-<6} {:-<6} {:-<6}\n",
        "", "", "", "", "", ""
    ));

    for r in rows {
        out.push_str(
            format!(
                "{:<24} {:>12.3} {:>8.3} {:>6} {:>6} {:>6}",
                truncate(&r.label, 24),
                r.mse,
                r.r2,
                r.n_features,
                r.true_positives,
                r.false_positives,
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

/// Loss and selection quality for every `k` of a sweep.
pub fn format_sweep(entries: &[SweepEntry], dataset: &Dataset) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "\nSweep over k (true informative count: {}):\n",
        dataset.informative_count()
    ));
    out.push_str(&format!(
        "{:>4} {:>6} {:>12} {:>12} {:>8} {:>6} {:>6}\n",
        "k", "iters", "loss", "mse", "r2", "tp", "fp"
    ));
    out.push_str(&format!(
        "{:-<4} {:-<6} {:-<12} {:-<12} {:-<8} {:-<6} {:-<6}\n",
        "", "", "", "", "", "", ""
    ));

    for entry in entries {
        match &entry.result {
            Ok(fit) => {
                let s = summarize("", dataset, &fit.weights, &fit.support_indices());
                out.push_str(&format!(
                    "{:>4} {:>6} {:>12.4} {:>12.3} {:>8.3} {:>6} {:>6}\n",
                    entry.k, fit.iterations, fit.loss, s.mse, s.r2, s.true_positives, s.false_positives
                ));
            }
            Err(e) => out.push_str(&format!("{:>4} failed: {e}\n", entry.k)),
        }
    }
    out
}

fn fmt_indices(v: &[usize]) -> String {
    let parts: Vec<String> = v.iter().map(|i| i.to_string()).collect();
    format!("[{}]", parts.join(", "))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

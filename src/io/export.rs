//! JSON export of a run.
//!
//! The export carries the configuration and seed needed to reproduce the run,
//! the ground truth, and whatever the command computed (IHT fit, baseline,
//! or a sweep table).

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Dataset, RunConfig, SelectionSummary};
use crate::error::{AppError, EXIT_INPUT};
use crate::fit::{IterationRecord, SweepEntry, Termination};
use crate::report::{BaselineReport, IhtReport};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    /// Seed actually used, also when the config left it unset.
    pub seed: u64,
    pub config: RunConfig,
    pub truth: TruthExport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iht: Option<IhtExport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<BaselineExport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sweep: Vec<SweepExport>,
}

impl ExportFile {
    pub fn new(seed: u64, config: &RunConfig, dataset: &Dataset) -> Self {
        Self {
            tool: "fes".to_string(),
            generated_at: Utc::now(),
            seed,
            config: config.clone(),
            truth: TruthExport::from(dataset),
            iht: None,
            baseline: None,
            sweep: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruthExport {
    pub n: usize,
    pub m: usize,
    pub w_true: Vec<f64>,
    pub informative: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_labels: Option<Vec<usize>>,
}

impl From<&Dataset> for TruthExport {
    fn from(ds: &Dataset) -> Self {
        Self {
            n: ds.n(),
            m: ds.m(),
            w_true: ds.w_true.iter().copied().collect(),
            informative: (0..ds.m()).filter(|&j| ds.features_mask[j]).collect(),
            group_labels: ds.group_labels.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IhtExport {
    pub k: usize,
    pub termination: Termination,
    pub iterations: usize,
    pub loss: f64,
    pub exhausted_backtracks: usize,
    pub weights: Vec<f64>,
    pub support: Vec<usize>,
    pub summary: SelectionSummary,
    pub history: Vec<IterationRecord>,
}

impl From<&IhtReport> for IhtExport {
    fn from(r: &IhtReport) -> Self {
        Self {
            k: r.config.k,
            termination: r.fit.termination,
            iterations: r.fit.iterations,
            loss: r.fit.loss,
            exhausted_backtracks: r.fit.exhausted_backtracks,
            weights: r.fit.weights.iter().copied().collect(),
            support: r.fit.support_indices(),
            summary: r.summary.clone(),
            history: r.fit.history.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineExport {
    pub coef: Vec<f64>,
    pub importances_mean: Vec<f64>,
    pub importances_std: Vec<f64>,
    pub scores: Vec<f64>,
    pub explanation_rate: f64,
    pub noise_floor: SelectionSummary,
    pub top: SelectionSummary,
    pub explained: SelectionSummary,
}

impl From<&BaselineReport> for BaselineExport {
    fn from(r: &BaselineReport) -> Self {
        Self {
            coef: r.coef.iter().copied().collect(),
            importances_mean: r.importances.mean.clone(),
            importances_std: r.importances.std.clone(),
            scores: r.scores.clone(),
            explanation_rate: r.explanation_rate,
            noise_floor: r.noise_floor.clone(),
            top: r.top.clone(),
            explained: r.explained.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepExport {
    pub k: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loss: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support: Option<Vec<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&SweepEntry> for SweepExport {
    fn from(e: &SweepEntry) -> Self {
        match &e.result {
            Ok(fit) => Self {
                k: e.k,
                iterations: Some(fit.iterations),
                loss: Some(fit.loss),
                support: Some(fit.support_indices()),
                error: None,
            },
            Err(err) => Self {
                k: e.k,
                iterations: None,
                loss: None,
                support: None,
                error: Some(err.to_string()),
            },
        }
    }
}

/// Write an export JSON file.
pub fn write_export_json(path: &Path, export: &ExportFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to create export JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, export)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write export JSON: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IhtError;
    use crate::fit::{IhtConfig, solve};
    use nalgebra::{DMatrix, DVector};

    fn read_export_json(path: &Path) -> ExportFile {
        serde_json::from_reader(File::open(path).unwrap()).unwrap()
    }

    fn dataset() -> Dataset {
        let x = DMatrix::<f64>::identity(4, 4);
        let w_true = DVector::from_vec(vec![0.0, 3.0, 0.0, -1.0]);
        let y_true = &x * &w_true;
        Dataset {
            y: y_true.clone(),
            x,
            w_true,
            y_true,
            features_mask: vec![false, true, false, true],
            group_labels: None,
        }
    }

    #[test]
    fn export_survives_a_file_round_trip() {
        let ds = dataset();
        let fit = solve(&ds.x, &ds.y, &IhtConfig::with_k(2)).unwrap();
        let mut export = ExportFile::new(5, &RunConfig::default(), &ds);
        export.sweep = vec![
            SweepExport::from(&SweepEntry { k: 2, result: Ok(fit) }),
            SweepExport::from(&SweepEntry {
                k: 9,
                result: Err(IhtError::InvalidParameters("k=9 exceeds the number of features m=4".to_string())),
            }),
        ];

        let path = std::env::temp_dir().join(format!("fes-export-{}.json", std::process::id()));
        write_export_json(&path, &export).unwrap();
        let back = read_export_json(&path);
        std::fs::remove_file(&path).ok();

        assert_eq!(back, export);
        assert_eq!(back.truth.informative, vec![1, 3]);
        assert_eq!(back.sweep[0].support, Some(vec![1, 3]));
        assert!(back.sweep[1].error.as_deref().unwrap().contains("k=9"));
        assert!(back.iht.is_none());
    }
}

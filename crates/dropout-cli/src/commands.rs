//! The run driven by the CLI switches.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use tracing::{info, info_span, warn};

use dropout_analysis::{ExploreSummary, OlsFit, explore, fit_ols};
use dropout_core::{PipelineOptions, run_pipeline};
use dropout_ingest::FlatFileSource;
use dropout_model::{PipelineReport, TableSchema};
use dropout_output::{
    HoldoutSplit, SnapshotContext, TESTING_PREFIX, TRAINING_PREFIX, holdout_split, read_snapshot,
    read_vocabularies, snapshot_path, write_partitions, write_snapshot,
};

use crate::cli::Cli;
use crate::config::DropoutConfig;

/// Stem of the full-table snapshot and suffix of its partitions.
pub const DATA_STEM: &str = "data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableOrigin {
    Assembled { source_dir: PathBuf },
    Loaded { path: PathBuf },
}

#[derive(Debug, Clone)]
pub struct SavedFiles {
    pub snapshot: PathBuf,
    pub training: PathBuf,
    pub testing: PathBuf,
}

#[derive(Debug, Clone)]
pub struct FitOutcome {
    pub fit: OlsFit,
    /// Which rows the fit used.
    pub fitted_on: &'static str,
    pub test_r_squared: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub origin: TableOrigin,
    pub rows: usize,
    pub columns: usize,
    pub report: Option<PipelineReport>,
    pub split: Option<(usize, usize)>,
    pub saved: Option<SavedFiles>,
    pub explore: Option<ExploreSummary>,
    pub fit: Option<FitOutcome>,
}

/// A modeling table in memory, however it was obtained.
struct TableData {
    origin: TableOrigin,
    frame: DataFrame,
    schema: TableSchema,
    report: Option<PipelineReport>,
    partitions: Option<HoldoutSplit>,
    saved: Option<SavedFiles>,
}

/// Runs the requested stages. `Ok(None)` means neither a load nor a fetch
/// was requested.
pub fn run(cli: &Cli) -> Result<Option<RunOutcome>> {
    let mut config = DropoutConfig::load(cli.config.as_deref())?;
    config.apply_cli(cli);

    let data = if let Some(path) = &cli.loaddata {
        if cli.getdata {
            warn!("--loaddata takes precedence over --getdata");
        }
        if cli.savedata {
            warn!("--savedata has no effect when loading a snapshot");
        }
        load_table(path)?
    } else if cli.getdata {
        assemble_table(cli, &config)?
    } else {
        return Ok(None);
    };

    let summary = if cli.plot {
        let _span = info_span!("explore").entered();
        Some(
            explore(&data.frame, &data.schema, config.analysis.histogram_bins)
                .context("summarize modeling table")?,
        )
    } else {
        None
    };

    let fit = if cli.fit {
        let _span = info_span!("fit").entered();
        Some(fit_table(&data)?)
    } else {
        None
    };

    Ok(Some(RunOutcome {
        origin: data.origin,
        rows: data.frame.height(),
        columns: data.frame.width(),
        report: data.report,
        split: data
            .partitions
            .as_ref()
            .map(|split| (split.training.height(), split.testing.height())),
        saved: data.saved,
        explore: summary,
        fit,
    }))
}

fn fit_table(data: &TableData) -> Result<FitOutcome> {
    match &data.partitions {
        Some(split) => {
            let fit = fit_ols(&split.training, &data.schema).context("fit training partition")?;
            let test_r_squared = fit
                .r_squared_on(&split.testing)
                .context("score testing partition")?;
            Ok(FitOutcome {
                fit,
                fitted_on: TRAINING_PREFIX,
                test_r_squared,
            })
        }
        None => Ok(FitOutcome {
            fit: fit_ols(&data.frame, &data.schema).context("fit modeling table")?,
            fitted_on: "all rows",
            test_r_squared: None,
        }),
    }
}

/// `testing_<suffix>.arrow` next to a `training_<suffix>.arrow` file.
pub fn sibling_testing_path(path: &Path) -> Option<PathBuf> {
    let stem = path.file_stem()?.to_str()?;
    let suffix = stem.strip_prefix(&format!("{TRAINING_PREFIX}_"))?;
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    Some(snapshot_path(dir, &format!("{TESTING_PREFIX}_{suffix}")))
}

fn load_table(path: &Path) -> Result<TableData> {
    let _span = info_span!("load", path = %path.display()).entered();
    let snapshot =
        read_snapshot(path).with_context(|| format!("load snapshot {}", path.display()))?;
    let schema = snapshot.manifest.schema();

    let partitions = match sibling_testing_path(path).filter(|testing| testing.is_file()) {
        Some(testing) => {
            info!(testing = %testing.display(), "found matching testing partition");
            let testing = read_snapshot(&testing)
                .with_context(|| format!("load snapshot {}", testing.display()))?;
            Some(HoldoutSplit {
                training: snapshot.frame.clone(),
                testing: testing.frame,
            })
        }
        None => None,
    };

    Ok(TableData {
        origin: TableOrigin::Loaded {
            path: path.to_path_buf(),
        },
        frame: snapshot.frame,
        schema,
        report: snapshot.manifest.report,
        partitions,
        saved: None,
    })
}

fn assemble_table(cli: &Cli, config: &DropoutConfig) -> Result<TableData> {
    let _span = info_span!("getdata", source = %config.source.dir.display()).entered();

    let vocabularies = cli
        .vocabulary
        .as_deref()
        .map(read_vocabularies)
        .transpose()
        .context("load prior vocabularies")?;
    let source = FlatFileSource::new(&config.source.dir)
        .with_extension(config.source.extension.as_str())
        .with_delimiter(config.delimiter()?);
    let options = PipelineOptions {
        top_k: config.features.top_k,
        max_drop_ratio: config.assembly.max_drop_ratio,
        vocabularies,
    };

    let output = run_pipeline(&source, &options)?;
    let frame = output.to_frame()?;
    let split = holdout_split(&frame, config.split.test_fraction, config.split.seed)
        .context("split modeling table")?;

    let saved = if cli.savedata {
        let context = SnapshotContext {
            schema: &output.table.schema,
            vocabularies: &output.table.vocabularies,
            report: Some(&output.report),
        };
        let snapshot = snapshot_path(&config.output.dir, DATA_STEM);
        write_snapshot(&snapshot, &frame, context)
            .with_context(|| format!("save snapshot {}", snapshot.display()))?;
        let files = write_partitions(&config.output.dir, DATA_STEM, &split, context)
            .context("save partitions")?;
        Some(SavedFiles {
            snapshot,
            training: files.training,
            testing: files.testing,
        })
    } else {
        None
    };

    Ok(TableData {
        origin: TableOrigin::Assembled {
            source_dir: config.source.dir.clone(),
        },
        frame,
        schema: output.table.schema,
        report: Some(output.report),
        partitions: Some(split),
        saved,
    })
}

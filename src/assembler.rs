/*!
This module orchestrates one classification report per group of the dataset plus one report
over the whole dataset, tags every resulting row with its group identifier and concatenates
everything into a single long-form table. The assembly is a pure fold over an immutable
dataset: each group's computation is independent of the others.
*/
use crate::dataset::{Dataset, LabeledRecord};
use crate::metrics::{classification_report, ComputationError, DivByZeroStrat};
use crate::reporter::{Average, Metric, Reporter};
use ahash::{random_state::RandomState, HashMap as AHashMap};
use enum_iterator::all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Display;

/// Group identifier stamped on the rows of the whole-dataset run.
pub const DEFAULT_OVERALL_TAG: &str = "all_countries";

/// A column of the assembled table: one of the classes, or one of the aggregate columns the
/// reference classification report carries next to them.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportColumn {
    Class(String),
    Accuracy,
    MacroAvg,
    WeightedAvg,
}

impl Display for ReportColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Class(name) => write!(f, "{}", name),
            Self::Accuracy => write!(f, "accuracy"),
            Self::MacroAvg => write!(f, "macro avg"),
            Self::WeightedAvg => write!(f, "weighted avg"),
        }
    }
}

/// One cell of the long-form result table: the value of one metric, for one column, in one
/// group's report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub group: String,
    pub metric: Metric,
    pub column: ReportColumn,
    pub value: f32,
}

/// The MetricRow struct acts as a line in a dataframe when displayed.
impl Display for MetricRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}",
            self.group, self.metric, self.column, self.value
        )
    }
}

/// The assembled long-form table: the per-group rows in sorted group order, then the rows of
/// the whole-dataset run, exactly once. Also carries the set of groups whose report hit a zero
/// denominator, so a substituted 0 stays distinguishable from a genuine 0 score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    rows: Vec<MetricRow>,
    degenerate_groups: BTreeSet<String>,
}

impl ResultTable {
    pub fn rows(&self) -> &[MetricRow] {
        &self.rows
    }

    /// The rows of a single metric, in table order. The visualization side of the original
    /// analysis consumes the `f1-score` rows.
    pub fn rows_for_metric(&self, metric: Metric) -> impl Iterator<Item = &MetricRow> {
        self.rows.iter().filter(move |r| r.metric == metric)
    }

    pub fn degenerate_groups(&self) -> &BTreeSet<String> {
        &self.degenerate_groups
    }

    pub fn is_degenerate(&self, group: &str) -> bool {
        self.degenerate_groups.contains(group)
    }
}

/// The ResultTable struct acts as a dataframe when displayed.
impl Display for ResultTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Group, Metric, Column, Value")?;
        for row in self.rows.iter() {
            writeln!(f, "{}", row)?
        }
        Ok(())
    }
}

/// Computes one classification report per distinct `group_key` value (when `grouped` is true)
/// plus one report over the full dataset tagged with `overall_tag`, and concatenates the tagged
/// rows into a `ResultTable`.
///
/// Group iteration happens in sorted key order, so the output is reproducible for a given
/// input. Records without a `group_key` only take part in the whole-dataset run. A degenerate
/// group (a single class, one record, ...) yields zero-substituted rows and lands in
/// `degenerate_groups` instead of aborting the run.
pub fn grouped_classification_report(
    dataset: &Dataset,
    grouped: bool,
    zero_division: DivByZeroStrat,
    parallel: bool,
    overall_tag: &str,
) -> Result<ResultTable, ComputationError> {
    let mut rows = Vec::new();
    let mut degenerate_groups = BTreeSet::new();
    if grouped {
        let buckets = partition_by_group(dataset);
        let ordered_keys = BTreeSet::from_iter(buckets.keys().copied());
        for key in ordered_keys {
            let records = &buckets[key];
            let y_true: Vec<&str> = records.iter().map(|r| r.ground_truth.as_str()).collect();
            let y_pred: Vec<&str> = records.iter().map(|r| r.predicted.as_str()).collect();
            let reporter = classification_report(&y_true, &y_pred, zero_division, parallel)?;
            if reporter.is_degenerate() {
                degenerate_groups.insert(String::from(key));
            }
            rows.extend(flatten_report(&reporter, key));
        }
    }
    let (y_true, y_pred) = dataset.labels();
    let overall = classification_report(&y_true, &y_pred, zero_division, parallel)?;
    if overall.is_degenerate() {
        degenerate_groups.insert(String::from(overall_tag));
    }
    rows.extend(flatten_report(&overall, overall_tag));
    Ok(ResultTable {
        rows,
        degenerate_groups,
    })
}

fn partition_by_group(dataset: &Dataset) -> AHashMap<&str, Vec<&LabeledRecord>> {
    let mut buckets: AHashMap<&str, Vec<&LabeledRecord>> =
        AHashMap::with_capacity_and_hasher(dataset.len(), RandomState::new());
    for record in dataset.records() {
        if let Some(key) = &record.group_key {
            buckets.entry(key.as_str()).or_default().push(record);
        }
    }
    buckets
}

/// Turns one report into its long-form rows: for every metric, the class columns in sorted
/// order, then the accuracy column, then the two average columns. The accuracy column repeats
/// the report's single accuracy value on every metric row, matching the reference library's
/// output shape; the support metric carries the slice's total record count in the average
/// columns.
fn flatten_report(reporter: &Reporter, group: &str) -> Vec<MetricRow> {
    let mut rows = Vec::new();
    for metric in all::<Metric>() {
        for class in reporter
            .classes
            .iter()
            .filter(|c| c.average == Average::None)
        {
            rows.push(MetricRow {
                group: String::from(group),
                metric,
                column: ReportColumn::Class(class.class.clone()),
                value: class.value(metric),
            });
        }
        rows.push(MetricRow {
            group: String::from(group),
            metric,
            column: ReportColumn::Accuracy,
            value: reporter.accuracy(),
        });
        for (average, column) in [
            (Average::Macro, ReportColumn::MacroAvg),
            (Average::Weighted, ReportColumn::WeightedAvg),
        ] {
            if let Some(overall) = reporter.overall(average) {
                rows.push(MetricRow {
                    group: String::from(group),
                    metric,
                    column,
                    value: overall.value(metric),
                });
            }
        }
    }
    rows
}

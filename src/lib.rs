/*!
This library computes stratified classification reports over labeled datasets. It is built with a
focus on performance and soudness.

Given a dataset of records carrying a ground-truth label, a predicted label and an optional group
key (such as a country of affiliation), it computes the usual one-vs-rest agreement metrics
(precision, recall, f1-score, support and accuracy) per class, their macro and weighted averages,
and assembles everything into a single long-form table with one report per group plus one report
over the whole dataset.

# Terminology
* A class is a label value we are interested in, such as 'female' or 'male' for a
    gender-agreement analysis. It can be anything, but must be represented by a string.
* The ground-truth label of a record is what the record reports about itself; the predicted label
    is what an algorithm inferred for the same record. The class domain is the sorted union of
    both label columns.
* A group is a slice of the dataset sharing a `group_key` value. Each group gets its own report,
    and the whole dataset gets one more, tagged with a configurable identifier
    (`all_countries` by default).
* A report is degenerate when at least one of its per-class divisions had a zero denominator (a
    class missing from the ground truth or from the predictions). The substituted scores stay in
    the table, but the group is flagged so a substituted 0 is not read as a genuine 0.
*/

mod assembler;
mod config;
mod dataset;
mod metrics;
mod reporter;

// The public api starts here
pub use dataset::{
    Dataset, LabeledRecord, SchemaError, GROUND_TRUTH_COLUMN, GROUP_KEY_COLUMN, IDENTIFIER_COLUMN,
    PREDICTED_COLUMN,
};

pub use metrics::{
    accuracy_score, classification_report, precision_recall_fscore_support, ComputationError,
    ConfusionCounts, DivByZeroStrat, PrfScores,
};

pub use reporter::{Average, ClassMetrics, Metric, Reporter};

pub use assembler::{
    grouped_classification_report, MetricRow, ReportColumn, ResultTable, DEFAULT_OVERALL_TAG,
};

pub use config::{DefaultEvalConfig, EvalConfig, EvalConfigBuilder};

/// Main entrypoint of the Stratev library. This function computes one classification report per
/// group of the dataset (when the config asks for it) plus one report over the whole dataset,
/// and flattens everything into a long-form `ResultTable`. The returned table can be
/// prettyprinted, filtered per metric or queried for its degenerate groups. Instead of taking in
/// the raw parameters, this function takes an `EvalConfig` struct and uses sensible defaults.
///
/// * `dataset`: Records carrying a ground-truth label, a predicted label and an optional group
///   key.
/// * `config`: Parameters used to compute and assemble the reports.
///
/// #Example
/// ```rust
/// use stratev::{grouped_report_conf, Dataset, DefaultEvalConfig, EvalConfigBuilder, Metric};
///
/// let columns = [
///     ("identifier", vec!["1", "2", "3", "4", "5", "6", "7", "8", "9"]),
///     (
///         "ground_truth_label",
///         vec!["male", "male", "male", "female", "male", "male", "female", "female", "male"],
///     ),
///     (
///         "predicted_label",
///         vec!["female", "male", "male", "female", "female", "male", "male", "female", "female"],
///     ),
/// ];
/// let dataset = Dataset::from_columns(&columns).unwrap();
/// let config: DefaultEvalConfig = EvalConfigBuilder::default().build();
///
/// let table = grouped_report_conf(&dataset, config).unwrap();
/// let fscore_rows: Vec<_> = table.rows_for_metric(Metric::FScore).collect();
/// assert_eq!(fscore_rows.len(), 5);
/// let male = fscore_rows
///     .iter()
///     .find(|row| row.column.to_string() == "male")
///     .unwrap();
/// assert_eq!(male.value, 0.6);
/// ```
pub fn grouped_report_conf<ZeroDiv>(
    dataset: &Dataset,
    config: EvalConfig<ZeroDiv>,
) -> Result<ResultTable, ComputationError>
where
    ZeroDiv: Into<DivByZeroStrat>,
{
    let (div_by_zero, parallel, grouped, overall_tag) = config.into();
    grouped_classification_report(dataset, grouped, div_by_zero, parallel, &overall_tag)
}

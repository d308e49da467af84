/*!
This module holds the input side of the crate: a single labeled observation and the immutable
dataset built from them. A dataset can be constructed directly from records or from named
columns, which is the tabular contract used by callers holding their data column-wise.
*/
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{self, Display};

pub const IDENTIFIER_COLUMN: &str = "identifier";
pub const GROUND_TRUTH_COLUMN: &str = "ground_truth_label";
pub const PREDICTED_COLUMN: &str = "predicted_label";
pub const GROUP_KEY_COLUMN: &str = "group_key";

/// One observation: a ground-truth label, the label assigned by the method under evaluation and
/// an optional grouping key (a country code, for instance). Records are immutable once built.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledRecord {
    pub identifier: String,
    pub ground_truth: String,
    pub predicted: String,
    pub group_key: Option<String>,
}

impl LabeledRecord {
    pub fn new(
        identifier: String,
        ground_truth: String,
        predicted: String,
        group_key: Option<String>,
    ) -> Self {
        Self {
            identifier,
            ground_truth,
            predicted,
            group_key,
        }
    }
}

impl Display for LabeledRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {:?})",
            self.identifier, self.ground_truth, self.predicted, self.group_key
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Error type raised when building a `Dataset` from columns. A missing required column or columns
/// of unequal lengths make the whole pipeline unusable, so construction fails fast.
pub enum SchemaError {
    MissingColumn(String),
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingColumn(name) => {
                write!(f, "The required column `{}` is missing", name)
            }
            Self::ColumnLengthMismatch {
                column,
                expected,
                actual,
            } => write!(
                f,
                "The column `{}` has length {} while the other columns have length {}",
                column, actual, expected
            ),
        }
    }
}
impl Error for SchemaError {}

/// A fixed, ordered sequence of `LabeledRecord`. The dataset is a read-only snapshot: every
/// computation downstream borrows it and none of them mutate it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<LabeledRecord>,
}

impl Dataset {
    pub fn from_records(records: Vec<LabeledRecord>) -> Self {
        Self { records }
    }

    /// Builds a dataset from named columns. The `identifier`, `ground_truth_label` and
    /// `predicted_label` columns are required; `group_key` is optional. All present columns must
    /// have the same length.
    pub fn from_columns(columns: &[(&str, Vec<&str>)]) -> Result<Self, SchemaError> {
        let identifiers = required_column(columns, IDENTIFIER_COLUMN)?;
        let ground_truths = required_column(columns, GROUND_TRUTH_COLUMN)?;
        let predictions = required_column(columns, PREDICTED_COLUMN)?;
        let group_keys = find_column(columns, GROUP_KEY_COLUMN);

        let expected = identifiers.len();
        check_column_length(GROUND_TRUTH_COLUMN, ground_truths, expected)?;
        check_column_length(PREDICTED_COLUMN, predictions, expected)?;
        if let Some(keys) = group_keys {
            check_column_length(GROUP_KEY_COLUMN, keys, expected)?;
        }

        let records = (0..expected)
            .map(|i| LabeledRecord {
                identifier: identifiers[i].to_string(),
                ground_truth: ground_truths[i].to_string(),
                predicted: predictions[i].to_string(),
                group_key: group_keys.map(|keys| keys[i].to_string()),
            })
            .collect();
        Ok(Self { records })
    }

    pub fn records(&self) -> &[LabeledRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Borrowed (ground truth, predicted) label slices, in record order.
    pub(crate) fn labels(&self) -> (Vec<&str>, Vec<&str>) {
        let y_true = self.records.iter().map(|r| r.ground_truth.as_str()).collect();
        let y_pred = self.records.iter().map(|r| r.predicted.as_str()).collect();
        (y_true, y_pred)
    }
}

fn find_column<'a>(columns: &'a [(&str, Vec<&'a str>)], name: &str) -> Option<&'a Vec<&'a str>> {
    columns.iter().find(|(n, _)| *n == name).map(|(_, c)| c)
}

fn required_column<'a>(
    columns: &'a [(&str, Vec<&'a str>)],
    name: &str,
) -> Result<&'a Vec<&'a str>, SchemaError> {
    find_column(columns, name).ok_or_else(|| SchemaError::MissingColumn(String::from(name)))
}

fn check_column_length(name: &str, column: &[&str], expected: usize) -> Result<(), SchemaError> {
    if column.len() != expected {
        return Err(SchemaError::ColumnLengthMismatch {
            column: String::from(name),
            expected,
            actual: column.len(),
        });
    }
    Ok(())
}

/*!
This module gives a few tools to prettyprint the metrics of a single dataset slice: the per-class
results, the overall averages and the accuracy.
*/
use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};
use std::cmp::PartialOrd;
use std::collections::{BTreeSet, HashSet};
use std::fmt::Display;
use std::hash::Hash;
use std::str::FromStr;

/// The four metrics a report carries for each class. The display strings follow the reference
/// classification-report vocabulary and are part of the public output contract.
#[derive(Debug, Hash, PartialEq, Eq, Copy, Clone, Sequence, Serialize, Deserialize)]
pub enum Metric {
    Precision,
    Recall,
    FScore,
    Support,
}

impl Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str_content = match self {
            Self::Precision => "precision",
            Self::Recall => "recall",
            Self::FScore => "f1-score",
            Self::Support => "support",
        };
        write!(f, "{}", str_content)
    }
}

/// The reporter holds the metrics of every class of one dataset slice, the overall averages and
/// the accuracy. It can be used to display the results (i.e. prettyprint them) as if they were
/// collected into a dataframe and can be consumed to obtain a `HashSet` containing the metrics.
/// The reporter is built by the `classification_report` function.
///
/// # Example
///
/// ```rust
/// use stratev::{classification_report, DivByZeroStrat};
///
/// let y_true = vec!["male", "male", "female", "female"];
/// let y_pred = vec!["male", "female", "female", "male"];
///
/// let reporter = classification_report(&y_true, &y_pred, DivByZeroStrat::ReplaceBy0, false)
///     .unwrap();
///
/// let expected_report = "Class, Precision, Recall, Fscore, Support
/// Overall_Weighted, 0.5, 0.5, 0.5, 4
/// Overall_Macro, 0.5, 0.5, 0.5, 4
/// male, 0.5, 0.5, 0.5, 2
/// female, 0.5, 0.5, 0.5, 2
/// Accuracy, 0.5\n";
///
/// assert_eq!(expected_report, reporter.to_string());
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Reporter {
    pub(crate) classes: BTreeSet<ClassMetricsInner>,
    pub(crate) accuracy: f32,
    pub(crate) degenerate: bool,
}

/// By converting the reporter into a `HashSet` of `ClassMetrics`, you lose the ordering, the
/// accuracy and the degenerate flag. If you mean to consume the per-class data without
/// prettyprinting it, this is not a problem.
impl From<Reporter> for HashSet<ClassMetrics> {
    fn from(value: Reporter) -> Self {
        value.classes.into_iter().map(ClassMetrics::from).collect()
    }
}

impl Reporter {
    pub(crate) fn new(accuracy: f32, degenerate: bool) -> Self {
        Self {
            classes: BTreeSet::default(),
            accuracy,
            degenerate,
        }
    }

    /// Empty report used for an empty dataset slice: no classes, zero accuracy, flagged as
    /// degenerate so a consumer can tell it apart from a genuinely poor classifier.
    pub(crate) fn degenerate_empty() -> Self {
        Self::new(0.0, true)
    }

    pub(crate) fn insert(&mut self, metrics: ClassMetricsInner) -> bool {
        self.classes.insert(metrics)
    }

    pub(crate) fn overall(&self, average: Average) -> Option<&ClassMetricsInner> {
        self.classes.iter().find(|c| c.average == average)
    }

    /// Fraction of records whose predicted label matches the ground truth.
    pub fn accuracy(&self) -> f32 {
        self.accuracy
    }

    /// `true` when at least one metric hit a zero denominator and was substituted, or when the
    /// slice was empty. Distinguishes an undefined metric from a true zero score.
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }
}

/// The Reporter struct acts as a dataframe when displayed.
impl Display for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Class, Precision, Recall, Fscore, Support")?;
        for v in self.classes.iter().rev() {
            //Must call `.rev()` because the iter is in ascending order
            writeln!(f, "{}", v)?
        }
        writeln!(f, "Accuracy, {}", self.accuracy)?;
        Ok(())
    }
}

#[derive(Debug)]
/// Datastructure holding metrics about a given class.
pub struct ClassMetrics {
    /// The class, such as "male", "female", etc.
    pub class: String,
    /// The average used to compute this class' metrics
    pub average: Average,
    /// Precision metric
    pub precision: f32,
    /// Recall metric
    pub recall: f32,
    /// Fscore metric
    pub fscore: f32,
    /// Support metric
    pub support: usize,
}

impl Hash for ClassMetrics {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.class.hash(state);
        self.average.hash(state)
    }
}

impl PartialEq for ClassMetrics {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class && self.average == other.average
    }
}
impl Eq for ClassMetrics {}

impl From<ClassMetricsInner> for ClassMetrics {
    fn from(value: ClassMetricsInner) -> Self {
        Self {
            class: value.class,
            average: value.average,
            precision: value.precision,
            recall: value.recall,
            fscore: value.fscore,
            support: value.support,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
/// ClassMetrics hold the metrics for a single class. They can't be constructed explicitely and
/// they implement a special version of the `Display` trait, allowing them to be treated as the
/// line of a dataframe.
pub(crate) struct ClassMetricsInner {
    /// The class, such as "male", "female", etc.
    pub(crate) class: String,
    /// The average used to compute this class' metrics
    pub(crate) average: Average,
    /// Precision metric
    pub(crate) precision: f32,
    /// Recall metric
    pub(crate) recall: f32,
    /// Fscore metric
    pub(crate) fscore: f32,
    /// Support metric
    pub(crate) support: usize,
}
impl PartialEq for ClassMetricsInner {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class && self.average == other.average
    }
}
impl Eq for ClassMetricsInner {}

#[allow(clippy::non_canonical_partial_ord_impl)]
impl PartialOrd for ClassMetricsInner {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        match self.average.cmp(&other.average) {
            std::cmp::Ordering::Equal => self.class.partial_cmp(&other.class),
            v => Some(v),
        }
    }
}

impl Ord for ClassMetricsInner {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.partial_cmp(other).unwrap()
    }
}

impl ClassMetricsInner {
    pub(crate) fn new_overall(
        average: OverallAverage,
        precision: f32,
        recall: f32,
        fscore: f32,
        support: usize,
    ) -> Self {
        let class = average.to_string();
        ClassMetricsInner {
            class,
            average: average.into(),
            precision,
            recall,
            fscore,
            support,
        }
    }

    /// The value this line carries for one of the four metrics. Support is widened to float for
    /// uniformity with the other metrics.
    pub(crate) fn value(&self, metric: Metric) -> f32 {
        match metric {
            Metric::Precision => self.precision,
            Metric::Recall => self.recall,
            Metric::FScore => self.fscore,
            Metric::Support => self.support as f32,
        }
    }
}

/// The Classmetrics struct acts as a line in a dataframe when displayed.
impl Display for ClassMetricsInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}, {}",
            self.class, self.precision, self.recall, self.fscore, self.support
        )
    }
}

/// Enumeration of the different types of averaging possible and supported by this crate. &str can
/// be parsed to create an `Average`.
#[derive(Debug, Hash, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub enum Average {
    None,
    Macro,
    Weighted,
}
impl Display for Average {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
impl FromStr for Average {
    type Err = AverageParsingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Average::None),
            "macro" => Ok(Average::Macro),
            "weighted" => Ok(Average::Weighted),
            _ => Err(AverageParsingError(String::from(s))),
        }
    }
}

#[derive(Debug, PartialEq, PartialOrd, Eq, Ord, Clone)]
pub struct AverageParsingError(String);
impl Display for AverageParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Impossible to parse the string ({}) into an Average",
            self.0
        )
    }
}

/// Average implements an ordering placing the per-class rows (`None`) below the overall rows.
/// Two overall averages compare as equal here; `ClassMetricsInner` breaks the tie on the class
/// name.
#[allow(clippy::non_canonical_partial_ord_impl)]
impl PartialOrd for Average {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (Self::None, Self::None) => Some(std::cmp::Ordering::Equal),
            (Self::None, _) => Some(std::cmp::Ordering::Less),
            (_, Self::None) => Some(std::cmp::Ordering::Greater),
            _ => Some(std::cmp::Ordering::Equal),
        }
    }
}
impl Ord for Average {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.partial_cmp(other).unwrap()
    }
}

#[derive(Debug, Hash, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub enum OverallAverage {
    Macro,
    Weighted,
}

impl Display for OverallAverage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str_content = match self {
            Self::Macro => "Overall_Macro",
            Self::Weighted => "Overall_Weighted",
        };
        write!(f, "{}", str_content)
    }
}

impl From<OverallAverage> for Average {
    fn from(value: OverallAverage) -> Self {
        match value {
            OverallAverage::Macro => Average::Macro,
            OverallAverage::Weighted => Average::Weighted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enum_iterator::all;

    #[test]
    fn test_metric_display_strings() {
        let actual: Vec<String> = all::<Metric>().map(|m| m.to_string()).collect();
        let expected = vec!["precision", "recall", "f1-score", "support"];
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_class_rows_sort_before_overall_rows() {
        let mut reporter = Reporter::new(1.0, false);
        reporter.insert(ClassMetricsInner::new_overall(
            OverallAverage::Macro,
            1.0,
            1.0,
            1.0,
            2,
        ));
        reporter.insert(ClassMetricsInner {
            class: String::from("male"),
            average: Average::None,
            precision: 1.0,
            recall: 1.0,
            fscore: 1.0,
            support: 2,
        });
        reporter.insert(ClassMetricsInner {
            class: String::from("female"),
            average: Average::None,
            precision: 0.0,
            recall: 0.0,
            fscore: 0.0,
            support: 0,
        });
        let ordered: Vec<&str> = reporter.classes.iter().map(|c| c.class.as_str()).collect();
        assert_eq!(ordered, vec!["female", "male", "Overall_Macro"]);
    }

    #[test]
    fn test_overall_lookup() {
        let mut reporter = Reporter::new(0.5, false);
        reporter.insert(ClassMetricsInner::new_overall(
            OverallAverage::Weighted,
            0.5,
            0.5,
            0.5,
            4,
        ));
        let overall = reporter.overall(Average::Weighted).unwrap();
        assert_eq!(overall.support, 4);
        assert!(reporter.overall(Average::Macro).is_none());
    }

    #[test]
    fn test_parse_average() {
        assert_eq!(Average::from_str("macro"), Ok(Average::Macro));
        assert_eq!(Average::from_str("Weighted"), Ok(Average::Weighted));
        assert!(Average::from_str("micro").is_err());
    }

    #[test]
    fn test_into_hashset_keeps_per_class_values() {
        let mut reporter = Reporter::new(0.75, false);
        reporter.insert(ClassMetricsInner {
            class: String::from("female"),
            average: Average::None,
            precision: 0.4,
            recall: 0.6666667,
            fscore: 0.5,
            support: 3,
        });
        let set: HashSet<ClassMetrics> = reporter.into();
        assert_eq!(set.len(), 1);
        let female = set
            .iter()
            .find(|c| c.class == "female" && c.average == Average::None)
            .unwrap();
        assert_eq!(female.support, 3);
    }
}

/*!
This module computes the metrics (precision, recall, f-score, support, accuracy) of a
ground-truth label sequence and a predicted label sequence, one-vs-rest over the classes both
sequences contain.
*/
use crate::dataset::SchemaError;
use crate::reporter::{Average, ClassMetricsInner, OverallAverage, Reporter};
use ahash::HashSet as AHashSet;
use core::fmt;
use itertools::multizip;
use ndarray::{prelude::*, Array, Data, ScalarOperand, Zip};
use ndarray_stats::{errors::MultiInputError, SummaryStatisticsExt};
use num::{Float, Num, NumCast};
use std::{
    collections::BTreeSet,
    error::Error,
    fmt::{Debug, Display},
    str::FromStr,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayNotUniqueOrEmpty(usize);

impl Display for ArrayNotUniqueOrEmpty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "This array contains more than one element or is empty. It has length: {} Cannot call `item` on it", self.0
        )
    }
}
impl Error for ArrayNotUniqueOrEmpty {}

trait ItemArrayExt<Output> {
    /// Returns the element out of the Array. Can return an error if the array is empty of if the
    /// array has a length superior to 1.
    fn item(&self) -> Result<Output, ArrayNotUniqueOrEmpty> {
        match self.length() {
            1 => Ok(self.get_first()),
            n => Err(ArrayNotUniqueOrEmpty(n)),
        }
    }
    /// Returns the length of the array;
    fn length(&self) -> usize;
    /// Gets the first element of the array
    fn get_first(&self) -> Output;
}

impl<F: Clone, T: Data<Elem = F>> ItemArrayExt<F> for ArrayBase<T, Dim<[usize; 1]>> {
    fn length(&self) -> usize {
        self.len()
    }
    fn get_first(&self) -> F {
        self.first().unwrap().clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How do we handle cases with a division by zero? Do we replace the result by 0, replace it by
/// 1, or return an error? The reference behavior substitutes 0, so `ReplaceBy0` is the default.
/// It is not recommended to use `ReturnError`; it will stop the computation. It can be useful if
/// you believe there should be no 0 in the denominator.
pub enum DivByZeroStrat {
    /// Replace the result of a division by zero with `1`
    ReplaceBy1,
    /// Returns an error
    ReturnError,
    /// Replace the result of a division by zero with `0`
    ReplaceBy0,
}
impl Default for DivByZeroStrat {
    fn default() -> Self {
        Self::ReplaceBy0
    }
}

#[derive(Debug)]
pub struct ParsingDivisionByZeroStrategyError<S: Debug + Display>(S);

impl<S: Debug + Display> Display for ParsingDivisionByZeroStrategyError<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Could not parse the {} into a a `DivByZeroStrat`",
            self.0
        )
    }
}
impl<S: Debug + Display> Error for ParsingDivisionByZeroStrategyError<S> {}

impl FromStr for DivByZeroStrat {
    type Err = ParsingDivisionByZeroStrategyError<String>;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_ref() {
            "replaceby0" | "replacebyzero" => Ok(DivByZeroStrat::ReplaceBy0),
            "replaceby1" | "replacebyone" => Ok(DivByZeroStrat::ReplaceBy1),
            "returnerror" | "error" => Ok(DivByZeroStrat::ReturnError),
            _ => Err(ParsingDivisionByZeroStrategyError(String::from(s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DivisionByZeroError;

impl Display for DivisionByZeroError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Encountered division by zero")
    }
}

impl Error for DivisionByZeroError {}

/// Internal extension trait for Num's Float trait
pub trait FloatExt: Float + Send + Sync + Clone + ScalarOperand + Debug {}

impl<T: Float + Send + Sync + Clone + Copy + ScalarOperand + Debug> FloatExt for T {}

/// One-vs-rest confusion counts for a single positive class over one slice of records. The
/// counts always partition the slice: tp + fp + fn + tn equals the record count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfusionCounts {
    pub true_positive: usize,
    pub false_positive: usize,
    pub false_negative: usize,
    pub true_negative: usize,
}

impl ConfusionCounts {
    /// Counts the slice treating `positive` as the positive class and every other label as
    /// negative. Pure single pass; both slices must have the same length.
    pub fn from_labels(y_true: &[&str], y_pred: &[&str], positive: &str) -> Self {
        let mut counts = ConfusionCounts::default();
        for (t, p) in y_true.iter().zip(y_pred.iter()) {
            match (*t == positive, *p == positive) {
                (true, true) => counts.true_positive += 1,
                (false, true) => counts.false_positive += 1,
                (true, false) => counts.false_negative += 1,
                (false, false) => counts.true_negative += 1,
            }
        }
        counts
    }

    /// Number of records actually belonging to the positive class.
    pub fn support(&self) -> usize {
        self.true_positive + self.false_negative
    }

    /// Number of records predicted as the positive class.
    pub fn predicted_positive(&self) -> usize {
        self.true_positive + self.false_positive
    }
}

impl Display for ConfusionCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(tp: {}, fp: {}, fn: {}, tn: {})",
            self.true_positive, self.false_positive, self.false_negative, self.true_negative
        )
    }
}

type Found0InDenominator = bool;

fn prf_divide<I: Debug + Num + Clone + Send + Sync + Copy, D: Dimension>(
    numerator: ArcArray<I, D>,
    denominator: ArrayViewMut<I, D>,
    parallel: bool,
    zero_division: DivByZeroStrat,
) -> Result<(ArcArray<I, D>, Found0InDenominator), DivisionByZeroError> {
    let (result, zero_mask) = if parallel {
        par_prf_divide_results_and_mask(numerator, denominator)
    } else {
        prf_divide_results_and_mask(numerator, denominator)
    };
    let found_zero = zero_mask.iter().any(|m| *m == I::zero());
    if !found_zero {
        return Ok((result, false));
    }
    match zero_division {
        DivByZeroStrat::ReturnError => Err(DivisionByZeroError),
        DivByZeroStrat::ReplaceBy0 => {
            let final_result = result * zero_mask;
            Ok((final_result, true))
        }
        DivByZeroStrat::ReplaceBy1 => {
            let final_result = if parallel {
                par_substitute_masked(result, &zero_mask, I::one())
            } else {
                substitute_masked(result, &zero_mask, I::one())
            };
            Ok((final_result, true))
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Error type to represent when two lists or arrays are not of the
/// same length (when they should be).
pub struct InconsistentLengthError(usize, usize);

impl Display for InconsistentLengthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Inconsistent length between two lists. `y_true` is length {}, `y_pred` is length {}",
            self.0, self.1
        )
    }
}
impl Error for InconsistentLengthError {}

fn check_for_empty_slices<T>(y_true: &[T], y_pred: &[T]) -> Result<(), ComputationError> {
    if y_true.is_empty() {
        return Err(ComputationError::EmptyInput(String::from("y_true")));
    };
    if y_pred.is_empty() {
        return Err(ComputationError::EmptyInput(String::from("y_pred")));
    };
    Ok(())
}

fn check_consistent_length<T>(y_true: &[T], y_pred: &[T]) -> Result<(), InconsistentLengthError> {
    if y_true.len() != y_pred.len() {
        return Err(InconsistentLengthError(y_true.len(), y_pred.len()));
    }
    Ok(())
}

/// The sorted set of classes present in either label sequence.
fn label_domain<'a>(y_true: &[&'a str], y_pred: &[&'a str]) -> BTreeSet<&'a str> {
    let unsorted: AHashSet<&str> = y_true.iter().chain(y_pred.iter()).copied().collect();
    BTreeSet::from_iter(unsorted)
}

/// predicted sum, true positive sum and true sum, per class over the sorted class domain
type ActualTPCorrect<T> = (Array1<T>, Array1<T>, Array1<T>);

/// Runs the one-vs-rest confusion counts once per class of the domain and collects the column
/// sums the derived metrics are built from.
fn extract_tp_actual_correct(y_true: &[&str], y_pred: &[&str]) -> ActualTPCorrect<usize> {
    let target_names = label_domain(y_true, y_pred);
    let mut pred_sum = Vec::with_capacity(target_names.len());
    let mut tp_sum = Vec::with_capacity(target_names.len());
    let mut true_sum = Vec::with_capacity(target_names.len());
    for name in target_names {
        let counts = ConfusionCounts::from_labels(y_true, y_pred, name);
        pred_sum.push(counts.predicted_positive());
        tp_sum.push(counts.true_positive);
        true_sum.push(counts.support());
    }
    (
        Array::from(pred_sum),
        Array::from(tp_sum),
        Array::from(true_sum),
    )
}

#[derive(Debug, Clone, PartialEq)]
/// Enum error encompassing many type of failures that could happen when computing the precison,
/// recall, f-score and the support.
pub enum ComputationError {
    BetaNotPositive,
    InconsistentLength(InconsistentLengthError),
    DivisionByZero(DivisionByZeroError),
    InputError(MultiInputError),
    EmptyArray(String),
    EmptyOrNotUnique(ArrayNotUniqueOrEmpty),
    EmptyInput(String),
    Schema(SchemaError),
}
impl Display for ComputationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BetaNotPositive => write!(f, "Beta value is not positive"),
            Self::InconsistentLength(length_err) => std::fmt::Display::fmt(length_err, f),
            Self::DivisionByZero(div_err) => std::fmt::Display::fmt(&div_err, f),
            Self::InputError(input_err) => std::fmt::Display::fmt(&input_err, f),
            Self::EmptyArray(empty_err) => write!(f, "Found an empty array in {}", empty_err),
            Self::EmptyOrNotUnique(size_err) => std::fmt::Display::fmt(size_err, f),
            Self::EmptyInput(which) => write!(f, "Received an empty input {}", which),
            Self::Schema(schema_err) => std::fmt::Display::fmt(schema_err, f),
        }
    }
}
impl Error for ComputationError {}

impl From<InconsistentLengthError> for ComputationError {
    fn from(value: InconsistentLengthError) -> Self {
        Self::InconsistentLength(value)
    }
}
impl From<DivisionByZeroError> for ComputationError {
    fn from(value: DivisionByZeroError) -> Self {
        Self::DivisionByZero(value)
    }
}
impl From<MultiInputError> for ComputationError {
    fn from(value: MultiInputError) -> Self {
        Self::InputError(value)
    }
}
impl From<ArrayNotUniqueOrEmpty> for ComputationError {
    fn from(value: ArrayNotUniqueOrEmpty) -> Self {
        Self::EmptyOrNotUnique(value)
    }
}
impl From<SchemaError> for ComputationError {
    fn from(value: SchemaError) -> Self {
        Self::Schema(value)
    }
}

/// Output of `precision_recall_fscore_support`. With `Average::None` each array holds one entry
/// per class of the sorted domain; with an averaging strategy the arrays hold a single entry.
/// `degenerate` is `true` when a zero denominator was encountered and substituted, so an
/// undefined metric stays distinguishable from a genuine zero score.
#[derive(Debug, Clone, PartialEq)]
pub struct PrfScores {
    pub precision: Array1<f32>,
    pub recall: Array1<f32>,
    pub fscore: Array1<f32>,
    pub support: Array1<usize>,
    pub degenerate: bool,
}

/// One of the main entrypoints of this library. This function computes the precision, recall,
/// fscore and support of the true and predicted labels, one-vs-rest per class.
///
/// * `y_true`: Ground-truth labels
/// * `y_pred`: Predicted labels
/// * `beta`: Value of the `beta` parameter of the fscore. `beta=1` for F1 and `beta=0.5` for F0.5.
/// * `average`: What type of average to use.
/// * `zero_division`: What to do in case of division by zero.
/// * `parallel`: Can we use multiple cores for the array computations?
pub fn precision_recall_fscore_support<F: FloatExt>(
    y_true: &[&str],
    y_pred: &[&str],
    beta: F,
    average: Average,
    zero_division: DivByZeroStrat,
    parallel: bool,
) -> Result<PrfScores, ComputationError> {
    check_for_empty_slices(y_true, y_pred)?;
    check_consistent_length(y_true, y_pred)?;
    let counts = extract_tp_actual_correct(y_true, y_pred);
    precision_recall_fscore_support_inner(&counts, beta, average, zero_division, parallel)
}

fn precision_recall_fscore_support_inner<F: FloatExt>(
    counts: &ActualTPCorrect<usize>,
    beta: F,
    average: Average,
    zero_division: DivByZeroStrat,
    parallel: bool,
) -> Result<PrfScores, ComputationError> {
    if beta.is_sign_negative() {
        return Err(ComputationError::BetaNotPositive);
    };
    let (pred_sum, tp_sum, true_sum) = counts;
    let beta2 = beta.powi(2);
    let arc_tp_sum = tp_sum.mapv(|x| x as f32).to_shared();
    let (precision, precision_degenerate) = prf_divide(
        arc_tp_sum.clone(), // ArcArray are (often) inexpensive to clone. They are in fact `Copy`
        pred_sum.mapv(|x| x as f32).view_mut(),
        parallel,
        zero_division,
    )?;
    let (recall, recall_degenerate) = prf_divide(
        arc_tp_sum,
        true_sum.mapv(|x| x as f32).view_mut(),
        parallel,
        zero_division,
    )?;
    let degenerate = precision_degenerate || recall_degenerate;
    let f_score: ArcArray<f32, Dim<[usize; 1]>> = if beta2.is_infinite() && beta2.is_sign_positive()
    {
        recall.clone()
    } else {
        let denom = precision.clone() + recall.view();
        let denom_non_zero = if parallel {
            par_replace(denom, 0.0, 1.0)
        } else {
            replace(denom, 0.0, 1.0)
        };
        let beta2p1 = beta2 + F::one();
        let beta2p1_cast: f32 = <f64 as NumCast>::from(beta2p1)
            .expect("Casting from f64 to f32 should always be possible")
            as f32;
        beta2p1_cast * precision.clone() * recall.view() / denom_non_zero
    };
    match average {
        Average::Weighted => {
            let tmp_weights = true_sum;
            if tmp_weights.sum() == 0 {
                return match zero_division {
                    DivByZeroStrat::ReturnError => {
                        Err(ComputationError::DivisionByZero(DivisionByZeroError))
                    }
                    _ => Ok(PrfScores {
                        precision: array![0.0],
                        recall: array![0.0],
                        fscore: array![0.0],
                        support: array![0],
                        degenerate: true,
                    }),
                };
            };
            let final_tmp_weights = tmp_weights.mapv(|x| x as f32).into_shared();
            let final_precision =
                Array::from_vec(vec![precision.weighted_mean(&final_tmp_weights)?]);
            let final_recall = Array::from_vec(vec![recall.weighted_mean(&final_tmp_weights)?]);
            let final_f_score = Array::from_vec(vec![f_score.weighted_mean(&final_tmp_weights)?]);
            let final_true_sum = array![tmp_weights.sum()];
            Ok(PrfScores {
                precision: final_precision,
                recall: final_recall,
                fscore: final_f_score,
                support: final_true_sum,
                degenerate,
            })
        }
        Average::None => Ok(PrfScores {
            precision: precision.into_owned(),
            recall: recall.into_owned(),
            fscore: f_score.into_owned(),
            support: true_sum.clone(),
            degenerate,
        }),
        Average::Macro => {
            let final_precision = Array::from_vec(vec![precision
                .mean()
                .ok_or_else(|| ComputationError::EmptyArray(String::from("precision")))?]);
            let final_recall = Array::from_vec(vec![recall
                .mean()
                .ok_or_else(|| ComputationError::EmptyArray(String::from("recall")))?]);
            let final_f_score = Array::from_vec(vec![f_score
                .mean()
                .ok_or_else(|| ComputationError::EmptyArray(String::from("fscore")))?]);
            let final_true_sum = array![true_sum.sum()];
            Ok(PrfScores {
                precision: final_precision,
                recall: final_recall,
                fscore: final_f_score,
                support: final_true_sum,
                degenerate,
            })
        }
    }
}

/// Fraction of records whose predicted label matches the ground truth. An empty slice yields
/// 0.0 rather than a division by zero.
pub fn accuracy_score(y_true: &[&str], y_pred: &[&str]) -> f32 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count();
    correct as f32 / y_true.len() as f32
}

/// This function computes the result in parallel. For a synchronous
/// version of this function, see `prf_divide_results_and_mask`.
///
/// * `numerator`: Numerator of the division
/// * `denominator`: Denominator of the division
fn par_prf_divide_results_and_mask<I: Debug + Num + Clone + Send + Sync, D: Dimension>(
    numerator: ArcArray<I, D>,
    mut denominator: ArrayViewMut<I, D>,
) -> (ArcArray<I, D>, Array<I, D>) {
    let zero_at_mask = Zip::from(&mut denominator).par_map_collect(|d| {
        if *d == I::zero() {
            I::zero()
        } else {
            I::one()
        }
    });
    denominator.par_mapv_inplace(|v| if v == I::zero() { I::one() } else { v });
    (numerator / denominator, zero_at_mask)
}

/// This function computes the result synchronously. For a parallel
/// version of this function, see `par_prf_divide_results_and_mask`.
///
/// * `numerator`: Numerator of the division
/// * `denominator`: Denominator of the division
fn prf_divide_results_and_mask<I: Debug + Num + Clone, D: Dimension>(
    numerator: ArcArray<I, D>,
    mut denominator: ArrayViewMut<I, D>,
) -> (ArcArray<I, D>, Array<I, D>) {
    let zero_at_mask =
        Zip::from(&mut denominator)
            .map_collect(|d| if *d == I::zero() { I::zero() } else { I::one() });
    denominator.mapv_inplace(|v| if v == I::zero() { I::one() } else { v });
    (numerator / denominator, zero_at_mask)
}

/// Helper function to replace values from an array.
fn replace<Data: PartialEq + Copy, D: Dimension>(
    mut array: ArcArray<Data, D>,
    replaced: Data,
    new_value: Data,
) -> ArcArray<Data, D> {
    array.mapv_inplace(|v| if v == replaced { new_value } else { v });
    array
}

/// Helper function to replace values from an array in parallel.
fn par_replace<Data: PartialEq + Send + Sync + Copy, D: Dimension>(
    mut array: ArcArray<Data, D>,
    replaced: Data,
    new_value: Data,
) -> ArcArray<Data, D> {
    array.par_mapv_inplace(|v| if v == replaced { new_value } else { v });
    array
}

/// Writes `substitute` into every position where the mask is zero.
fn substitute_masked<I: Num + Copy, D: Dimension>(
    mut array: ArcArray<I, D>,
    mask: &Array<I, D>,
    substitute: I,
) -> ArcArray<I, D> {
    Zip::from(&mut array).and(mask).for_each(|v, m| {
        if *m == I::zero() {
            *v = substitute;
        }
    });
    array
}

/// Parallel version of `substitute_masked`.
fn par_substitute_masked<I: Num + Copy + Send + Sync, D: Dimension>(
    mut array: ArcArray<I, D>,
    mask: &Array<I, D>,
    substitute: I,
) -> ArcArray<I, D> {
    Zip::from(&mut array).and(mask).par_for_each(|v, m| {
        if *m == I::zero() {
            *v = substitute;
        }
    });
    array
}

/// Main entrypoint of this library for a single dataset slice. This function computes the
/// precision, recall, fscore and support of the true and predicted labels. It returns
/// information about the individual classes, the overall averages and the accuracy. The returned
/// structure can be used to prettyprint the results or be converted into a HashSet.
///
/// An empty slice produces an empty, degenerate report rather than an error, so that a grouped
/// run never aborts on a degenerate group.
///
/// * `y_true`: Ground-truth labels
/// * `y_pred`: Predicted labels
/// * `zero_division`: What to do in case of division by zero.
/// * `parallel`: Can we use multiple cores for the array computations?
pub fn classification_report(
    y_true: &[&str],
    y_pred: &[&str],
    zero_division: DivByZeroStrat,
    parallel: bool,
) -> Result<Reporter, ComputationError> {
    check_consistent_length(y_true, y_pred)?;
    if y_true.is_empty() {
        return Ok(Reporter::degenerate_empty());
    }
    let counts = extract_tp_actual_correct(y_true, y_pred);
    let target_names_sorted_iter = label_domain(y_true, y_pred);
    let scores = precision_recall_fscore_support_inner::<f32>(
        &counts,
        1.0,
        Average::None,
        zero_division,
        parallel,
    )?;
    let mut degenerate = scores.degenerate;
    let mut reporter = Reporter::new(accuracy_score(y_true, y_pred), false);
    for (name, precision, recall, fscore, support) in multizip((
        target_names_sorted_iter.iter(),
        scores.precision.into_iter(),
        scores.recall.into_iter(),
        scores.fscore.into_iter(),
        scores.support.into_iter(),
    )) {
        let tmp_metrics = ClassMetricsInner {
            class: String::from(*name),
            precision,
            recall,
            fscore,
            support,
            average: Average::None,
        };
        reporter.insert(tmp_metrics);
    }
    for avg in [OverallAverage::Macro, OverallAverage::Weighted].into_iter() {
        let scores = precision_recall_fscore_support_inner::<f32>(
            &counts,
            1.0,
            avg.into(),
            zero_division,
            parallel,
        )?;
        degenerate |= scores.degenerate;
        let tmp_metrics = ClassMetricsInner::new_overall(
            avg,
            scores.precision.item()?,
            scores.recall.item()?,
            scores.fscore.item()?,
            scores.support.item()?,
        );
        reporter.insert(tmp_metrics);
    }
    reporter.degenerate = degenerate;
    Ok(reporter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{QuickCheck, TestResult};

    pub trait CloseEnough {
        fn are_close(&self, other: &Self, eps: f32) -> bool;
    }

    // ClassMetrics does not have the default PartialEq implementation.
    impl CloseEnough for ClassMetricsInner {
        fn are_close(&self, other: &Self, eps: f32) -> bool {
            let are_equal = self == other;
            let precision_is_equal = f32::abs(self.precision - other.precision) < eps;
            let recall_is_equal = f32::abs(self.recall - other.recall) < eps;
            let fscore_is_equal = f32::abs(self.fscore - other.fscore) < eps;
            let support_is_equal = self.support == other.support;
            are_equal
                && precision_is_equal
                && recall_is_equal
                && fscore_is_equal
                && support_is_equal
        }
    }
    impl CloseEnough for Reporter {
        fn are_close(&self, other: &Self, eps: f32) -> bool {
            if f32::abs(self.accuracy - other.accuracy) >= eps {
                return false;
            }
            for (c1, c2) in self.classes.iter().zip(other.classes.iter()) {
                let are_close = c1.are_close(c2, eps);
                if !are_close {
                    return false;
                };
            }
            true
        }
    }

    // The 9-record gender agreement example, hand-counted class by class.
    const Y_TRUE: [&str; 9] = [
        "male", "male", "male", "female", "male", "male", "female", "female", "male",
    ];
    const Y_PRED: [&str; 9] = [
        "female", "male", "male", "female", "female", "male", "male", "female", "female",
    ];

    #[test]
    fn test_confusion_counts_males() {
        let counts = ConfusionCounts::from_labels(&Y_TRUE, &Y_PRED, "male");
        let expected = ConfusionCounts {
            true_positive: 3,
            false_positive: 1,
            false_negative: 3,
            true_negative: 2,
        };
        assert_eq!(counts, expected);
        assert_eq!(counts.support(), 6);
        assert_eq!(counts.predicted_positive(), 4);
    }

    #[test]
    fn test_confusion_counts_females() {
        let counts = ConfusionCounts::from_labels(&Y_TRUE, &Y_PRED, "female");
        let expected = ConfusionCounts {
            true_positive: 2,
            false_positive: 3,
            false_negative: 1,
            true_negative: 3,
        };
        assert_eq!(counts, expected);
    }

    #[test]
    fn test_extract_tp_actual_correct() {
        // Sorted domain: female, male
        let (predicted_sum, true_positive_sum, true_sum) =
            extract_tp_actual_correct(&Y_TRUE, &Y_PRED);
        let expected = (vec![5, 4], vec![2, 3], vec![3, 6]);
        assert_eq!(
            (expected),
            (
                predicted_sum.to_vec(),
                true_positive_sum.to_vec(),
                true_sum.to_vec(),
            )
        );
    }

    #[test]
    fn test_precision_recall_fscore_support_per_class() {
        let scores = precision_recall_fscore_support::<f32>(
            &Y_TRUE,
            &Y_PRED,
            1.0,
            Average::None,
            DivByZeroStrat::ReplaceBy0,
            false,
        )
        .unwrap();
        assert_eq!(scores.precision, array![0.4, 0.75]);
        assert_eq!(scores.recall, array![2.0 / 3.0, 0.5]);
        assert!(f32::abs(scores.fscore[0] - 0.5) < 1e-6);
        assert_eq!(scores.fscore[1], 0.6);
        assert_eq!(scores.support, array![3, 6]);
        assert!(!scores.degenerate);
    }

    #[test]
    fn test_precision_recall_fscore_support_macro() {
        let scores = precision_recall_fscore_support::<f32>(
            &Y_TRUE,
            &Y_PRED,
            1.0,
            Average::Macro,
            DivByZeroStrat::ReplaceBy0,
            false,
        )
        .unwrap();
        assert!(f32::abs(scores.precision.item().unwrap() - 0.575) < 1e-6);
        assert!(f32::abs(scores.recall.item().unwrap() - 0.5833333) < 1e-6);
        assert!(f32::abs(scores.fscore.item().unwrap() - 0.55) < 1e-6);
        assert_eq!(scores.support.item().unwrap(), 9);
    }

    #[test]
    fn test_precision_recall_fscore_support_weighted() {
        let scores = precision_recall_fscore_support::<f32>(
            &Y_TRUE,
            &Y_PRED,
            1.0,
            Average::Weighted,
            DivByZeroStrat::ReplaceBy0,
            false,
        )
        .unwrap();
        assert!(f32::abs(scores.precision.item().unwrap() - 0.6333333) < 1e-6);
        assert!(f32::abs(scores.recall.item().unwrap() - 0.5555556) < 1e-6);
        assert!(f32::abs(scores.fscore.item().unwrap() - 0.5666667) < 1e-6);
        assert_eq!(scores.support.item().unwrap(), 9);
    }

    #[test]
    fn test_accuracy_score() {
        assert_eq!(accuracy_score(&Y_TRUE, &Y_PRED), 5.0 / 9.0);
        assert_eq!(accuracy_score(&[], &[]), 0.0);
    }

    #[test]
    fn test_classification_report() {
        let actual =
            classification_report(&Y_TRUE, &Y_PRED, DivByZeroStrat::ReplaceBy0, false).unwrap();
        let mut expected = Reporter::new(5.0 / 9.0, false);
        expected.insert(ClassMetricsInner {
            class: String::from("female"),
            precision: 0.4,
            recall: 0.6666667,
            fscore: 0.5,
            support: 3,
            average: Average::None,
        });
        expected.insert(ClassMetricsInner {
            class: String::from("male"),
            precision: 0.75,
            recall: 0.5,
            fscore: 0.6,
            support: 6,
            average: Average::None,
        });
        expected.insert(ClassMetricsInner::new_overall(
            OverallAverage::Macro,
            0.575,
            0.5833333,
            0.55,
            9,
        ));
        expected.insert(ClassMetricsInner::new_overall(
            OverallAverage::Weighted,
            0.6333333,
            0.5555556,
            0.5666667,
            9,
        ));
        assert!(actual.are_close(&expected, 1e-6));
        assert!(!actual.is_degenerate());
    }

    #[test]
    fn test_classification_report_single_class_group_is_degenerate() {
        // Only one ground-truth class; the other class has no true instances, so its recall
        // denominator is zero.
        let y_true = vec!["male", "male", "male", "male"];
        let y_pred = vec!["female", "male", "male", "male"];
        let reporter =
            classification_report(&y_true, &y_pred, DivByZeroStrat::ReplaceBy0, false).unwrap();
        assert!(reporter.is_degenerate());
        let female = reporter
            .classes
            .iter()
            .find(|c| c.class == "female")
            .unwrap();
        assert_eq!(female.recall, 0.0);
        assert_eq!(female.support, 0);
        assert_eq!(reporter.accuracy(), 0.75);
    }

    #[test]
    fn test_classification_report_empty_input() {
        let reporter = classification_report(&[], &[], DivByZeroStrat::ReplaceBy0, false).unwrap();
        assert!(reporter.is_degenerate());
        assert!(reporter.classes.is_empty());
        assert_eq!(reporter.accuracy(), 0.0);
    }

    #[test]
    fn test_classification_report_inconsistent_length() {
        let actual = classification_report(
            &["male", "female"],
            &["male"],
            DivByZeroStrat::ReplaceBy0,
            false,
        );
        assert_eq!(
            actual,
            Err(ComputationError::InconsistentLength(
                InconsistentLengthError(2, 1)
            ))
        );
    }

    #[test]
    fn test_zero_division_return_error() {
        let y_true = vec!["male", "male"];
        let y_pred = vec!["female", "male"];
        let actual = classification_report(&y_true, &y_pred, DivByZeroStrat::ReturnError, false);
        assert_eq!(
            actual,
            Err(ComputationError::DivisionByZero(DivisionByZeroError))
        );
    }

    #[test]
    fn test_zero_division_replace_by_1() {
        let y_true = vec!["male", "male"];
        let y_pred = vec!["female", "male"];
        let scores = precision_recall_fscore_support::<f32>(
            &y_true,
            &y_pred,
            1.0,
            Average::None,
            DivByZeroStrat::ReplaceBy1,
            false,
        )
        .unwrap();
        // Domain sorted: female, male. Female has no true instance, so its recall denominator
        // is zero and gets the substitute.
        assert_eq!(scores.recall, array![1.0, 0.5]);
        assert!(scores.degenerate);
    }

    #[test]
    fn test_par_divide_results_and_mask() {
        let numerator = array![[1., 2., 4., 5.]].into_shared();
        let mut cloned = numerator.clone();
        let mut same_cloned = numerator.clone();
        let denominator = cloned.view_mut();
        let same_denominator = same_cloned.view_mut();
        let (div_result, zero_mask) =
            prf_divide_results_and_mask(numerator.clone(), same_denominator);
        let (par_div_result, par_zero_mask) =
            par_prf_divide_results_and_mask(numerator, denominator);
        let has_no_zero = zero_mask == ArcArray::ones(div_result.raw_dim());
        let par_has_no_zero = par_zero_mask == ArcArray::ones(par_div_result.raw_dim());
        assert!(has_no_zero);
        assert!(par_has_no_zero);
        assert_eq!(div_result, array![[1., 1., 1., 1.,]]);
        assert_eq!(par_div_result, array![[1., 1., 1., 1.,]]);
    }

    #[test]
    fn test_replace_0s_by_1s() {
        let to_be_replaced =
            array![[[1.0, 0.0, 0.0, -1.0, 100.0], [10., 0.0, 0.0, 5.0, 10.]]].to_shared();
        let synchronous_actual = replace(to_be_replaced.clone(), 0.0, 1.0);
        let parallel_actual = par_replace(to_be_replaced, 0.0, 1.0);
        let expected = array![[[1.0, 1.0, 1.0, -1.0, 100.0], [10., 1.0, 1.0, 5.0, 10.]]];
        assert_eq!(synchronous_actual, expected);
        assert_eq!(parallel_actual, expected);
    }

    #[test]
    fn test_substitute_masked() {
        let values = array![0.0, 0.5, 0.0].to_shared();
        let mask = array![1.0, 1.0, 0.0];
        let actual = substitute_masked(values.clone(), &mask, 1.0);
        let par_actual = par_substitute_masked(values, &mask, 1.0);
        let expected = array![0.0, 0.5, 1.0];
        assert_eq!(actual, expected);
        assert_eq!(par_actual, expected);
    }

    #[test]
    fn test_parallel_matches_synchronous() {
        let synchronous = classification_report(&Y_TRUE, &Y_PRED, DivByZeroStrat::ReplaceBy0, false)
            .unwrap();
        let parallel =
            classification_report(&Y_TRUE, &Y_PRED, DivByZeroStrat::ReplaceBy0, true).unwrap();
        assert!(synchronous.are_close(&parallel, 1e-6));
    }

    #[test]
    fn test_err_on_negative_beta() {
        let actual = precision_recall_fscore_support::<f32>(
            &Y_TRUE,
            &Y_PRED,
            -1.0,
            Average::Macro,
            DivByZeroStrat::ReplaceBy0,
            false,
        );
        assert_eq!(actual, Err(ComputationError::BetaNotPositive));
    }

    #[test]
    fn test_empty_input() {
        let res = precision_recall_fscore_support::<f32>(
            &[],
            &[],
            1.0,
            Average::Macro,
            DivByZeroStrat::ReplaceBy0,
            false,
        );
        assert!(res.is_err_and(|err| err == ComputationError::EmptyInput(String::from("y_true"))));
    }

    #[derive(Clone, Copy, Debug, PartialEq)]
    pub enum LabelToTest {
        Male,
        Female,
        Unknown,
    }

    impl quickcheck::Arbitrary for LabelToTest {
        fn arbitrary(g: &mut quickcheck::Gen) -> Self {
            let values = [LabelToTest::Male, LabelToTest::Female, LabelToTest::Unknown];
            *g.choose(&values).unwrap()
        }
    }

    impl From<LabelToTest> for &'static str {
        fn from(value: LabelToTest) -> Self {
            match value {
                LabelToTest::Male => "male",
                LabelToTest::Female => "female",
                LabelToTest::Unknown => "unknown",
            }
        }
    }

    fn paired_labels(
        y_true: Vec<LabelToTest>,
        y_pred: Vec<LabelToTest>,
    ) -> (Vec<&'static str>, Vec<&'static str>) {
        // Truncate to a common length so the pair is always consistent.
        let len = y_true.len().min(y_pred.len());
        let y_true_str = y_true[..len].iter().map(|l| (*l).into()).collect();
        let y_pred_str = y_pred[..len].iter().map(|l| (*l).into()).collect();
        (y_true_str, y_pred_str)
    }

    #[test]
    fn test_property_counts_partition_the_slice() {
        fn counts_partition(y_true: Vec<LabelToTest>, y_pred: Vec<LabelToTest>) -> TestResult {
            let (y_true, y_pred) = paired_labels(y_true, y_pred);
            if y_true.is_empty() {
                return TestResult::discard();
            }
            for class in label_domain(&y_true, &y_pred) {
                let counts = ConfusionCounts::from_labels(&y_true, &y_pred, class);
                let actual_positives = y_true.iter().filter(|t| **t == class).count();
                let predicted_positives = y_pred.iter().filter(|p| **p == class).count();
                if counts.support() != actual_positives {
                    return TestResult::failed();
                }
                if counts.predicted_positive() != predicted_positives {
                    return TestResult::failed();
                }
                let total = counts.true_positive
                    + counts.false_positive
                    + counts.false_negative
                    + counts.true_negative;
                if total != y_true.len() {
                    return TestResult::failed();
                }
            }
            TestResult::passed()
        }
        let mut qc = QuickCheck::new().tests(2000);
        qc.quickcheck(
            counts_partition as fn(y_true: Vec<LabelToTest>, y_pred: Vec<LabelToTest>) -> TestResult,
        )
    }

    #[test]
    fn test_property_supports_sum_to_record_count() {
        fn supports_sum(y_true: Vec<LabelToTest>, y_pred: Vec<LabelToTest>) -> TestResult {
            let (y_true, y_pred) = paired_labels(y_true, y_pred);
            if y_true.is_empty() {
                return TestResult::discard();
            }
            let (_, _, true_sum) = extract_tp_actual_correct(&y_true, &y_pred);
            if true_sum.sum() == y_true.len() {
                TestResult::passed()
            } else {
                TestResult::failed()
            }
        }
        let mut qc = QuickCheck::new().tests(2000);
        qc.quickcheck(
            supports_sum as fn(y_true: Vec<LabelToTest>, y_pred: Vec<LabelToTest>) -> TestResult,
        )
    }

    #[test]
    fn test_property_macro_is_arithmetic_mean() {
        fn macro_is_mean(y_true: Vec<LabelToTest>, y_pred: Vec<LabelToTest>) -> TestResult {
            let (y_true, y_pred) = paired_labels(y_true, y_pred);
            if y_true.is_empty() {
                return TestResult::discard();
            }
            let per_class = precision_recall_fscore_support::<f32>(
                &y_true,
                &y_pred,
                1.0,
                Average::None,
                DivByZeroStrat::ReplaceBy0,
                false,
            )
            .unwrap();
            let averaged = precision_recall_fscore_support::<f32>(
                &y_true,
                &y_pred,
                1.0,
                Average::Macro,
                DivByZeroStrat::ReplaceBy0,
                false,
            )
            .unwrap();
            let expected = per_class.precision.sum() / per_class.precision.len() as f32;
            if f32::abs(averaged.precision.item().unwrap() - expected) < 1e-6 {
                TestResult::passed()
            } else {
                TestResult::failed()
            }
        }
        let mut qc = QuickCheck::new().tests(2000);
        qc.quickcheck(
            macro_is_mean as fn(y_true: Vec<LabelToTest>, y_pred: Vec<LabelToTest>) -> TestResult,
        )
    }

    #[test]
    fn test_property_f1_is_harmonic_mean() {
        fn f1_is_harmonic(y_true: Vec<LabelToTest>, y_pred: Vec<LabelToTest>) -> TestResult {
            let (y_true, y_pred) = paired_labels(y_true, y_pred);
            if y_true.is_empty() {
                return TestResult::discard();
            }
            let scores = precision_recall_fscore_support::<f32>(
                &y_true,
                &y_pred,
                1.0,
                Average::None,
                DivByZeroStrat::ReplaceBy0,
                false,
            )
            .unwrap();
            for (p, (r, f)) in scores
                .precision
                .iter()
                .zip(scores.recall.iter().zip(scores.fscore.iter()))
            {
                if *p == 0.0 && *r == 0.0 {
                    if *f != 0.0 {
                        return TestResult::failed();
                    }
                    continue;
                }
                let harmonic = 2.0 * p * r / (p + r);
                if f32::abs(harmonic - f) >= 1e-6 {
                    return TestResult::failed();
                }
            }
            TestResult::passed()
        }
        let mut qc = QuickCheck::new().tests(2000);
        qc.quickcheck(
            f1_is_harmonic as fn(y_true: Vec<LabelToTest>, y_pred: Vec<LabelToTest>) -> TestResult,
        )
    }
}

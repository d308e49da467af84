/*
 * This modules contains some quality of life structs and alias. Most importantly, it contains the
 * `EvalConfig` struct, which implements the default trait. This config can be passed to the
 * `grouped_report_conf` function to simplify its arguments.
*/
use crate::assembler::DEFAULT_OVERALL_TAG;
use crate::metrics::DivByZeroStrat;
use either::Either as LeftOrRight;
use std::fmt::{Debug, Display};

/// Reasonable default configuration when computing a report.
pub type DefaultEvalConfig = EvalConfig<DivByZeroStrat>;

impl DefaultEvalConfig {
    pub fn new() -> Self {
        Self {
            zero_division: DivByZeroStrat::ReplaceBy0,
            parallel: false,
            grouped: false,
            overall_tag: String::from(DEFAULT_OVERALL_TAG),
        }
    }
}

impl<ZeroDiv> From<(ZeroDiv, bool, bool, String)> for EvalConfig<ZeroDiv>
where
    ZeroDiv: Into<DivByZeroStrat>,
{
    fn from(value: (ZeroDiv, bool, bool, String)) -> Self {
        Self {
            zero_division: value.0,
            parallel: value.1,
            grouped: value.2,
            overall_tag: value.3,
        }
    }
}

impl<ZeroDiv> From<EvalConfigBuilder<ZeroDiv>> for EvalConfig<DivByZeroStrat>
where
    ZeroDiv: Into<DivByZeroStrat>,
{
    fn from(value: EvalConfigBuilder<ZeroDiv>) -> Self {
        Self {
            zero_division: value.zero_division.either_into(),
            parallel: value.parallel,
            grouped: value.grouped,
            overall_tag: value.overall_tag,
        }
    }
}

impl<ZeroDiv> From<EvalConfig<ZeroDiv>> for (DivByZeroStrat, bool, bool, String)
where
    ZeroDiv: Into<DivByZeroStrat>,
{
    fn from(value: EvalConfig<ZeroDiv>) -> Self {
        (
            value.zero_division.into(),
            value.parallel,
            value.grouped,
            value.overall_tag,
        )
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
/// Config struct used to simplify the inputs of parameters to the main functions of `Stratev`. It
/// Implements the default trait.
pub struct EvalConfig<ZeroDiv>
where
    ZeroDiv: Into<DivByZeroStrat>,
{
    /// This parameter describe what to do when we encounter a division by zero when computing
    /// precision and recall. The most common solution is to replace the results by 0.
    zero_division: ZeroDiv,
    /// Can we use multiple cores to compute the metrics? This option should be benched. In
    /// practice, most benchmarks show that it is better to *not* parallelize the computations.
    parallel: bool,
    /// Should the dataset be partitioned on its `group_key` column, with one report computed per
    /// group in addition to the whole-dataset report?
    grouped: bool,
    /// Group identifier stamped on the rows of the whole-dataset report.
    overall_tag: String,
}

impl Default for DefaultEvalConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl<ZeroDiv> Display for EvalConfig<ZeroDiv>
where
    ZeroDiv: Into<DivByZeroStrat> + Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let string = format!("Strategy when encountering a division by zero: {:?}\n Using parallel computations: {}\n Stratifying per group: {}\n Tag of the whole-dataset rows: {}", self.zero_division, self.parallel, self.grouped, self.overall_tag);
        write!(f, "{}", string)
    }
}

/// This builder can be used to build and customize an `EvalConfig` stucture.
pub struct EvalConfigBuilder<ZeroDiv>
where
    ZeroDiv: Into<DivByZeroStrat>,
{
    zero_division: LeftOrRight<ZeroDiv, DivByZeroStrat>,
    parallel: bool,
    grouped: bool,
    overall_tag: String,
}

impl Default for EvalConfigBuilder<DivByZeroStrat> {
    fn default() -> Self {
        Self::new()
    }
}

impl<ZeroDiv> EvalConfigBuilder<ZeroDiv>
where
    ZeroDiv: Into<DivByZeroStrat>,
{
    pub fn division_by_zero(mut self, division_by_zero: ZeroDiv) -> Self {
        self.zero_division = LeftOrRight::Left(division_by_zero);
        self
    }
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
    pub fn grouped(mut self, grouped: bool) -> Self {
        self.grouped = grouped;
        self
    }
    pub fn overall_tag(mut self, overall_tag: impl Into<String>) -> Self {
        self.overall_tag = overall_tag.into();
        self
    }
    pub fn new() -> Self {
        Self {
            zero_division: LeftOrRight::Right(DivByZeroStrat::ReplaceBy0),
            parallel: false,
            grouped: false,
            overall_tag: String::from(DEFAULT_OVERALL_TAG),
        }
    }
    pub fn build(self) -> EvalConfig<DivByZeroStrat> {
        EvalConfig::from(self)
    }
}
#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(DivByZeroStrat::ReplaceBy1)]
    #[case(DivByZeroStrat::ReplaceBy0)]
    #[case(DivByZeroStrat::ReturnError)]
    fn test_builder_setters_division_by_zero(#[case] strat: DivByZeroStrat) {
        let builder = EvalConfigBuilder::default();
        let div_by_zero = strat;
        let config = builder.division_by_zero(div_by_zero).build();
        assert_eq!(config.zero_division, div_by_zero)
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn test_builder_setters_parallel(#[case] parallel: bool) {
        let builder = EvalConfigBuilder::default();
        let config = builder.parallel(parallel).build();
        assert_eq!(config.parallel, parallel)
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn test_builder_setters_grouped(#[case] grouped: bool) {
        let builder = EvalConfigBuilder::default();
        let config = builder.grouped(grouped).build();
        assert_eq!(config.grouped, grouped)
    }

    #[test]
    fn test_builder_setters_overall_tag() {
        let builder = EvalConfigBuilder::default();
        let config = builder.overall_tag("everyone").build();
        assert_eq!(config.overall_tag, "everyone");
        let defaulted = EvalConfigBuilder::default().build();
        assert_eq!(defaulted.overall_tag, DEFAULT_OVERALL_TAG)
    }
}

use crate::classify::{
    classify_columns, partition_columns, ClassificationCounts, ClassifyOptions, ColumnClasses,
};
use crate::dataset::{serialize_rows, Dataset};
use crate::outliers::{collect_outliers, OutlierRange, OutlierSelection, ThresholdOptions};
use crate::profile::{
    categorical_summary, missing_value_report, missing_vs_target, numeric_summary,
    structural_summary, FrequencyTable, MissingTargetSummary, StructuralSummary,
};
use crate::quantile::DistributionSummary;
use crate::render::ChartRenderer;
use eda_lens_common::{ReportConfig, ReportFormat, Result};
use serde::Serialize;
use std::fmt;
use std::io::Write;
use tracing::warn;

/// Display slice of an outlier selection.
#[derive(Debug, Clone, Serialize)]
pub struct OutlierPreview {
    pub column: String,
    pub range: OutlierRange,
    pub total: usize,
    pub truncated: bool,
    #[serde(serialize_with = "serialize_rows")]
    pub rows: Dataset,
}

impl OutlierPreview {
    pub fn from_selection(selection: &OutlierSelection) -> Self {
        Self {
            column: selection.column.clone(),
            range: selection.range,
            total: selection.len(),
            truncated: selection.is_truncated_for_display(),
            rows: selection.preview(),
        }
    }
}

impl fmt::Display for OutlierPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} outlier rows outside [{}, {}]",
            self.column, self.total, self.range.low_limit, self.range.high_limit
        )?;
        match self.rows.pretty() {
            Ok(table) => write!(f, "{table}"),
            Err(_) => write!(f, "<unprintable rows>"),
        }
    }
}

#[derive(Serialize)]
struct ClassificationOutput<'c> {
    counts: ClassificationCounts,
    classes: &'c ColumnClasses,
}

/// Writes summaries to an output stream, optionally handing charts to a renderer.
///
/// Every method returns the computed value as well, so callers can keep
/// working with it after it has been printed.
pub struct Reporter<'a, W: Write> {
    out: W,
    config: ReportConfig,
    renderer: Option<&'a mut dyn ChartRenderer>,
}

impl<'a, W: Write> Reporter<'a, W> {
    pub fn new(out: W, config: ReportConfig) -> Self {
        Self {
            out,
            config,
            renderer: None,
        }
    }

    pub fn with_renderer(mut self, renderer: &'a mut dyn ChartRenderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit<T: Serialize + fmt::Display>(&mut self, value: &T) -> Result<()> {
        match self.config.format {
            ReportFormat::Text => writeln!(self.out, "{value}")?,
            ReportFormat::Json => {
                serde_json::to_writer(&mut self.out, value)?;
                writeln!(self.out)?;
            }
        }
        Ok(())
    }

    fn chart(&mut self, column: &str) -> Option<&mut (dyn ChartRenderer + 'a)> {
        if !self.config.plot {
            return None;
        }
        let renderer = self.renderer.as_deref_mut();
        if renderer.is_none() {
            warn!(column, "plotting requested but no renderer attached");
        }
        renderer
    }

    /// Shape, types, trailing rows, missing counts and quantiles.
    pub fn check_df(&mut self, dataset: &Dataset) -> Result<StructuralSummary> {
        let summary = structural_summary(dataset, self.config.tail_rows)?;
        self.emit(&summary)?;
        Ok(summary)
    }

    pub fn cat_summary(&mut self, dataset: &Dataset, column: &str) -> Result<FrequencyTable> {
        let table = categorical_summary(dataset, column)?;
        self.emit(&table)?;
        if let Some(renderer) = self.chart(column) {
            renderer.count_plot(column, &table);
        }
        Ok(table)
    }

    pub fn num_summary(&mut self, dataset: &Dataset, column: &str) -> Result<DistributionSummary> {
        let summary = numeric_summary(dataset, column)?;
        if self.config.format == ReportFormat::Text {
            writeln!(self.out, "{column}")?;
        }
        self.emit(&summary)?;
        if self.config.plot {
            let values = dataset.numeric_values(column)?;
            if let Some(renderer) = self.chart(column) {
                renderer.histogram(column, &values);
            }
        }
        Ok(summary)
    }

    /// Classifies the columns, printing the count summary.
    pub fn grab_col_names(
        &mut self,
        dataset: &Dataset,
        opts: &ClassifyOptions,
    ) -> Result<ColumnClasses> {
        match self.config.format {
            ReportFormat::Text => classify_columns(dataset, opts, &mut self.out),
            ReportFormat::Json => {
                let classes = partition_columns(dataset, opts)?;
                let output = ClassificationOutput {
                    counts: classes.counts(dataset),
                    classes: &classes,
                };
                serde_json::to_writer(&mut self.out, &output)?;
                writeln!(self.out)?;
                Ok(classes)
            }
        }
    }

    /// Prints the missing-value table; returns the affected column names when `na_name` is set.
    pub fn missing_values_table(
        &mut self,
        dataset: &Dataset,
        na_name: bool,
    ) -> Result<Option<Vec<String>>> {
        let report = missing_value_report(dataset)?;
        self.emit(&report)?;
        Ok(na_name.then(|| report.column_names()))
    }

    pub fn missing_vs_target(
        &mut self,
        dataset: &Dataset,
        target: &str,
        na_columns: &[String],
    ) -> Result<Vec<MissingTargetSummary>> {
        let summaries = missing_vs_target(dataset, target, na_columns)?;
        for summary in &summaries {
            self.emit(summary)?;
        }
        Ok(summaries)
    }

    /// Prints the outlier rows of `column` (first five once more than ten
    /// were found) and returns the full selection.
    pub fn outlier_preview(
        &mut self,
        dataset: &Dataset,
        column: &str,
        return_indices: bool,
        opts: &ThresholdOptions,
    ) -> Result<OutlierSelection> {
        let selection = collect_outliers(dataset, column, return_indices, opts)?;
        self.emit(&OutlierPreview::from_selection(&selection))?;
        Ok(selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl ChartRenderer for Recorder {
        fn count_plot(&mut self, column: &str, table: &FrequencyTable) {
            self.calls.push(format!("count:{column}:{}", table.entries.len()));
        }

        fn histogram(&mut self, column: &str, values: &[f64]) {
            self.calls.push(format!("hist:{column}:{}", values.len()));
        }
    }

    fn data() -> Dataset {
        Dataset::from_columns(vec![
            (
                "age",
                Arc::new(Int64Array::from(vec![
                    10, 12, 11, 13, 90, 12, 11, 14, 13, 12, 11, 500,
                ])) as ArrayRef,
            ),
            (
                "city",
                Arc::new(StringArray::from(vec![
                    Some("a"),
                    Some("b"),
                    None,
                    Some("a"),
                    Some("a"),
                    Some("b"),
                    Some("c"),
                    Some("a"),
                    Some("b"),
                    Some("a"),
                    Some("c"),
                    Some("a"),
                ])) as ArrayRef,
            ),
            (
                "score",
                Arc::new(Float64Array::from(vec![
                    Some(1.0),
                    None,
                    Some(3.0),
                    Some(4.0),
                    None,
                    Some(6.0),
                    Some(7.0),
                    Some(8.0),
                    Some(9.0),
                    Some(10.0),
                    Some(11.0),
                    Some(12.0),
                ])) as ArrayRef,
            ),
            (
                "active",
                Arc::new(BooleanArray::from(vec![
                    true, false, true, true, false, true, true, true, false, true, true, true,
                ])) as ArrayRef,
            ),
        ])
        .unwrap()
    }

    fn plotting() -> ReportConfig {
        ReportConfig {
            plot: true,
            ..ReportConfig::default()
        }
    }

    fn text(reporter: Reporter<'_, Vec<u8>>) -> String {
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn renderer_called_only_when_plotting() {
        let ds = data();
        let mut recorder = Recorder::default();
        {
            let mut reporter =
                Reporter::new(Vec::new(), ReportConfig::default()).with_renderer(&mut recorder);
            reporter.cat_summary(&ds, "city").unwrap();
            reporter.num_summary(&ds, "score").unwrap();
        }
        assert!(recorder.calls.is_empty());

        {
            let mut reporter = Reporter::new(Vec::new(), plotting()).with_renderer(&mut recorder);
            reporter.cat_summary(&ds, "city").unwrap();
            reporter.num_summary(&ds, "score").unwrap();
        }
        assert_eq!(recorder.calls, vec!["count:city:3", "hist:score:10"]);
    }

    #[test]
    fn plotting_without_renderer_still_reports() {
        let ds = data();
        let mut reporter = Reporter::new(Vec::new(), plotting());
        let table = reporter.cat_summary(&ds, "active").unwrap();
        assert_eq!(table.get("1").unwrap().count, 9);
        assert!(text(reporter).contains("Ratio"));
    }

    #[test]
    fn check_df_prints_sections() {
        let ds = data();
        let mut reporter = Reporter::new(Vec::new(), ReportConfig::default());
        let summary = reporter.check_df(&ds).unwrap();
        assert_eq!(summary.tail.row_count(), 5);
        let out = text(reporter);
        assert!(out.contains("(12, 4)"));
        assert!(out.contains("Quantiles"));
    }

    #[test]
    fn missing_values_table_returns_names_on_request() {
        let ds = data();
        let mut reporter = Reporter::new(Vec::new(), ReportConfig::default());
        assert_eq!(reporter.missing_values_table(&ds, false).unwrap(), None);
        assert_eq!(
            reporter.missing_values_table(&ds, true).unwrap(),
            Some(vec!["score".to_string(), "city".to_string()])
        );
        assert!(text(reporter).contains("n_miss"));
    }

    #[test]
    fn grab_col_names_writes_counts() {
        let ds = data();
        let mut reporter = Reporter::new(Vec::new(), ReportConfig::default());
        let classes = reporter
            .grab_col_names(&ds, &ClassifyOptions::default())
            .unwrap();
        // age has seven distinct values, below the default cat_th of 10
        assert_eq!(classes.categorical, vec!["city", "active", "age"]);
        assert_eq!(classes.numeric, vec!["score"]);
        assert_eq!(classes.numeric_but_categorical, vec!["age"]);
        assert!(text(reporter).contains("Observations"));
    }

    #[test]
    fn json_output_is_one_document_per_line() {
        let ds = data();
        let config = ReportConfig {
            format: ReportFormat::Json,
            ..ReportConfig::default()
        };
        let mut reporter = Reporter::new(Vec::new(), config);
        reporter.cat_summary(&ds, "city").unwrap();
        reporter
            .grab_col_names(&ds, &ClassifyOptions::default())
            .unwrap();
        reporter
            .outlier_preview(&ds, "age", true, &ThresholdOptions::default())
            .unwrap();
        let out = text(reporter);
        let docs: Vec<serde_json::Value> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0]["column"], "city");
        assert_eq!(docs[1]["counts"]["observations"], 12);
        assert_eq!(docs[2]["total"], 2);
        assert_eq!(docs[2]["rows"]["rows"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn outlier_preview_returns_full_selection() {
        let ds = data();
        let mut reporter = Reporter::new(Vec::new(), ReportConfig::default());
        let selection = reporter
            .outlier_preview(&ds, "age", true, &ThresholdOptions::default())
            .unwrap();
        assert_eq!(selection.indices(), Some(&[4usize, 11][..]));
        assert!(text(reporter).contains("2 outlier rows"));
    }

    #[test]
    fn missing_vs_target_emits_each_column() {
        let ds = data();
        let mut reporter = Reporter::new(Vec::new(), ReportConfig::default());
        let out = reporter
            .missing_vs_target(&ds, "age", &["score".to_string(), "city".to_string()])
            .unwrap();
        assert_eq!(out.len(), 2);
        let printed = text(reporter);
        assert!(printed.contains("score_NA_FLAG"));
        assert!(printed.contains("city_NA_FLAG"));
    }
}

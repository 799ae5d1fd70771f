//! Fitted column preprocessor: standard scaling and one-hot encoding

use crate::artifacts::{read_json, FeatureTransformer};
use crate::error::{LoadError, TransformError};
use crate::features::{FeatureRow, FeatureValue, INPUT_COLUMNS};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Behaviour of the encoder for a category it was not fitted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    #[default]
    Error,
    Ignore,
}

/// One fitted step of the column transformer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnTransform {
    StandardScaler {
        name: String,
        columns: Vec<String>,
        mean: Vec<f64>,
        scale: Vec<f64>,
    },
    OneHotEncoder {
        name: String,
        columns: Vec<String>,
        categories: Vec<Vec<String>>,
        #[serde(default)]
        handle_unknown: HandleUnknown,
    },
    Passthrough {
        name: String,
        columns: Vec<String>,
    },
}

impl ColumnTransform {
    fn name(&self) -> &str {
        match self {
            ColumnTransform::StandardScaler { name, .. }
            | ColumnTransform::OneHotEncoder { name, .. }
            | ColumnTransform::Passthrough { name, .. } => name,
        }
    }

    fn columns(&self) -> &[String] {
        match self {
            ColumnTransform::StandardScaler { columns, .. }
            | ColumnTransform::OneHotEncoder { columns, .. }
            | ColumnTransform::Passthrough { columns, .. } => columns,
        }
    }

    fn validate(&self) -> Result<(), LoadError> {
        let name = self.name();
        let n_columns = self.columns().len();

        for column in self.columns() {
            if !INPUT_COLUMNS.contains(&column.as_str()) {
                return Err(LoadError::Inconsistent(format!(
                    "transformer '{}' references unknown column '{}'",
                    name, column
                )));
            }
        }

        match self {
            ColumnTransform::StandardScaler { mean, scale, .. } => {
                if mean.len() != n_columns || scale.len() != n_columns {
                    return Err(LoadError::Inconsistent(format!(
                        "scaler '{}' has {} columns but {} means and {} scales",
                        name,
                        n_columns,
                        mean.len(),
                        scale.len()
                    )));
                }
                if mean.iter().chain(scale.iter()).any(|v| !v.is_finite()) {
                    return Err(LoadError::Inconsistent(format!(
                        "scaler '{}' contains non-finite parameters",
                        name
                    )));
                }
            }
            ColumnTransform::OneHotEncoder { categories, .. } => {
                if categories.len() != n_columns {
                    return Err(LoadError::Inconsistent(format!(
                        "encoder '{}' has {} columns but {} category lists",
                        name,
                        n_columns,
                        categories.len()
                    )));
                }
                if let Some(pos) = categories.iter().position(|c| c.is_empty()) {
                    return Err(LoadError::Inconsistent(format!(
                        "encoder '{}' has no categories for column '{}'",
                        name,
                        self.columns()[pos]
                    )));
                }
            }
            ColumnTransform::Passthrough { .. } => {}
        }

        Ok(())
    }

    fn width(&self) -> usize {
        match self {
            ColumnTransform::OneHotEncoder { categories, .. } => {
                categories.iter().map(Vec::len).sum()
            }
            other => other.columns().len(),
        }
    }

    fn feature_names(&self, out: &mut Vec<String>) {
        match self {
            ColumnTransform::OneHotEncoder {
                name,
                columns,
                categories,
                ..
            } => {
                for (column, cats) in columns.iter().zip(categories) {
                    for category in cats {
                        out.push(format!("{}__{}_{}", name, column, category));
                    }
                }
            }
            other => {
                for column in other.columns() {
                    out.push(format!("{}__{}", other.name(), column));
                }
            }
        }
    }

    fn encode(&self, row: &FeatureRow, out: &mut Vec<f64>) -> Result<(), TransformError> {
        match self {
            ColumnTransform::StandardScaler {
                columns,
                mean,
                scale,
                ..
            } => {
                for ((column, mu), sigma) in columns.iter().zip(mean).zip(scale) {
                    let x = numeric_cell(row, column)?;
                    // A constant column was fitted with zero variance
                    let sigma = if *sigma == 0.0 { 1.0 } else { *sigma };
                    out.push((x - mu) / sigma);
                }
            }
            ColumnTransform::OneHotEncoder {
                columns,
                categories,
                handle_unknown,
                ..
            } => {
                for (column, cats) in columns.iter().zip(categories) {
                    let value = cell(row, column)?;
                    let hit = match value {
                        FeatureValue::Category(label) => cats.iter().position(|c| c == label),
                        FeatureValue::Number(x) => cats
                            .iter()
                            .position(|c| c.parse::<f64>().map_or(false, |v| v == *x)),
                    };

                    if hit.is_none() && *handle_unknown == HandleUnknown::Error {
                        let value = match value {
                            FeatureValue::Category(label) => label.to_string(),
                            FeatureValue::Number(x) => x.to_string(),
                        };
                        return Err(TransformError::UnknownCategory {
                            column: column.clone(),
                            value,
                        });
                    }

                    out.extend((0..cats.len()).map(|i| if Some(i) == hit { 1.0 } else { 0.0 }));
                }
            }
            ColumnTransform::Passthrough { columns, .. } => {
                for column in columns {
                    out.push(numeric_cell(row, column)?);
                }
            }
        }
        Ok(())
    }
}

fn cell<'a>(row: &'a FeatureRow, column: &str) -> Result<&'a FeatureValue, TransformError> {
    row.get(column)
        .ok_or_else(|| TransformError::MissingColumn(column.to_string()))
}

fn numeric_cell(row: &FeatureRow, column: &str) -> Result<f64, TransformError> {
    match cell(row, column)? {
        FeatureValue::Number(x) if x.is_finite() => Ok(*x),
        FeatureValue::Number(x) => Err(TransformError::NotFinite {
            column: column.to_string(),
            value: *x,
        }),
        FeatureValue::Category(_) => Err(TransformError::TypeMismatch {
            column: column.to_string(),
            expected: "numeric",
        }),
    }
}

/// Column transformer applying its steps in order; unlisted columns are dropped
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnPreprocessor {
    pub transformers: Vec<ColumnTransform>,
}

impl ColumnPreprocessor {
    pub fn new(transformers: Vec<ColumnTransform>) -> Result<Self, LoadError> {
        let preprocessor = Self { transformers };
        preprocessor.validate()?;
        Ok(preprocessor)
    }

    /// Load an exported preprocessor from JSON
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let preprocessor: ColumnPreprocessor = read_json(path)?;
        preprocessor.validate()?;
        tracing::debug!(
            path = %path.display(),
            steps = preprocessor.transformers.len(),
            "preprocessor loaded"
        );
        Ok(preprocessor)
    }

    fn validate(&self) -> Result<(), LoadError> {
        if self.transformers.is_empty() {
            return Err(LoadError::Inconsistent(
                "preprocessor has no transformers".to_string(),
            ));
        }
        self.transformers.iter().try_for_each(ColumnTransform::validate)
    }

    pub fn n_features_out(&self) -> usize {
        self.transformers.iter().map(ColumnTransform::width).sum()
    }
}

impl FeatureTransformer for ColumnPreprocessor {
    fn transform(&self, row: &FeatureRow) -> Result<Array2<f64>, TransformError> {
        let mut values = Vec::with_capacity(self.n_features_out());
        for transformer in &self.transformers {
            transformer.encode(row, &mut values)?;
        }
        Ok(Array1::from(values).insert_axis(Axis(0)))
    }

    fn feature_names_out(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.n_features_out());
        for transformer in &self.transformers {
            transformer.feature_names(&mut names);
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::CustomerRecord;
    use crate::features::{assemble_row, derive_features};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn small_preprocessor(handle_unknown: HandleUnknown) -> ColumnPreprocessor {
        ColumnPreprocessor::new(vec![
            ColumnTransform::StandardScaler {
                name: "num".to_string(),
                columns: strings(&["tenure", "MonthlyCharges"]),
                mean: vec![32.0, 65.0],
                scale: vec![24.0, 0.0],
            },
            ColumnTransform::OneHotEncoder {
                name: "cat".to_string(),
                columns: strings(&["Contract", "InternetService"]),
                categories: vec![
                    strings(&["Month-to-month", "One year", "Two year"]),
                    strings(&["DSL", "No"]),
                ],
                handle_unknown,
            },
        ])
        .unwrap()
    }

    fn default_row() -> FeatureRow {
        let record = CustomerRecord::default();
        assemble_row(&record, &derive_features(&record))
    }

    #[test]
    fn test_transform_scales_and_encodes() {
        let preprocessor = small_preprocessor(HandleUnknown::Error);
        let matrix = preprocessor.transform(&default_row()).unwrap();

        assert_eq!(matrix.shape(), &[1, 7]);
        let row = matrix.row(0);
        assert!((row[0] - (12.0 - 32.0) / 24.0).abs() < 1e-12);
        // Zero scale leaves the centred value unscaled
        assert!((row[1] - 5.0).abs() < 1e-12);
        assert_eq!(row.iter().skip(2).copied().collect::<Vec<_>>(), vec![1.0, 0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_feature_names_out() {
        let names = small_preprocessor(HandleUnknown::Error).feature_names_out();
        assert_eq!(
            names,
            strings(&[
                "num__tenure",
                "num__MonthlyCharges",
                "cat__Contract_Month-to-month",
                "cat__Contract_One year",
                "cat__Contract_Two year",
                "cat__InternetService_DSL",
                "cat__InternetService_No",
            ])
        );
    }

    #[test]
    fn test_unknown_category_policy() {
        let record = CustomerRecord {
            internet_service: crate::customer::InternetService::FiberOptic,
            ..CustomerRecord::default()
        };
        let row = assemble_row(&record, &derive_features(&record));

        let err = small_preprocessor(HandleUnknown::Error)
            .transform(&row)
            .unwrap_err();
        assert_eq!(
            err,
            TransformError::UnknownCategory {
                column: "InternetService".to_string(),
                value: "Fiber optic".to_string(),
            }
        );

        let matrix = small_preprocessor(HandleUnknown::Ignore).transform(&row).unwrap();
        assert_eq!(matrix[[0, 5]], 0.0);
        assert_eq!(matrix[[0, 6]], 0.0);
    }

    #[test]
    fn test_non_finite_and_type_mismatch() {
        let preprocessor = small_preprocessor(HandleUnknown::Error);

        let row = FeatureRow::new(vec![
            ("tenure", FeatureValue::Number(f64::INFINITY)),
            ("MonthlyCharges", FeatureValue::Number(1.0)),
        ]);
        assert!(matches!(
            preprocessor.transform(&row),
            Err(TransformError::NotFinite { .. })
        ));

        let row = FeatureRow::new(vec![("tenure", FeatureValue::Category("twelve"))]);
        assert!(matches!(
            preprocessor.transform(&row),
            Err(TransformError::TypeMismatch { .. })
        ));

        let row = FeatureRow::new(vec![("tenure", FeatureValue::Number(3.0))]);
        assert_eq!(
            preprocessor.transform(&row).unwrap_err(),
            TransformError::MissingColumn("MonthlyCharges".to_string())
        );
    }

    #[test]
    fn test_numeric_column_one_hot() {
        let preprocessor = ColumnPreprocessor::new(vec![ColumnTransform::OneHotEncoder {
            name: "cat".to_string(),
            columns: strings(&["SeniorCitizen"]),
            categories: vec![strings(&["0", "1"])],
            handle_unknown: HandleUnknown::Error,
        }])
        .unwrap();

        let matrix = preprocessor.transform(&default_row()).unwrap();
        assert_eq!(matrix.row(0).to_vec(), vec![1.0, 0.0]);
    }

    #[test]
    fn test_invalid_definitions_rejected() {
        let bad_arity = ColumnPreprocessor::new(vec![ColumnTransform::StandardScaler {
            name: "num".to_string(),
            columns: strings(&["tenure"]),
            mean: vec![],
            scale: vec![1.0],
        }]);
        assert!(matches!(bad_arity, Err(LoadError::Inconsistent(_))));

        let bad_column = ColumnPreprocessor::new(vec![ColumnTransform::Passthrough {
            name: "rest".to_string(),
            columns: strings(&["customerID"]),
        }]);
        assert!(bad_column.is_err());

        assert!(ColumnPreprocessor::new(vec![]).is_err());
    }

    #[test]
    fn test_load_from_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"transformers": [
                {{"kind": "standard_scaler", "name": "num", "columns": ["tenure"], "mean": [0.0], "scale": [72.0]}},
                {{"kind": "one_hot_encoder", "name": "cat", "columns": ["gender"], "categories": [["Female", "Male"]]}}
            ]}}"#
        )
        .unwrap();

        let preprocessor = ColumnPreprocessor::load(file.path()).unwrap();
        assert_eq!(preprocessor.n_features_out(), 3);
        let matrix = preprocessor.transform(&default_row()).unwrap();
        assert_eq!(matrix.row(0).to_vec(), vec![12.0 / 72.0, 0.0, 1.0]);
    }

    #[test]
    fn test_load_errors() {
        let missing = ColumnPreprocessor::load(Path::new("/nonexistent/preprocessor.json"));
        assert!(matches!(missing, Err(LoadError::Io { .. })));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            ColumnPreprocessor::load(file.path()),
            Err(LoadError::Parse { .. })
        ));
    }
}

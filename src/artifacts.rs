//! Model-serving contract and the process-wide artifact bundle

use crate::error::{InferenceError, LoadError, TransformError};
use crate::features::FeatureRow;
use crate::model::GradientBoostedTrees;
use crate::preprocess::ColumnPreprocessor;
use ndarray::Array2;
use std::path::Path;

/// A fitted binary classifier
pub trait ChurnClassifier: Send + Sync {
    /// Class probabilities, one row per input row, columns `[P(stay), P(churn)]`
    fn predict_proba(&self, features: &Array2<f64>) -> Result<Array2<f64>, InferenceError>;

    /// Importance per model input feature, aligned with the preprocessor output names
    fn feature_importances(&self) -> &[f64];
}

/// A fitted preprocessing transformer
pub trait FeatureTransformer: Send + Sync {
    /// Encode a named input row as a 1×N numeric matrix
    fn transform(&self, row: &FeatureRow) -> Result<Array2<f64>, TransformError>;

    /// Names of the N output features, in column order
    fn feature_names_out(&self) -> Vec<String>;
}

/// Classifier and preprocessor, loaded once and shared read-only
pub struct ModelArtifacts {
    classifier: Box<dyn ChurnClassifier>,
    preprocessor: Box<dyn FeatureTransformer>,
}

impl ModelArtifacts {
    /// Bundle already constructed adapters, checking that they agree on width
    pub fn new(
        classifier: Box<dyn ChurnClassifier>,
        preprocessor: Box<dyn FeatureTransformer>,
    ) -> Result<Self, LoadError> {
        let n_outputs = preprocessor.feature_names_out().len();
        let n_importances = classifier.feature_importances().len();
        if n_outputs != n_importances {
            return Err(LoadError::Inconsistent(format!(
                "preprocessor emits {} features but the classifier reports {} importances",
                n_outputs, n_importances
            )));
        }

        Ok(Self {
            classifier,
            preprocessor,
        })
    }

    /// Load the exported gradient-boosting model and column preprocessor
    pub fn load(
        model_path: impl AsRef<Path>,
        preprocessor_path: impl AsRef<Path>,
    ) -> Result<Self, LoadError> {
        let model = GradientBoostedTrees::load(model_path.as_ref())?;
        let preprocessor = ColumnPreprocessor::load(preprocessor_path.as_ref())?;

        tracing::info!(
            trees = model.n_trees(),
            features = preprocessor.n_features_out(),
            "model artifacts loaded"
        );

        Self::new(Box::new(model), Box::new(preprocessor))
    }

    pub fn classifier(&self) -> &dyn ChurnClassifier {
        self.classifier.as_ref()
    }

    pub fn preprocessor(&self) -> &dyn FeatureTransformer {
        self.preprocessor.as_ref()
    }
}

impl std::fmt::Debug for ModelArtifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelArtifacts")
            .field("n_features", &self.classifier.feature_importances().len())
            .finish_non_exhaustive()
    }
}

/// Read an artifact file and deserialize it from JSON
pub(crate) fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

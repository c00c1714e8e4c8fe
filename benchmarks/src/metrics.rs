use forest_machine::Prediction;

/// Metrics for evaluating classifiers.
pub struct Metrics;

impl Metrics {
    /// Fraction of predictions equal to the truth.
    ///
    /// # Arguments
    ///
    /// * `y_true` - Ground truth labels
    /// * `y_pred` - Predicted labels
    ///
    /// # Returns
    ///
    /// Accuracy in `[0, 1]` (higher is better); 0 for empty input
    pub fn accuracy<S: AsRef<str>, T: AsRef<str>>(y_true: &[S], y_pred: &[T]) -> f64 {
        assert_eq!(
            y_true.len(),
            y_pred.len(),
            "Arrays must have the same length"
        );

        if y_true.is_empty() {
            return 0.0;
        }

        let correct = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(t, p)| t.as_ref() == p.as_ref())
            .count();

        correct as f64 / y_true.len() as f64
    }

    /// Mean of the winning vote fractions.
    pub fn mean_confidence(confidences: &[f64]) -> f64 {
        if confidences.is_empty() {
            return 0.0;
        }
        confidences.iter().sum::<f64>() / confidences.len() as f64
    }

    /// Accuracy, mean confidence and `class` precision/recall of a batch.
    pub fn evaluate<S: AsRef<str>>(
        y_true: &[S],
        predictions: &[Prediction],
        class: &str,
    ) -> Evaluation {
        let labels: Vec<&str> = predictions.iter().map(|p| p.label.as_str()).collect();
        let confidences: Vec<f64> = predictions.iter().map(|p| p.confidence).collect();
        Evaluation {
            accuracy: Self::accuracy(y_true, &labels),
            mean_confidence: Self::mean_confidence(&confidences),
            class: Self::precision_recall(y_true, &labels, class),
        }
    }

    /// Per-class precision and recall for `class`.
    pub fn precision_recall<S: AsRef<str>, T: AsRef<str>>(
        y_true: &[S],
        y_pred: &[T],
        class: &str,
    ) -> ClassMetrics {
        assert_eq!(
            y_true.len(),
            y_pred.len(),
            "Arrays must have the same length"
        );

        let mut tp = 0usize;
        let mut fp = 0usize;
        let mut fn_ = 0usize;
        for (t, p) in y_true.iter().zip(y_pred.iter()) {
            match (t.as_ref() == class, p.as_ref() == class) {
                (true, true) => tp += 1,
                (false, true) => fp += 1,
                (true, false) => fn_ += 1,
                (false, false) => {}
            }
        }

        let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
        ClassMetrics {
            precision: ratio(tp, tp + fp),
            recall: ratio(tp, tp + fn_),
        }
    }
}

/// Batch prediction quality against known labels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub accuracy: f64,
    pub mean_confidence: f64,
    /// Precision and recall of the class passed to [`Metrics::evaluate`].
    pub class: ClassMetrics,
}

/// Precision and recall of a single class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
}

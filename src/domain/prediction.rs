//! Prediction tasks and their results.
//!
//! Each task owns one bundled model. The output class order is fixed by the
//! training notebooks and cannot be discovered from the model at runtime.

use serde::{Deserialize, Serialize};

use super::advice::{advice_for, Advice};
use super::encoding;
use super::survey::{SurveyField, SurveyState};

/// One of the bundled prediction models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredictionTask {
    HeartDisease,
    MaternalHealthRisk,
    ObesityLikelihood,
    DiabetesLikelihood,
}

impl PredictionTask {
    pub const ALL: [Self; 4] = [
        Self::HeartDisease,
        Self::MaternalHealthRisk,
        Self::ObesityLikelihood,
        Self::DiabetesLikelihood,
    ];

    /// Panel title.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::HeartDisease => "Heart Disease Prediction",
            Self::MaternalHealthRisk => "Maternal Health Risk",
            Self::ObesityLikelihood => "Obesity Likelihood Predictor",
            Self::DiabetesLikelihood => "Diabetes Likelihood Predictor",
        }
    }

    /// File name of the model inside the model directory.
    #[must_use]
    pub fn model_file(&self) -> &'static str {
        match self {
            Self::HeartDisease => "heart_disease_model.onnx",
            Self::MaternalHealthRisk => "maternal_health_risk_model.onnx",
            Self::ObesityLikelihood => "obesity_likelihood_model.onnx",
            Self::DiabetesLikelihood => "diabetes_likelihood_model.onnx",
        }
    }

    /// Output class names, in model output order.
    #[must_use]
    pub fn class_labels(&self) -> &'static [&'static str] {
        match self {
            Self::HeartDisease => &["Absence", "Presence"],
            Self::MaternalHealthRisk => &["High Risk", "Low Risk", "Medium Risk"],
            Self::ObesityLikelihood => &[
                "Underweight",
                "Normal Weight",
                "Obesity I",
                "Obesity II",
                "Obesity III",
                "Overweight I",
                "Overweight II",
            ],
            Self::DiabetesLikelihood => &["No Diabetes", "Prediabetes", "Diabetes"],
        }
    }

    /// Verdict shown for the winning class. Only the heart model words its
    /// verdict differently from the class name.
    #[must_use]
    pub fn verdict_label(&self, class: usize) -> Option<&'static str> {
        match self {
            Self::HeartDisease => ["Low Risk", "High Risk"].get(class).copied(),
            _ => self.class_labels().get(class).copied(),
        }
    }

    /// Order in which classes are listed in the results view.
    #[must_use]
    pub fn display_order(&self) -> &'static [usize] {
        match self {
            Self::HeartDisease => &[0, 1],
            Self::MaternalHealthRisk => &[1, 2, 0],
            Self::ObesityLikelihood => &[0, 1, 5, 6, 2, 3, 4],
            Self::DiabetesLikelihood => &[0, 1, 2],
        }
    }

    #[must_use]
    pub fn class_count(&self) -> usize {
        self.class_labels().len()
    }

    /// Input length the model expects.
    #[must_use]
    pub fn feature_len(&self) -> usize {
        match self {
            Self::HeartDisease => encoding::HEART_DISEASE_FEATURES,
            Self::MaternalHealthRisk => encoding::MATERNAL_HEALTH_FEATURES,
            Self::ObesityLikelihood => encoding::OBESITY_FEATURES,
            Self::DiabetesLikelihood => encoding::DIABETES_FEATURES,
        }
    }

    /// Build the model input from the survey.
    #[must_use]
    pub fn encode(&self, state: &SurveyState) -> Vec<f32> {
        match self {
            Self::HeartDisease => encoding::encode_heart_disease(state),
            Self::MaternalHealthRisk => encoding::encode_maternal_health(state),
            Self::ObesityLikelihood => encoding::encode_obesity(state),
            Self::DiabetesLikelihood => encoding::encode_diabetes(state),
        }
    }

    /// Survey fields read by this task's encoder, in form order.
    #[must_use]
    pub fn fields(&self) -> &'static [SurveyField] {
        use SurveyField as F;
        match self {
            Self::HeartDisease => &[
                F::Age,
                F::Sex,
                F::RestingBloodPressure,
                F::Cholesterol,
                F::MaximumHeartRate,
                F::ChestPainType,
                F::BloodGlucoseLevel,
                F::HasExerciseInducedAngina,
            ],
            Self::MaternalHealthRisk => &[
                F::Age,
                F::SystolicBloodPressure,
                F::DiastolicBloodPressure,
                F::BloodGlucoseLevel,
                F::BodyTemperature,
                F::RestingHeartRate,
            ],
            Self::ObesityLikelihood => &[
                F::Age,
                F::Sex,
                F::HasFamilyHistoryOverweight,
                F::FrequentHighCalorieFood,
                F::FrequentEatBetweenMeals,
                F::FrequentSmoke,
                F::HasMonitorCalories,
                F::FrequentDrinkAlcohol,
                F::UsualTransportation,
            ],
            Self::DiabetesLikelihood => &[
                F::Weight,
                F::Height,
                F::Sex,
                F::SystolicBloodPressure,
                F::DiastolicBloodPressure,
                F::Cholesterol,
                F::HasCholesterolChecked,
                F::GeneralHealthEvaluation,
                F::MentalHealthMonthDecline,
                F::PhysicalHealthMonthDecline,
                F::FrequentSmoke,
                F::HasHadStroke,
                F::HasHeartDisease,
                F::FrequentPhysicalActivity,
                F::FrequentEatFruits,
                F::FrequentEatVegetables,
                F::FrequentDrinkAlcohol,
                F::HasHealthcare,
                F::HasDifficultyClimbing,
            ],
        }
    }
}

impl std::fmt::Display for PredictionTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HeartDisease => write!(f, "heart-disease"),
            Self::MaternalHealthRisk => write!(f, "maternal-health-risk"),
            Self::ObesityLikelihood => write!(f, "obesity-likelihood"),
            Self::DiabetesLikelihood => write!(f, "diabetes-likelihood"),
        }
    }
}

/// Index of the first maximum value, `None` for an empty slice.
///
/// Later entries only win on a strictly greater value, so ties keep the
/// earliest index.
#[must_use]
pub fn index_of_max(values: &[f64]) -> Option<usize> {
    let (first, rest) = values.split_first()?;
    let mut max = *first;
    let mut max_index = 0;
    for (offset, value) in rest.iter().enumerate() {
        if *value > max {
            max = *value;
            max_index = offset + 1;
        }
    }
    Some(max_index)
}

/// Scale raw model outputs to percentages, floored at zero.
#[must_use]
pub fn to_percentages(raw: &[f32]) -> Vec<f64> {
    raw.iter().map(|v| (f64::from(*v) * 100.0).max(0.0)).collect()
}

/// Outcome of one model run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub task: PredictionTask,

    /// One percentage per output class, in model output order.
    pub percentages: Vec<f64>,

    /// Winning class index
    pub verdict: Option<usize>,

    pub computed_at: chrono::DateTime<chrono::Utc>,
}

impl PredictionResult {
    /// Build a result from raw model outputs.
    #[must_use]
    pub fn from_raw(task: PredictionTask, raw: &[f32]) -> Self {
        let percentages = to_percentages(raw);
        let verdict = index_of_max(&percentages);
        Self {
            task,
            percentages,
            verdict,
            computed_at: chrono::Utc::now(),
        }
    }

    #[must_use]
    pub fn verdict_label(&self) -> Option<&'static str> {
        self.verdict.and_then(|idx| self.task.verdict_label(idx))
    }

    /// Recommendations for the winning class.
    #[must_use]
    pub fn advice(&self) -> Option<&'static Advice> {
        self.verdict.and_then(|idx| advice_for(self.task, idx))
    }

    /// `(class label, percentage)` pairs in display order.
    #[must_use]
    pub fn rows(&self) -> Vec<(&'static str, f64)> {
        let labels = self.task.class_labels();
        self.task
            .display_order()
            .iter()
            .filter_map(|&idx| Some((*labels.get(idx)?, *self.percentages.get(idx)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_of_max_empty() {
        assert_eq!(index_of_max(&[]), None);
    }

    #[test]
    fn test_index_of_max_unique() {
        assert_eq!(index_of_max(&[0.1, 0.7, 0.2]), Some(1));
        assert_eq!(index_of_max(&[5.0]), Some(0));
        assert_eq!(index_of_max(&[-3.0, -1.0, -2.0]), Some(1));
    }

    #[test]
    fn test_index_of_max_ties_keep_first() {
        assert_eq!(index_of_max(&[0.2, 0.4, 0.4, 0.1]), Some(1));
        assert_eq!(index_of_max(&[1.0, 1.0, 1.0]), Some(0));
    }

    #[test]
    fn test_to_percentages_clamps_negatives() {
        let p = to_percentages(&[-0.25, 0.5, 0.75]);
        assert_eq!(p, vec![0.0, 50.0, 75.0]);
    }

    #[test]
    fn test_result_from_raw() {
        let result = PredictionResult::from_raw(PredictionTask::DiabetesLikelihood, &[0.1, 0.3, 0.6]);
        assert_eq!(result.verdict, Some(2));
        assert_eq!(result.verdict_label(), Some("Diabetes"));
        assert_eq!(result.percentages.len(), 3);
    }

    #[test]
    fn test_heart_verdict_wording() {
        let result = PredictionResult::from_raw(PredictionTask::HeartDisease, &[0.8, 0.2]);
        assert_eq!(result.verdict_label(), Some("Low Risk"));
    }

    #[test]
    fn test_rows_follow_display_order() {
        let result =
            PredictionResult::from_raw(PredictionTask::MaternalHealthRisk, &[0.5, 0.25, 0.25]);
        let rows = result.rows();
        assert_eq!(rows[0].0, "Low Risk");
        assert_eq!(rows[2], ("High Risk", 50.0));
        assert_eq!(result.verdict_label(), Some("High Risk"));
    }

    #[test]
    fn test_feature_len_matches_encoder() {
        let state = SurveyState::default();
        for task in PredictionTask::ALL {
            assert_eq!(task.encode(&state).len(), task.feature_len());
        }
    }

    #[test]
    fn test_display_order_covers_every_class() {
        for task in PredictionTask::ALL {
            let mut order = task.display_order().to_vec();
            order.sort_unstable();
            assert_eq!(order, (0..task.class_count()).collect::<Vec<_>>());
        }
    }
}

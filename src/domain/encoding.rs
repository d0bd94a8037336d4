//! Feature encoders: survey state to model input vectors.
//!
//! Each trained model expects a fixed-length vector in a fixed order. The
//! order below is the contract with the training notebooks. A swapped pair
//! still yields a plausible prediction, so the tests pin every slot.
//!
//! Binary answers are one-hot pairs: `[0, 1]` when the answer is "yes" (or
//! the sex is male, or the threshold is met) and `[1, 0]` otherwise.

use super::survey::{ChestPainType, Sex, SurveyState, Transportation};

/// Input length of the heart disease model.
pub const HEART_DISEASE_FEATURES: usize = 14;
/// Input length of the maternal health risk model.
pub const MATERNAL_HEALTH_FEATURES: usize = 6;
/// Input length of the obesity likelihood model.
pub const OBESITY_FEATURES: usize = 24;
/// Input length of the diabetes likelihood model.
pub const DIABETES_FEATURES: usize = 32;

/// mg/dL per mmol/L for blood glucose.
const GLUCOSE_MG_DL_PER_MMOL_L: f64 = 18.0;

/// Fasting blood sugar above this (mg/dL) counts as elevated.
const FASTING_GLUCOSE_THRESHOLD: f64 = 120.0;

const HYPERTENSIVE_SYSTOLIC: f64 = 130.0;
const HYPERTENSIVE_DIASTOLIC: f64 = 80.0;
const HIGH_CHOLESTEROL: f64 = 100.0;

/// Smallest squared height used for BMI.
const MIN_HEIGHT_SQUARED: f64 = 0.1;

fn pair(flag: bool) -> [f32; 2] {
    if flag {
        [0.0, 1.0]
    } else {
        [1.0, 0.0]
    }
}

fn sex_pair(sex: Sex) -> [f32; 2] {
    pair(sex == Sex::Male)
}

fn one_hot<T: PartialEq, const N: usize>(categories: &[T; N], value: &T) -> [f32; N] {
    let mut out = [0.0; N];
    if let Some(idx) = categories.iter().position(|c| c == value) {
        out[idx] = 1.0;
    }
    out
}

/// "Always" occupies the second slot, "sometimes" the third.
fn frequency(always: bool) -> [f32; 4] {
    if always {
        [0.0, 1.0, 0.0, 0.0]
    } else {
        [0.0, 0.0, 1.0, 0.0]
    }
}

/// Body mass index with the squared height floored at 0.1.
#[must_use]
pub fn body_mass_index(weight: f64, height: f64) -> f64 {
    weight / MIN_HEIGHT_SQUARED.max(height * height)
}

/// Heart disease model input.
///
/// Order: age, resting BP, cholesterol, max heart rate, sex (female, male),
/// chest pain (typical, atypical, non-anginal, asymptomatic), fasting blood
/// sugar > 120, exercise-induced angina.
#[must_use]
pub fn encode_heart_disease(state: &SurveyState) -> Vec<f32> {
    let mut v = Vec::with_capacity(HEART_DISEASE_FEATURES);
    v.extend([
        state.age as f32,
        state.resting_blood_pressure as f32,
        state.cholesterol as f32,
        state.maximum_heart_rate as f32,
    ]);
    v.extend(sex_pair(state.sex));
    v.extend(one_hot(&ChestPainType::ALL, &state.chest_pain_type));
    v.extend(pair(state.blood_glucose_level > FASTING_GLUCOSE_THRESHOLD));
    v.extend(pair(state.has_exercise_induced_angina));
    v
}

/// Maternal health risk model input.
///
/// Order: age, systolic BP, diastolic BP, blood glucose (mmol/L), body
/// temperature (°F), resting heart rate.
#[must_use]
pub fn encode_maternal_health(state: &SurveyState) -> Vec<f32> {
    vec![
        state.age as f32,
        state.systolic_blood_pressure as f32,
        state.diastolic_blood_pressure as f32,
        (state.blood_glucose_level / GLUCOSE_MG_DL_PER_MMOL_L) as f32,
        state.body_temperature as f32,
        state.resting_heart_rate as f32,
    ]
}

/// Obesity likelihood model input.
///
/// Order: age, sex, family history, FAVC, CAEC (4 slots), SMOKE, SCC,
/// CALC (4 slots), transportation (car, bicycle, motorcycle, public, walking).
#[must_use]
pub fn encode_obesity(state: &SurveyState) -> Vec<f32> {
    let mut v = Vec::with_capacity(OBESITY_FEATURES);
    v.push(state.age as f32);
    v.extend(sex_pair(state.sex));
    v.extend(pair(state.has_family_history_overweight));
    v.extend(pair(state.frequent_high_calorie_food));
    v.extend(frequency(state.frequent_eat_between_meals));
    v.extend(pair(state.frequent_smoke));
    v.extend(pair(state.has_monitor_calories));
    v.extend(frequency(state.frequent_drink_alcohol));
    v.extend(one_hot(&Transportation::ALL, &state.usual_transportation));
    v
}

/// Diabetes likelihood model input.
///
/// Order: BMI, general health, mental health days, physical health days,
/// then pairs for sex, high BP, high cholesterol, cholesterol check, smoker,
/// stroke, heart disease, physical activity, fruits, veggies, heavy alcohol,
/// healthcare coverage, denied care due to cost (always "no"), difficulty
/// walking.
#[must_use]
pub fn encode_diabetes(state: &SurveyState) -> Vec<f32> {
    let hypertensive = state.systolic_blood_pressure >= HYPERTENSIVE_SYSTOLIC
        || state.diastolic_blood_pressure >= HYPERTENSIVE_DIASTOLIC;

    let mut v = Vec::with_capacity(DIABETES_FEATURES);
    v.extend([
        body_mass_index(state.weight, state.height) as f32,
        state.general_health_evaluation as f32,
        state.mental_health_month_decline as f32,
        state.physical_health_month_decline as f32,
    ]);
    v.extend(sex_pair(state.sex));
    v.extend(pair(hypertensive));
    v.extend(pair(state.cholesterol >= HIGH_CHOLESTEROL));
    v.extend(pair(state.has_cholesterol_checked));
    v.extend(pair(state.frequent_smoke));
    v.extend(pair(state.has_had_stroke));
    v.extend(pair(state.has_heart_disease));
    v.extend(pair(state.frequent_physical_activity));
    v.extend(pair(state.frequent_eat_fruits));
    v.extend(pair(state.frequent_eat_vegetables));
    v.extend(pair(state.frequent_drink_alcohol));
    v.extend(pair(state.has_healthcare));
    v.extend(pair(false));
    v.extend(pair(state.has_difficulty_climbing));
    v
}

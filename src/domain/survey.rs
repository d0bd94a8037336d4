//! Self-reported health survey state.
//!
//! Every field carries a default so the state is always complete. Changes are
//! expressed as a [`SurveyUpdate`], a record of optional fields that is merged
//! into the state, and raw user input is turned into updates through the
//! per-field metadata in [`SurveyField`].

use serde::{Deserialize, Serialize};

/// Biological sex as asked by the survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    #[default]
    Male,
    Female,
}

impl Sex {
    pub const ALL: [Self; 2] = [Self::Male, Self::Female];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

/// Kind of chest pain experienced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChestPainType {
    TypicalAngina,
    AtypicalAngina,
    NonAnginal,
    #[default]
    Asymptomatic,
}

impl ChestPainType {
    /// Order matches the one-hot layout of the heart disease model.
    pub const ALL: [Self; 4] = [
        Self::TypicalAngina,
        Self::AtypicalAngina,
        Self::NonAnginal,
        Self::Asymptomatic,
    ];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::TypicalAngina => "Typical angina",
            Self::AtypicalAngina => "Atypical angina",
            Self::NonAnginal => "Non-anginal",
            Self::Asymptomatic => "Asymptomatic",
        }
    }
}

/// Usual mode of transportation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transportation {
    Car,
    Bicycle,
    Motorcycle,
    Public,
    #[default]
    Walking,
}

impl Transportation {
    /// Order matches the one-hot layout of the obesity model.
    pub const ALL: [Self; 5] = [
        Self::Car,
        Self::Bicycle,
        Self::Motorcycle,
        Self::Public,
        Self::Walking,
    ];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Car => "Car",
            Self::Bicycle => "Bicycle",
            Self::Motorcycle => "Motorcycle",
            Self::Public => "Public transportation",
            Self::Walking => "Walking",
        }
    }
}

/// Everything the user reported, with a valid value for every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyState {
    /// Age in years
    pub age: f64,
    /// Height in meters
    pub height: f64,
    /// Weight in kilograms
    pub weight: f64,
    pub sex: Sex,

    /// Systolic blood pressure in mmHg (high when >= 130)
    pub systolic_blood_pressure: f64,
    /// Diastolic blood pressure in mmHg (high when >= 80)
    pub diastolic_blood_pressure: f64,
    /// Resting blood pressure in mmHg
    pub resting_blood_pressure: f64,
    /// Resting heart rate in bpm
    pub resting_heart_rate: f64,
    /// Maximum heart rate ever achieved in bpm
    pub maximum_heart_rate: f64,

    /// LDL cholesterol in mg/dL (high when >= 100)
    pub cholesterol: f64,
    /// Cholesterol checked within the past 5 years
    pub has_cholesterol_checked: bool,
    pub has_exercise_induced_angina: bool,
    pub chest_pain_type: ChestPainType,
    /// Blood glucose in mg/dL (1 mg/dL = 1/18 mmol/L)
    pub blood_glucose_level: f64,
    /// Body temperature in degrees Fahrenheit
    pub body_temperature: f64,

    /// Overweight runs in the family
    pub has_family_history_overweight: bool,
    /// FAVC: frequently eats high calorie food
    pub frequent_high_calorie_food: bool,
    /// SCC: monitors calorie intake
    pub has_monitor_calories: bool,
    /// CAEC: true means "always", false means "sometimes"
    pub frequent_eat_between_meals: bool,
    pub frequent_smoke: bool,
    /// CALC: true means "always", false means "sometimes"
    pub frequent_drink_alcohol: bool,
    pub usual_transportation: Transportation,

    pub has_had_stroke: bool,
    pub has_heart_disease: bool,
    /// Daily or almost daily physical activity
    pub frequent_physical_activity: bool,
    pub frequent_eat_fruits: bool,
    pub frequent_eat_vegetables: bool,
    /// Any health care coverage (insurance, prepaid plans, ...)
    pub has_healthcare: bool,
    /// General health on a 1-5 scale
    pub general_health_evaluation: f64,
    /// Days out of the last 30 where mental health was not good
    pub mental_health_month_decline: f64,
    /// Days out of the last 30 where physical health was not good
    pub physical_health_month_decline: f64,
    pub has_difficulty_climbing: bool,
}

impl Default for SurveyState {
    fn default() -> Self {
        Self {
            age: 18.0,
            height: 1.69,
            weight: 58.0,
            sex: Sex::Male,
            systolic_blood_pressure: 100.0,
            diastolic_blood_pressure: 70.0,
            resting_blood_pressure: 80.0,
            resting_heart_rate: 80.0,
            maximum_heart_rate: 120.0,
            cholesterol: 70.0,
            has_cholesterol_checked: true,
            has_exercise_induced_angina: false,
            chest_pain_type: ChestPainType::Asymptomatic,
            blood_glucose_level: 100.0,
            body_temperature: 97.0,
            has_family_history_overweight: false,
            frequent_high_calorie_food: false,
            has_monitor_calories: false,
            frequent_eat_between_meals: false,
            frequent_smoke: false,
            frequent_drink_alcohol: false,
            usual_transportation: Transportation::Walking,
            has_had_stroke: false,
            has_heart_disease: false,
            frequent_physical_activity: false,
            frequent_eat_fruits: false,
            frequent_eat_vegetables: false,
            has_healthcare: false,
            general_health_evaluation: 3.0,
            mental_health_month_decline: 0.0,
            physical_health_month_decline: 0.0,
            has_difficulty_climbing: false,
        }
    }
}

/// Partial survey state. Present fields overwrite, absent fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveyUpdate {
    pub age: Option<f64>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub sex: Option<Sex>,
    pub systolic_blood_pressure: Option<f64>,
    pub diastolic_blood_pressure: Option<f64>,
    pub resting_blood_pressure: Option<f64>,
    pub resting_heart_rate: Option<f64>,
    pub maximum_heart_rate: Option<f64>,
    pub cholesterol: Option<f64>,
    pub has_cholesterol_checked: Option<bool>,
    pub has_exercise_induced_angina: Option<bool>,
    pub chest_pain_type: Option<ChestPainType>,
    pub blood_glucose_level: Option<f64>,
    pub body_temperature: Option<f64>,
    pub has_family_history_overweight: Option<bool>,
    pub frequent_high_calorie_food: Option<bool>,
    pub has_monitor_calories: Option<bool>,
    pub frequent_eat_between_meals: Option<bool>,
    pub frequent_smoke: Option<bool>,
    pub frequent_drink_alcohol: Option<bool>,
    pub usual_transportation: Option<Transportation>,
    pub has_had_stroke: Option<bool>,
    pub has_heart_disease: Option<bool>,
    pub frequent_physical_activity: Option<bool>,
    pub frequent_eat_fruits: Option<bool>,
    pub frequent_eat_vegetables: Option<bool>,
    pub has_healthcare: Option<bool>,
    pub general_health_evaluation: Option<f64>,
    pub mental_health_month_decline: Option<f64>,
    pub physical_health_month_decline: Option<f64>,
    pub has_difficulty_climbing: Option<bool>,
}

macro_rules! merge_fields {
    ($state:ident, $update:ident; $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $update.$field {
                $state.$field = value;
            }
        )+
    };
}

impl SurveyState {
    /// Merge a partial update into this state.
    pub fn apply(&mut self, update: &SurveyUpdate) {
        let state = self;
        merge_fields!(state, update;
            age,
            height,
            weight,
            sex,
            systolic_blood_pressure,
            diastolic_blood_pressure,
            resting_blood_pressure,
            resting_heart_rate,
            maximum_heart_rate,
            cholesterol,
            has_cholesterol_checked,
            has_exercise_induced_angina,
            chest_pain_type,
            blood_glucose_level,
            body_temperature,
            has_family_history_overweight,
            frequent_high_calorie_food,
            has_monitor_calories,
            frequent_eat_between_meals,
            frequent_smoke,
            frequent_drink_alcohol,
            usual_transportation,
            has_had_stroke,
            has_heart_disease,
            frequent_physical_activity,
            frequent_eat_fruits,
            frequent_eat_vegetables,
            has_healthcare,
            general_health_evaluation,
            mental_health_month_decline,
            physical_health_month_decline,
            has_difficulty_climbing,
        );
    }
}

impl SurveyUpdate {
    /// True when the update carries no field at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// How a field is edited.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Free numeric entry, clamped to `[min, max]`.
    Number { min: f64, max: f64, integer: bool },
    /// Yes / no.
    Toggle,
    /// One of a fixed list of options.
    Choice,
}

/// One editable survey field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurveyField {
    Age,
    Height,
    Weight,
    Sex,
    SystolicBloodPressure,
    DiastolicBloodPressure,
    RestingBloodPressure,
    RestingHeartRate,
    MaximumHeartRate,
    Cholesterol,
    HasCholesterolChecked,
    HasExerciseInducedAngina,
    ChestPainType,
    BloodGlucoseLevel,
    BodyTemperature,
    HasFamilyHistoryOverweight,
    FrequentHighCalorieFood,
    HasMonitorCalories,
    FrequentEatBetweenMeals,
    FrequentSmoke,
    FrequentDrinkAlcohol,
    UsualTransportation,
    HasHadStroke,
    HasHeartDisease,
    FrequentPhysicalActivity,
    FrequentEatFruits,
    FrequentEatVegetables,
    HasHealthcare,
    GeneralHealthEvaluation,
    MentalHealthMonthDecline,
    PhysicalHealthMonthDecline,
    HasDifficultyClimbing,
}

impl SurveyField {
    /// Fields of the general section shared by every panel.
    pub const GENERAL: [Self; 4] = [Self::Age, Self::Height, Self::Weight, Self::MaximumHeartRate];

    /// Question shown next to the input.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::Height => "Height",
            Self::Weight => "Weight",
            Self::Sex => "Sex",
            Self::SystolicBloodPressure => "Systolic blood pressure",
            Self::DiastolicBloodPressure => "Diastolic blood pressure",
            Self::RestingBloodPressure => "Resting blood pressure",
            Self::RestingHeartRate => "Resting heart rate",
            Self::MaximumHeartRate => "Maximum heart rate achieved",
            Self::Cholesterol => "Cholesterol (LDL)",
            Self::HasCholesterolChecked => "Cholesterol checked in the past 5 years?",
            Self::HasExerciseInducedAngina => "Chest pain induced by exercise?",
            Self::ChestPainType => "Chest pain type",
            Self::BloodGlucoseLevel => "Blood glucose",
            Self::BodyTemperature => "Body temperature",
            Self::HasFamilyHistoryOverweight => "Family history of being overweight?",
            Self::FrequentHighCalorieFood => "Frequently eat high calorie food?",
            Self::HasMonitorCalories => "Do you monitor your calories?",
            Self::FrequentEatBetweenMeals => "Frequently eat between meals?",
            Self::FrequentSmoke => "Do you smoke frequently?",
            Self::FrequentDrinkAlcohol => "Do you frequently drink alcohol?",
            Self::UsualTransportation => "Usual mode of transportation",
            Self::HasHadStroke => "Have you had a stroke?",
            Self::HasHeartDisease => "Do you currently have a heart disease?",
            Self::FrequentPhysicalActivity => "Frequent physical activity?",
            Self::FrequentEatFruits => "Do you frequently eat fruits?",
            Self::FrequentEatVegetables => "Do you frequently eat vegetables?",
            Self::HasHealthcare => "Any health care coverage or insurance?",
            Self::GeneralHealthEvaluation => "General health",
            Self::MentalHealthMonthDecline => "Days of poor mental health",
            Self::PhysicalHealthMonthDecline => "Days of poor physical health",
            Self::HasDifficultyClimbing => "Difficulty walking or climbing stairs?",
        }
    }

    /// Unit or range hint.
    #[must_use]
    pub fn hint(&self) -> &'static str {
        match self {
            Self::Age => "years",
            Self::Height => "meters",
            Self::Weight => "kilograms",
            Self::SystolicBloodPressure
            | Self::DiastolicBloodPressure
            | Self::RestingBloodPressure => "mmHg",
            Self::RestingHeartRate | Self::MaximumHeartRate => "bpm",
            Self::Cholesterol | Self::BloodGlucoseLevel => "mg/dL",
            Self::BodyTemperature => "°F",
            Self::GeneralHealthEvaluation => "1 (excellent) - 5 (poor)",
            Self::MentalHealthMonthDecline | Self::PhysicalHealthMonthDecline => {
                "days out of 30"
            }
            Self::Sex | Self::ChestPainType | Self::UsualTransportation => "select",
            _ => "yes / no",
        }
    }

    #[must_use]
    pub fn kind(&self) -> FieldKind {
        let number = |min: f64, max: f64, integer: bool| FieldKind::Number { min, max, integer };
        match self {
            Self::Age => number(0.0, 120.0, true),
            Self::Height => number(0.0, 2.5, false),
            Self::Weight => number(0.0, 350.0, false),
            Self::SystolicBloodPressure => number(0.0, 300.0, true),
            Self::DiastolicBloodPressure => number(0.0, 200.0, true),
            Self::RestingBloodPressure => number(0.0, 200.0, true),
            Self::RestingHeartRate => number(0.0, 250.0, true),
            Self::MaximumHeartRate => number(0.0, 250.0, true),
            Self::Cholesterol => number(0.0, 500.0, false),
            Self::BloodGlucoseLevel => number(0.0, 600.0, false),
            Self::BodyTemperature => number(80.0, 115.0, false),
            Self::GeneralHealthEvaluation => number(1.0, 5.0, true),
            Self::MentalHealthMonthDecline | Self::PhysicalHealthMonthDecline => {
                number(0.0, 30.0, true)
            }
            Self::Sex | Self::ChestPainType | Self::UsualTransportation => FieldKind::Choice,
            _ => FieldKind::Toggle,
        }
    }

    /// Current numeric value, `None` for non-numeric fields.
    #[must_use]
    pub fn number(&self, state: &SurveyState) -> Option<f64> {
        let value = match self {
            Self::Age => state.age,
            Self::Height => state.height,
            Self::Weight => state.weight,
            Self::SystolicBloodPressure => state.systolic_blood_pressure,
            Self::DiastolicBloodPressure => state.diastolic_blood_pressure,
            Self::RestingBloodPressure => state.resting_blood_pressure,
            Self::RestingHeartRate => state.resting_heart_rate,
            Self::MaximumHeartRate => state.maximum_heart_rate,
            Self::Cholesterol => state.cholesterol,
            Self::BloodGlucoseLevel => state.blood_glucose_level,
            Self::BodyTemperature => state.body_temperature,
            Self::GeneralHealthEvaluation => state.general_health_evaluation,
            Self::MentalHealthMonthDecline => state.mental_health_month_decline,
            Self::PhysicalHealthMonthDecline => state.physical_health_month_decline,
            _ => return None,
        };
        Some(value)
    }

    /// Current yes/no value, `None` for non-toggle fields.
    #[must_use]
    pub fn flag(&self, state: &SurveyState) -> Option<bool> {
        let value = match self {
            Self::HasCholesterolChecked => state.has_cholesterol_checked,
            Self::HasExerciseInducedAngina => state.has_exercise_induced_angina,
            Self::HasFamilyHistoryOverweight => state.has_family_history_overweight,
            Self::FrequentHighCalorieFood => state.frequent_high_calorie_food,
            Self::HasMonitorCalories => state.has_monitor_calories,
            Self::FrequentEatBetweenMeals => state.frequent_eat_between_meals,
            Self::FrequentSmoke => state.frequent_smoke,
            Self::FrequentDrinkAlcohol => state.frequent_drink_alcohol,
            Self::HasHadStroke => state.has_had_stroke,
            Self::HasHeartDisease => state.has_heart_disease,
            Self::FrequentPhysicalActivity => state.frequent_physical_activity,
            Self::FrequentEatFruits => state.frequent_eat_fruits,
            Self::FrequentEatVegetables => state.frequent_eat_vegetables,
            Self::HasHealthcare => state.has_healthcare,
            Self::HasDifficultyClimbing => state.has_difficulty_climbing,
            _ => return None,
        };
        Some(value)
    }

    /// Human-readable current value.
    #[must_use]
    pub fn display_value(&self, state: &SurveyState) -> String {
        match self {
            Self::Sex => state.sex.label().to_string(),
            Self::ChestPainType => state.chest_pain_type.label().to_string(),
            Self::UsualTransportation => state.usual_transportation.label().to_string(),
            _ => {
                if let Some(flag) = self.flag(state) {
                    return if flag { "Yes" } else { "No" }.to_string();
                }
                match (self.number(state), self.kind()) {
                    (Some(v), FieldKind::Number { integer: true, .. }) => format!("{v:.0}"),
                    (Some(v), _) => format!("{v}"),
                    (None, _) => String::new(),
                }
            }
        }
    }

    /// Build an update setting this numeric field. Non-numeric fields yield an
    /// empty update.
    #[must_use]
    pub fn with_number(&self, value: f64) -> SurveyUpdate {
        let mut update = SurveyUpdate::default();
        let slot = match self {
            Self::Age => &mut update.age,
            Self::Height => &mut update.height,
            Self::Weight => &mut update.weight,
            Self::SystolicBloodPressure => &mut update.systolic_blood_pressure,
            Self::DiastolicBloodPressure => &mut update.diastolic_blood_pressure,
            Self::RestingBloodPressure => &mut update.resting_blood_pressure,
            Self::RestingHeartRate => &mut update.resting_heart_rate,
            Self::MaximumHeartRate => &mut update.maximum_heart_rate,
            Self::Cholesterol => &mut update.cholesterol,
            Self::BloodGlucoseLevel => &mut update.blood_glucose_level,
            Self::BodyTemperature => &mut update.body_temperature,
            Self::GeneralHealthEvaluation => &mut update.general_health_evaluation,
            Self::MentalHealthMonthDecline => &mut update.mental_health_month_decline,
            Self::PhysicalHealthMonthDecline => &mut update.physical_health_month_decline,
            _ => return update,
        };
        *slot = Some(value);
        update
    }

    fn with_flag(&self, value: bool) -> SurveyUpdate {
        let mut update = SurveyUpdate::default();
        let slot = match self {
            Self::HasCholesterolChecked => &mut update.has_cholesterol_checked,
            Self::HasExerciseInducedAngina => &mut update.has_exercise_induced_angina,
            Self::HasFamilyHistoryOverweight => &mut update.has_family_history_overweight,
            Self::FrequentHighCalorieFood => &mut update.frequent_high_calorie_food,
            Self::HasMonitorCalories => &mut update.has_monitor_calories,
            Self::FrequentEatBetweenMeals => &mut update.frequent_eat_between_meals,
            Self::FrequentSmoke => &mut update.frequent_smoke,
            Self::FrequentDrinkAlcohol => &mut update.frequent_drink_alcohol,
            Self::HasHadStroke => &mut update.has_had_stroke,
            Self::HasHeartDisease => &mut update.has_heart_disease,
            Self::FrequentPhysicalActivity => &mut update.frequent_physical_activity,
            Self::FrequentEatFruits => &mut update.frequent_eat_fruits,
            Self::FrequentEatVegetables => &mut update.frequent_eat_vegetables,
            Self::HasHealthcare => &mut update.has_healthcare,
            Self::HasDifficultyClimbing => &mut update.has_difficulty_climbing,
            _ => return update,
        };
        *slot = Some(value);
        update
    }

    /// Turn raw text typed into a numeric field into an update.
    ///
    /// Text that does not parse to a finite number keeps the current value.
    /// Integer fields drop the fractional part, and every value is clamped to
    /// the field's range. Non-numeric fields yield an empty update.
    #[must_use]
    pub fn parse_input(&self, state: &SurveyState, raw: &str) -> SurveyUpdate {
        let FieldKind::Number { min, max, integer } = self.kind() else {
            return SurveyUpdate::default();
        };
        let Some(current) = self.number(state) else {
            return SurveyUpdate::default();
        };

        let value = match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => {
                let v = if integer { v.trunc() } else { v };
                v.clamp(min, max)
            }
            _ => {
                tracing::debug!(field = self.label(), "Unparseable input, keeping current value");
                current
            }
        };

        self.with_number(value)
    }

    /// Move a toggle or choice field to its next (or previous) option.
    ///
    /// Numeric fields yield an empty update.
    #[must_use]
    pub fn cycle(&self, state: &SurveyState, forward: bool) -> SurveyUpdate {
        if let Some(flag) = self.flag(state) {
            return self.with_flag(!flag);
        }

        match self {
            Self::Sex => SurveyUpdate {
                sex: Some(step(&Sex::ALL, state.sex, forward)),
                ..Default::default()
            },
            Self::ChestPainType => SurveyUpdate {
                chest_pain_type: Some(step(&ChestPainType::ALL, state.chest_pain_type, forward)),
                ..Default::default()
            },
            Self::UsualTransportation => SurveyUpdate {
                usual_transportation: Some(step(
                    &Transportation::ALL,
                    state.usual_transportation,
                    forward,
                )),
                ..Default::default()
            },
            _ => SurveyUpdate::default(),
        }
    }
}

fn step<T: Copy + PartialEq>(options: &[T], current: T, forward: bool) -> T {
    let len = options.len();
    let idx = options.iter().position(|o| *o == current).unwrap_or(0);
    let next = if forward { (idx + 1) % len } else { (idx + len - 1) % len };
    options[next]
}

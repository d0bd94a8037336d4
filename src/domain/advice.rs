//! Static recommendations shown next to a verdict.

use super::prediction::PredictionTask;

/// Hand-written advice for one verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advice {
    pub summary: &'static str,
    pub items: &'static [&'static str],
    pub source: Option<&'static str>,
}

const HEART_SOURCE: &str = "https://www.healthline.com/health/healthy-heart-tips";
const OBESITY_UNDERWEIGHT_SOURCE: &str = "https://www.eatthis.com/how-to-gain-weight-if-underweight/";
const OBESITY_SOURCE: &str = "https://www.verywellhealth.com/obesity-prevention-4014175";
const DIABETES_SOURCE: &str =
    "https://www.mayoclinic.org/diseases-conditions/diabetes/in-depth/diabetes-management/ART-20045803";

const HEART_ABSENT: Advice = Advice {
    summary: "The model predicts the absence of the possibility of heart disease. \
              It is recommended that you maintain your health:",
    items: &[
        "by having a healthy diet",
        "getting enough sleep",
        "managing stress",
        "controlling your cholesterol, and blood pressure",
    ],
    source: Some(HEART_SOURCE),
};

const HEART_PRESENT: Advice = Advice {
    summary: "The model predicts the presence of the possibility of heart disease. \
              It is recommended that you improve your lifestyle:",
    items: &[
        "by having a healthy diet; a nutritious breakfast every day helps maintain a healthy weight",
        "getting enough sleep",
        "managing stress",
        "cutting on salt intake",
        "reducing the saturated fat intake",
        "controlling your cholesterol, and blood pressure",
    ],
    source: Some(HEART_SOURCE),
};

const MATERNAL_HIGH: Advice = Advice {
    summary: "The model predicts a high maternal health risk:",
    items: &[
        "seek advice from a healthcare professional as soon as possible",
        "keep your blood pressure and blood sugar monitored",
        "attend every scheduled prenatal visit",
    ],
    source: None,
};

const MATERNAL_LOW: Advice = Advice {
    summary: "The model predicts a low maternal health risk. It is recommended that you maintain:",
    items: &[
        "a healthy diet",
        "enough sleep",
        "regular prenatal check-ups",
    ],
    source: None,
};

const MATERNAL_MEDIUM: Advice = Advice {
    summary: "The model predicts a medium maternal health risk:",
    items: &[
        "discuss your blood pressure and blood sugar with a healthcare professional",
        "manage stress",
        "avoid smoking and alcohol",
    ],
    source: None,
};

const OBESITY_UNDERWEIGHT: Advice = Advice {
    summary: "The model predicts that you likely will be underweight:",
    items: &[
        "it is recommended to maintain a normal weight range",
        "engage more in physical exercise",
        "have a healthy and balanced diet",
        "boost your calories and add healthy fats",
    ],
    source: Some(OBESITY_UNDERWEIGHT_SOURCE),
};

const OBESITY_NORMAL: Advice = Advice {
    summary: "The model predicts that you likely will be normal weight:",
    items: &[
        "it is recommended to maintain a normal weight range",
        "continue engaging in physical exercise",
        "continue having a healthy and balanced diet",
    ],
    source: Some(OBESITY_UNDERWEIGHT_SOURCE),
};

const OBESITY_ITEMS: &[&str] = &[
    "it is recommended to seek advice from a healthcare professional",
    "avoid processed foods",
    "limit your sugar intake",
    "reduce saturated fat intake",
];

const OBESITY_I: Advice = Advice {
    summary: "The model predicts that you likely will be obese (type I):",
    items: OBESITY_ITEMS,
    source: Some(OBESITY_SOURCE),
};

const OBESITY_II: Advice = Advice {
    summary: "The model predicts that you likely will be obese (type II):",
    items: OBESITY_ITEMS,
    source: Some(OBESITY_SOURCE),
};

const OBESITY_III: Advice = Advice {
    summary: "The model predicts that you likely will be obese (type III):",
    items: OBESITY_ITEMS,
    source: Some(OBESITY_SOURCE),
};

const OVERWEIGHT_I: Advice = Advice {
    summary: "The model predicts that you likely will be overweight (type I):",
    items: OBESITY_ITEMS,
    source: Some(OBESITY_SOURCE),
};

const OVERWEIGHT_II: Advice = Advice {
    summary: "The model predicts that you likely will be overweight (type II):",
    items: OBESITY_ITEMS,
    source: Some(OBESITY_SOURCE),
};

const DIABETES_NONE: Advice = Advice {
    summary: "The model predicts that you likely have no diabetes:",
    items: &[
        "maintain your weight",
        "maintain physical exercise",
        "regularly eat healthy fats",
    ],
    source: Some(DIABETES_SOURCE),
};

const DIABETES_PRE: Advice = Advice {
    summary: "The model predicts that you are likely to undergo prediabetes:",
    items: &[
        "seek advice from a healthcare professional",
        "it is recommended to avoid smoking",
        "reduce stress",
        "ensure you get regular physical exams",
        "keep vaccines up to date",
    ],
    source: Some(DIABETES_SOURCE),
};

const DIABETES_PRESENT: Advice = Advice {
    summary: "The model predicts that you are likely to have diabetes:",
    items: &[
        "seek advice from a healthcare professional",
        "do not smoke",
        "keep your blood pressure and cholesterol under control",
        "schedule regular physical exams",
        "keep vaccines up to date",
        "pay attention to yourself",
    ],
    source: Some(DIABETES_SOURCE),
};

/// Advice for the winning class of a task, `None` for an unknown class.
#[must_use]
pub fn advice_for(task: PredictionTask, class: usize) -> Option<&'static Advice> {
    let table: &'static [Advice] = match task {
        PredictionTask::HeartDisease => &[HEART_ABSENT, HEART_PRESENT],
        PredictionTask::MaternalHealthRisk => &[MATERNAL_HIGH, MATERNAL_LOW, MATERNAL_MEDIUM],
        PredictionTask::ObesityLikelihood => &[
            OBESITY_UNDERWEIGHT,
            OBESITY_NORMAL,
            OBESITY_I,
            OBESITY_II,
            OBESITY_III,
            OVERWEIGHT_I,
            OVERWEIGHT_II,
        ],
        PredictionTask::DiabetesLikelihood => &[DIABETES_NONE, DIABETES_PRE, DIABETES_PRESENT],
    };
    table.get(class)
}

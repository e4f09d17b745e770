//! # Power Quality Advisor
//!
//! Maps measured power-quality indicators and reported symptoms to
//! mitigation recommendations through a fixed, ordered rule table.
//!
//! Every rule is checked in table order and fires independently; the output
//! keeps that order. Blank or non-numeric readings count as 0, so this
//! module never rejects its input.
//!
//! | # | Trigger                                        | Mitigation                    |
//! |---|------------------------------------------------|-------------------------------|
//! | 1 | THD-I > 15 % or VFD > 30 % or UPS > 10 %        | Harmonic filters              |
//! | 2 | THD-V > 5 %                                    | Line reactors / isolation TX  |
//! | 3 | neutral symptom or THD-I > 20 %                 | K-rated TX / oversized neutral|
//! | 4 | capacitor symptom or PF < 0.9                   | Detuning reactors             |
//! | 5 | unbalance > 2 %                                | Phase balancing               |
//! | 6 | sags > 2 or flicker symptom                     | Ride-through / DVR            |
//! | 7 | trips symptom                                  | Protection review             |
//! | 8 | VFD-noise symptom                              | Line reactors + grounding     |

use serde::{Deserialize, Serialize};

use crate::errors::CalcResult;
use crate::units::format_quantity;

use super::{Report, ResultSummary};

/// Reported site symptoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Symptom {
    NeutralOverheat,
    CapacitorResonance,
    Flicker,
    NuisanceTrips,
    VfdNoise,
}

impl Symptom {
    /// Parse a symptom tag, ignoring case and `-`/`_` separators.
    ///
    /// Accepts the short form ("neutral", "capacitor", "trips", "vfdnoise")
    /// and the long form ("neutral-overheat", "VFD-noise", ...).
    pub fn from_tag(tag: &str) -> Option<Symptom> {
        let key: String = tag
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_' && !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "neutral" | "neutraloverheat" => Some(Symptom::NeutralOverheat),
            "capacitor" | "capacitorresonance" => Some(Symptom::CapacitorResonance),
            "flicker" => Some(Symptom::Flicker),
            "trips" | "nuisancetrips" => Some(Symptom::NuisanceTrips),
            "vfdnoise" => Some(Symptom::VfdNoise),
            _ => None,
        }
    }
}

/// Input readings for the advisor.
///
/// ## JSON Example
///
/// ```json
/// {
///   "thd_v_percent": 6,
///   "thd_i_percent": 22,
///   "unbalance_percent": 2.5,
///   "power_factor": 0.82,
///   "sag_events": 3,
///   "vfd_load_percent": 40,
///   "ups_load_percent": 20,
///   "symptoms": ["neutral-overheat", "flicker"]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerQualityInput {
    /// Voltage total harmonic distortion (%)
    #[serde(default, with = "crate::validation::lenient")]
    pub thd_v_percent: Option<f64>,

    /// Current total harmonic distortion (%)
    #[serde(default, with = "crate::validation::lenient")]
    pub thd_i_percent: Option<f64>,

    /// Voltage unbalance (%)
    #[serde(default, with = "crate::validation::lenient")]
    pub unbalance_percent: Option<f64>,

    #[serde(default, with = "crate::validation::lenient")]
    pub power_factor: Option<f64>,

    /// Voltage sag events in the logging period
    #[serde(default, with = "crate::validation::lenient")]
    pub sag_events: Option<f64>,

    /// Share of load on variable frequency drives (%)
    #[serde(default, with = "crate::validation::lenient")]
    pub vfd_load_percent: Option<f64>,

    /// Share of load on UPS systems (%)
    #[serde(default, with = "crate::validation::lenient")]
    pub ups_load_percent: Option<f64>,

    /// Symptom tags; unknown tags are skipped with a warning
    #[serde(default)]
    pub symptoms: Vec<String>,
}

/// Mitigation recommended by one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mitigation {
    HarmonicFilters,
    LineReactors,
    KRatedTransformer,
    DetuningReactors,
    PhaseBalancing,
    RideThrough,
    ProtectionReview,
    VfdGrounding,
}

impl Mitigation {
    pub fn message(&self) -> &'static str {
        match self {
            Mitigation::HarmonicFilters => {
                "Install passive or active harmonic filters to reduce current distortion."
            }
            Mitigation::LineReactors => {
                "Consider line reactors or isolation transformers to mitigate voltage THD."
            }
            Mitigation::KRatedTransformer => "Specify K-rated transformer or oversized neutral conductors.",
            Mitigation::DetuningReactors => "Use capacitor bank detuning reactors to avoid resonance.",
            Mitigation::PhaseBalancing => "Perform phase balancing and check single-phase load distribution.",
            Mitigation::RideThrough => "Evaluate UPS ride-through or dynamic voltage restorer (DVR) options.",
            Mitigation::ProtectionReview => "Review protective device settings and nuisance trip coordination.",
            Mitigation::VfdGrounding => "Add line reactors and proper grounding for VFD installations.",
        }
    }
}

/// Parsed readings the rules test against
#[derive(Debug, Clone, Default)]
struct Readings {
    thd_v: f64,
    thd_i: f64,
    unbalance: f64,
    pf: f64,
    sags: f64,
    vfd: f64,
    ups: f64,
    symptoms: Vec<Symptom>,
}

impl Readings {
    fn has(&self, symptom: Symptom) -> bool {
        self.symptoms.contains(&symptom)
    }
}

struct Rule {
    mitigation: Mitigation,
    applies: fn(&Readings) -> bool,
}

/// Rule table, in output order
const RULES: [Rule; 8] = [
    Rule {
        mitigation: Mitigation::HarmonicFilters,
        applies: |r| r.thd_i > 15.0 || r.vfd > 30.0 || r.ups > 10.0,
    },
    Rule {
        mitigation: Mitigation::LineReactors,
        applies: |r| r.thd_v > 5.0,
    },
    Rule {
        mitigation: Mitigation::KRatedTransformer,
        applies: |r| r.has(Symptom::NeutralOverheat) || r.thd_i > 20.0,
    },
    Rule {
        mitigation: Mitigation::DetuningReactors,
        applies: |r| r.has(Symptom::CapacitorResonance) || r.pf < 0.9,
    },
    Rule {
        mitigation: Mitigation::PhaseBalancing,
        applies: |r| r.unbalance > 2.0,
    },
    Rule {
        mitigation: Mitigation::RideThrough,
        applies: |r| r.sags > 2.0 || r.has(Symptom::Flicker),
    },
    Rule {
        mitigation: Mitigation::ProtectionReview,
        applies: |r| r.has(Symptom::NuisanceTrips),
    },
    Rule {
        mitigation: Mitigation::VfdGrounding,
        applies: |r| r.has(Symptom::VfdNoise),
    },
];

const NEXT_MEASURES: [&str; 3] = [
    "Capture 7-day PQ analyzer trend with THD, sags, swells.",
    "Measure neutral current and harmonic spectrum.",
    "Verify transformer loading and temperature rise.",
];

/// A fired rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub mitigation: Mitigation,
    pub message: String,
}

/// One before/after row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expectation {
    pub metric: String,
    /// Measured value (%)
    pub before: f64,
    /// Expected value after mitigation (%)
    pub after: f64,
}

/// Results from the advisor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerQualityResult {
    /// Fired rules, in rule-table order
    pub recommendations: Vec<Recommendation>,
    /// Measurements to take next
    pub next_measures: Vec<String>,
    /// THD-I, THD-V, unbalance before and after
    pub expectations: Vec<Expectation>,
}

impl ResultSummary for PowerQualityResult {
    fn summary(&self) -> String {
        format!("Recommendations {}", self.recommendations.len())
    }

    fn snapshot(&self) -> String {
        self.recommendations
            .first()
            .map(|rec| rec.message.clone())
            .unwrap_or_else(|| "No issues detected".to_string())
    }
}

fn reading(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Evaluate the rule table.
///
/// Always succeeds; the `CalcResult` keeps the signature uniform with the
/// other modules.
///
/// # Example
///
/// ```rust
/// use ee_core::calculations::power_quality::{calculate, PowerQualityInput, Mitigation};
///
/// let input = PowerQualityInput {
///     thd_v_percent: Some(6.0),
///     power_factor: Some(0.95),
///     ..Default::default()
/// };
/// let report = calculate(&input).unwrap();
/// assert_eq!(report.results.recommendations[0].mitigation, Mitigation::LineReactors);
/// ```
pub fn calculate(input: &PowerQualityInput) -> CalcResult<Report<PowerQualityResult>> {
    let mut warnings = Vec::new();
    let mut symptoms = Vec::new();
    for tag in &input.symptoms {
        match Symptom::from_tag(tag) {
            Some(symptom) => symptoms.push(symptom),
            None => warnings.push(format!("Unknown symptom '{}' ignored.", tag)),
        }
    }

    let readings = Readings {
        thd_v: reading(input.thd_v_percent),
        thd_i: reading(input.thd_i_percent),
        unbalance: reading(input.unbalance_percent),
        pf: reading(input.power_factor),
        sags: reading(input.sag_events),
        vfd: reading(input.vfd_load_percent),
        ups: reading(input.ups_load_percent),
        symptoms,
    };

    let recommendations: Vec<Recommendation> = RULES
        .iter()
        .filter(|rule| (rule.applies)(&readings))
        .map(|rule| Recommendation {
            mitigation: rule.mitigation,
            message: rule.mitigation.message().to_string(),
        })
        .collect();

    let expectations = vec![
        Expectation {
            metric: "THD-I".to_string(),
            before: readings.thd_i,
            after: (readings.thd_i - 8.0).max(5.0),
        },
        Expectation {
            metric: "THD-V".to_string(),
            before: readings.thd_v,
            after: (readings.thd_v - 2.0).max(3.0),
        },
        Expectation {
            metric: "Unbalance".to_string(),
            before: readings.unbalance,
            after: (readings.unbalance - 0.5).max(1.0),
        },
    ];

    if input.power_factor.filter(|pf| pf.is_finite()).is_none() {
        warnings.push("Power factor not given; treated as 0.".to_string());
    }

    let mut steps = vec![
        "Assess symptoms, THD, unbalance, and load mix.".to_string(),
        "Match symptoms and readings against the mitigation rule table.".to_string(),
        "List recommendations in rule order.".to_string(),
    ];
    steps.extend(expectations.iter().map(|row| {
        format!(
            "{}: {} → {} (expected)",
            row.metric,
            format_quantity(row.before, "%"),
            format_quantity(row.after, "%")
        )
    }));

    tracing::debug!(fired = recommendations.len(), "power quality rules evaluated");

    Ok(Report {
        results: PowerQualityResult {
            recommendations,
            next_measures: NEXT_MEASURES.iter().map(|m| m.to_string()).collect(),
            expectations,
        },
        derivation_steps: steps,
        warnings,
        notes: vec![
            "Recommendations are rule-based and explainable.".to_string(),
            "Validate with site measurements and PQ logging.".to_string(),
        ],
    })
}

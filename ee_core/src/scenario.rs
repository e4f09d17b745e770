//! # Scenario Records
//!
//! A [`Scenario`] is a named, evaluated input: the input fields together with
//! the one-line digests of its result. Scenarios are plain serializable
//! values; storing them is up to the caller.
//!
//! ## Structure
//!
//! ```text
//! ScenarioBook
//! ├── scenarios: Vec<Scenario>     (insertion order)
//! ├── recent: Vec<ListEntry>       (newest first, at most 6)
//! └── favorites: Vec<ListEntry>    (newest first, at most 6)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use ee_core::calculations::ModuleKind;
//! use ee_core::library::LibrarySnapshot;
//! use ee_core::presets::example_input;
//! use ee_core::scenario::{compare, Scenario};
//!
//! let library = LibrarySnapshot::default();
//! let base = Scenario::capture("Base", example_input(ModuleKind::PowerFactor), &library).unwrap();
//! let alt = Scenario::capture("Alt", example_input(ModuleKind::PowerFactor), &library).unwrap();
//!
//! let table = compare(&base, &alt).unwrap();
//! assert_eq!(table.rows[0].label, "Summary");
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculations::{CalcResponse, CalculationInput, ModuleKind};
use crate::errors::{CalcError, CalcResult};
use crate::library::LibrarySnapshot;

/// Maximum entries kept in the recent and favorites lists
pub const LIST_CAPACITY: usize = 6;

/// A named input with its result digests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: Uuid,
    pub name: String,
    pub module: ModuleKind,
    pub inputs: CalculationInput,
    /// Headline digest of the result
    pub summary: String,
    /// Secondary digest of the result
    pub snapshot: String,
    pub created: DateTime<Utc>,
}

impl Scenario {
    /// Evaluate `inputs` and record the result digests.
    ///
    /// A calculation that fails is not recorded; its error is returned.
    pub fn capture(
        name: impl Into<String>,
        inputs: CalculationInput,
        library: &LibrarySnapshot,
    ) -> CalcResult<Self> {
        let (summary, snapshot) = match inputs.try_evaluate(library)? {
            CalcResponse::Success { summary, snapshot, .. } => (summary, snapshot),
            CalcResponse::Failure { errors } => {
                return Err(CalcError::invalid_input("", "", errors.join(" ")));
            }
        };
        Ok(Scenario {
            id: Uuid::new_v4(),
            name: name.into(),
            module: inputs.module(),
            inputs,
            summary,
            snapshot,
            created: Utc::now(),
        })
    }
}

/// One row of a side-by-side comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub label: String,
    pub a: String,
    pub b: String,
}

/// Side-by-side comparison of two scenarios of the same module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub module: ModuleKind,
    pub name_a: String,
    pub name_b: String,
    pub rows: Vec<ComparisonRow>,
}

/// Compare two scenarios.
///
/// Fails with `InvalidInput` when the scenarios belong to different modules.
pub fn compare(a: &Scenario, b: &Scenario) -> CalcResult<Comparison> {
    if a.module != b.module {
        return Err(CalcError::invalid_input(
            "module",
            b.module.id(),
            format!(
                "Cannot compare a {} scenario with a {} scenario.",
                a.module.id(),
                b.module.id()
            ),
        ));
    }

    let row = |label: &str, a: &str, b: &str| ComparisonRow {
        label: label.to_string(),
        a: a.to_string(),
        b: b.to_string(),
    };
    Ok(Comparison {
        module: a.module,
        name_a: a.name.clone(),
        name_b: b.name.clone(),
        rows: vec![
            row("Summary", &a.summary, &b.summary),
            row("Result Snapshot", &a.snapshot, &b.snapshot),
        ],
    })
}

/// Entry in the recent or favorites list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEntry {
    pub module: ModuleKind,
    pub summary: String,
    pub time: DateTime<Utc>,
}

/// Collection of scenarios plus the recent and favorites lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioBook {
    scenarios: Vec<Scenario>,
    recent: Vec<ListEntry>,
    favorites: Vec<ListEntry>,
}

fn push_front_capped(list: &mut Vec<ListEntry>, entry: ListEntry) {
    list.insert(0, entry);
    list.truncate(LIST_CAPACITY);
}

impl ScenarioBook {
    pub fn new() -> Self {
        ScenarioBook::default()
    }

    /// Record a calculation in the recent list
    pub fn record_recent(&mut self, module: ModuleKind, summary: impl Into<String>) {
        push_front_capped(
            &mut self.recent,
            ListEntry {
                module,
                summary: summary.into(),
                time: Utc::now(),
            },
        );
    }

    /// Capture a scenario, store it, and note it in the recent list.
    ///
    /// Returns the new scenario's id.
    pub fn capture(
        &mut self,
        name: impl Into<String>,
        inputs: CalculationInput,
        library: &LibrarySnapshot,
    ) -> CalcResult<Uuid> {
        let scenario = Scenario::capture(name, inputs, library)?;
        self.record_recent(scenario.module, scenario.summary.clone());
        Ok(self.insert(scenario))
    }

    /// Store an already captured scenario
    pub fn insert(&mut self, scenario: Scenario) -> Uuid {
        let id = scenario.id;
        self.scenarios.push(scenario);
        id
    }

    pub fn get(&self, id: &Uuid) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == *id)
    }

    pub fn remove(&mut self, id: &Uuid) -> Option<Scenario> {
        let index = self.scenarios.iter().position(|s| s.id == *id)?;
        Some(self.scenarios.remove(index))
    }

    /// Scenarios of one module, in insertion order
    pub fn for_module(&self, module: ModuleKind) -> impl Iterator<Item = &Scenario> {
        self.scenarios.iter().filter(move |s| s.module == module)
    }

    /// Add a scenario to the favorites list as "name: summary".
    ///
    /// Returns false if the id is unknown.
    pub fn add_favorite(&mut self, id: &Uuid) -> bool {
        let Some(scenario) = self.get(id) else {
            return false;
        };
        let entry = ListEntry {
            module: scenario.module,
            summary: format!("{}: {}", scenario.name, scenario.summary),
            time: Utc::now(),
        };
        push_front_capped(&mut self.favorites, entry);
        true
    }

    pub fn recent(&self) -> &[ListEntry] {
        &self.recent
    }

    pub fn favorites(&self) -> &[ListEntry] {
        &self.favorites
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::{PowerFactorInput, ShortCircuitInput};
    use crate::presets::example_input;

    fn library() -> LibrarySnapshot {
        LibrarySnapshot::default()
    }

    #[test]
    fn test_capture_records_digests() {
        let scenario = Scenario::capture("Plant A", example_input(ModuleKind::PowerFactor), &library()).unwrap();
        assert_eq!(scenario.module, ModuleKind::PowerFactor);
        assert_eq!(scenario.summary, "Required kvar 276.617 kvar");
        assert_eq!(scenario.snapshot, "Recommended bank 300 kvar");
    }

    #[test]
    fn test_capture_refuses_failed_calculation() {
        let inputs = CalculationInput::ShortCircuit(ShortCircuitInput::default());
        let err = Scenario::capture("Broken", inputs, &library()).unwrap_err();
        assert_eq!(err.violations().len(), 3);
    }

    #[test]
    fn test_scenario_json_roundtrip() {
        let scenario = Scenario::capture("Roof", example_input(ModuleKind::Pv), &library()).unwrap();
        let json = serde_json::to_string(&scenario).unwrap();
        let parsed: Scenario = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, scenario);
    }

    #[test]
    fn test_compare_same_module() {
        let a = Scenario::capture("0.95 target", example_input(ModuleKind::PowerFactor), &library()).unwrap();
        let b_input = CalculationInput::PowerFactor(PowerFactorInput {
            pf_target: Some(0.9),
            ..match example_input(ModuleKind::PowerFactor) {
                CalculationInput::PowerFactor(input) => input,
                _ => unreachable!(),
            }
        });
        let b = Scenario::capture("0.90 target", b_input, &library()).unwrap();

        let table = compare(&a, &b).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].a, "Recommended bank 300 kvar");
        assert_eq!(table.rows[1].b, "Recommended bank 200 kvar");
    }

    #[test]
    fn test_compare_different_modules_fails() {
        let a = Scenario::capture("A", example_input(ModuleKind::Pv), &library()).unwrap();
        let b = Scenario::capture("B", example_input(ModuleKind::Conduit), &library()).unwrap();
        let err = compare(&a, &b).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_book_keeps_insertion_order_per_module() {
        let mut book = ScenarioBook::new();
        let first = book.capture("first", example_input(ModuleKind::Pv), &library()).unwrap();
        book.capture("other", example_input(ModuleKind::Conduit), &library()).unwrap();
        let second = book.capture("second", example_input(ModuleKind::Pv), &library()).unwrap();

        let ids: Vec<_> = book.for_module(ModuleKind::Pv).map(|s| s.id).collect();
        assert_eq!(ids, vec![first, second]);
        assert_eq!(book.len(), 3);
    }

    #[test]
    fn test_recent_is_capped_newest_first() {
        let mut book = ScenarioBook::new();
        for i in 0..8 {
            book.record_recent(ModuleKind::Conduit, format!("run {}", i));
        }
        let summaries: Vec<_> = book.recent().iter().map(|e| e.summary.as_str()).collect();
        assert_eq!(summaries, vec!["run 7", "run 6", "run 5", "run 4", "run 3", "run 2"]);
    }

    #[test]
    fn test_favorites() {
        let mut book = ScenarioBook::new();
        let id = book.capture("Roof", example_input(ModuleKind::Pv), &library()).unwrap();
        assert!(book.add_favorite(&id));
        assert!(!book.add_favorite(&Uuid::new_v4()));
        assert_eq!(book.favorites()[0].summary, "Roof: PV size 183.15 kWp");
    }

    #[test]
    fn test_remove() {
        let mut book = ScenarioBook::new();
        let id = book.capture("Roof", example_input(ModuleKind::Pv), &library()).unwrap();
        assert!(book.remove(&id).is_some());
        assert!(book.is_empty());
        assert!(book.get(&id).is_none());
    }
}

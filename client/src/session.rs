use inkmath_shared::Recognition;

use crate::overlay::{OverlayArena, OverlayId};
use crate::vars::VarStore;

pub struct MergeOutcome {
    pub appended: Vec<OverlayId>,
    pub skipped_assignments: Vec<String>,
}

pub fn parse_assignment_value(value: &str) -> Option<f64> {
    value.trim().parse().ok()
}

/// Applies one successful recognition round, in recognizer order: assignment
/// results update the variable store, and every result (assignments
/// included) becomes an overlay. Never runs on a failed round.
pub fn merge_results(
    vars: &mut VarStore,
    overlays: &mut OverlayArena,
    results: &[Recognition],
) -> MergeOutcome {
    let mut appended = Vec::with_capacity(results.len());
    let mut skipped_assignments = Vec::new();
    for result in results {
        if result.is_assignment {
            match parse_assignment_value(&result.value) {
                Some(value) => vars.apply_assignment(&result.expression, value),
                None => skipped_assignments.push(result.expression.clone()),
            }
        }
        appended.push(overlays.append(result.typeset_source()));
    }
    MergeOutcome {
        appended,
        skipped_assignments,
    }
}

#[cfg(test)]
mod tests {
    use inkmath_shared::Recognition;

    use super::{merge_results, parse_assignment_value};
    use crate::overlay::OverlayArena;
    use crate::vars::VarStore;

    fn result(expression: &str, value: &str, is_assignment: bool) -> Recognition {
        Recognition {
            expression: expression.to_string(),
            value: value.to_string(),
            is_assignment,
        }
    }

    #[test]
    fn empty_round_changes_nothing() {
        let mut vars = VarStore::new();
        let mut overlays = OverlayArena::new();
        let outcome = merge_results(&mut vars, &mut overlays, &[]);
        assert!(outcome.appended.is_empty());
        assert!(vars.is_empty());
        assert!(overlays.is_empty());
    }

    #[test]
    fn plain_evaluation_appends_overlay_without_touching_vars() {
        let mut vars = VarStore::new();
        let mut overlays = OverlayArena::new();
        let outcome = merge_results(&mut vars, &mut overlays, &[result("2+2", "4", false)]);
        assert_eq!(outcome.appended.len(), 1);
        assert!(vars.is_empty());
        let overlay = overlays.get(outcome.appended[0]).unwrap();
        assert_eq!(overlay.source, "2+2 = 4");
    }

    #[test]
    fn assignment_updates_vars_and_still_gets_an_overlay() {
        let mut vars = VarStore::new();
        let mut overlays = OverlayArena::new();
        let outcome = merge_results(&mut vars, &mut overlays, &[result("y", "10", true)]);
        assert_eq!(vars.get().get("y"), Some(&10.0));
        assert_eq!(overlays.len(), 1);
        assert_eq!(overlays.get(outcome.appended[0]).unwrap().source, "y = 10");
    }

    #[test]
    fn results_merge_in_recognizer_order() {
        let mut vars = VarStore::new();
        let mut overlays = OverlayArena::new();
        merge_results(
            &mut vars,
            &mut overlays,
            &[
                result("a", "1", true),
                result("a", "2", true),
                result("a+1", "3", false),
            ],
        );
        assert_eq!(vars.get().get("a"), Some(&2.0));
        let sources: Vec<&str> = overlays.iter().map(|overlay| overlay.source.as_str()).collect();
        assert_eq!(sources, vec!["a = 1", "a = 2", "a+1 = 3"]);
    }

    #[test]
    fn unparseable_assignment_value_is_skipped_but_still_shown() {
        let mut vars = VarStore::new();
        let mut overlays = OverlayArena::new();
        let outcome = merge_results(&mut vars, &mut overlays, &[result("z", "undefined", true)]);
        assert!(vars.is_empty());
        assert_eq!(outcome.skipped_assignments, vec!["z".to_string()]);
        assert_eq!(overlays.len(), 1);
    }

    #[test]
    fn assignment_values_parse_with_surrounding_whitespace() {
        assert_eq!(parse_assignment_value(" 10 "), Some(10.0));
        assert_eq!(parse_assignment_value("-2.5"), Some(-2.5));
        assert_eq!(parse_assignment_value("ten"), None);
    }
}

//! Effective rule resolution and trigger filtering.

use super::{Rule, Rules, Trigger};

/// Compute a field's effective rule list.
///
/// Explicit rules win outright over the form-level rules for the field's
/// name; the two are never merged. The `required` shortcut is layered on top:
/// when no rule in the base list is already required, a default required
/// rule firing on blur is put at the head of the list.
pub fn resolve(explicit: Option<&Rules>, form_rules: Option<&Rules>, required: bool) -> Vec<Rule> {
    let mut rules = explicit
        .or(form_rules)
        .map(Rules::to_vec)
        .unwrap_or_default();

    if required && !rules.iter().any(|rule| rule.required) {
        rules.insert(0, Rule::required_default());
    }

    log::trace!(
        "resolved {} rule(s) (explicit: {}, form: {}, required: {})",
        rules.len(),
        explicit.is_some(),
        form_rules.is_some(),
        required
    );

    rules
}

/// Keep the rules that fire on `trigger`, in order.
pub fn filter(rules: &[Rule], trigger: Trigger) -> Vec<Rule> {
    rules
        .iter()
        .filter(|rule| rule.applies_to(trigger))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern_rule() -> Rule {
        Rule::new().pattern("^x+$").unwrap()
    }

    #[test]
    fn test_nothing_resolves_to_empty() {
        assert!(resolve(None, None, false).is_empty());
    }

    #[test]
    fn test_required_only_synthesizes_default() {
        let rules = resolve(None, None, true);
        assert_eq!(rules, vec![Rule::required_default()]);
        assert_eq!(rules[0].message.as_deref(), Some("required"));
        assert_eq!(rules[0].trigger, Some(vec![Trigger::Blur]));
    }

    #[test]
    fn test_explicit_overrides_form_rules() {
        let explicit = Rules::Many(vec![pattern_rule()]);
        let form = Rules::Single(Rule::new().required());
        let rules = resolve(Some(&explicit), Some(&form), false);
        assert_eq!(rules, vec![pattern_rule()]);
    }

    #[test]
    fn test_form_rules_used_without_explicit() {
        let form = Rules::Single(Rule::new().min(2.0));
        assert_eq!(resolve(None, Some(&form), false), vec![Rule::new().min(2.0)]);
    }

    #[test]
    fn test_required_not_duplicated() {
        let explicit = Rules::Many(vec![pattern_rule(), Rule::new().required()]);
        let rules = resolve(Some(&explicit), None, true);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules.iter().filter(|r| r.required).count(), 1);
    }

    #[test]
    fn test_required_prepended_once() {
        let explicit = Rules::Single(pattern_rule());
        let rules = resolve(Some(&explicit), None, true);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0], Rule::required_default());
        assert_eq!(rules[1], pattern_rule());
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let explicit = Rules::Many(vec![pattern_rule(), Rule::new().on(Trigger::Change)]);
        let first = resolve(Some(&explicit), None, true);
        let second = resolve(Some(&explicit), None, true);
        assert_eq!(first, second);
    }

    #[test]
    fn test_filter_by_trigger() {
        let blur = Rule::new().required().on(Trigger::Blur);
        let any = Rule::new().min(1.0);
        let rules = vec![blur.clone(), any.clone()];

        assert_eq!(filter(&rules, Trigger::Change), vec![any.clone()]);
        assert_eq!(filter(&rules, Trigger::Blur), vec![blur, any]);
    }
}

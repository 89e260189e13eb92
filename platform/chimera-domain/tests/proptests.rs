use chimera_domain::services::formatting::{format_currency, group_thousands};
use chimera_domain::value_objects::snapshot::{
    normalize_last_actions, AWAITING_ACTION_PLACEHOLDER, MAX_LAST_ACTIONS,
};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    #[test]
    fn grouping_only_inserts_separators(value in 0.0f64..1.0e12) {
        let grouped = group_thousands(value, 2);
        prop_assert_eq!(grouped.replace(',', ""), format!("{:.2}", value));
        let int_part = grouped.split('.').next().unwrap_or_default();
        prop_assert!(int_part.split(',').skip(1).all(|group| group.len() == 3));
    }

    #[test]
    fn currency_always_starts_with_dollar(value in -1.0e9f64..1.0e9) {
        let formatted = format_currency(value);
        prop_assert!(formatted.starts_with('$'));
        prop_assert!(formatted.ends_with(|c: char| c.is_ascii_digit()));
        prop_assert_eq!(formatted.starts_with("$-"), value < 0.0);
    }

    #[test]
    fn last_actions_are_bounded_and_never_empty(actions in prop::collection::vec("[a-z ]{0,12}", 0..8)) {
        let input_len = actions.len();
        let normalized = normalize_last_actions(actions);
        prop_assert!(!normalized.is_empty());
        prop_assert!(normalized.len() <= MAX_LAST_ACTIONS);
        if input_len == 0 {
            prop_assert_eq!(normalized[0].as_str(), AWAITING_ACTION_PLACEHOLDER);
        }
    }
}

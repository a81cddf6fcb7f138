use kanban_core::{validate_and_normalize, ProjectValidationError};
use proptest::prelude::*;

proptest! {
    #[test]
    fn legal_names_normalize_to_lowercase(name in "[A-Za-z0-9_-]{1,40}") {
        let normalized = validate_and_normalize(Some(name.as_str()), Some(1)).unwrap();
        prop_assert_eq!(normalized.as_str(), name.to_lowercase());
    }

    #[test]
    fn names_with_an_illegal_character_are_rejected(
        prefix in "[A-Za-z0-9_-]{1,10}",
        illegal in "[ \t!@#$%&*()+={}\\[\\]?/|\\\\'\".,:;~`^<>]",
        suffix in "[A-Za-z0-9_-]{0,10}",
    ) {
        let name = format!("{prefix}{illegal}{suffix}");
        let result = validate_and_normalize(Some(name.as_str()), Some(1));
        prop_assert!(matches!(result, Err(ProjectValidationError::InvalidFormat(_))));
    }

    #[test]
    fn blank_names_are_empty(name in "[ \t\r\n]{0,12}") {
        prop_assert_eq!(
            validate_and_normalize(Some(name.as_str()), Some(1)),
            Err(ProjectValidationError::EmptyName)
        );
    }

    #[test]
    fn missing_owner_always_fails(name in "[A-Za-z0-9_-]{0,20}") {
        prop_assert_eq!(
            validate_and_normalize(Some(name.as_str()), None),
            Err(ProjectValidationError::EmptyOwner)
        );
    }
}

use constraintdom::{Constraint, DomError, InputElement, InputType, Step, ValidityState};

// ============================================================================
// Constraint names
// ============================================================================

#[test]
fn test_constraint_names_round_trip() {
    for constraint in Constraint::ALL {
        let parsed: Constraint = constraint.as_str().parse().unwrap();
        assert_eq!(parsed, constraint);
    }
}

#[test]
fn test_unknown_constraint_name() {
    let err = "tooShrt".parse::<Constraint>().unwrap_err();
    assert!(matches!(err, DomError::UnknownConstraint(ref name) if name == "tooShrt"));
}

#[test]
fn test_validity_with_and_violations() {
    let state = ValidityState::with([Constraint::TooShort, Constraint::ValueMissing]);
    assert!(!state.valid());
    let violations: Vec<_> = state.violations().collect();
    assert_eq!(violations, vec![Constraint::ValueMissing, Constraint::TooShort]);
    assert!(ValidityState::new().valid());
}

// ============================================================================
// Text constraints
// ============================================================================

#[test]
fn test_required_empty_is_value_missing() {
    let input = InputElement::new("username").required(true);
    let validity = input.validity();
    assert!(validity.value_missing);
    assert_eq!(input.validation_message(), "Please fill out this field.");

    input.set_value("john");
    assert!(input.check_validity());
    assert_eq!(input.validation_message(), "");
}

#[test]
fn test_empty_value_skips_length_and_pattern() {
    let input = InputElement::new("username")
        .min_length(3)
        .pattern("[a-z]+")
        .unwrap();
    assert!(input.check_validity());
}

#[test]
fn test_too_short_and_too_long() {
    let input = InputElement::new("username").min_length(3).max_length(5);

    input.set_value("ab");
    assert!(input.validity().too_short);
    assert_eq!(
        input.validation_message(),
        "Please lengthen this text to 3 characters or more (you are currently using 2 characters)."
    );

    input.set_value("abcdef");
    assert!(input.validity().too_long);
    assert!(!input.validity().too_short);

    input.set_value("abcd");
    assert!(input.check_validity());
}

#[test]
fn test_pattern_mismatch() {
    let input = InputElement::new("password").pattern(".{5,}").unwrap().value("1234");
    assert!(input.validity().pattern_mismatch);
    assert_eq!(input.validation_message(), "Please match the requested format.");

    input.set_value("123456");
    assert!(!input.validity().pattern_mismatch);
}

#[test]
fn test_invalid_pattern() {
    let err = InputElement::new("x").pattern("(").unwrap_err();
    assert!(matches!(err, DomError::InvalidPattern { .. }));
}

// ============================================================================
// Typed inputs
// ============================================================================

#[test]
fn test_email_type_mismatch() {
    let input = InputElement::new("email").kind(InputType::Email).value("not-an-email");
    assert!(input.validity().type_mismatch);
    assert_eq!(input.validation_message(), "Please enter an email address.");

    input.set_value("john@example.com");
    assert!(input.check_validity());
}

#[test]
fn test_url_type_mismatch() {
    let input = InputElement::new("website").kind(InputType::Url).value("example");
    assert!(input.validity().type_mismatch);
    assert_eq!(input.validation_message(), "Please enter a URL.");

    input.set_value("https://example.com");
    assert!(input.check_validity());
}

#[test]
fn test_number_range_and_bad_input() {
    let input = InputElement::new("age").kind(InputType::Number).min(18.0).max(99.0);

    input.set_value("12");
    assert!(input.validity().range_underflow);
    assert_eq!(
        input.validation_message(),
        "Value must be greater than or equal to 18."
    );

    input.set_value("120");
    assert!(input.validity().range_overflow);

    input.set_value("abc");
    let validity = input.validity();
    assert!(validity.bad_input);
    assert!(!validity.range_underflow);

    input.set_value("30");
    assert!(input.check_validity());
}

#[test]
fn test_number_default_step_is_one() {
    let input = InputElement::new("count").kind(InputType::Number).value("1.5");
    assert!(input.validity().step_mismatch);

    let input = input.step(Step::Any);
    assert!(input.check_validity());
}

#[test]
fn test_custom_validity_takes_precedence() {
    let input = InputElement::new("username").required(true);
    input.set_custom_validity("Username already taken");
    let validity = input.validity();
    assert!(validity.custom_error);
    assert!(validity.value_missing);
    assert_eq!(input.validation_message(), "Username already taken");

    input.set_custom_validity("");
    assert_eq!(input.validation_message(), "Please fill out this field.");
}

// ============================================================================
// Attributes
// ============================================================================

#[test]
fn test_attributes_from_markup() {
    let input = InputElement::new("age")
        .attribute("type", "number")
        .unwrap()
        .attribute("required", "")
        .unwrap()
        .attribute("min", "18")
        .unwrap()
        .attribute("step", "any")
        .unwrap()
        .attribute("placeholder", "Age")
        .unwrap();

    let data = input.data();
    assert_eq!(data.kind, InputType::Number);
    assert!(data.required);
    assert_eq!(data.min, Some(18.0));
    assert_eq!(data.step, Some(Step::Any));
}

#[test]
fn test_invalid_numeric_attribute() {
    let err = InputElement::new("age").attribute("min", "eighteen").unwrap_err();
    assert!(matches!(err, DomError::InvalidNumber { attribute: "min", .. }));
}

#[test]
fn test_clones_share_state() {
    let input = InputElement::new("username");
    let handle = input.clone();
    handle.set_value("typed");
    assert_eq!(input.get_value(), "typed");
    assert_eq!(input.name(), "username");
}

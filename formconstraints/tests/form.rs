use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use constraintdom::{Constraint, InputElement, InputType};
use formconstraints::emitter::listener;
use formconstraints::{
    EmitterError, FeedbackKey, Feedback, FieldFeedbacks, FormConfig, FormError, FormEvent,
    FormEventKind, FormWithConstraints, Severity, Stop,
};

fn keys(set: &BTreeSet<FeedbackKey>) -> Vec<u64> {
    set.iter().map(|k| k.0).collect()
}

fn record(form: &FormWithConstraints, kinds: &[FormEventKind]) -> Arc<Mutex<Vec<FormEvent>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    for kind in kinds {
        let log = Arc::clone(&log);
        form.add_listener(
            *kind,
            listener(move |e: &FormEvent| log.lock().unwrap().push(e.clone())),
        )
        .unwrap();
    }
    log
}

fn password_form(value: &str) -> FormWithConstraints {
    let form = FormWithConstraints::new();
    form.mount_input(
        InputElement::new("password")
            .kind(InputType::Password)
            .required(true)
            .pattern(".{5,}")
            .unwrap()
            .value(value),
    )
    .unwrap();
    form.mount_feedbacks(
        FieldFeedbacks::new("password")
            .feedback(Feedback::when("valueMissing").unwrap())
            .feedback(
                Feedback::when("patternMismatch")
                    .unwrap()
                    .message("Should be at least 5 characters long"),
            )
            .feedback(
                Feedback::predicate(|v| !v.chars().any(|c| c.is_ascii_digit()))
                    .warning()
                    .message("Should contain numbers"),
            )
            .feedback(
                Feedback::predicate(|v| !v.chars().any(|c| c.is_lowercase()))
                    .warning()
                    .message("Should contain small letters"),
            )
            .feedback(
                Feedback::predicate(|v| !v.chars().any(|c| c.is_uppercase()))
                    .warning()
                    .message("Should contain capital letters"),
            )
            .feedback(
                Feedback::predicate(|v| !v.chars().any(|c| !c.is_alphanumeric()))
                    .warning()
                    .message("Should contain special characters"),
            ),
    )
    .unwrap();
    form
}

// ============================================================================
// Resolution
// ============================================================================

#[tokio::test]
async fn test_password_scenario() {
    let form = password_form("123456");

    let field = form.validate_field("password").await.unwrap().unwrap();

    assert!(field.errors.is_empty());
    assert_eq!(keys(&field.warnings), vec![4, 5, 6]);
    assert!(field.dirty);
    assert!(form.is_valid());

    let messages: Vec<String> = form
        .shown_feedbacks("password")
        .unwrap()
        .into_iter()
        .map(|f| f.message)
        .collect();
    assert_eq!(
        messages,
        vec![
            "Should contain small letters",
            "Should contain capital letters",
            "Should contain special characters",
        ]
    );
}

#[tokio::test]
async fn test_password_too_short_stops_at_first_error() {
    let form = password_form("12");

    let field = form.validate_field("password").await.unwrap().unwrap();

    assert_eq!(keys(&field.errors), vec![2]);
    assert!(field.warnings.is_empty());
    assert!(!form.is_valid());
    assert_eq!(field.validation_message, "Please match the requested format.");
}

#[tokio::test]
async fn test_value_missing_shows_native_message() {
    let form = password_form("");

    form.validate_field("password").await.unwrap();

    let shown = form.shown_feedbacks("password").unwrap();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].key, FeedbackKey(1));
    assert_eq!(shown[0].severity, Severity::Error);
    assert_eq!(shown[0].message, "Please fill out this field.");
}

fn three_errors_form(stop: Option<Stop>) -> FormWithConstraints {
    let form = FormWithConstraints::new();
    form.mount_input(InputElement::new("username").value("x")).unwrap();
    let mut tree = FieldFeedbacks::new("username")
        .feedback(Feedback::predicate(|_| true).message("first"))
        .feedback(Feedback::predicate(|_| true).message("second"))
        .feedback(Feedback::predicate(|_| false).message("third"));
    if let Some(stop) = stop {
        tree = tree.stop(stop);
    }
    form.mount_feedbacks(tree).unwrap();
    form
}

#[tokio::test]
async fn test_default_stop_shows_first_error_only() {
    let form = three_errors_form(None);
    let field = form.validate_field("username").await.unwrap().unwrap();
    assert_eq!(keys(&field.errors), vec![1]);
}

#[tokio::test]
async fn test_stop_all_shows_every_match() {
    let form = three_errors_form("all".parse().ok());
    let field = form.validate_field("username").await.unwrap().unwrap();
    assert_eq!(keys(&field.errors), vec![1, 2]);
}

#[tokio::test]
async fn test_config_default_stop() {
    let form = FormWithConstraints::with_config(FormConfig::new().default_stop(Stop::No));
    form.mount_input(InputElement::new("username").value("x")).unwrap();
    form.mount_feedbacks(
        FieldFeedbacks::new("username")
            .feedback(Feedback::predicate(|_| true))
            .feedback(Feedback::predicate(|_| true)),
    )
    .unwrap();

    let field = form.validate_field("username").await.unwrap().unwrap();
    assert_eq!(keys(&field.errors), vec![1, 2]);
}

#[tokio::test]
async fn test_stop_first_warning_lets_errors_through() {
    let form = FormWithConstraints::new();
    form.mount_input(InputElement::new("username").value("x")).unwrap();
    form.mount_feedbacks(
        FieldFeedbacks::new("username")
            .stop(Stop::FirstWarning)
            .feedback(Feedback::predicate(|_| true))
            .feedback(Feedback::predicate(|_| true).warning())
            .feedback(Feedback::predicate(|_| true))
            .feedback(Feedback::predicate(|_| true).info()),
    )
    .unwrap();

    let field = form.validate_field("username").await.unwrap().unwrap();
    assert_eq!(keys(&field.errors), vec![1]);
    assert_eq!(keys(&field.warnings), vec![2]);
    assert!(field.infos.is_empty());
}

#[tokio::test]
async fn test_valid_feedback_when_nothing_matches() {
    let form = FormWithConstraints::new();
    form.mount_input(InputElement::new("username").min_length(3).value("john"))
        .unwrap();
    form.mount_feedbacks(
        FieldFeedbacks::new("username")
            .feedback(Feedback::native(Constraint::TooShort))
            .feedback(Feedback::valid().message("Looks good!")),
    )
    .unwrap();

    let field = form.validate_field("username").await.unwrap().unwrap();

    assert!(field.errors.is_empty());
    assert_eq!(keys(&field.valids), vec![2]);
    assert!(form.is_valid());
    let shown = form.shown_feedbacks("username").unwrap();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].severity, Severity::WhenValid);
    assert_eq!(shown[0].message, "Looks good!");
}

#[tokio::test]
async fn test_valid_feedback_hidden_by_warning() {
    let form = FormWithConstraints::new();
    form.mount_input(InputElement::new("username").value("john")).unwrap();
    form.mount_feedbacks(
        FieldFeedbacks::new("username")
            .feedback(Feedback::valid())
            .feedback(Feedback::predicate(|v| v.len() < 8).warning()),
    )
    .unwrap();

    let field = form.validate_field("username").await.unwrap().unwrap();
    assert!(field.valids.is_empty());
    assert_eq!(keys(&field.warnings), vec![2]);
}

#[tokio::test]
async fn test_wildcard_uses_validation_message() {
    let form = FormWithConstraints::new();
    form.mount_input(InputElement::new("email").kind(InputType::Email).value("nope"))
        .unwrap();
    form.mount_feedbacks(FieldFeedbacks::new("email").feedback(Feedback::any()))
        .unwrap();

    form.validate_form().await.unwrap();

    let shown = form.shown_feedbacks("email").unwrap();
    assert_eq!(shown[0].message, "Please enter an email address.");
}

#[tokio::test]
async fn test_revalidation_is_idempotent() {
    let form = password_form("abc");

    let first = form.validate_field("password").await.unwrap().unwrap();
    let second = form.validate_field("password").await.unwrap().unwrap();

    assert_eq!(first, second);
    assert_eq!(form.get_field("password"), Some(second));
}

#[tokio::test]
async fn test_revalidation_drops_stale_keys() {
    let input = InputElement::new("password").required(true);
    let form = FormWithConstraints::new();
    form.mount_input(input.clone()).unwrap();
    form.mount_feedbacks(
        FieldFeedbacks::new("password").feedback(Feedback::when("valueMissing").unwrap()),
    )
    .unwrap();

    let field = form.validate_field("password").await.unwrap().unwrap();
    assert_eq!(keys(&field.errors), vec![1]);

    input.set_value("secret");
    let field = form.validate_field("password").await.unwrap().unwrap();
    assert!(field.errors.is_empty());
    assert_eq!(field.validation_message, "");
}

#[tokio::test]
async fn test_multiple_trees_for_one_field() {
    let form = FormWithConstraints::new();
    form.mount_input(InputElement::new("username").value("x")).unwrap();
    form.mount_feedbacks(FieldFeedbacks::new("username").feedback(Feedback::predicate(|_| true)))
        .unwrap();
    form.mount_feedbacks(
        FieldFeedbacks::new("username").feedback(Feedback::predicate(|_| true).info()),
    )
    .unwrap();

    let field = form.validate_field("username").await.unwrap().unwrap();
    assert_eq!(keys(&field.errors), vec![1]);
    assert_eq!(keys(&field.infos), vec![3]);
    assert!(form.has_feedbacks());
}

// ============================================================================
// Form-level results
// ============================================================================

/// Documented policy: a field that was never validated has no errors and
/// counts as valid, even though its input would fail. Kept for
/// compatibility; callers should run `validate_form` before trusting it.
#[tokio::test]
async fn test_is_valid_is_permissive_before_validation() {
    let form = password_form("");
    assert!(form.is_valid());
    assert!(!form.get_field("password").unwrap().dirty);

    form.validate_form().await.unwrap();
    assert!(!form.is_valid());
}

#[tokio::test]
async fn test_validate_form_covers_every_field() {
    let form = password_form("");
    form.mount_input(InputElement::new("username").required(true)).unwrap();
    form.mount_feedbacks(FieldFeedbacks::new("username").feedback(Feedback::any()))
        .unwrap();

    let fields = form.validate_form().await.unwrap();
    let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["password", "username"]);
    assert!(form.fields().iter().all(|f| f.dirty));
}

#[tokio::test]
async fn test_validate_fields_without_feedback_skips_dirty() {
    let form = password_form("");
    form.mount_input(InputElement::new("username").required(true)).unwrap();
    form.mount_feedbacks(FieldFeedbacks::new("username").feedback(Feedback::any()))
        .unwrap();

    form.validate_field("password").await.unwrap();
    let fields = form
        .validate_fields_without_feedback(std::iter::empty::<&str>())
        .await
        .unwrap();

    let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["username"]);
}

#[tokio::test]
async fn test_fields_display() {
    let form = password_form("12");
    form.validate_form().await.unwrap();

    let dump = form.fields().to_string();
    assert!(dump.starts_with("password: dirty=true errors=[2]"));
}

// ============================================================================
// Reset
// ============================================================================

#[tokio::test]
async fn test_reset_clears_fields_and_emits_once() {
    let form = password_form("");
    let log = record(&form, &[FormEventKind::Reset]);

    let field = form.validate_field("password").await.unwrap().unwrap();
    assert!(!field.errors.is_empty());

    form.reset().unwrap();

    let field = form.get_field("password").unwrap();
    assert!(field.errors.is_empty());
    assert!(!field.dirty);
    assert_eq!(field.validation_message, "");
    assert_eq!(*log.lock().unwrap(), vec![FormEvent::Reset]);
}

#[tokio::test]
async fn test_reset_fields_subset() {
    let form = password_form("");
    form.mount_input(InputElement::new("username").required(true)).unwrap();
    form.mount_feedbacks(FieldFeedbacks::new("username").feedback(Feedback::any()))
        .unwrap();
    let log = record(&form, &[FormEventKind::Reset]);

    form.validate_form().await.unwrap();
    let reset = form.reset_fields(["username"]).unwrap();

    assert_eq!(reset.len(), 1);
    assert!(!form.get_field("username").unwrap().dirty);
    assert!(form.get_field("password").unwrap().dirty);
    assert!(log.lock().unwrap().is_empty());
}

// ============================================================================
// Events
// ============================================================================

#[tokio::test]
async fn test_validation_events() {
    let form = password_form("123456");
    let log = record(
        &form,
        &[FormEventKind::FieldWillValidate, FormEventKind::FieldDidValidate],
    );

    let field = form.validate_field("password").await.unwrap().unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            FormEvent::FieldWillValidate("password".into()),
            FormEvent::FieldDidValidate(field),
        ]
    );
}

#[tokio::test]
async fn test_field_added_and_removed() {
    let form = FormWithConstraints::new();
    let log = record(&form, &[FormEventKind::FieldAdded, FormEventKind::FieldRemoved]);

    let first = form.mount_feedbacks(FieldFeedbacks::new("username")).unwrap();
    let second = form.mount_feedbacks(FieldFeedbacks::new("username")).unwrap();
    form.unmount_feedbacks(&first).unwrap();
    assert!(form.get_field("username").is_some());
    form.unmount_feedbacks(&second).unwrap();
    assert!(form.get_field("username").is_none());

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            FormEvent::FieldAdded("username".into()),
            FormEvent::FieldRemoved("username".into()),
        ]
    );

    let err = form.unmount_feedbacks(&second).unwrap_err();
    assert!(matches!(err, FormError::NotMounted(_)));
}

#[tokio::test]
async fn test_emit_without_remaining_listener_fails() {
    let form = password_form("123456");
    let did_validate = listener(|_: &FormEvent| {});
    form.add_listener(FormEventKind::FieldDidValidate, did_validate.clone())
        .unwrap();
    form.remove_listener(FormEventKind::FieldDidValidate, &did_validate)
        .unwrap();

    let err = form.validate_field("password").await.unwrap_err();
    assert!(matches!(
        err,
        FormError::Emitter(EmitterError::NoListener { .. })
    ));
}

#[tokio::test]
async fn test_duplicate_form_listener_fails() {
    let form = FormWithConstraints::new();
    let reset = listener(|_: &FormEvent| {});
    form.add_listener(FormEventKind::Reset, reset.clone()).unwrap();
    let err = form.add_listener(FormEventKind::Reset, reset).unwrap_err();
    assert!(matches!(
        err,
        FormError::Emitter(EmitterError::DuplicateListener { .. })
    ));
}

// ============================================================================
// Configuration errors
// ============================================================================

#[test]
fn test_unknown_when_fails() {
    let err = Feedback::when("tooShrt").unwrap_err();
    assert_eq!(err.to_string(), "Unknown when value 'tooShrt'");
}

#[tokio::test]
async fn test_feedbacks_without_input_fail() {
    let form = FormWithConstraints::new();
    form.mount_feedbacks(FieldFeedbacks::new("username").feedback(Feedback::any()))
        .unwrap();

    let err = form.validate_form().await.unwrap_err();
    assert!(matches!(err, FormError::NoInput(ref name) if name == "username"));
}

#[tokio::test]
async fn test_unknown_field_fails() {
    let form = password_form("");
    let err = form.validate_field("email").await.unwrap_err();
    assert!(matches!(err, FormError::UnknownField(ref name) if name == "email"));
}

#[tokio::test]
async fn test_failed_targets_emit_nothing() {
    let form = password_form("");
    let log = record(&form, &[FormEventKind::FieldWillValidate]);

    assert!(form.validate_fields(["password", "email"]).await.is_err());
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn test_duplicate_input_fails() {
    let form = FormWithConstraints::new();
    form.mount_input(InputElement::new("username")).unwrap();
    let err = form.mount_input(InputElement::new("username")).unwrap_err();
    assert!(matches!(err, FormError::DuplicateInput(ref name) if name == "username"));
}

#[test]
fn test_unmount_input() {
    let form = FormWithConstraints::new();
    form.mount_input(InputElement::new("username")).unwrap();
    form.unmount_input("username").unwrap();
    assert!(form.input("username").is_none());
    assert!(matches!(
        form.unmount_input("username"),
        Err(FormError::NoInput(_))
    ));
}

//! Sign-up form: username, email, password and its confirmation.

use std::time::Duration;

use constraintdom::{InputElement, InputType};
use formconstraints::emitter::listener;
use formconstraints::{
    Feedback, FieldFeedbacks, FormConfig, FormError, FormEvent, FormEventKind,
    FormWithConstraints, Severity,
};

const TAKEN_USERNAMES: [&str; 3] = ["admin", "john", "root"];

/// Simulated server round trip for the username check.
async fn is_taken(username: String) -> bool {
    tokio::time::sleep(Duration::from_millis(200)).await;
    TAKEN_USERNAMES.contains(&username.to_lowercase().as_str())
}

/// Mount the inputs and feedbacks; returns the input handles to type into.
fn build(form: &FormWithConstraints) -> Result<Vec<InputElement>, FormError> {
    let username = InputElement::new("username").required(true).min_length(3);
    let email = InputElement::new("email").kind(InputType::Email).required(true);
    let password = InputElement::new("password")
        .kind(InputType::Password)
        .required(true)
        .pattern(".{5,}")?;
    let confirm = InputElement::new("passwordConfirm").kind(InputType::Password);

    let inputs = vec![username, email, password.clone(), confirm];
    for input in &inputs {
        form.mount_input(input.clone())?;
    }

    form.mount_feedbacks(
        FieldFeedbacks::new("username")
            .feedback(Feedback::any())
            .feedback(
                Feedback::async_predicate(is_taken).message("Username already taken, choose another"),
            )
            .feedback(Feedback::valid().message("Username available")),
    )?;

    form.mount_feedbacks(FieldFeedbacks::new("email").feedback(Feedback::when("*")?))?;

    form.mount_feedbacks(
        FieldFeedbacks::new("password")
            .feedback(Feedback::when("valueMissing")?)
            .feedback(
                Feedback::when("patternMismatch")?.message("Should be at least 5 characters long"),
            )
            .group(
                FieldFeedbacks::nested()
                    .stop(formconstraints::Stop::No)
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
            .feedback(Feedback::valid().message("Looks good!")),
    )?;

    form.mount_feedbacks(
        FieldFeedbacks::new("passwordConfirm").feedback(
            Feedback::predicate(move |v| v != password.get_value()).message("Not the same password"),
        ),
    )?;

    Ok(inputs)
}

fn print_report(form: &FormWithConstraints) -> Result<(), FormError> {
    for field in form.fields().iter() {
        println!("{}", field.name);
        for feedback in form.shown_feedbacks(&field.name)? {
            let tag = match feedback.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Info => "info",
                Severity::WhenValid => "ok",
            };
            println!("  [{tag}] {}", feedback.message);
        }
    }
    Ok(())
}

/// Fill the form with `values`, validate it and print what is shown.
///
/// Returns whether the form is valid.
pub async fn run(config: FormConfig, values: &[(String, String)]) -> Result<bool, FormError> {
    let form = FormWithConstraints::with_config(config);
    let inputs = build(&form)?;

    form.add_listener(
        FormEventKind::FieldDidValidate,
        listener(|event: &FormEvent| {
            if let FormEvent::FieldDidValidate(field) = event {
                log::info!("did validate {}", field);
            }
        }),
    )?;

    for (name, value) in values {
        let input = inputs
            .iter()
            .find(|input| input.name() == name)
            .ok_or_else(|| FormError::NoInput(name.clone()))?;
        log::debug!("setting '{}' ({} chars)", name, value.chars().count());
        input.set_value(value.as_str());
    }

    form.validate_form().await?;
    print_report(&form)?;

    let valid = form.is_valid();
    println!("{}", if valid { "form is valid" } else { "form is invalid" });
    Ok(valid)
}

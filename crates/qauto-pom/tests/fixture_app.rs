//! Registration scenarios against the local replica of the qauto form.
//!
//! No deployment needed, but Chrome is, so these are ignored by default:
//!
//! ```text
//! cargo test -p qauto-pom --test fixture_app -- --ignored
//! ```

mod common;
mod scenarios;

use common::{FixtureApp, fixture_config};
use qauto_pom::{
    Field, Message, PomError, Result, Session, Suite, SuiteConfig, TEST_DATA,
    generate_unique_email,
};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tempfile::TempDir;

struct Harness {
    app: Arc<FixtureApp>,
    suite: Suite,
    artifacts: TempDir,
}

async fn harness_with(configure: impl FnOnce(SuiteConfig) -> SuiteConfig) -> Harness {
    let artifacts = TempDir::new().expect("temp dir");
    let app = Arc::new(FixtureApp::start().await.expect("fixture server"));
    let config = configure(fixture_config(&artifacts));
    let suite = Suite::new(config, app.clone());
    Harness {
        app,
        suite,
        artifacts,
    }
}

async fn run<F, Fut>(name: &str, scenario: F) -> Result<()>
where
    F: Fn(Session) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let harness = harness_with(|config| config).await;
    harness.suite.run(name, scenario).await
}

#[tokio::test]
#[ignore] // Requires Chrome
async fn successful_registration() -> Result<()> {
    run("successful registration", scenarios::successful_registration).await
}

#[tokio::test]
#[ignore]
async fn empty_required_fields() -> Result<()> {
    run("empty required fields", scenarios::empty_required_fields).await
}

#[tokio::test]
#[ignore]
async fn name_too_short() -> Result<()> {
    run("name too short", scenarios::name_too_short).await
}

#[tokio::test]
#[ignore]
async fn valid_name_has_no_length_error() -> Result<()> {
    run(
        "valid name has no length error",
        scenarios::valid_name_has_no_length_error,
    )
    .await
}

#[tokio::test]
#[ignore]
async fn invalid_email_format() -> Result<()> {
    run("invalid email format", scenarios::invalid_email_format).await
}

#[tokio::test]
#[ignore]
async fn password_without_uppercase() -> Result<()> {
    run("password without uppercase", scenarios::password_without_uppercase).await
}

#[tokio::test]
#[ignore]
async fn password_without_number() -> Result<()> {
    run("password without number", scenarios::password_without_number).await
}

#[tokio::test]
#[ignore]
async fn password_too_short() -> Result<()> {
    run("password too short", scenarios::password_too_short).await
}

#[tokio::test]
#[ignore]
async fn passwords_mismatch() -> Result<()> {
    run("passwords mismatch", scenarios::passwords_mismatch).await
}

#[tokio::test]
#[ignore]
async fn duplicate_email() -> Result<()> {
    run("duplicate email", scenarios::duplicate_email).await
}

#[tokio::test]
#[ignore]
async fn empty_repeat_password_is_required() -> Result<()> {
    run("empty repeat password", |session| async move {
        let page = session.registration_page();
        page.open().await?;

        page.fill_password(TEST_DATA.valid_user.password).await?;
        page.trigger_field_validation(Field::RepeatPassword).await?;

        page.expect_exact_message_visible(Message::RequiredRepeatPassword)
            .await?;
        page.expect_message_hidden(Message::Mismatch).await
    })
    .await
}

#[tokio::test]
#[ignore]
async fn last_name_too_short() -> Result<()> {
    run("last name too short", |session| async move {
        let page = session.registration_page();
        page.open().await?;

        page.fill_last_name(TEST_DATA.invalid_names.too_short).await?;
        page.trigger_field_validation(Field::LastName).await?;

        page.expect_message_visible(Message::LastNameLength).await
    })
    .await
}

#[tokio::test]
#[ignore]
async fn refilling_a_field_replaces_its_value() -> Result<()> {
    run("refill replaces value", |session| async move {
        let page = session.registration_page();
        page.open().await?;

        page.fill_name(TEST_DATA.invalid_names.too_short).await?;
        page.fill_name(TEST_DATA.invalid_names.valid).await?;
        page.trigger_field_validation(Field::Name).await?;

        let value: String = session
            .page()
            .evaluate("document.getElementById('signupName').value")
            .await?;
        assert_eq!(value, "John");
        page.expect_message_hidden(Message::NameLength).await
    })
    .await
}

#[tokio::test]
#[ignore]
async fn rejected_duplicate_never_reaches_the_garage() {
    let harness = harness_with(|config| config).await;
    let email = generate_unique_email();

    let first = email.clone();
    harness
        .suite
        .run("first sign-up", move |session| {
            let email = first.clone();
            async move {
                let page = session.registration_page();
                page.open().await?;
                page.complete_registration(&TEST_DATA.valid_user.with_email(email))
                    .await?;
                page.expect_success_message().await
            }
        })
        .await
        .expect("first sign-up succeeds");
    assert_eq!(harness.app.registered(), 1);

    harness
        .suite
        .run("second sign-up", move |session| {
            let email = email.clone();
            async move {
                let page = session.registration_page();
                page.open().await?;
                page.complete_registration(&TEST_DATA.valid_user.with_email(email))
                    .await?;
                page.expect_user_exists_message().await?;
                page.expect_no_success_message().await?;
                page.expect_field_visible(Field::Email).await
            }
        })
        .await
        .expect("second sign-up is rejected");

    assert_eq!(harness.app.registered(), 1);
}

#[tokio::test]
#[ignore]
async fn failed_attempt_is_retried_and_leaves_a_screenshot() {
    let harness = harness_with(|config| SuiteConfig {
        retries: Some(1),
        expect_timeout_ms: 500,
        ..config
    })
    .await;
    let attempts = Arc::new(AtomicU32::new(0));

    let counter = Arc::clone(&attempts);
    harness
        .suite
        .run("Flaky: passes on retry", move |session| {
            let attempt = counter.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                let page = session.registration_page();
                page.open().await?;
                if attempt == 1 {
                    // Nothing is submitted, so this times out.
                    page.expect_success_message_within(Duration::from_millis(300))
                        .await?;
                }
                Ok(())
            }
        })
        .await
        .expect("second attempt passes");

    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    let screenshot = harness
        .artifacts
        .path()
        .join("flaky-passes-on-retry-attempt1.png");
    let png = std::fs::read(&screenshot).expect("failure screenshot written");
    assert_eq!(&png[..4], &[0x89, 0x50, 0x4E, 0x47]);
    assert!(
        !harness
            .artifacts
            .path()
            .join("flaky-passes-on-retry-attempt2.png")
            .exists()
    );
}

#[tokio::test]
#[ignore]
async fn scenario_budget_is_enforced() {
    let harness = harness_with(|config| SuiteConfig {
        scenario_timeout_ms: 500,
        screenshot_on_failure: false,
        ..config
    })
    .await;

    let err = harness
        .suite
        .run("slow", |_session| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await
        .expect_err("scenario exceeds its budget");

    assert!(matches!(err, PomError::ScenarioTimeout { .. }));
    assert!(err.is_timeout());
}

#[tokio::test]
#[ignore]
async fn missing_element_times_out_with_locator_in_message() {
    let harness = harness_with(|config| SuiteConfig {
        expect_timeout_ms: 300,
        screenshot_on_failure: false,
        ..config
    })
    .await;

    let err = harness
        .suite
        .run("modal never opened", |session| async move {
            let page = session.registration_page();
            page.goto().await?;
            page.expect_field_visible(Field::Name).await
        })
        .await
        .expect_err("name field is hidden until the modal opens");

    assert!(err.is_timeout());
    assert!(err.to_string().contains("#signupName"), "{err}");
}

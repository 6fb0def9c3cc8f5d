//! Registration scenarios shared by the live and the offline suites.
//!
//! Every scenario starts from the open registration modal.

#![allow(dead_code)]

use qauto_pom::{
    Field, Message, RegistrationInput, Result, Session, TEST_DATA, generate_unique_email,
};

pub async fn successful_registration(session: Session) -> Result<()> {
    let page = session.registration_page();
    page.open().await?;

    let input = TEST_DATA.valid_user.with_email(generate_unique_email());
    page.complete_registration(&input).await?;
    page.expect_success_message().await
}

pub async fn empty_required_fields(session: Session) -> Result<()> {
    let page = session.registration_page();
    page.open().await?;

    page.trigger_all_fields_validation().await?;

    for message in [
        Message::RequiredName,
        Message::RequiredLastName,
        Message::RequiredEmail,
        Message::RequiredPassword,
        Message::RequiredRepeatPassword,
    ] {
        page.expect_exact_message_visible(message).await?;
    }
    Ok(())
}

pub async fn name_too_short(session: Session) -> Result<()> {
    let page = session.registration_page();
    page.open().await?;

    let input = RegistrationInput {
        name: Some(TEST_DATA.invalid_names.too_short.into()),
        ..TEST_DATA.valid_user.with_email(generate_unique_email())
    };
    page.fill_registration_form(&input).await?;
    page.trigger_field_validation(Field::Name).await?;

    page.expect_message_visible(Message::NameLength).await
}

pub async fn valid_name_has_no_length_error(session: Session) -> Result<()> {
    let page = session.registration_page();
    page.open().await?;

    page.fill_name(TEST_DATA.invalid_names.valid).await?;
    page.trigger_field_validation(Field::Name).await?;

    page.expect_message_hidden(Message::NameLength).await?;
    page.expect_message_hidden(Message::RequiredName).await
}

pub async fn invalid_email_format(session: Session) -> Result<()> {
    let page = session.registration_page();
    page.open().await?;

    let input = RegistrationInput::builder()
        .name(TEST_DATA.valid_user.name)
        .last_name(TEST_DATA.valid_user.last_name)
        .email(TEST_DATA.invalid_emails.invalid_format)
        .password(TEST_DATA.valid_user.password)
        .build();
    page.fill_registration_form(&input).await?;
    page.trigger_field_validation(Field::Email).await?;

    page.expect_message_visible(Message::EmailInvalid).await
}

async fn weak_password(session: Session, password: &str) -> Result<()> {
    let page = session.registration_page();
    page.open().await?;

    let input = RegistrationInput {
        password: Some(password.into()),
        ..TEST_DATA.valid_user.with_email(generate_unique_email())
    };
    page.fill_registration_form(&input).await?;
    page.trigger_field_validation(Field::Password).await?;

    page.expect_message_visible(Message::PasswordComplexity).await
}

pub async fn password_without_uppercase(session: Session) -> Result<()> {
    weak_password(session, TEST_DATA.invalid_passwords.no_uppercase).await
}

pub async fn password_without_number(session: Session) -> Result<()> {
    weak_password(session, TEST_DATA.invalid_passwords.no_number).await
}

pub async fn password_too_short(session: Session) -> Result<()> {
    weak_password(session, TEST_DATA.invalid_passwords.too_short).await
}

pub async fn passwords_mismatch(session: Session) -> Result<()> {
    let page = session.registration_page();
    page.open().await?;

    let input = RegistrationInput {
        repeat_password: Some(TEST_DATA.invalid_repeat_passwords.mismatch.into()),
        ..TEST_DATA.valid_user.with_email(generate_unique_email())
    };
    page.fill_registration_form(&input).await?;
    page.trigger_field_validation(Field::RepeatPassword).await?;

    page.expect_message_visible(Message::Mismatch).await
}

/// Registers a fresh email, then tries again from a clean browsing context.
pub async fn duplicate_email(session: Session) -> Result<()> {
    let page = session.registration_page();
    page.open().await?;

    let input = TEST_DATA.valid_user.with_email(generate_unique_email());
    page.complete_registration(&input).await?;
    page.expect_success_message().await?;

    let second = session.open_context().await?;
    let outcome = async {
        let page = second.registration_page();
        page.open().await?;
        page.complete_registration(&input).await?;
        page.expect_user_exists_message().await?;
        page.expect_no_success_message().await
    }
    .await;
    second.close().await?;
    outcome
}

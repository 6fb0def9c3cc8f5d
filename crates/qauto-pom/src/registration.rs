//! Page object for the qauto sign-up modal.
//!
//! The modal is opened from the landing page's "Sign up" button. Field
//! validation runs on blur, so negative checks focus and blur a field
//! instead of submitting.

use crate::base::BasePage;
use crate::data::RegistrationInput;
use crate::error::{PomError, Result};
use crate::messages::Message;
use crate::selectors::{Control, Field};
use qauto_browser_test::{Locator, TextMatch, WaitConfig};
use std::time::Duration;
use tracing::{Instrument, debug, info_span};

/// How long the application may take to answer a sign-up request.
pub const SUBMIT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy)]
pub struct RegistrationPage<'a> {
    base: BasePage<'a>,
}

impl<'a> RegistrationPage<'a> {
    #[must_use]
    pub fn new(base: BasePage<'a>) -> Self {
        Self { base }
    }

    #[must_use]
    pub fn base(&self) -> &BasePage<'a> {
        &self.base
    }

    /// Opens the landing page.
    pub async fn goto(&self) -> Result<()> {
        self.base.goto("/").await
    }

    /// Clicks "Sign up" and waits for the name input of the modal.
    pub async fn open_registration_form(&self) -> Result<()> {
        self.click(Control::SignUp).await?;
        self.base.wait_for_element(Field::Name.selector()).await
    }

    /// Landing page, modal, title and first field: the state every
    /// registration scenario starts from.
    pub async fn open(&self) -> Result<()> {
        async {
            self.goto().await?;
            self.open_registration_form().await?;
            self.expect_title_visible().await?;
            self.expect_field_visible(Field::Name).await
        }
        .instrument(info_span!("open_registration"))
        .await
    }

    pub async fn fill(&self, field: Field, value: &str) -> Result<()> {
        self.base.fill_field(field.selector(), value).await
    }

    pub async fn fill_name(&self, name: &str) -> Result<()> {
        self.fill(Field::Name, name).await
    }

    pub async fn fill_last_name(&self, last_name: &str) -> Result<()> {
        self.fill(Field::LastName, last_name).await
    }

    pub async fn fill_email(&self, email: &str) -> Result<()> {
        self.fill(Field::Email, email).await
    }

    pub async fn fill_password(&self, password: &str) -> Result<()> {
        self.fill(Field::Password, password).await
    }

    pub async fn fill_repeat_password(&self, password: &str) -> Result<()> {
        self.fill(Field::RepeatPassword, password).await
    }

    /// Types every present, non-empty value of `input` in form order.
    pub async fn fill_registration_form(&self, input: &RegistrationInput) -> Result<()> {
        for (field, value) in input.fields_to_fill() {
            debug!(%field, "filling");
            self.fill(field, value).await?;
        }
        Ok(())
    }

    /// Clicks "Register".
    pub async fn submit_form(&self) -> Result<()> {
        self.click(Control::Register).await
    }

    pub async fn complete_registration(&self, input: &RegistrationInput) -> Result<()> {
        async {
            self.fill_registration_form(input).await?;
            self.submit_form().await
        }
        .instrument(info_span!("complete_registration", email = input.email.as_deref()))
        .await
    }

    /// Focus then blur, which is what makes the form validate a field.
    pub async fn trigger_field_validation(&self, field: Field) -> Result<()> {
        self.base.focus_field(field.selector()).await?;
        self.base.blur_field(field.selector()).await
    }

    pub async fn trigger_all_fields_validation(&self) -> Result<()> {
        for field in Field::ALL {
            self.trigger_field_validation(field).await?;
        }
        Ok(())
    }

    pub async fn expect_title_visible(&self) -> Result<()> {
        self.base.expect_text_visible(&Message::Title.matcher()).await
    }

    pub async fn expect_field_visible(&self, field: Field) -> Result<()> {
        self.base.expect_element_visible(field.selector()).await
    }

    /// Asserts that `message` is shown.
    ///
    /// Literal messages are compared as case-insensitive substrings and
    /// checked on their first match; patterns must match exactly one
    /// element.
    pub async fn expect_message_visible(&self, message: Message) -> Result<()> {
        self.expect_message_visible_with(&message.matcher(), message.is_literal()).await
    }

    /// Like [`expect_message_visible`](Self::expect_message_visible), but
    /// a literal must be the element's whole text.
    pub async fn expect_exact_message_visible(&self, message: Message) -> Result<()> {
        self.expect_message_visible_with(&message.exact_matcher(), message.is_literal()).await
    }

    /// Asserts arbitrary text, optionally relaxed to its first match.
    pub async fn expect_message_visible_with(&self, text: &TextMatch, first: bool) -> Result<()> {
        let locator = Locator::text(text.clone());
        let locator = if first { locator.first() } else { locator };
        self.base
            .expect_visible(&locator, self.base.timeouts().expect)
            .await
    }

    /// Waits until `message` is not shown (or never was).
    pub async fn expect_message_hidden(&self, message: Message) -> Result<()> {
        let locator = Locator::text(message.exact_matcher()).first();
        self.base
            .page()
            .expect_hidden(&locator, self.base.timeouts().expect)
            .await?;
        Ok(())
    }

    pub async fn expect_success_message(&self) -> Result<()> {
        self.expect_success_message_within(SUBMIT_RESPONSE_TIMEOUT).await
    }

    /// Waits for a registration success message or the garage view.
    pub async fn expect_success_message_within(&self, timeout: Duration) -> Result<()> {
        let locator = Locator::text(Message::SuccessAny.matcher()).first();
        self.base
            .expect_visible(&locator, self.response_wait(timeout))
            .await
    }

    pub async fn expect_user_exists_message(&self) -> Result<()> {
        self.expect_user_exists_message_within(SUBMIT_RESPONSE_TIMEOUT).await
    }

    pub async fn expect_user_exists_message_within(&self, timeout: Duration) -> Result<()> {
        let locator = Locator::text(Message::UserExists.matcher());
        self.base
            .expect_visible(&locator, self.response_wait(timeout))
            .await
    }

    /// Fails if any success signal is visible right now.
    pub async fn expect_no_success_message(&self) -> Result<()> {
        let locator = Locator::text(Message::SuccessAny.matcher());
        match self.base.page().visible_count(&locator).await? {
            0 => Ok(()),
            n => Err(PomError::Assertion(format!(
                "{locator} matched {n} visible element(s) but registration should have been rejected"
            ))),
        }
    }

    async fn click(&self, control: Control) -> Result<()> {
        self.base.click_by_role(control.role(), &control.name()).await
    }

    fn response_wait(&self, timeout: Duration) -> WaitConfig {
        WaitConfig {
            timeout,
            ..self.base.timeouts().expect
        }
    }
}

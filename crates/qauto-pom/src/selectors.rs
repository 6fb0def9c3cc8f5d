//! Where the registration form's elements live in the DOM.

use once_cell::sync::Lazy;
use qauto_browser_test::{AriaRole, Locator, TextMatch};
use regex::{Regex, RegexBuilder};
use std::fmt;

/// An input of the registration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    LastName,
    Email,
    Password,
    RepeatPassword,
}

impl Field {
    /// Every field, in the order validation is triggered.
    pub const ALL: [Field; 5] = [
        Field::Name,
        Field::LastName,
        Field::Email,
        Field::Password,
        Field::RepeatPassword,
    ];

    #[must_use]
    pub fn selector(self) -> &'static str {
        match self {
            Field::Name => "#signupName",
            Field::LastName => "#signupLastName",
            Field::Email => "#signupEmail",
            Field::Password => "#signupPassword",
            Field::RepeatPassword => "#signupRepeatPassword",
        }
    }

    #[must_use]
    pub fn locator(self) -> Locator {
        Locator::css(self.selector())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.selector())
    }
}

static REGISTER_NAME: Lazy<Regex> = Lazy::new(|| case_insensitive("register"));
static SIGN_UP_NAME: Lazy<Regex> = Lazy::new(|| case_insensitive("sign up"));

fn case_insensitive(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .expect("constant pattern")
}

/// A button of the landing page or the registration modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    /// Opens the registration modal from the landing page.
    SignUp,
    /// Submits the registration form.
    Register,
}

impl Control {
    #[must_use]
    pub fn role(self) -> AriaRole {
        AriaRole::Button
    }

    /// Accessible-name matcher for the button.
    #[must_use]
    pub fn name(self) -> TextMatch {
        match self {
            Control::SignUp => TextMatch::Pattern(SIGN_UP_NAME.clone()),
            Control::Register => TextMatch::Pattern(REGISTER_NAME.clone()),
        }
    }

    #[must_use]
    pub fn locator(self) -> Locator {
        Locator::role(self.role(), self.name())
    }
}

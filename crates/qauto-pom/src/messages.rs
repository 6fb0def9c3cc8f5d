//! Texts the registration form and the application show.

use once_cell::sync::Lazy;
use qauto_browser_test::TextMatch;
use regex::{Regex, RegexBuilder};

/// Something the user can read after a form interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Message {
    /// Heading of the registration modal.
    Title,
    RequiredName,
    RequiredLastName,
    RequiredEmail,
    RequiredPassword,
    RequiredRepeatPassword,
    NameLength,
    LastNameLength,
    EmailInvalid,
    PasswordComplexity,
    /// Repeat password differs from password.
    Mismatch,
    /// Any sign of a completed registration, including landing in the garage.
    SuccessAny,
    UserExists,
}

/// Literal text or a pattern, before it becomes a [`TextMatch`].
#[derive(Debug, Clone)]
pub enum MessageText {
    Literal(&'static str),
    Pattern(&'static Regex),
}

static TITLE: Lazy<Regex> = Lazy::new(|| Regex::new("^Registration$").expect("constant pattern"));
static NAME_LENGTH: Lazy<Regex> =
    Lazy::new(|| ci("name has to be from 2 to 20 characters long"));
static LAST_NAME_LENGTH: Lazy<Regex> =
    Lazy::new(|| ci("last name has to be from 2 to 20 characters long"));
static EMAIL_INVALID: Lazy<Regex> = Lazy::new(|| ci("email is incorrect"));
static MISMATCH: Lazy<Regex> = Lazy::new(|| ci("passwords do not match"));
static SUCCESS_ANY: Lazy<Regex> = Lazy::new(|| ci("registration successful|garage"));
static USER_EXISTS: Lazy<Regex> = Lazy::new(|| ci("user already exists"));

fn ci(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .expect("constant pattern")
}

/// Full text of the password rule hint.
pub const PASSWORD_COMPLEXITY: &str = "Password has to be from 8 to 15 characters long and contain at least one integer, one capital, and one small letter";

impl Message {
    #[must_use]
    pub fn text(self) -> MessageText {
        use MessageText::{Literal, Pattern};
        match self {
            Message::Title => Pattern(&TITLE),
            Message::RequiredName => Literal("Name required"),
            Message::RequiredLastName => Literal("Last name required"),
            Message::RequiredEmail => Literal("Email required"),
            Message::RequiredPassword => Literal("Password required"),
            Message::RequiredRepeatPassword => Literal("Re-enter password required"),
            Message::NameLength => Pattern(&NAME_LENGTH),
            Message::LastNameLength => Pattern(&LAST_NAME_LENGTH),
            Message::EmailInvalid => Pattern(&EMAIL_INVALID),
            Message::PasswordComplexity => Literal(PASSWORD_COMPLEXITY),
            Message::Mismatch => Pattern(&MISMATCH),
            Message::SuccessAny => Pattern(&SUCCESS_ANY),
            Message::UserExists => Pattern(&USER_EXISTS),
        }
    }

    /// Default matcher: literals match as case-insensitive substrings.
    #[must_use]
    pub fn matcher(self) -> TextMatch {
        match self.text() {
            MessageText::Literal(text) => TextMatch::contains(text),
            MessageText::Pattern(re) => TextMatch::Pattern(re.clone()),
        }
    }

    /// Literals must equal the whole element text. Patterns are unchanged.
    #[must_use]
    pub fn exact_matcher(self) -> TextMatch {
        match self.text() {
            MessageText::Literal(text) => TextMatch::exact(text),
            MessageText::Pattern(re) => TextMatch::Pattern(re.clone()),
        }
    }

    /// Literal messages may render more than once (inline hint plus
    /// tooltip), so they are asserted on the first visible match only.
    #[must_use]
    pub fn is_literal(self) -> bool {
        matches!(self.text(), MessageText::Literal(_))
    }
}

//! Registration fixtures and the form input type.

use crate::selectors::Field;
use bon::Builder;

/// A user the form accepts, minus the email which must be unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidUser {
    pub name: &'static str,
    pub last_name: &'static str,
    pub password: &'static str,
}

impl ValidUser {
    /// Full form input for this user, with matching repeat password.
    #[must_use]
    pub fn with_email(&self, email: impl Into<String>) -> RegistrationInput {
        RegistrationInput::builder()
            .name(self.name)
            .last_name(self.last_name)
            .email(email)
            .password(self.password)
            .build()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidNames {
    /// Below the two-character minimum.
    pub too_short: &'static str,
    pub valid: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidEmails {
    pub invalid_format: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidPasswords {
    pub no_uppercase: &'static str,
    pub no_number: &'static str,
    pub too_short: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidRepeatPasswords {
    /// Differs from the valid user's password by one character.
    pub mismatch: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestData {
    pub valid_user: ValidUser,
    pub invalid_names: InvalidNames,
    pub invalid_emails: InvalidEmails,
    pub invalid_passwords: InvalidPasswords,
    pub invalid_repeat_passwords: InvalidRepeatPasswords,
}

pub const TEST_DATA: TestData = TestData {
    valid_user: ValidUser {
        name: "John",
        last_name: "Tester",
        password: "Qauto123",
    },
    invalid_names: InvalidNames {
        too_short: "A",
        valid: "John",
    },
    invalid_emails: InvalidEmails {
        invalid_format: "aqa-invalid-email",
    },
    invalid_passwords: InvalidPasswords {
        no_uppercase: "qauto123",
        no_number: "Qautoabc",
        too_short: "Qa1",
    },
    invalid_repeat_passwords: InvalidRepeatPasswords {
        mismatch: "Qauto124",
    },
};

/// Values to type into the registration form.
///
/// A field left as `None` or set to an empty string is not touched.
/// `repeat_password` falls back to `password` when `None`; pass
/// `Some(String::new())` to fill the password but leave the repeat
/// field empty.
///
/// ```
/// use qauto_pom::{Field, RegistrationInput};
///
/// let input = RegistrationInput::builder()
///     .name("John")
///     .password("Qauto123")
///     .build();
///
/// let filled: Vec<_> = input.fields_to_fill().into_iter().map(|(f, _)| f).collect();
/// assert_eq!(filled, [Field::Name, Field::Password, Field::RepeatPassword]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder)]
pub struct RegistrationInput {
    #[builder(into)]
    pub name: Option<String>,
    #[builder(into)]
    pub last_name: Option<String>,
    #[builder(into)]
    pub email: Option<String>,
    #[builder(into)]
    pub password: Option<String>,
    #[builder(into)]
    pub repeat_password: Option<String>,
}

impl RegistrationInput {
    /// Repeat password after applying the fallback to `password`.
    #[must_use]
    pub fn effective_repeat_password(&self) -> Option<&str> {
        self.repeat_password
            .as_deref()
            .or(self.password.as_deref())
    }

    /// The `(field, value)` pairs to fill, in form order.
    #[must_use]
    pub fn fields_to_fill(&self) -> Vec<(Field, &str)> {
        [
            (Field::Name, self.name.as_deref()),
            (Field::LastName, self.last_name.as_deref()),
            (Field::Email, self.email.as_deref()),
            (Field::Password, self.password.as_deref()),
            (Field::RepeatPassword, self.effective_repeat_password()),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.filter(|v| !v.is_empty()).map(|v| (field, v)))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_user_fills_every_field() {
        let input = TEST_DATA.valid_user.with_email("aqa-1@test.com");
        assert_eq!(
            input.fields_to_fill(),
            vec![
                (Field::Name, "John"),
                (Field::LastName, "Tester"),
                (Field::Email, "aqa-1@test.com"),
                (Field::Password, "Qauto123"),
                (Field::RepeatPassword, "Qauto123"),
            ]
        );
    }

    #[test]
    fn explicit_repeat_password_wins() {
        let input = RegistrationInput {
            repeat_password: Some(TEST_DATA.invalid_repeat_passwords.mismatch.into()),
            ..TEST_DATA.valid_user.with_email("aqa-2@test.com")
        };
        assert_eq!(input.effective_repeat_password(), Some("Qauto124"));
    }

    #[test]
    fn empty_repeat_password_skips_the_field() {
        let input = RegistrationInput::builder()
            .password("Qauto123")
            .repeat_password("")
            .build();
        assert_eq!(input.fields_to_fill(), vec![(Field::Password, "Qauto123")]);
    }

    #[test]
    fn empty_values_are_not_filled() {
        let input = RegistrationInput::builder()
            .name("")
            .last_name("Tester")
            .email("")
            .build();
        assert_eq!(input.fields_to_fill(), vec![(Field::LastName, "Tester")]);
    }

    #[test]
    fn default_input_fills_nothing() {
        assert!(RegistrationInput::default().fields_to_fill().is_empty());
    }

    #[test]
    fn fixtures_break_exactly_one_rule() {
        let data = TEST_DATA;
        assert!(data.invalid_names.too_short.len() < 2);
        assert!((2..=20).contains(&data.invalid_names.valid.len()));
        assert!(!data.invalid_emails.invalid_format.contains('@'));
        assert!(!data.invalid_passwords.no_uppercase.chars().any(char::is_uppercase));
        assert!(!data.invalid_passwords.no_number.chars().any(|c| c.is_ascii_digit()));
        assert!(data.invalid_passwords.too_short.len() < 8);
        assert_ne!(data.invalid_repeat_passwords.mismatch, data.valid_user.password);
    }
}

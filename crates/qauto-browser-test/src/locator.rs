//! Element locators and text matching.
//!
//! A [`Locator`] describes how to find an element: by CSS selector, by ARIA
//! role plus accessible name, or by its text. Resolution happens in two
//! steps. The page returns a snapshot of every element matching the
//! locator's base CSS query (text, accessible name, visibility), and the
//! filtering below picks the matching candidates. Keeping the matching on
//! the Rust side means regexes use the `regex` crate's syntax and the
//! filtering is testable without a browser.
//!
//! Locators are strict: a locator that matches more than one element is an
//! error unless it was narrowed with [`Locator::first`].

use crate::error::{BrowserError, Result};
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Base query used for text locators.
const TEXT_QUERY: &str = "body *:not(script):not(style):not(noscript):not(template)";

/// How an element's text (or accessible name) is compared.
#[derive(Debug, Clone)]
pub enum TextMatch {
    /// Case-insensitive substring match after whitespace normalisation.
    Contains(String),
    /// Case-sensitive match of the whole normalised text.
    Exact(String),
    /// Regular expression tested against the normalised text.
    Pattern(Regex),
}

impl TextMatch {
    /// Substring match, the default for plain strings.
    pub fn contains(text: impl Into<String>) -> Self {
        TextMatch::Contains(text.into())
    }

    /// Whole-text, case-sensitive match.
    pub fn exact(text: impl Into<String>) -> Self {
        TextMatch::Exact(text.into())
    }

    /// Case-sensitive regular expression.
    ///
    /// # Errors
    ///
    /// Returns the regex compile error for an invalid pattern.
    pub fn regex(pattern: &str) -> std::result::Result<Self, regex::Error> {
        Regex::new(pattern).map(TextMatch::Pattern)
    }

    /// Case-insensitive regular expression (the `/.../i` form).
    ///
    /// # Errors
    ///
    /// Returns the regex compile error for an invalid pattern.
    pub fn regex_ci(pattern: &str) -> std::result::Result<Self, regex::Error> {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map(TextMatch::Pattern)
    }

    /// Tests `text` against this matcher.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        let text = normalize_whitespace(text);
        match self {
            TextMatch::Contains(needle) => text
                .to_lowercase()
                .contains(&normalize_whitespace(needle).to_lowercase()),
            TextMatch::Exact(expected) => text == normalize_whitespace(expected),
            TextMatch::Pattern(re) => re.is_match(&text),
        }
    }
}

impl From<&str> for TextMatch {
    fn from(text: &str) -> Self {
        TextMatch::contains(text)
    }
}

impl From<Regex> for TextMatch {
    fn from(re: Regex) -> Self {
        TextMatch::Pattern(re)
    }
}

impl fmt::Display for TextMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextMatch::Contains(text) => write!(f, "{text:?}"),
            TextMatch::Exact(text) => write!(f, "{text:?}s"),
            TextMatch::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

/// Collapses runs of whitespace into single spaces and trims the ends.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// ARIA roles the suite locates by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AriaRole {
    /// `button`
    Button,
    /// `heading`
    Heading,
}

impl AriaRole {
    /// CSS query covering the elements that carry this role, implicitly
    /// or explicitly.
    #[must_use]
    pub fn css(self) -> &'static str {
        match self {
            AriaRole::Button => {
                "button, [role=button], input[type=button], input[type=submit], input[type=reset]"
            }
            AriaRole::Heading => "h1, h2, h3, h4, h5, h6, [role=heading]",
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            AriaRole::Button => "button",
            AriaRole::Heading => "heading",
        }
    }
}

/// One element from a page snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Position within the locator's base query result.
    pub index: usize,
    /// Raw `textContent`.
    pub text: String,
    /// Computed accessible name.
    pub name: String,
    /// Non-empty box and not `visibility: hidden`.
    pub visible: bool,
    /// `index` of the nearest ancestor that is also in the snapshot.
    #[serde(default)]
    pub parent: Option<usize>,
}

#[derive(Debug, Clone)]
enum Target {
    Css(String),
    Role { role: AriaRole, name: TextMatch },
    Text(TextMatch),
}

/// Describes how to find one element on a page.
#[derive(Debug, Clone)]
pub struct Locator {
    target: Target,
    first: bool,
}

impl Locator {
    /// Locates by CSS selector.
    pub fn css(selector: impl Into<String>) -> Self {
        Self::from_target(Target::Css(selector.into()))
    }

    /// Locates by ARIA role and accessible name. Hidden elements are not
    /// in the accessibility tree and never match.
    pub fn role(role: AriaRole, name: impl Into<TextMatch>) -> Self {
        Self::from_target(Target::Role {
            role,
            name: name.into(),
        })
    }

    /// Locates the innermost element whose text matches.
    pub fn text(text: impl Into<TextMatch>) -> Self {
        Self::from_target(Target::Text(text.into()))
    }

    fn from_target(target: Target) -> Self {
        Self {
            target,
            first: false,
        }
    }

    /// Narrows the locator to the first match in document order.
    #[must_use]
    pub fn first(mut self) -> Self {
        self.first = true;
        self
    }

    /// Base CSS query whose results are snapshotted and filtered.
    #[must_use]
    pub fn query(&self) -> &str {
        match &self.target {
            Target::Css(selector) => selector,
            Target::Role { role, .. } => role.css(),
            Target::Text(_) => TEXT_QUERY,
        }
    }

    /// Returns the candidates this locator matches, in document order.
    #[must_use]
    pub fn filter<'c>(&self, candidates: &'c [Candidate]) -> Vec<&'c Candidate> {
        let matched: Vec<_> = candidates
            .iter()
            .filter(|c| match &self.target {
                Target::Css(_) => true,
                Target::Role { name, .. } => c.visible && name.matches(&c.name),
                Target::Text(m) => m.matches(&c.text),
            })
            .collect();
        match self.target {
            Target::Text(_) => innermost(matched, candidates),
            _ => matched,
        }
    }

    /// Picks the single element this locator refers to.
    ///
    /// Returns `Ok(None)` when nothing matches yet.
    ///
    /// # Errors
    ///
    /// Returns `StrictModeViolation` when a strict locator matches more
    /// than one element.
    pub fn select<'c>(&self, candidates: &'c [Candidate]) -> Result<Option<&'c Candidate>> {
        let matched = self.filter(candidates);
        match matched.as_slice() {
            [] => Ok(None),
            [only] => Ok(Some(only)),
            [first, ..] if self.first => Ok(Some(first)),
            many => Err(BrowserError::StrictModeViolation {
                locator: self.to_string(),
                count: many.len(),
            }),
        }
    }
}

/// Drops every match that contains another match.
fn innermost<'c>(matched: Vec<&'c Candidate>, all: &[Candidate]) -> Vec<&'c Candidate> {
    let parents: HashMap<usize, Option<usize>> = all.iter().map(|c| (c.index, c.parent)).collect();
    let mut enclosing = HashSet::new();
    for candidate in &matched {
        let mut up = candidate.parent;
        while let Some(index) = up {
            if !enclosing.insert(index) {
                break;
            }
            up = parents.get(&index).copied().flatten();
        }
    }
    matched
        .into_iter()
        .filter(|c| !enclosing.contains(&c.index))
        .collect()
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Target::Css(selector) => write!(f, "{selector}")?,
            Target::Role { role, name } => write!(f, "role={}[name={name}]", role.as_str())?,
            Target::Text(m) => write!(f, "text={m}")?,
        }
        if self.first {
            write!(f, " >> nth=0")?;
        }
        Ok(())
    }
}

impl From<&str> for Locator {
    fn from(selector: &str) -> Self {
        Locator::css(selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(index: usize, text: &str, visible: bool) -> Candidate {
        Candidate {
            index,
            text: text.to_string(),
            name: text.trim().to_string(),
            visible,
            parent: None,
        }
    }

    fn child_of(parent: usize, candidate: Candidate) -> Candidate {
        Candidate {
            parent: Some(parent),
            ..candidate
        }
    }

    #[test]
    fn contains_is_case_insensitive_and_normalised() {
        let m = TextMatch::contains("name  REQUIRED");
        assert!(m.matches("  Last\n name required "));
        assert!(!m.matches("Name is required"));
    }

    #[test]
    fn exact_requires_whole_text() {
        let m = TextMatch::exact("Name required");
        assert!(m.matches("\n  Name required  "));
        assert!(!m.matches("Last name required"));
        assert!(!m.matches("name required"));
    }

    #[test]
    fn anchored_pattern_rejects_longer_text() {
        let m = TextMatch::regex("^Registration$").unwrap();
        assert!(m.matches(" Registration "));
        assert!(!m.matches("Registration successful"));
    }

    #[test]
    fn case_insensitive_pattern() {
        let m = TextMatch::regex_ci("registration successful|garage").unwrap();
        assert!(m.matches("Registration complete"));
        assert!(m.matches("Your GARAGE is empty"));
        assert!(!m.matches("Registration"));
    }

    #[test]
    fn strict_locator_rejects_multiple_matches() {
        let candidates = vec![candidate(0, "Sign up", true), candidate(1, "Sign up now", true)];
        let locator = Locator::text(TextMatch::regex_ci("sign up").unwrap());

        let err = locator.select(&candidates).unwrap_err();
        assert!(matches!(err, BrowserError::StrictModeViolation { count: 2, .. }));

        let first = locator.first().select(&candidates).unwrap().unwrap();
        assert_eq!(first.index, 0);
    }

    #[test]
    fn text_locator_skips_wrapper_elements() {
        let candidates = vec![
            candidate(0, "Name required", true),
            child_of(0, candidate(1, "Name required", true)),
        ];

        let hit = Locator::text(TextMatch::exact("Name required"))
            .select(&candidates)
            .unwrap()
            .unwrap();
        assert_eq!(hit.index, 1);
    }

    #[test]
    fn text_locator_picks_deepest_element_in_nested_markup() {
        // <div><p>Error: <b>User already exists</b></p></div>
        let candidates = vec![
            candidate(0, "Error: User already exists", true),
            child_of(0, candidate(1, "Error: User already exists", true)),
            child_of(1, candidate(2, "User already exists", true)),
        ];
        let locator = Locator::text(TextMatch::regex_ci("user already exists").unwrap());

        let hit = locator.select(&candidates).unwrap().unwrap();
        assert_eq!(hit.index, 2);
        assert_eq!(locator.filter(&candidates).len(), 1);
    }

    #[test]
    fn text_locator_keeps_unrelated_matches() {
        let candidates = vec![
            candidate(0, "Name required", true),
            child_of(0, candidate(1, "Last name required", true)),
            candidate(2, "Email required", true),
        ];
        let matched = Locator::text("required").filter(&candidates);
        let indices: Vec<_> = matched.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn role_locator_matches_accessible_name() {
        let candidates = vec![
            candidate(0, "Sign In", true),
            candidate(1, "Sign up", true),
            candidate(2, "Register", false),
        ];

        let sign_up = Locator::role(AriaRole::Button, TextMatch::regex_ci("sign up").unwrap());
        assert_eq!(sign_up.select(&candidates).unwrap().unwrap().index, 1);

        let register = Locator::role(AriaRole::Button, TextMatch::regex_ci("register").unwrap());
        assert!(register.select(&candidates).unwrap().is_none());
    }

    #[test]
    fn role_locator_ignores_hidden_duplicate() {
        // A collapsed mobile nav repeats the header button.
        let candidates = vec![candidate(0, "Sign up", false), candidate(1, "Sign up", true)];

        let sign_up = Locator::role(AriaRole::Button, TextMatch::regex_ci("sign up").unwrap());
        let hit = sign_up.select(&candidates).unwrap().unwrap();
        assert_eq!(hit.index, 1);
        assert!(hit.visible);
    }

    #[test]
    fn css_locator_takes_everything_from_query() {
        let candidates = vec![candidate(0, "", true)];
        let locator = Locator::css("#signupName");
        assert_eq!(locator.query(), "#signupName");
        assert_eq!(locator.select(&candidates).unwrap().unwrap().index, 0);
        assert!(locator.select(&[]).unwrap().is_none());
    }

    #[test]
    fn display_forms() {
        assert_eq!(Locator::css("#signupEmail").to_string(), "#signupEmail");
        assert_eq!(
            Locator::role(AriaRole::Button, TextMatch::regex_ci("register").unwrap()).to_string(),
            "role=button[name=/register/]"
        );
        assert_eq!(
            Locator::text(TextMatch::exact("Email required")).first().to_string(),
            "text=\"Email required\"s >> nth=0"
        );
    }

    #[test]
    fn snapshot_deserializes_from_page_json() {
        let json = serde_json::json!([
            { "index": 0, "text": "Registration", "name": "Registration", "visible": true, "parent": null },
            { "index": 1, "text": "Registration", "name": "Registration", "visible": true, "parent": 0 }
        ]);
        let parsed: Vec<Candidate> = serde_json::from_value(json).unwrap();
        assert_eq!(parsed[0], candidate(0, "Registration", true));
        assert_eq!(parsed[1], child_of(0, candidate(1, "Registration", true)));
    }
}

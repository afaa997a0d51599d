//! The agent record and the input types used to create and edit it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FieldIssue, ValidationError};

/// Maximum lengths (in characters) accepted for each text column.
pub const MAX_CODENAME_LEN: usize = 100;
pub const MAX_CONTACT_NUMBER_LEN: usize = 32;
pub const MAX_EMAIL_LEN: usize = 120;

/// Secrecy classification of an agent, lowest first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum AccessLevel {
    #[default]
    #[serde(rename = "Secret", alias = "Секретно")]
    Secret,
    #[serde(rename = "Top Secret", alias = "Очень секретно")]
    TopSecret,
    #[serde(rename = "Most Secret", alias = "Совершенно секретно")]
    MostSecret,
}

impl AccessLevel {
    /// Every level, in ascending order.
    pub const ALL: [AccessLevel; 3] = [
        AccessLevel::Secret,
        AccessLevel::TopSecret,
        AccessLevel::MostSecret,
    ];

    /// Canonical label, also the stored column value.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Secret => "Secret",
            AccessLevel::TopSecret => "Top Secret",
            AccessLevel::MostSecret => "Most Secret",
        }
    }

    /// Russian label used by the original registry forms.
    pub fn localized_label(&self) -> &'static str {
        match self {
            AccessLevel::Secret => "Секретно",
            AccessLevel::TopSecret => "Очень секретно",
            AccessLevel::MostSecret => "Совершенно секретно",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known access level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown access level: '{0}'")]
pub struct UnknownAccessLevel(pub String);

impl FromStr for AccessLevel {
    type Err = UnknownAccessLevel;

    /// Accepts canonical labels (any case, `_`/`-` for spaces) and the localized labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let normalized = trimmed.replace(['_', '-'], " ").to_lowercase();
        match normalized.as_str() {
            "secret" | "секретно" => Ok(AccessLevel::Secret),
            "top secret" | "topsecret" | "очень секретно" => Ok(AccessLevel::TopSecret),
            "most secret" | "mostsecret" | "совершенно секретно" => Ok(AccessLevel::MostSecret),
            _ => Err(UnknownAccessLevel(trimmed.to_string())),
        }
    }
}

/// A stored agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: i64,
    pub codename: String,
    pub contact_number: String,
    pub email: String,
    pub access_level: AccessLevel,
}

impl Agent {
    /// The editable part of this agent, e.g. to prefill an edit form.
    pub fn fields(&self) -> AgentFields {
        AgentFields {
            codename: self.codename.clone(),
            contact_number: self.contact_number.clone(),
            email: self.email.clone(),
            access_level: self.access_level,
        }
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Agent {}, contact number: {}, email: {}, access level: {}>",
            self.codename, self.contact_number, self.email, self.access_level
        )
    }
}

/// The full set of writable fields. Create and update always take all four.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentFields {
    pub codename: String,
    pub contact_number: String,
    pub email: String,
    #[serde(default)]
    pub access_level: AccessLevel,
}

impl AgentFields {
    pub fn new(
        codename: impl Into<String>,
        contact_number: impl Into<String>,
        email: impl Into<String>,
        access_level: AccessLevel,
    ) -> Self {
        Self {
            codename: codename.into(),
            contact_number: contact_number.into(),
            email: email.into(),
            access_level,
        }
    }

    /// Check every text field is non-blank and within its column limit.
    ///
    /// Values are checked trimmed but stored as given.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::default();
        check_text(&mut errors, "codename", &self.codename, MAX_CODENAME_LEN);
        check_text(
            &mut errors,
            "contact_number",
            &self.contact_number,
            MAX_CONTACT_NUMBER_LEN,
        );
        check_text(&mut errors, "email", &self.email, MAX_EMAIL_LEN);
        errors.into_result()
    }
}

fn check_text(errors: &mut ValidationError, field: &'static str, value: &str, max: usize) {
    if value.trim().is_empty() {
        errors.push(field, FieldIssue::Blank);
    } else if value.chars().count() > max {
        errors.push(field, FieldIssue::TooLong { max });
    }
}

/// Raw, string-typed input as submitted by a client.
///
/// Kept verbatim so a rejected submission can be handed back for correction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentForm {
    #[serde(default)]
    pub codename: String,
    #[serde(default)]
    pub contact_number: String,
    #[serde(default)]
    pub email: String,
    /// Left out entirely means the lowest level; present but blank is an error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_level: Option<String>,
}

impl AgentForm {
    /// Prefill a form from an existing record.
    pub fn from_agent(agent: &Agent) -> Self {
        Self {
            codename: agent.codename.clone(),
            contact_number: agent.contact_number.clone(),
            email: agent.email.clone(),
            access_level: Some(agent.access_level.as_str().to_string()),
        }
    }

    /// Convert to typed fields, collecting every problem at once.
    pub fn to_fields(&self) -> Result<AgentFields, ValidationError> {
        let mut errors = ValidationError::default();

        let access_level = match self.access_level.as_deref() {
            None => AccessLevel::default(),
            Some(raw) if raw.trim().is_empty() => {
                errors.push("access_level", FieldIssue::Blank);
                AccessLevel::default()
            }
            Some(raw) => match raw.parse::<AccessLevel>() {
                Ok(level) => level,
                Err(UnknownAccessLevel(value)) => {
                    errors.push("access_level", FieldIssue::UnknownAccessLevel { value });
                    AccessLevel::default()
                }
            },
        };

        let fields = AgentFields {
            codename: self.codename.clone(),
            contact_number: self.contact_number.clone(),
            email: self.email.clone(),
            access_level,
        };

        if let Err(text_errors) = fields.validate() {
            errors.extend(text_errors);
        }
        errors.into_result().map(|()| fields)
    }
}

/// Optional constraints for listing agents. Absent constraints match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentFilter {
    /// Case-insensitive literal substring of the codename.
    pub codename: Option<String>,
    pub access_level: Option<AccessLevel>,
}

impl AgentFilter {
    pub fn codename(mut self, substring: impl Into<String>) -> Self {
        self.codename = Some(substring.into());
        self
    }

    pub fn access_level(mut self, level: AccessLevel) -> Self {
        self.access_level = Some(level);
        self
    }

    /// The codename substring to match, if it constrains anything.
    pub(crate) fn codename_needle(&self) -> Option<&str> {
        self.codename
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(codename: &str, contact: &str, email: &str, level: Option<&str>) -> AgentForm {
        AgentForm {
            codename: codename.to_string(),
            contact_number: contact.to_string(),
            email: email.to_string(),
            access_level: level.map(str::to_string),
        }
    }

    #[test]
    fn test_access_level_parse_canonical_and_localized() {
        assert_eq!("Secret".parse::<AccessLevel>().unwrap(), AccessLevel::Secret);
        assert_eq!("top secret".parse::<AccessLevel>().unwrap(), AccessLevel::TopSecret);
        assert_eq!("most_secret".parse::<AccessLevel>().unwrap(), AccessLevel::MostSecret);
        assert_eq!("Очень секретно".parse::<AccessLevel>().unwrap(), AccessLevel::TopSecret);
        assert_eq!(
            "Совершенно секретно".parse::<AccessLevel>().unwrap(),
            AccessLevel::MostSecret
        );
        assert_eq!(
            "classified".parse::<AccessLevel>(),
            Err(UnknownAccessLevel("classified".to_string()))
        );
    }

    #[test]
    fn test_access_level_order_and_default() {
        assert_eq!(AccessLevel::default(), AccessLevel::Secret);
        assert!(AccessLevel::Secret < AccessLevel::TopSecret);
        assert!(AccessLevel::TopSecret < AccessLevel::MostSecret);
        for level in AccessLevel::ALL {
            assert_eq!(level.as_str().parse::<AccessLevel>().unwrap(), level);
            assert_eq!(level.localized_label().parse::<AccessLevel>().unwrap(), level);
        }
    }

    #[test]
    fn test_access_level_serde_labels() {
        let json = serde_json::to_string(&AccessLevel::TopSecret).unwrap();
        assert_eq!(json, "\"Top Secret\"");
        let level: AccessLevel = serde_json::from_str("\"Секретно\"").unwrap();
        assert_eq!(level, AccessLevel::Secret);
    }

    #[test]
    fn test_fields_validate_blank() {
        let fields = AgentFields::new("  ", "555-0100", "\t", AccessLevel::Secret);
        let err = fields.validate().unwrap_err();
        assert_eq!(err.field_names(), vec!["codename", "email"]);
    }

    #[test]
    fn test_fields_validate_too_long() {
        let fields = AgentFields::new("Shadow Fox", "5".repeat(33), "a@x.com", AccessLevel::Secret);
        let err = fields.validate().unwrap_err();
        assert_eq!(err.field_names(), vec!["contact_number"]);
        assert!(err.to_string().contains("32"));
    }

    #[test]
    fn test_form_missing_level_defaults_to_secret() {
        let fields = form("Shadow Fox", "555-0100", "a@x.com", None).to_fields().unwrap();
        assert_eq!(fields.access_level, AccessLevel::Secret);
    }

    #[test]
    fn test_form_collects_every_problem() {
        let err = form("", "555-0100", " ", Some("Ultra")).to_fields().unwrap_err();
        assert_eq!(err.field_names(), vec!["access_level", "codename", "email"]);
    }

    #[test]
    fn test_form_blank_level_rejected() {
        let err = form("Shadow Fox", "555-0100", "a@x.com", Some("  ")).to_fields().unwrap_err();
        assert_eq!(err.field_names(), vec!["access_level"]);
    }

    #[test]
    fn test_form_keeps_values_untrimmed() {
        let fields = form(" Shadow Fox ", "555-0100", "a@x.com", Some("Top Secret"))
            .to_fields()
            .unwrap();
        assert_eq!(fields.codename, " Shadow Fox ");
        assert_eq!(fields.access_level, AccessLevel::TopSecret);
    }

    #[test]
    fn test_filter_blank_codename_is_unconstrained() {
        assert_eq!(AgentFilter::default().codename("   ").codename_needle(), None);
        assert_eq!(AgentFilter::default().codename(" fox ").codename_needle(), Some("fox"));
    }

    #[test]
    fn test_agent_display() {
        let agent = Agent {
            id: 1,
            codename: "Iron Raven".to_string(),
            contact_number: "555-0101".to_string(),
            email: "raven@x.com".to_string(),
            access_level: AccessLevel::MostSecret,
        };
        assert_eq!(
            agent.to_string(),
            "<Agent Iron Raven, contact number: 555-0101, email: raven@x.com, access level: Most Secret>"
        );
        assert_eq!(AgentForm::from_agent(&agent).to_fields().unwrap(), agent.fields());
    }
}

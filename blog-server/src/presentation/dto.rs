use std::collections::BTreeMap;

use lettre::message::Mailbox;
use serde::{Deserialize, Deserializer};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::application::share_service::Recommendation;

/// Trims form input; blank values count as missing.
fn non_blank<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// Rejects addresses the mail transport would refuse (`.bob@example.com`,
/// `bob..x@example.com`), which the plain email check lets through.
fn deliverable_address(address: &str) -> Result<(), ValidationError> {
    address.parse::<Mailbox>().map(|_| ()).map_err(|_| {
        ValidationError::new("email").with_message("Enter a valid email address.".into())
    })
}

// ======================= QUERIES =======================

#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    pub page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

// ======================= FORMS =======================

#[derive(Debug, Default, Clone, Deserialize, Validate)]
pub struct CommentForm {
    #[serde(default, deserialize_with = "non_blank")]
    #[validate(
        required(message = "This field is required."),
        length(max = 80, message = "Ensure this value has at most 80 characters.")
    )]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "non_blank")]
    #[validate(
        required(message = "This field is required."),
        email(message = "Enter a valid email address.")
    )]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "non_blank")]
    #[validate(required(message = "This field is required."))]
    pub body: Option<String>,
}

impl CommentForm {
    /// Name, email and body; only meaningful once the form validated.
    pub fn into_parts(self) -> (String, String, String) {
        (
            self.name.unwrap_or_default(),
            self.email.unwrap_or_default(),
            self.body.unwrap_or_default(),
        )
    }
}

#[derive(Debug, Default, Clone, Deserialize, Validate)]
pub struct EmailPostForm {
    #[serde(default, deserialize_with = "non_blank")]
    #[validate(
        required(message = "This field is required."),
        length(max = 25, message = "Ensure this value has at most 25 characters.")
    )]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "non_blank")]
    #[validate(
        required(message = "This field is required."),
        email(message = "Enter a valid email address."),
        custom(function = "deliverable_address")
    )]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "non_blank")]
    #[validate(
        required(message = "This field is required."),
        email(message = "Enter a valid email address."),
        custom(function = "deliverable_address")
    )]
    pub to: Option<String>,
    #[serde(default, deserialize_with = "non_blank")]
    pub comments: Option<String>,
}

impl EmailPostForm {
    /// Only meaningful once the form validated.
    pub fn recommendation(&self) -> Recommendation {
        Recommendation {
            name: self.name.clone().unwrap_or_default(),
            email: self.email.clone().unwrap_or_default(),
            to: self.to.clone().unwrap_or_default(),
            comments: self.comments.clone().unwrap_or_default(),
        }
    }
}

// ======================= ERRORS =======================

/// Field-level messages shown next to the inputs, plus an optional
/// message for the form as a whole.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<String, String>,
    general: Option<String>,
}

impl FormErrors {
    pub fn general(message: impl Into<String>) -> Self {
        Self {
            fields: BTreeMap::new(),
            general: Some(message.into()),
        }
    }

    pub fn for_field(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            fields: BTreeMap::from([(name.into(), message.into())]),
            general: None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn general_message(&self) -> Option<&str> {
        self.general.as_deref()
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .filter_map(|(field, errs)| {
                let first = errs.first()?;
                let message = first
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| first.code.to_string());
                Some((field.to_string(), message))
            })
            .collect();
        Self {
            fields,
            general: None,
        }
    }
}

pub fn validate_form<T: Validate>(form: &T) -> Result<(), FormErrors> {
    form.validate().map_err(FormErrors::from)
}

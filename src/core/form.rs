//! Create-form fields and their `application/x-www-form-urlencoded` body.

use url::form_urlencoded;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// One form control.  Controls without a name are not submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: Option<String>,
    pub value: String,
}

impl FormField {
    pub fn named(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            value: value.into(),
        }
    }

    /// Parse a `NAME=VALUE` command-line argument.  One without `=` yields a
    /// field with an empty value.
    pub fn from_arg(arg: &str) -> Self {
        match arg.split_once('=') {
            Some((name, value)) => Self::named(name.trim(), value),
            None => Self::named(arg.trim(), ""),
        }
    }
}

/// Serialise every named field as `&name=value`, in form order.
///
/// The leading `&` on the first pair is kept; form decoders treat the empty
/// leading segment as nothing.
pub fn encode_form_body(fields: &[FormField]) -> String {
    let mut body = String::new();
    for field in fields {
        let Some(name) = field.name.as_deref().filter(|n| !n.is_empty()) else {
            continue;
        };
        body.push('&');
        body.extend(form_urlencoded::byte_serialize(name.as_bytes()));
        body.push('=');
        body.extend(form_urlencoded::byte_serialize(field.value.as_bytes()));
    }
    body
}

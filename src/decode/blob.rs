use std::fmt;

use bytes::Bytes;

/// Binary payload returned by a data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    data: Bytes,
    content_type: Option<String>,
}

impl Blob {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            content_type: None,
        }
    }

    /// Attaches the content type declared by the transport.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Self-contained displayable value (`data:<mime>;base64,<body>`).
///
/// The empty value stands for "nothing to display".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DataUrl(String);

impl DataUrl {
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub(crate) fn from_parts(mime: &str, base64_body: &str) -> Self {
        Self(format!("data:{mime};base64,{base64_body}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the MIME type of a non-empty URL.
    pub fn mime(&self) -> Option<&str> {
        let rest = self.0.strip_prefix("data:")?;
        rest.split(';').next().filter(|m| !m.is_empty())
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DataUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A plain error carrying nothing but its message.
///
/// This is what string contexts turn into: `wrap!(cause, "..")` and
/// [`WrapErr::wrap_msg`](crate::WrapErr::wrap_msg) both produce a `Message`
/// for the new link. The text is stored verbatim.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct Message {
    message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.message
    }
}

impl From<&str> for Message {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for Message {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

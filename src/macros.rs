/// Wrap an optional cause with a message built from a template.
///
/// Mirrors [`wrap`](crate::wrap) but takes the context as a format string
/// and positional arguments:
///
/// ```
/// use errwrap::{Message, wrap};
///
/// let leaf = Message::new("disk full");
/// let chain = wrap!(Some(leaf), "save failed: {}", "config.yml").unwrap();
/// assert_eq!(chain.to_string(), "save failed: config.yml <-- disk full");
/// ```
///
/// With no arguments the literal is the message as written; braces are not
/// interpreted and inline captures are not expanded:
///
/// ```
/// use errwrap::{Message, wrap};
///
/// let chain = wrap!(Some(Message::new("x")), "100% {failed}").unwrap();
/// assert_eq!(chain.err().to_string(), "100% {failed}");
/// ```
///
/// Any other expression is taken as an already-built context error.
#[macro_export]
macro_rules! wrap {
    ($cause:expr, $message:literal $(,)?) => {
        $crate::wrap($cause, $crate::Message::new($message))
    };
    ($cause:expr, $fmt:literal, $($arg:tt)+) => {
        $crate::wrap($cause, $crate::Message::new(::std::format!($fmt, $($arg)+)))
    };
    ($cause:expr, $context:expr $(,)?) => {
        $crate::wrap($cause, $context)
    };
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use std::io;

    use crate::error::Message;

    #[test]
    fn literal_without_args_is_verbatim() {
        let chain = wrap!(Some(Message::new("leaf")), "100% failed").unwrap();
        assert_eq!(chain.err().to_string(), "100% failed");

        let chain = wrap!(Some(Message::new("leaf")), "{0} {name}").unwrap();
        assert_eq!(chain.err().to_string(), "{0} {name}");
    }

    #[test]
    fn template_is_formatted_with_args() {
        let port = 8080;
        let refused = io::Error::other("refused");
        let chain = wrap!(Some(refused), "connect {}:{}", "localhost", port).unwrap();
        assert_eq!(chain.to_string(), "connect localhost:8080 <-- refused");
    }

    #[test]
    fn expression_context_is_used_as_is() {
        let chain = wrap!(Some(Message::new("leaf")), io::Error::other("ctx")).unwrap();
        assert!(chain.find::<io::Error>().is_some());
        assert_eq!(chain.to_string(), "ctx <-- leaf");
    }

    #[test]
    fn absent_cause_stays_absent() {
        assert!(wrap!(None::<Message>, "context").is_none());
        assert!(wrap!(None::<Message>, "context {}", 1).is_none());
    }
}

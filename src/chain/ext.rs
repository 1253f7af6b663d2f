use std::error::Error;

use crate::chain::{Chain, IntoChain};
use crate::error::Message;

/// Attach context to the error side of a `Result`.
///
/// The error is promoted with [`IntoChain`], so a `Result<_, Chain>` grows by
/// exactly one link per call.
pub trait WrapErr<T> {
    fn wrap_err<C>(self, context: C) -> Result<T, Chain>
    where
        C: Error + Send + Sync + 'static;

    /// Like [`wrap_err`](Self::wrap_err), building the context only on error.
    fn wrap_err_with<C, F>(self, context: F) -> Result<T, Chain>
    where
        C: Error + Send + Sync + 'static,
        F: FnOnce() -> C;

    fn wrap_msg(self, message: impl Into<String>) -> Result<T, Chain>;
}

impl<T, E> WrapErr<T> for Result<T, E>
where
    E: IntoChain,
{
    fn wrap_err<C>(self, context: C) -> Result<T, Chain>
    where
        C: Error + Send + Sync + 'static,
    {
        self.map_err(|cause| cause.into_chain().wrap(context))
    }

    fn wrap_err_with<C, F>(self, context: F) -> Result<T, Chain>
    where
        C: Error + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|cause| cause.into_chain().wrap(context()))
    }

    fn wrap_msg(self, message: impl Into<String>) -> Result<T, Chain> {
        self.map_err(|cause| cause.into_chain().wrap(Message::new(message)))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use std::io;

    use super::WrapErr;
    use crate::error::Message;

    fn read_config() -> Result<String, io::Error> {
        Err(io::Error::other("disk full"))
    }

    #[test]
    fn ok_passes_through_untouched() {
        let res: Result<u8, io::Error> = Ok(7);
        let mut called = false;
        let wrapped = res.wrap_err_with(|| {
            called = true;
            Message::new("never")
        });
        assert_eq!(wrapped.unwrap(), 7);
        assert!(!called);
    }

    #[test]
    fn err_gains_one_link_per_call() {
        let err = read_config()
            .wrap_msg("load failed")
            .wrap_err(Message::new("startup failed"))
            .unwrap_err();

        assert_eq!(err.depth(), 3);
        assert_eq!(err.to_string(), "startup failed <-- load failed <-- disk full");
        assert!(err.find::<io::Error>().is_some());
    }

    #[test]
    fn chain_propagates_as_plain_error() {
        fn outer() -> Result<String, Box<dyn std::error::Error>> {
            Ok(read_config().wrap_msg("load failed")?)
        }

        let err = outer().unwrap_err();
        assert_eq!(err.to_string(), "load failed <-- disk full");
        assert!(crate::wrapped(err.as_ref()));
    }
}

#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::dbg_macro,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::panic,
    )
)]

#[macro_use]
mod macros;

pub mod chain;
pub mod error;
pub mod types;

pub use chain::ext::WrapErr;
pub use chain::{Chain, IntoChain, Links, wrap, wrap_boxed, wrapped};
pub use error::Message;
pub use types::{AnyError, BoxError, BoxedError, ErrorType, SharedError, peel, type_of};

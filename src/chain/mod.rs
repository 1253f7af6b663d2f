pub mod ext;

use std::any::Any;
use std::error::Error;
use std::fmt;
use std::iter::FusedIterator;
use std::sync::Arc;

use crate::types::{
    AnyError, BoxError, BoxedError, ErrorType, SharedError, downcast_link, peel, share, share_arc,
    type_of,
};

const SEPARATOR: &str = " <-- ";

/// One link of a causal error history.
///
/// `err` is the error at this link and `prev` the next-older link it wraps.
/// Nodes own their `prev` exclusively and never change after construction,
/// so a chain is always finite and ends at a root with no `prev`.
pub struct Chain {
    err: SharedError,
    prev: Option<Box<Chain>>,
    depth: usize,
}

impl Chain {
    /// A single-link chain rooted at `err`.
    ///
    /// `err` is stored as a leaf even if it is itself a `Chain`; use
    /// [`IntoChain`] to promote without double-boxing.
    pub fn new<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self::leaf(share(err))
    }

    fn leaf(err: SharedError) -> Self {
        Self {
            err,
            prev: None,
            depth: 1,
        }
    }

    /// Promote an erased error without double-boxing: a boxed `Chain` is
    /// taken back as is, any other error becomes a [`BoxedError`] root.
    pub fn from_boxed(err: BoxError) -> Self {
        match err.downcast::<Chain>() {
            Ok(chain) => *chain,
            Err(err) => match err.downcast::<SharedError>() {
                Ok(shared) => Self::leaf(*shared),
                Err(err) => Self::new(BoxedError::from(err)),
            },
        }
    }

    /// Add `context` as the newest link on top of `self`.
    pub fn wrap<E>(self, context: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        let depth = self.depth + 1;
        let chain = Self {
            err: share(context),
            prev: Some(Box::new(self)),
            depth,
        };
        tracing::trace!(depth, context = %chain.err, "wrapped error");
        chain
    }

    /// Error at this link, the newest one of the chain starting here.
    pub fn err(&self) -> &SharedError {
        &self.err
    }

    /// Root cause: the error of the oldest link.
    pub fn first(&self) -> &SharedError {
        let mut node = self;
        while let Some(prev) = node.prev.as_deref() {
            node = prev;
        }
        &node.err
    }

    pub fn prev(&self) -> Option<&Chain> {
        self.prev.as_deref()
    }

    /// Give up the newest link and return what it wrapped.
    pub fn into_prev(mut self) -> Option<Chain> {
        self.prev.take().map(|prev| *prev)
    }

    /// Link errors from newest to oldest.
    pub fn iter(&self) -> Links<'_> {
        Links { next: Some(self) }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Every link's error, newest first.
    pub fn list(&self) -> Vec<SharedError> {
        self.iter().cloned().collect()
    }

    /// Visit link errors newest to oldest. The first `Err` returned by `f`
    /// stops the walk and is handed back.
    pub fn each<B, F>(&self, f: F) -> Result<(), B>
    where
        F: FnMut(&SharedError) -> Result<(), B>,
    {
        self.iter().try_for_each(f)
    }

    /// Like [`each`](Self::each), also passing the concrete type of every
    /// link's error so callers can dispatch on error kind.
    pub fn each_type<B, F>(&self, mut f: F) -> Result<(), B>
    where
        F: FnMut(ErrorType, &SharedError) -> Result<(), B>,
    {
        self.iter().try_for_each(|err| f(type_of(&**err), err))
    }

    /// Whether `target` is the very same error object as one of the links.
    ///
    /// Identity is by address after stripping [`SharedError`] boxes; two
    /// distinct errors with equal messages do not match.
    pub fn is(&self, target: &dyn AnyError) -> bool {
        let target = peel(target) as *const dyn AnyError;
        self.iter()
            .any(|err| std::ptr::addr_eq(peel(&**err) as *const dyn AnyError, target))
    }

    /// Newest link whose concrete error type is `T`, including errors kept
    /// in a [`BoxedError`].
    pub fn find<T>(&self) -> Option<&T>
    where
        T: Error + 'static,
    {
        self.iter().find_map(|err| downcast_link::<T>(&**err))
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(SEPARATOR)?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

// `Display` already renders every link, so no `source` is reported.
impl Error for Chain {}

impl Drop for Chain {
    fn drop(&mut self) {
        let mut prev = self.prev.take();
        while let Some(mut node) = prev {
            prev = node.prev.take();
        }
    }
}

impl From<BoxError> for Chain {
    fn from(err: BoxError) -> Self {
        Self::from_boxed(err)
    }
}

impl<'a> IntoIterator for &'a Chain {
    type Item = &'a SharedError;
    type IntoIter = Links<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a chain's link errors, newest to oldest.
#[derive(Clone)]
pub struct Links<'a> {
    next: Option<&'a Chain>,
}

impl<'a> Iterator for Links<'a> {
    type Item = &'a SharedError;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.prev.as_deref();
        Some(&node.err)
    }
}

impl FusedIterator for Links<'_> {}

/// Conversion into a chain that never double-boxes: a [`Chain`] is taken as
/// is, any other error becomes the root of a new single-link chain.
pub trait IntoChain {
    fn into_chain(self) -> Chain;
}

impl<E> IntoChain for E
where
    E: Error + Send + Sync + 'static,
{
    fn into_chain(self) -> Chain {
        let err = Arc::new(self);
        let any: Arc<dyn Any + Send + Sync> = Arc::<E>::clone(&err);
        match any.downcast::<Chain>() {
            Ok(chain) => {
                drop(err);
                Arc::try_unwrap(chain).unwrap_or_else(|chain| Chain::leaf(chain))
            }
            Err(_) => {
                tracing::trace!(
                    error_type = %ErrorType::of::<E>(),
                    "promoted leaf error to chain root"
                );
                Chain::leaf(share_arc(err))
            }
        }
    }
}

/// Wrap `cause` with `context` as the new newest link.
///
/// An absent cause yields `None`, so fallible results can be wrapped without
/// branching first:
///
/// ```
/// use errwrap::{Message, wrap};
///
/// let res: Result<(), std::io::Error> = Ok(());
/// assert!(wrap(res.err(), Message::new("read failed")).is_none());
/// ```
pub fn wrap<C, E>(cause: Option<C>, context: E) -> Option<Chain>
where
    C: IntoChain,
    E: Error + Send + Sync + 'static,
{
    let Some(cause) = cause else {
        tracing::trace!("no cause to wrap");
        return None;
    };
    Some(cause.into_chain().wrap(context))
}

/// [`wrap`] for a cause that went through `Box<dyn Error + Send + Sync>`.
///
/// A chain that was propagated through the box is extended, not re-rooted.
pub fn wrap_boxed<E>(cause: Option<BoxError>, context: E) -> Option<Chain>
where
    E: Error + Send + Sync + 'static,
{
    wrap(cause.map(Chain::from_boxed), context)
}

/// Whether `err` is already a chain node rather than a plain leaf error.
pub fn wrapped(err: &(dyn Error + 'static)) -> bool {
    err.is::<Chain>()
}

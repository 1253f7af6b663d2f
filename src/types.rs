use std::any::{Any, TypeId};
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// An error as stored in a chain link.
///
/// Links hold their error behind an `Arc` so callers can keep a handle to a
/// specific error and later ask [`Chain::is`](crate::Chain::is) whether that
/// same object is part of a chain.
pub type SharedError = Arc<dyn AnyError>;

/// Object-safe view of any thread-safe `'static` error.
///
/// Blanket-implemented for every `Error + Send + Sync + 'static` type, so the
/// concrete type's identity travels in the vtable and survives erasure into
/// [`SharedError`].
pub trait AnyError: Error + Send + Sync + 'static {
    /// Type of the value this vtable was built for. For a [`SharedError`]
    /// this is the `Arc` itself; use [`type_of`] to see through it.
    fn error_type(&self) -> ErrorType;

    fn as_any(&self) -> &dyn Any;
}

impl<E> AnyError for E
where
    E: Error + Send + Sync + 'static,
{
    fn error_type(&self) -> ErrorType {
        ErrorType::of::<E>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Concrete type descriptor of an error link.
///
/// Equality is by `TypeId`; the name is for display only and follows
/// [`std::any::type_name`], so it is not guaranteed stable across compilers.
#[derive(Debug, Clone, Copy)]
pub struct ErrorType {
    id: TypeId,
    name: &'static str,
}

impl ErrorType {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ErrorType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ErrorType {}

impl std::hash::Hash for ErrorType {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A type-erased error as produced by `?` into `Box<dyn Error + Send + Sync>`.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Leaf holding a [`BoxError`] whose concrete type is no longer known.
///
/// [`type_of`] reports `BoxedError` for such a link, while
/// [`Chain::find`](crate::Chain::find) still downcasts through it.
pub struct BoxedError(BoxError);

impl BoxedError {
    pub fn inner(&self) -> &(dyn Error + Send + Sync + 'static) {
        &*self.0
    }

    pub fn into_inner(self) -> BoxError {
        self.0
    }
}

impl From<BoxError> for BoxedError {
    fn from(err: BoxError) -> Self {
        Self(err)
    }
}

impl fmt::Debug for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Error for BoxedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.0.source()
    }
}

/// Strip every [`SharedError`] box around `err` and return the innermost error.
pub fn peel(mut err: &dyn AnyError) -> &dyn AnyError {
    while let Some(shared) = err.as_any().downcast_ref::<SharedError>() {
        err = &**shared;
    }
    err
}

/// Concrete underlying type of `err`.
///
/// References are already gone by the time a value reaches `&dyn AnyError`,
/// and any number of nested [`SharedError`] boxes are stripped here. Other
/// smart pointers are reported as themselves: a link built from
/// `Box<io::Error>` or `Arc<io::Error>` has that wrapper as its type, since a
/// generic `Box<T>` cannot be looked through on stable Rust. Erased
/// [`BoxError`]s are reported as [`BoxedError`].
pub fn type_of(err: &dyn AnyError) -> ErrorType {
    peel(err).error_type()
}

/// Downcast `err` to `T`, looking through [`SharedError`] boxes and into
/// [`BoxedError`] leaves.
pub(crate) fn downcast_link<T>(err: &dyn AnyError) -> Option<&T>
where
    T: Error + 'static,
{
    let err = peel(err).as_any();
    err.downcast_ref::<T>().or_else(|| {
        err.downcast_ref::<BoxedError>()
            .and_then(|boxed| boxed.inner().downcast_ref::<T>())
    })
}

/// Move `err` into a [`SharedError`].
pub(crate) fn share<E>(err: E) -> SharedError
where
    E: Error + Send + Sync + 'static,
{
    share_arc(Arc::new(err))
}

/// Erase `err`, reusing the inner allocation when `E` already is a
/// [`SharedError`] so its identity is kept.
pub(crate) fn share_arc<E>(err: Arc<E>) -> SharedError
where
    E: Error + Send + Sync + 'static,
{
    let any: Arc<dyn Any + Send + Sync> = Arc::<E>::clone(&err);
    match any.downcast::<SharedError>() {
        Ok(outer) => {
            drop(err);
            Arc::try_unwrap(outer).unwrap_or_else(|outer| outer as SharedError)
        }
        Err(_) => err,
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Arc;

    use super::{
        AnyError, BoxError, BoxedError, ErrorType, SharedError, downcast_link, peel, share, type_of,
    };
    use crate::error::Message;

    #[test]
    fn error_type_compares_by_type_only() {
        assert_eq!(ErrorType::of::<Message>(), ErrorType::of::<Message>());
        assert_ne!(ErrorType::of::<Message>(), ErrorType::of::<io::Error>());
        assert!(ErrorType::of::<io::Error>().is::<io::Error>());
        assert!(!ErrorType::of::<io::Error>().is::<Message>());
        assert!(ErrorType::of::<Message>().to_string().ends_with("Message"));
    }

    #[test]
    fn type_of_sees_through_shared_boxes() {
        let inner: SharedError = Arc::new(io::Error::other("disk full"));
        let outer: SharedError = Arc::new(Arc::clone(&inner));

        assert!(inner.error_type().is::<SharedError>());
        assert!(type_of(&inner).is::<io::Error>());
        assert!(type_of(&outer).is::<io::Error>());
        assert!(type_of(&Message::new("x")).is::<Message>());
    }

    #[test]
    fn peel_reaches_the_same_object() {
        let leaf: SharedError = Arc::new(Message::new("disk full"));
        let wrapped: SharedError = Arc::new(Arc::clone(&leaf));
        assert!(std::ptr::addr_eq(
            peel(&wrapped) as *const dyn AnyError,
            &*leaf as *const dyn AnyError
        ));
    }

    #[test]
    fn share_reuses_existing_allocation() {
        let leaf: SharedError = Arc::new(Message::new("disk full"));
        let again = share(Arc::clone(&leaf));
        assert!(Arc::ptr_eq(&leaf, &again));

        let fresh = share(Message::new("disk full"));
        assert!(!Arc::ptr_eq(&leaf, &fresh));
        assert!(type_of(&fresh).is::<Message>());
    }

    #[test]
    fn smart_pointer_links_report_the_pointer_type() {
        let boxed = Box::new(io::Error::other("x"));
        assert!(type_of(&boxed).is::<Box<io::Error>>());

        let arc = Arc::new(io::Error::other("x"));
        assert!(type_of(&arc).is::<Arc<io::Error>>());
    }

    #[test]
    fn boxed_leaf_is_downcast_through() {
        let erased: BoxError = Box::new(io::Error::new(io::ErrorKind::NotFound, "missing"));
        let leaf = share(BoxedError::from(erased));

        assert!(type_of(&leaf).is::<BoxedError>());
        assert_eq!(leaf.to_string(), "missing");
        assert_eq!(
            downcast_link::<io::Error>(&*leaf).map(io::Error::kind),
            Some(io::ErrorKind::NotFound)
        );
        assert!(downcast_link::<Message>(&*leaf).is_none());
    }
}

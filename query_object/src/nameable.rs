//! Table name resolution
//!
//! Anything that can name a table: string literals, owned strings, or a
//! domain descriptor such as a model type. Names are resolved once, when a
//! node or condition is constructed.

use std::borrow::Cow;

/// A value that resolves to a table name.
///
/// ```
/// use query_object::Nameable;
/// use std::borrow::Cow;
///
/// struct Issue;
///
/// impl Nameable for Issue {
///     fn table_name(&self) -> Cow<'_, str> {
///         Cow::Borrowed("issue")
///     }
/// }
///
/// assert_eq!(Issue.table_name(), "issue");
/// assert_eq!("issue".table_name(), "issue");
/// ```
pub trait Nameable {
    fn table_name(&self) -> Cow<'_, str>;
}

impl Nameable for str {
    fn table_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl Nameable for String {
    fn table_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

impl<T: Nameable + ?Sized> Nameable for &T {
    fn table_name(&self) -> Cow<'_, str> {
        (**self).table_name()
    }
}

impl<T: Nameable + ?Sized> Nameable for Box<T> {
    fn table_name(&self) -> Cow<'_, str> {
        (**self).table_name()
    }
}

/// Resolve a table name into an owned string.
pub(crate) fn resolve(table: &(impl Nameable + ?Sized)) -> String {
    table.table_name().into_owned()
}

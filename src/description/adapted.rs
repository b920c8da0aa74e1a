use core::fmt;

use super::Description;

/// A description for a value that does not describe itself.
///
/// The value renders as `[TypeName] value`, where `TypeName` is the value's
/// [`type_name`](core::any::type_name) with all module paths removed and
/// `value` is its [`Display`](fmt::Display) output.
///
/// Equality and hashing delegate to the wrapped value.
///
/// # Examples
///
/// ```
/// use pannkaka::description::Adapted;
///
/// assert_eq!(Adapted::new(10).to_string(), "[i32] 10");
/// assert_eq!(Adapted::new(String::from("id")).to_string(), "[String] id");
/// assert_eq!(Adapted::new(10), Adapted::new(10));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Adapted<T> {
    value: T,
}

impl<T> Adapted<T> {
    /// Wraps `value`.
    pub const fn new(value: T) -> Self {
        Self { value }
    }

    /// Returns a reference to the wrapped value.
    pub const fn inner(&self) -> &T {
        &self.value
    }

    /// Unwraps the value.
    pub fn into_inner(self) -> T {
        self.value
    }

    /// Returns the type name used in the rendered text.
    ///
    /// ```
    /// use pannkaka::description::Adapted;
    ///
    /// assert_eq!(Adapted::new(vec![String::new()]).type_name(), "Vec<String>");
    /// ```
    pub fn type_name(&self) -> String {
        short_type_name(core::any::type_name::<T>())
    }
}

impl<T: fmt::Display> fmt::Display for Adapted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.type_name(), self.value)
    }
}

impl<T> Description for Adapted<T> where T: fmt::Display + Send + Sync + 'static {}

impl<T> From<T> for Adapted<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

/// Strips the module path from every path segment of `full`, keeping generic
/// arguments, references and tuples intact.
fn short_type_name(full: &str) -> String {
    let mut short = String::with_capacity(full.len());
    let mut segment_start = 0;
    let mut chars = full.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                short.truncate(segment_start);
            }
            '<' | '>' | '(' | ')' | '[' | ']' | ',' | ';' | ' ' | '&' | '*' => {
                short.push(c);
                segment_start = short.len();
            }
            _ => short.push(c),
        }
    }

    short
}

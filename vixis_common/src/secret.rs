use std::fmt;

const REDACTED: &str = "****";

/// Masks configuration values that must never end up in logs or debug output.
///
/// The wrapped value is only reachable through an explicit [`Secret::reveal`] call, which makes
/// accidental leaks easy to spot in review. Both `Debug` and `Display` print a fixed mask.
#[derive(Clone, Default)]
pub struct Secret<T>(T);

impl<T> Secret<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    pub fn reveal(&self) -> &T {
        &self.0
    }

    /// Consumes the wrapper and hands the value back.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

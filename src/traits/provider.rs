use crate::error::BoxError;
use crate::traits::Connection;

/// Supplies live connections on demand.
///
/// Each call hands out a fresh handle that the caller owns until it is
/// dropped. The template never pools or caches what it receives, so any
/// pooling policy lives behind this trait.
pub trait ConnectionProvider: Send + Sync {
    /// Acquire a usable connection or fail.
    fn connection(&self) -> Result<Box<dyn Connection>, BoxError>;
}

use std::{any::Any, error::Error};

use crate::StatusCode;

/// Object-safe extension implemented by every tidemq error, so that a
/// [`StackError`](crate::StackError) can carry any of them and still report a
/// status code or be downcast back.
pub trait ErrorExt: Error + Send + Sync + 'static {
    /// Status code of the error. Defaults to [`StatusCode::Internal`].
    fn status_code(&self) -> StatusCode {
        StatusCode::Internal
    }

    /// Returns the error as [`Any`] so it can be downcast to its concrete type.
    fn as_any(&self) -> &dyn Any;
}

use err_derive::Error;

use crate::menu::Drink;

/// Domain failures. Both are recoverable: callers report them and carry on.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// A required ingredient lacks stock; carries the offending drink so the
    /// caller can report it.
    #[error(display = "out of stock: {}", _0)]
    OutOfStock(Drink),
    /// The reference names no entry in the current menu.
    #[error(display = "invalid selection: {}", _0)]
    InvalidSelectedDrink(String),
}

pub mod ids;
pub mod token;

pub use token::{Claims, TokenCodec, TokenError};

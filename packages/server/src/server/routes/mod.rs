// HTTP routes
pub mod health;
pub mod negotiate;
pub mod questions;

pub use health::*;
pub use negotiate::*;
pub use questions::*;

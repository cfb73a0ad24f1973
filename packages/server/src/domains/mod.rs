// Domain layer
pub mod questions;

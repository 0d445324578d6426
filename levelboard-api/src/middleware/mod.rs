/// Tower middleware for the API server
///
/// Authentication is a `from_fn` layer in [`crate::app`]; this module holds
/// the hand-written layers.

pub mod security;

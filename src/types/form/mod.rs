pub mod comment;
pub mod post;

/// Upper bound for post and comment bodies, so request bodies
/// stay bounded.
pub const TEXT_MAX: usize = 10_000;

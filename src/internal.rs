/// Stops downstream code from implementing marker traits that
/// only make sense inside this crate.
pub trait Sealed {}

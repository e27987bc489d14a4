use std::fmt::{Debug, Display};

use num_traits::Float;

/// A trait for types that can be used for indexed coordinates.
///
/// This trait is sealed and cannot be implemented for external types. Searches rely on an
/// infinite value as the initial pruning bound and on absolute differences for point matching,
/// so only IEEE floats are supported.
pub trait IndexableNum:
    private::Sealed + Float + Debug + Display + Default + Send + Sync + 'static
{
    /// Tolerance used when matching a point's coordinates for removal.
    fn match_epsilon() -> Self;
}

impl IndexableNum for f32 {
    #[inline]
    fn match_epsilon() -> Self {
        1e-6
    }
}

impl IndexableNum for f64 {
    #[inline]
    fn match_epsilon() -> Self {
        1e-6
    }
}

// https://rust-lang.github.io/api-guidelines/future-proofing.html#sealed-traits-protect-against-downstream-implementations-c-sealed
mod private {
    pub trait Sealed {}

    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

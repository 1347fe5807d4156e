use crate::internal::Sealed;

macro_rules! markers {
    { $( $ident:ident, )* } => {$(
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $ident;
        impl Sealed for $ident {}
        impl Marker for $ident {
            const NAME: &'static str = stringify!($ident);
        }
    )*};
}

markers! {
    AnyMarker,
    UserMarker,
    GroupMarker,
    PostMarker,
    CommentMarker,
    FollowMarker,
}

/// Restricts which types may appear as the generic parameter of
/// [`Id`](super::Id).
pub trait Marker: Sealed {
    const NAME: &'static str;
}

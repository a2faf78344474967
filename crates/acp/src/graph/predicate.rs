//! `sign_predicate!`: declare a predicate from its inputs and a sign body.

/// Define a `SignPredicate` struct with one `NodeId` field per input.
///
/// The body sees the graph as `$g` and the predicate as `$s`, and returns
/// `Result<i32, AcpError>` computed from current values only:
///
/// ```
/// use acp::graph::ParameterSource;
/// acp::sign_predicate! {
///     /// Sign of `a - b` on the first parameter.
///     pub struct FirstGreater { a, b }
///     |g, p| g.parameter(p.a, 0).compare(g.parameter(p.b, 0))
/// }
/// ```
///
/// The generated type has a `new` taking the ids in field order and derives
/// `Clone, Copy, Debug, PartialEq, Eq`.
#[macro_export]
macro_rules! sign_predicate {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident { $($field:ident),+ $(,)? }
        |$g:ident, $s:ident| $body:expr
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        $vis struct $name {
            $(pub $field: $crate::graph::NodeId),+
        }

        impl $name {
            #[allow(clippy::too_many_arguments)]
            pub fn new($($field: $crate::graph::NodeId),+) -> Self {
                Self { $($field),+ }
            }
        }

        impl $crate::graph::SignPredicate for $name {
            fn dependencies(&self) -> ::std::vec::Vec<$crate::graph::NodeId> {
                ::std::vec![$(self.$field),+]
            }

            fn sign(
                &self,
                $g: &$crate::graph::DependencyGraph,
            ) -> ::std::result::Result<i32, $crate::AcpError> {
                let $s = self;
                $body
            }
        }
    };
}

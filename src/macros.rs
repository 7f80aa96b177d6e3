//! Macros for declaring state tables.

/// Declare a closed state enum together with its transition table.
///
/// Generates the enum (deriving `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`,
/// `Debug`, `Serialize` and `Deserialize`), a `Display` impl printing the
/// state name, and the [`State`](crate::core::State) impl. States listed
/// with no next states are final. Entry and exit hooks are optional names of
/// functions with the signatures of [`State::on_enter`](crate::core::State::on_enter)
/// and [`State::on_exit`](crate::core::State::on_exit).
///
/// # Example
///
/// ```rust
/// use waybill::core::State;
/// use waybill::state_enum;
///
/// state_enum! {
///     pub enum Ticket {
///         Open,
///         Closed,
///         Spam,
///     }
///     initial: Open
///     transitions: {
///         Open => [Closed, Spam],
///         Closed => [Open],
///         Spam => [],
///     }
///     error: [Spam]
/// }
///
/// assert_eq!(Ticket::initial(), Ticket::Open);
/// assert!(Ticket::Open.can_transition_to(&Ticket::Spam));
/// assert!(Ticket::Spam.is_final());
/// assert!(Ticket::Spam.is_error());
/// assert_eq!(Ticket::Closed.to_string(), "Closed");
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }

        initial: $initial:ident
        transitions: {
            $($from:ident => [$($to:ident),* $(,)?]),* $(,)?
        }
        $(error: [$($error:ident),* $(,)?])?
        $(on_enter: $on_enter:ident)?
        $(on_exit: $on_exit:ident)?
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }

            fn initial() -> Self {
                Self::$initial
            }

            fn all() -> &'static [Self] {
                &[$(Self::$variant),*]
            }

            fn next_states(&self) -> &'static [Self] {
                match self {
                    $(Self::$from => &[$(Self::$to),*],)*
                    #[allow(unreachable_patterns)]
                    _ => &[],
                }
            }

            fn is_error(&self) -> bool {
                match self {
                    $($(Self::$error => true,)*)?
                    #[allow(unreachable_patterns)]
                    _ => false,
                }
            }

            $(
                fn on_enter(
                    &self,
                    metadata: &mut $crate::core::Metadata,
                    event: &$crate::core::TransitionEvent<Self>,
                ) {
                    $on_enter(self, metadata, event)
                }
            )?

            $(
                fn on_exit(&self, metadata: &mut $crate::core::Metadata) {
                    $on_exit(self, metadata)
                }
            )?
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::core::State::name(self))
            }
        }
    };
}

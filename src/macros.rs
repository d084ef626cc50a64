// ABOUTME: Macros that cut the boilerplate of octet flag enumerations and chained config setters
// ABOUTME: Flag enums get their value/mask table and a BinaryFlag implementation from one declaration

/// Declare an enumeration of flags that are matched against an octet.
///
/// Each variant carries the bit pattern it stands for and the mask the
/// pattern is compared under. The generated enum implements
/// [`crate::datatypes::BinaryFlag`], so it can live in a
/// [`crate::datatypes::FlagSet`].
///
/// ```rust,ignore
/// binary_flags! {
///     /// Doc for the enum
///     pub enum DcsFlag {
///         SevenBit = (0b0000_0000, 0b1100_1100),
///     }
/// }
/// ```
macro_rules! binary_flags {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident = ($value:expr, $mask:expr)
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::datatypes::BinaryFlag for $name {
            const ALL: &'static [Self] = &[$($name::$variant),*];

            fn value(self) -> u8 {
                match self {
                    $($name::$variant => $value),*
                }
            }

            fn mask(self) -> u8 {
                match self {
                    $($name::$variant => $mask),*
                }
            }
        }
    };
}

/// Generate chained `with_*` setters for plain config fields.
///
/// For each `setter => field: Type` entry, generates:
/// ```rust,ignore
/// pub fn setter(mut self, field: Type) -> Self {
///     self.field = field;
///     self
/// }
/// ```
macro_rules! builder_setters {
    ($($(#[$meta:meta])* $setter:ident => $field:ident: $type:ty),* $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $setter(mut self, $field: $type) -> Self {
                self.$field = $field;
                self
            }
        )*
    };
}

pub(crate) use {binary_flags, builder_setters};

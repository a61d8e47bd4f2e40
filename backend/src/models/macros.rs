/// Defines one or more identity newtypes over an integer-like scalar
/// (typically `i64`) and generates for each:
/// - derives (Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)
/// - `Display` printing the bare integer
/// - `From<$inner> for $name` and `From<$name> for $inner`
/// - `new` / `value` accessors
///
/// Serialized form is the bare integer, so `RestaurantId(3)` is `3` in JSON.
///
/// Usage:
///   define_id_types!(i64 => RestaurantId, PizzaId);
#[macro_export]
macro_rules! define_id_types {
    ($inner:ty => $($name:ident),+ $(,)?) => {
        $(
            #[derive(
                Debug,
                Copy,
                Clone,
                PartialEq,
                Eq,
                PartialOrd,
                Ord,
                Hash,
                serde::Serialize,
                serde::Deserialize,
            )]
            #[serde(transparent)]
            pub struct $name(pub $inner);

            impl ::std::fmt::Display for $name {
                fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                    ::std::write!(f, "{}", self.0)
                }
            }

            impl ::std::convert::From<$inner> for $name {
                fn from(v: $inner) -> Self {
                    $name(v)
                }
            }

            impl ::std::convert::From<$name> for $inner {
                fn from(v: $name) -> Self {
                    v.0
                }
            }

            impl $name {
                pub fn new(value: $inner) -> Self {
                    $name(value)
                }

                pub fn value(&self) -> $inner {
                    self.0
                }
            }
        )+
    };
}

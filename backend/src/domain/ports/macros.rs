//! Macro generating port error enums with snake_case constructors.
//!
//! Struct-like variants get constructors taking `impl Into<T>` per field.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum KitchenPortError {
            Closed => "kitchen is closed",
            Backlog { orders: u32 } => "kitchen backlog: {orders}",
            Rejected { dish: String, reason: String } => "rejected {dish}: {reason}",
        }
    }

    #[test]
    fn unit_variants_get_snake_case_constructors() {
        assert_eq!(KitchenPortError::closed(), KitchenPortError::Closed);
    }

    #[test]
    fn constructors_preserve_non_string_types() {
        let err = KitchenPortError::backlog(42_u32);
        assert_eq!(err.to_string(), "kitchen backlog: 42");
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = KitchenPortError::rejected("Taco", "sold out");
        assert_eq!(err.to_string(), "rejected Taco: sold out");
    }
}

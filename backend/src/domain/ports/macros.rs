//! `define_port_error!` declares the error enum of a driven port.
//!
//! Every variant carries its message and a failure class:
//!
//! - `transient`: the backing service may recover on its own, so callers
//!   answer `service_unavailable`;
//! - `permanent`: retrying cannot help, so callers answer `internal_error`.
//!
//! ```text
//! define_port_error! {
//!     pub enum TaskRepositoryError {
//!         Connection { message: String } => transient "connection failed: {message}",
//!         Query { message: String } => permanent "query failed: {message}",
//!     }
//! }
//! // TaskRepositoryError::connection("refused").is_transient() == true
//! ```
//!
//! The expansion derives `thiserror::Error`, adds one snake_case constructor
//! per variant (each field accepts `impl Into<FieldType>`) and an
//! `is_transient` classifier.

macro_rules! define_port_error {
    (@class transient) => {
        true
    };
    (@class permanent) => {
        false
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )?
                    => $class:ident $message:literal
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

        ::paste::paste! {
            impl $name {
                $(
                    #[must_use]
                    pub fn [<$variant:snake>]($($($field: impl Into<$ty>),*)?) -> Self {
                        Self::$variant $( { $($field: $field.into()),* } )?
                    }
                )*

                /// True when the backing service may recover without intervention.
                #[must_use]
                pub const fn is_transient(&self) -> bool {
                    match self {
                        $( Self::$variant { .. } => define_port_error!(@class $class), )*
                    }
                }
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    define_port_error! {
        pub enum SamplePortError {
            Unavailable => transient "sample unavailable",
            Query { message: String } => permanent "query failed: {message}",
            Upstream { status: u16, message: String } => transient "upstream {status}: {message}",
        }
    }

    #[rstest]
    #[case(SamplePortError::unavailable(), "sample unavailable", true)]
    #[case(SamplePortError::query("timeout"), "query failed: timeout", false)]
    #[case(
        SamplePortError::upstream(502_u16, "bad gateway"),
        "upstream 502: bad gateway",
        true
    )]
    fn variants_carry_message_and_class(
        #[case] error: SamplePortError,
        #[case] message: &str,
        #[case] transient: bool,
    ) {
        assert_eq!(error.to_string(), message);
        assert_eq!(error.is_transient(), transient);
    }

    #[rstest]
    fn constructors_convert_field_values() {
        assert_eq!(
            SamplePortError::query(String::from("x")),
            SamplePortError::Query {
                message: "x".to_owned()
            }
        );
    }
}

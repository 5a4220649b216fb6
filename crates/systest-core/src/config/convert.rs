//! String to typed value conversion
//!
//! Every type that can be read from a `Config` implements [`FromConfigValue`].
//! Ad-hoc conversions can be supplied per lookup with a [`Converter`].

use std::any::type_name;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Why a raw value could not be converted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert to {target}: {reason}")]
pub struct ConversionError {
    /// Name of the requested type
    pub target: &'static str,
    /// Human-readable cause
    pub reason: String,
}

impl ConversionError {
    pub fn new(target: &'static str, reason: impl Into<String>) -> Self {
        Self {
            target,
            reason: reason.into(),
        }
    }
}

/// Converts a raw configuration string into `T`
pub trait Converter<T>: Send + Sync {
    /// Convert `value`, failing if it is not a valid `T`
    fn convert(&self, value: &str) -> Result<T, ConversionError>;
}

impl<T, F> Converter<T> for F
where
    F: Fn(&str) -> Result<T, ConversionError> + Send + Sync,
{
    fn convert(&self, value: &str) -> Result<T, ConversionError> {
        self(value)
    }
}

/// Types with a built-in converter
pub trait FromConfigValue: Sized {
    fn from_config_value(value: &str) -> Result<Self, ConversionError>;
}

/// Converter that dispatches to a type's built-in conversion
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinConverter;

impl<T: FromConfigValue> Converter<T> for BuiltinConverter {
    fn convert(&self, value: &str) -> Result<T, ConversionError> {
        T::from_config_value(value)
    }
}

impl FromConfigValue for String {
    fn from_config_value(value: &str) -> Result<Self, ConversionError> {
        Ok(value.to_string())
    }
}

impl FromConfigValue for bool {
    fn from_config_value(value: &str) -> Result<Self, ConversionError> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if trimmed.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(ConversionError::new("bool", "expected 'true' or 'false'"))
        }
    }
}

macro_rules! impl_from_config_value_parse {
    ($($t:ty),* $(,)?) => {
        $(
            impl FromConfigValue for $t {
                fn from_config_value(value: &str) -> Result<Self, ConversionError> {
                    value
                        .trim()
                        .parse::<$t>()
                        .map_err(|e| ConversionError::new(type_name::<$t>(), e.to_string()))
                }
            }
        )*
    };
}

impl_from_config_value_parse!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl FromConfigValue for char {
    fn from_config_value(value: &str) -> Result<Self, ConversionError> {
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(ConversionError::new("char", "expected exactly one character")),
        }
    }
}

impl FromConfigValue for PathBuf {
    fn from_config_value(value: &str) -> Result<Self, ConversionError> {
        if value.is_empty() {
            return Err(ConversionError::new("PathBuf", "path must not be empty"));
        }
        Ok(PathBuf::from(value))
    }
}

/// Whole seconds, as used by the readiness probe settings
impl FromConfigValue for Duration {
    fn from_config_value(value: &str) -> Result<Self, ConversionError> {
        u64::from_config_value(value)
            .map(Duration::from_secs)
            .map_err(|e| ConversionError::new("Duration", format!("expected whole seconds: {}", e.reason)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_conversion() {
        assert_eq!(bool::from_config_value("true"), Ok(true));
        assert_eq!(bool::from_config_value("TRUE"), Ok(true));
        assert_eq!(bool::from_config_value(" False "), Ok(false));

        for bad in ["maybe", "yes", "1", ""] {
            let err = bool::from_config_value(bad).unwrap_err();
            assert_eq!(err.target, "bool");
        }
    }

    #[test]
    fn test_integer_conversion() {
        assert_eq!(i32::from_config_value("7"), Ok(7));
        assert_eq!(i32::from_config_value(" -3 "), Ok(-3));
        assert_eq!(u16::from_config_value("8080"), Ok(8080));

        assert!(i32::from_config_value("abc").is_err());
        assert!(i32::from_config_value("7.5").is_err());
        assert!(i32::from_config_value("").is_err());
        assert!(u8::from_config_value("256").is_err());
        assert!(u32::from_config_value("-1").is_err());

        let err = i64::from_config_value("abc").unwrap_err();
        assert_eq!(err.target, "i64");
    }

    #[test]
    fn test_string_is_identity() {
        assert_eq!(String::from_config_value("  spaced  "), Ok("  spaced  ".to_string()));
        assert_eq!(String::from_config_value(""), Ok(String::new()));
    }

    #[test]
    fn test_other_builtins() {
        assert_eq!(f64::from_config_value("1.5"), Ok(1.5));
        assert_eq!(char::from_config_value("x"), Ok('x'));
        assert!(char::from_config_value("xy").is_err());
        assert_eq!(PathBuf::from_config_value("/tmp/a"), Ok(PathBuf::from("/tmp/a")));
        assert!(PathBuf::from_config_value("").is_err());
        assert_eq!(Duration::from_config_value("10"), Ok(Duration::from_secs(10)));
        assert!(Duration::from_config_value("-1").is_err());
    }

    #[test]
    fn test_closure_converter() {
        let upper = |value: &str| -> Result<String, ConversionError> { Ok(value.to_uppercase()) };
        assert_eq!(upper.convert("abc"), Ok("ABC".to_string()));

        let builtin: Result<i32, _> = BuiltinConverter.convert("42");
        assert_eq!(builtin, Ok(42));
    }
}

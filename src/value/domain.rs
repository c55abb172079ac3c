//! Domain coercion helpers

use thiserror::Error;

use super::{DbType, DbValue};

/// Failure to coerce a value into a target domain.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoerceError {
    /// The value was NULL where a concrete value is required.
    #[error("NULL cannot be used as {to}")]
    Null { to: DbType },

    /// The value's domain cannot be converted.
    #[error("cannot coerce {from} to {to}")]
    Incompatible { from: DbType, to: DbType },
}

/// Coerce a value into the BIGINT domain.
///
/// Doubles and numeric strings round to the nearest integer.
pub fn coerce_to_bigint(value: &DbValue) -> Result<i64, CoerceError> {
    let incompatible = || CoerceError::Incompatible {
        from: value.db_type(),
        to: DbType::BigInt,
    };

    match value {
        DbValue::Null => Err(CoerceError::Null { to: DbType::BigInt }),
        DbValue::Integer(v) => Ok(i64::from(*v)),
        DbValue::BigInt(v) => Ok(*v),
        DbValue::Double(v) => double_to_bigint(*v).ok_or_else(incompatible),
        DbValue::String(s) => {
            let s = s.trim();
            if let Ok(v) = s.parse::<i64>() {
                return Ok(v);
            }
            s.parse::<f64>()
                .ok()
                .and_then(double_to_bigint)
                .ok_or_else(incompatible)
        }
        _ => Err(incompatible()),
    }
}

fn double_to_bigint(v: f64) -> Option<i64> {
    let rounded = v.round();
    if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded <= i64::MAX as f64 {
        Some(rounded as i64)
    } else {
        None
    }
}

/// Shorten a string key to `prefix_len` characters.
///
/// Returns `true` if the value was truncated. Non-string values are left
/// untouched.
pub fn truncate_prefix(value: &mut DbValue, prefix_len: usize) -> bool {
    if let DbValue::String(s) = value {
        if s.chars().count() > prefix_len {
            *s = s.chars().take(prefix_len).collect();
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_integers() {
        assert_eq!(coerce_to_bigint(&DbValue::Integer(7)), Ok(7));
        assert_eq!(coerce_to_bigint(&DbValue::BigInt(-3)), Ok(-3));
    }

    #[test]
    fn test_coerce_double_rounds() {
        assert_eq!(coerce_to_bigint(&DbValue::Double(2.6)), Ok(3));
        assert!(coerce_to_bigint(&DbValue::Double(f64::NAN)).is_err());
    }

    #[test]
    fn test_coerce_numeric_string() {
        assert_eq!(coerce_to_bigint(&DbValue::string(" 42 ")), Ok(42));
        assert_eq!(coerce_to_bigint(&DbValue::string("1.4")), Ok(1));
        assert!(matches!(
            coerce_to_bigint(&DbValue::string("ten")),
            Err(CoerceError::Incompatible { .. })
        ));
    }

    #[test]
    fn test_coerce_null() {
        assert_eq!(
            coerce_to_bigint(&DbValue::Null),
            Err(CoerceError::Null { to: DbType::BigInt })
        );
    }

    #[test]
    fn test_truncate_prefix() {
        let mut v = DbValue::string("abcdef");
        assert!(truncate_prefix(&mut v, 3));
        assert_eq!(v, DbValue::string("abc"));

        let mut short = DbValue::string("ab");
        assert!(!truncate_prefix(&mut short, 3));

        let mut num = DbValue::Integer(123456);
        assert!(!truncate_prefix(&mut num, 2));
    }
}

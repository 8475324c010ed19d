//! Correlative codes: `001`, `001.0001`, `ADM.001`.
//!
//! The next code under a prefix is the highest numeric suffix already in use
//! plus one, zero padded to a fixed width. Suffixes that are not all digits
//! are ignored so manually loaded legacy codes do not break the sequence.

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeError {
    #[error("no codes left under prefix '{prefix}' with width {width}")]
    Exhausted { prefix: String, width: usize },
}

/// Compute the code following the highest `prefix` + digits entry.
pub fn next_code<I, S>(prefix: &str, existing: I, width: usize) -> Result<String, CodeError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let max = existing
        .into_iter()
        .filter_map(|code| {
            let rest = code.as_ref().strip_prefix(prefix)?;
            if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            // all digits, so a parse failure is an overflow
            Some(rest.parse::<u64>().unwrap_or(u64::MAX))
        })
        .max()
        .unwrap_or(0);
    let exhausted = || CodeError::Exhausted { prefix: prefix.to_string(), width };
    let next = max.checked_add(1).ok_or_else(exhausted)?;
    let formatted = format!("{prefix}{next:0width$}");
    if formatted.len() - prefix.len() > width {
        return Err(exhausted());
    }
    Ok(formatted)
}

/// Codes of `E` starting with `prefix`.
pub async fn codes_with_prefix<E, C>(db: &C, column: E::Column, prefix: &str) -> Result<Vec<String>, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let mut query = E::find().select_only().column(column);
    if !prefix.is_empty() {
        query = query.filter(column.starts_with(prefix));
    }
    query.into_tuple::<String>().all(db).await
}

/// Load the codes under `prefix` and compute the next one.
pub async fn generate<E, C>(db: &C, column: E::Column, prefix: &str, width: usize) -> Result<String, crate::errors::ServiceError>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let existing = codes_with_prefix::<E, C>(db, column, prefix).await?;
    Ok(next_code(prefix, &existing, width)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_code_without_rows() {
        let none: [&str; 0] = [];
        assert_eq!(next_code("", none, 3).unwrap(), "001");
        assert_eq!(next_code("001.", none, 4).unwrap(), "001.0001");
    }

    #[test]
    fn increments_highest_suffix() {
        let existing = ["001.0001", "001.0007", "001.0003"];
        assert_eq!(next_code("001.", existing, 4).unwrap(), "001.0008");
    }

    #[test]
    fn ignores_other_prefixes_and_non_numeric_suffixes() {
        let existing = ["002.0009", "001.00A1", "001.", "001.0002", "0010003"];
        assert_eq!(next_code("001.", existing, 4).unwrap(), "001.0003");
    }

    #[test]
    fn top_level_groups_skip_dotted_codes() {
        let existing = ["001", "002", "001.0005"];
        assert_eq!(next_code("", existing, 3).unwrap(), "003");
    }

    #[test]
    fn exhausted_width_is_an_error() {
        let err = next_code("ADM.", ["ADM.999"], 3).unwrap_err();
        assert_eq!(err, CodeError::Exhausted { prefix: "ADM.".into(), width: 3 });
    }

    #[test]
    fn wider_legacy_suffix_still_counts() {
        // a legacy row already beyond the width exhausts the sequence
        assert!(next_code("", ["1000"], 3).is_err());
    }

    #[test]
    fn huge_legacy_suffix_exhausts_instead_of_overflowing() {
        let max = u64::MAX.to_string();
        assert!(matches!(next_code("", [max.as_str()], 32), Err(CodeError::Exhausted { .. })));
        assert!(matches!(next_code("", ["9".repeat(30)], 32), Err(CodeError::Exhausted { .. })));
    }
}

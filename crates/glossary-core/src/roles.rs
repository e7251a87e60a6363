//! Column role inference from header names
//!
//! The primary column is the one headed exactly "English" (any case). When
//! there is none, the caller is asked whether column 0 may stand in for it.
//! The other columns are classified by substring: anything mentioning
//! "japan"/"jp"/"ja" is Japanese, "malay"/"ms" is Malay, and leftover columns
//! are assigned by position.

use crate::error::{Error, Result};
use crate::store::Lang;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Header text that marks the primary column
pub const PRIMARY_HEADER: &str = "english";

const SECONDARY_HINTS: [&str; 3] = ["japan", "jp", "ja"];
const TERTIARY_HINTS: [&str; 2] = ["malay", "ms"];

/// Which grid column feeds which language slot
///
/// Exactly one column is primary. Secondary and tertiary may be unassigned,
/// in which case rows contribute nothing for that language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRoleMap {
    /// Number of header columns (2 or 3)
    pub column_count: usize,
    pub primary: usize,
    pub secondary: Option<usize>,
    pub tertiary: Option<usize>,
}

impl ColumnRoleMap {
    /// Column index assigned to a language, if any
    pub fn column(&self, lang: Lang) -> Option<usize> {
        match lang {
            Lang::Primary => Some(self.primary),
            Lang::Secondary => self.secondary,
            Lang::Tertiary => self.tertiary,
        }
    }

    /// Language assigned to a column, if any
    pub fn role_of(&self, column: usize) -> Option<Lang> {
        Lang::ALL
            .into_iter()
            .find(|&lang| self.column(lang) == Some(column))
    }

    /// Assigned (language, column) pairs in slot order
    pub fn assigned(&self) -> impl Iterator<Item = (Lang, usize)> + '_ {
        Lang::ALL
            .into_iter()
            .filter_map(move |lang| self.column(lang).map(|col| (lang, col)))
    }
}

/// Outcome of looking for the primary header without asking anyone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryDetection {
    /// A header matched "English"
    Found(usize),
    /// No match; column 0 may be used if the user agrees
    NeedsConfirmation,
}

/// Asked whether column 0 should be treated as the primary column
///
/// Returning `false` cancels the whole operation.
pub trait ConfirmPrimary {
    fn confirm(&mut self, headers: &[String]) -> bool;
}

impl<F> ConfirmPrimary for F
where
    F: FnMut(&[String]) -> bool,
{
    fn confirm(&mut self, headers: &[String]) -> bool {
        self(headers)
    }
}

/// Confirmer that always gives the same answer
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl ConfirmPrimary for AutoConfirm {
    fn confirm(&mut self, _headers: &[String]) -> bool {
        self.0
    }
}

/// Fail unless there are 2 or 3 headers
pub fn check_column_count(headers: &[String]) -> Result<()> {
    match headers.len() {
        2 | 3 => Ok(()),
        n => Err(Error::InvalidColumnCount(n)),
    }
}

/// Look for a header that is exactly "English", ignoring case and padding
pub fn detect_primary(headers: &[String]) -> PrimaryDetection {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(PRIMARY_HEADER))
        .map(PrimaryDetection::Found)
        .unwrap_or(PrimaryDetection::NeedsConfirmation)
}

/// Assign the secondary and tertiary slots once the primary column is known
pub fn assign_targets(headers: &[String], primary: usize) -> ColumnRoleMap {
    let column_count = headers.len();
    let others: Vec<usize> = (0..column_count).filter(|&i| i != primary).collect();

    let mut secondary = None;
    let mut tertiary = None;
    for &i in &others {
        let name = headers[i].to_lowercase();
        if SECONDARY_HINTS.iter().any(|hint| name.contains(hint)) {
            secondary = Some(i);
        } else if TERTIARY_HINTS.iter().any(|hint| name.contains(hint)) {
            tertiary = Some(i);
        }
    }

    let first_other_than = |taken: usize| others.iter().copied().find(|&i| i != taken);

    match (secondary, tertiary) {
        (None, None) => {
            warn!("no language hints in headers {:?}, assigning by position", headers);
            secondary = others.first().copied();
            if column_count == 3 {
                tertiary = others.get(1).copied();
            }
        }
        (None, Some(t)) if column_count == 3 => {
            secondary = first_other_than(t);
        }
        (Some(s), None) if column_count == 3 => {
            tertiary = first_other_than(s);
        }
        _ => {}
    }

    ColumnRoleMap {
        column_count,
        primary,
        secondary,
        tertiary,
    }
}

/// Resolve column roles, asking `confirmer` when no "English" header exists
///
/// Fails with [`Error::InvalidColumnCount`] before asking anything, and with
/// [`Error::UserCancelled`] when the fallback to column 0 is declined.
pub fn resolve_roles(headers: &[String], confirmer: &mut dyn ConfirmPrimary) -> Result<ColumnRoleMap> {
    check_column_count(headers)?;

    let primary = match detect_primary(headers) {
        PrimaryDetection::Found(i) => i,
        PrimaryDetection::NeedsConfirmation => {
            if !confirmer.confirm(headers) {
                return Err(Error::UserCancelled {
                    headers: headers.to_vec(),
                });
            }
            0
        }
    };

    let roles = assign_targets(headers, primary);
    debug!(
        "resolved roles: primary={} secondary={:?} tertiary={:?}",
        roles.primary, roles.secondary, roles.tertiary
    );
    Ok(roles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn resolve(names: &[&str], answer: bool) -> Result<ColumnRoleMap> {
        resolve_roles(&headers(names), &mut AutoConfirm(answer))
    }

    #[test]
    fn test_standard_three_columns() {
        let roles = resolve(&["English", "Japanese", "Malay"], false).unwrap();
        assert_eq!(roles.primary, 0);
        assert_eq!(roles.secondary, Some(1));
        assert_eq!(roles.tertiary, Some(2));
    }

    #[test]
    fn test_english_anywhere_any_case() {
        let roles = resolve(&["Malay", " ENGLISH ", "JP"], false).unwrap();
        assert_eq!(roles.primary, 1);
        assert_eq!(roles.secondary, Some(2));
        assert_eq!(roles.tertiary, Some(0));
    }

    #[test]
    fn test_english_must_match_exactly() {
        let mut asked = false;
        let mut confirmer = |_: &[String]| {
            asked = true;
            true
        };
        let roles = resolve_roles(&headers(&["English (US)", "Japanese"]), &mut confirmer).unwrap();
        assert!(asked);
        assert_eq!(roles.primary, 0);
    }

    #[test]
    fn test_unknown_headers_confirmed() {
        let roles = resolve(&["Foo", "Bar"], true).unwrap();
        assert_eq!(roles.primary, 0);
        assert_eq!(roles.secondary, Some(1));
        assert_eq!(roles.tertiary, None);
    }

    #[test]
    fn test_unknown_headers_declined() {
        let err = resolve(&["Foo", "Bar"], false).unwrap_err();
        assert!(err.is_cancelled());
    }

    #[test]
    fn test_confirmer_not_asked_when_english_present() {
        let mut confirmer = |_: &[String]| -> bool { panic!("should not ask") };
        resolve_roles(&headers(&["english", "ms"]), &mut confirmer).unwrap();
    }

    #[test]
    fn test_invalid_column_count_checked_first() {
        let mut confirmer = |_: &[String]| -> bool { panic!("should not ask") };
        for names in [&["Foo"][..], &["A", "B", "C", "D"][..], &[][..]] {
            let err = resolve_roles(&headers(names), &mut confirmer).unwrap_err();
            assert!(matches!(err, Error::InvalidColumnCount(n) if n == names.len()));
        }
    }

    #[test]
    fn test_positional_fallback_three_columns() {
        let roles = resolve(&["English", "Col B", "Col C"], false).unwrap();
        assert_eq!(roles.secondary, Some(1));
        assert_eq!(roles.tertiary, Some(2));
    }

    #[test]
    fn test_only_malay_matched_fills_secondary() {
        let roles = resolve(&["English", "Bahasa Malay", "Other"], false).unwrap();
        assert_eq!(roles.tertiary, Some(1));
        assert_eq!(roles.secondary, Some(2));
    }

    #[test]
    fn test_only_japanese_matched_fills_tertiary() {
        let roles = resolve(&["English", "Notes", "ja-JP"], false).unwrap();
        assert_eq!(roles.secondary, Some(2));
        assert_eq!(roles.tertiary, Some(1));
    }

    #[test]
    fn test_two_columns_malay_leaves_secondary_open() {
        let roles = resolve(&["English", "Malay"], false).unwrap();
        assert_eq!(roles.secondary, None);
        assert_eq!(roles.tertiary, Some(1));
    }

    #[test]
    fn test_japanese_hint_wins_over_malay() {
        // "jp" is checked before "ms"
        let roles = resolve(&["English", "jp-ms"], false).unwrap();
        assert_eq!(roles.secondary, Some(1));
        assert_eq!(roles.tertiary, None);
    }

    #[test]
    fn test_fallback_can_misclassify_reversed_columns() {
        // Headers with no hints are assigned purely by position, so a sheet
        // laid out English/Malay/Japanese under opaque names ends up swapped.
        let roles = resolve(&["English", "Column 2", "Column 3"], false).unwrap();
        assert_eq!(roles.role_of(1), Some(Lang::Secondary));
        assert_eq!(roles.role_of(2), Some(Lang::Tertiary));
    }

    #[test]
    fn test_detect_primary_two_phase() {
        assert_eq!(
            detect_primary(&headers(&["Japanese", "English"])),
            PrimaryDetection::Found(1)
        );
        assert_eq!(
            detect_primary(&headers(&["Foo", "Bar"])),
            PrimaryDetection::NeedsConfirmation
        );
    }

    #[test]
    fn test_assigned_pairs() {
        let roles = assign_targets(&headers(&["English", "Japanese"]), 0);
        let pairs: Vec<_> = roles.assigned().collect();
        assert_eq!(pairs, vec![(Lang::Primary, 0), (Lang::Secondary, 1)]);
        assert_eq!(roles.role_of(5), None);
    }
}

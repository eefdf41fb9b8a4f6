//! Direct filtering of records by task type and login

use crate::table::Records;

/// Case-insensitive substring test used for every login match.
///
/// A blank login never matches.
pub fn login_contains(login: &str, needle: &str) -> bool {
    !login.is_empty() && login.to_lowercase().contains(&needle.to_lowercase())
}

/// Indices of rows whose task type equals `task_type` and, when `login` is
/// given, whose login contains it case-insensitively
pub fn matching_rows(records: &Records, task_type: &str, login: Option<&str>) -> Vec<usize> {
    (0..records.len())
        .filter(|&i| records.task_type(i) == task_type)
        .filter(|&i| match login {
            Some(needle) => login_contains(&records.login(i), needle),
            None => true,
        })
        .collect()
}

/// Copy of the matching rows, in their original order.
///
/// The result carries the same schema, including the assignee column.
pub fn filter_records(records: &Records, task_type: &str, login: Option<&str>) -> Records {
    records.select(&matching_rows(records, task_type, login))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Cell, ColumnNames, Dataset};

    fn records(rows: &[(&str, &str)]) -> Records {
        let dataset = Dataset::from_rows(
            vec!["task".into(), "login".into(), "id".into()],
            rows.iter()
                .enumerate()
                .map(|(i, (t, l))| vec![Cell::from(*t), Cell::from(*l), Cell::Number(i as f64)])
                .collect(),
        );
        Records::normalize(
            dataset,
            &ColumnNames {
                task_type: "task".into(),
                login: "login".into(),
                assignee: "owner".into(),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_login_contains_is_case_insensitive() {
        assert!(login_contains("eduarsouza.ext", "EDUARSOUZA"));
        assert!(login_contains("X-KAMARQUES", "kamarques"));
        assert!(!login_contains("ROSSILV", "ROSSILVA"));
        assert!(!login_contains("", "FOO"));
        assert!(!login_contains("", ""));
    }

    #[test]
    fn test_filter_by_task_only() {
        let recs = records(&[("A", "x"), ("B", "y"), ("A", "")]);
        assert_eq!(matching_rows(&recs, "A", None), vec![0, 2]);
    }

    #[test]
    fn test_filter_task_must_match_exactly() {
        let recs = records(&[("Despacho", ""), ("Despacho ", ""), ("despacho", "")]);
        assert_eq!(matching_rows(&recs, "Despacho", None), vec![0]);
    }

    #[test]
    fn test_filter_by_task_and_login() {
        let recs = records(&[
            ("A", "vsilveira"),
            ("A", "PFREGOLON"),
            ("B", "VSILVEIRA"),
            ("A", ""),
            ("A", "xVSILVEIRAx"),
        ]);
        assert_eq!(matching_rows(&recs, "A", Some("VSILVEIRA")), vec![0, 4]);
    }

    #[test]
    fn test_filter_records_keeps_assignee_column() {
        let recs = records(&[("A", "x")]);
        let filtered = filter_records(&recs, "A", None);

        assert_eq!(filtered.len(), 1);
        assert!(filtered.dataset().has_column("owner"));
    }

    #[test]
    fn test_empty_result_is_not_an_error() {
        let recs = records(&[("A", "x")]);
        let filtered = filter_records(&recs, "Z", Some("nobody"));
        assert!(filtered.is_empty());
        assert!(filtered.dataset().has_column("owner"));
    }
}

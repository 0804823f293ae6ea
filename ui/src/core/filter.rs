//! Name matching shared by every selection list.

/// Case-insensitive substring match. A leading `!` negates the rest of the
/// filter; an empty or absent filter matches everything.
pub fn matches(name: &str, filter: Option<&str>) -> bool {
    let filter = match filter {
        Some(filter) if !filter.is_empty() => filter,
        _ => return true,
    };

    let name = name.to_lowercase();
    match filter.strip_prefix('!') {
        Some(rest) => !name.contains(&rest.to_lowercase()),
        None => name.contains(&filter.to_lowercase()),
    }
}

/// Whether an account's `/`-joined parent path lies within `unit`.
///
/// Compares whole path segments, so `us` does not admit `usa/east`.
pub fn in_org_unit(path: &str, unit: Option<&str>) -> bool {
    let unit = match unit {
        Some(unit) if !unit.is_empty() => unit,
        _ => return true,
    };

    let mut path_segments = path.split('/');
    unit.split('/')
        .all(|segment| path_segments.next() == Some(segment))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_matches_everything() {
        assert!(matches("AmazonEC2", None));
        assert!(matches("AmazonEC2", Some("")));
        assert!(matches("", None));
    }

    #[test]
    fn plain_filter_is_case_insensitive_substring() {
        assert!(matches("AmazonEC2", Some("ec2")));
        assert!(matches("AmazonEC2", Some("AMAZON")));
        assert!(!matches("AmazonS3", Some("ec2")));
    }

    #[test]
    fn bang_negates_the_remainder() {
        assert!(!matches("AmazonEC2", Some("!ec2")));
        assert!(matches("AmazonS3", Some("!EC2")));
        // A bare `!` negates the empty string, which every name contains.
        assert!(!matches("AmazonS3", Some("!")));
    }

    #[test]
    fn org_unit_matches_on_segments() {
        assert!(in_org_unit("us/prod", Some("us/prod")));
        assert!(in_org_unit("us/prod/team1", Some("us/prod")));
        assert!(!in_org_unit("us/dev", Some("us/prod")));
        assert!(!in_org_unit("usa/east", Some("us")));
        assert!(!in_org_unit("us", Some("us/prod")));
    }

    #[test]
    fn empty_unit_admits_all() {
        assert!(in_org_unit("", None));
        assert!(in_org_unit("anything/at/all", Some("")));
    }
}

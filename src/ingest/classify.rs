//! Path classifier
//!
//! Decodes a dataset file's location into a [`HierarchyAddress`] by finding
//! marker segments rather than reading fixed offsets. The published snapshot
//! nests the three category branches at different depths:
//!
//! ```text
//! aggregated/transaction/country/india/2021/2.json
//! aggregated/transaction/country/india/state/goa/2021/2.json
//! map/transaction/hover/country/india/2021/2.json
//! map/transaction/hover/country/india/state/goa/2021/2.json
//! top/user/country/india/state/goa/2021/2.json
//! ```
//!
//! The category marker must be immediately followed by a scope marker. The
//! segments after it are read forwards and must be exactly
//! `[hover/]country/<country>/[state/<state>/]<year>/<quarter>.json`, with
//! `hover` allowed only under `map`. Anything in front of the category marker
//! (the checkout directory, `pulse/data`, ...) is ignored, so the result does
//! not depend on where the snapshot lives.

use std::path::{Component, Path};

use crate::models::{Category, HierarchyAddress, Scope};

use super::error::{ClassificationError, ClassificationReason};

/// Segment introducing the country code
pub const COUNTRY_MARKER: &str = "country";

/// Segment introducing a sub-national (state) file
pub const STATE_MARKER: &str = "state";

/// Extra level the map branch puts in front of the country marker
pub const HOVER_MARKER: &str = "hover";

/// Extension every dataset payload carries
pub const PAYLOAD_EXTENSION: &str = ".json";

/// Segments that may never be read as a country name
const RESERVED_SEGMENTS: &[&str] = &[
    COUNTRY_MARKER,
    HOVER_MARKER,
    STATE_MARKER,
    "aggregated",
    "map",
    "top",
    "transaction",
    "user",
];

/// Classify an ordered sequence of path segments
pub fn classify<S: AsRef<str>>(segments: &[S]) -> Result<HierarchyAddress, ClassificationError> {
    let parts: Vec<&str> = segments.iter().map(AsRef::as_ref).collect();
    let fail = |reason| ClassificationError::new(parts.join("/"), reason);

    let (marker, category, scope) = parts
        .windows(2)
        .enumerate()
        .find_map(|(i, pair)| {
            Some((
                i,
                Category::from_marker(pair[0])?,
                Scope::from_marker(pair[1])?,
            ))
        })
        .ok_or_else(|| fail(ClassificationReason::MissingMarkers))?;

    let mut rest = &parts[marker + 2..];
    if category == Category::Map
        && let [HOVER_MARKER, after @ ..] = rest
    {
        rest = after;
    }

    let rest = match rest {
        [COUNTRY_MARKER, after @ ..] => after,
        [] => return Err(fail(ClassificationReason::Truncated)),
        [other, ..] => return Err(fail(unexpected(other))),
    };
    let (country, rest) = match rest {
        [country, after @ ..] => (*country, after),
        [] => return Err(fail(ClassificationReason::Truncated)),
    };
    let (state, rest) = match rest {
        [STATE_MARKER, state, after @ ..] => (Some(*state), after),
        _ => (None, rest),
    };
    // Exactly the year and the quarter file remain
    let (year, file) = match rest {
        [year, file] => (*year, *file),
        [extra, _, _, ..] => return Err(fail(unexpected(extra))),
        _ => return Err(fail(ClassificationReason::Truncated)),
    };

    if country.is_empty() || RESERVED_SEGMENTS.contains(&country) {
        return Err(fail(ClassificationReason::InvalidCountry(
            country.to_string(),
        )));
    }
    if state.is_some_and(str::is_empty) {
        return Err(fail(ClassificationReason::EmptyState));
    }

    let year: i32 = year
        .parse()
        .map_err(|_| fail(ClassificationReason::InvalidYear(year.to_string())))?;
    let quarter = parse_quarter(file)
        .ok_or_else(|| fail(ClassificationReason::InvalidQuarter(file.to_string())))?;

    Ok(HierarchyAddress {
        category,
        scope,
        country: country.to_string(),
        state: state.map(str::to_string),
        year,
        quarter,
    })
}

/// Classify a filesystem path, using its normal components as segments
pub fn classify_path(path: &Path) -> Result<HierarchyAddress, ClassificationError> {
    let segments: Vec<_> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect();
    classify(&segments)
}

fn unexpected(segment: &str) -> ClassificationReason {
    ClassificationReason::UnexpectedSegment(segment.to_string())
}

fn parse_quarter(file: &str) -> Option<i16> {
    let stem = file.strip_suffix(PAYLOAD_EXTENSION)?;
    let quarter: i16 = stem.parse().ok()?;
    (1..=4).contains(&quarter).then_some(quarter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Granularity, Shape};

    fn split(path: &str) -> Vec<&str> {
        path.split('/').collect()
    }

    /// Relative path of a file of the given shape, as laid out in the snapshot
    fn layout(shape: Shape) -> String {
        let mut path = format!("{}/{}/", shape.category, shape.scope);
        if shape.category == Category::Map {
            path.push_str("hover/");
        }
        path.push_str("country/india/");
        if shape.is_sub_national() {
            path.push_str("state/tamil-nadu/");
        }
        path.push_str("2021/2.json");
        path
    }

    #[test]
    fn test_all_shapes_at_varying_depth() {
        let prefixes = ["", "data/", "pulse/data/", "/home/user/checkouts/pulse/data/"];

        for shape in Shape::ALL {
            for prefix in prefixes {
                let path = format!("{}{}", prefix, layout(shape));
                let address = classify(&split(path.trim_start_matches('/')))
                    .unwrap_or_else(|e| panic!("{}: {}", path, e));

                assert_eq!(address.shape(), shape, "{}", path);
                assert_eq!(address.country, "india");
                assert_eq!(address.year, 2021);
                assert_eq!(address.quarter, 2);
                match shape.granularity {
                    Granularity::National => assert!(address.state.is_none()),
                    Granularity::SubNational => {
                        assert_eq!(address.state.as_deref(), Some("tamil-nadu"))
                    }
                }
            }
        }
    }

    #[test]
    fn test_missing_category_marker() {
        let err = classify(&split("pulse/data/transaction/country/india/2021/1.json")).unwrap_err();
        assert_eq!(err.reason, ClassificationReason::MissingMarkers);
        assert!(err.path.contains("pulse/data/transaction"));
    }

    #[test]
    fn test_missing_scope_marker() {
        let err = classify(&split("data/aggregated/payments/country/india/2021/1.json")).unwrap_err();
        assert_eq!(err.reason, ClassificationReason::MissingMarkers);
    }

    #[test]
    fn test_scope_must_follow_category() {
        let err = classify(&split("top/country/user/india/2021/1.json")).unwrap_err();
        assert_eq!(err.reason, ClassificationReason::MissingMarkers);
    }

    #[test]
    fn test_truncated_path() {
        for path in [
            "aggregated/user",
            "aggregated/user/country",
            "aggregated/user/country/india/1.json",
            "top/user/country/india/state/goa/2021",
        ] {
            let err = classify(&split(path)).unwrap_err();
            assert_eq!(err.reason, ClassificationReason::Truncated, "{}", path);
        }
    }

    #[test]
    fn test_country_marker_required() {
        let err = classify(&split("aggregated/user/2021/1.json")).unwrap_err();
        assert_eq!(err.reason, unexpected("2021"));

        let err = classify(&split("aggregated/user/state/goa/2021/1.json")).unwrap_err();
        assert_eq!(err.reason, unexpected("state"));

        let err = classify(&split("aggregated/transaction/garbage/more/india/2021/1.json"))
            .unwrap_err();
        assert_eq!(err.reason, unexpected("garbage"));
    }

    #[test]
    fn test_hover_only_under_map() {
        let err = classify(&split("top/user/hover/country/india/2021/1.json")).unwrap_err();
        assert_eq!(err.reason, unexpected("hover"));

        // The map branch accepts both forms
        for path in [
            "map/user/hover/country/india/2021/1.json",
            "map/user/country/india/2021/1.json",
        ] {
            assert!(classify(&split(path)).is_ok(), "{}", path);
        }
    }

    #[test]
    fn test_extra_segment_is_not_misfiled() {
        let err = classify(&split(
            "top/user/country/india/state/goa/districts/2021/1.json",
        ))
        .unwrap_err();
        assert_eq!(err.reason, unexpected("districts"));

        let err = classify(&split(
            "aggregated/transaction/country/india/state/goa/x/2021/1.json",
        ))
        .unwrap_err();
        assert_eq!(err.reason, unexpected("x"));

        // State marker missing in front of the state name
        let err = classify(&split("aggregated/transaction/country/india/goa/2021/1.json"))
            .unwrap_err();
        assert_eq!(err.reason, unexpected("goa"));
    }

    #[test]
    fn test_reserved_country() {
        let err = classify(&split("top/user/country/state/2021/1.json")).unwrap_err();
        assert_eq!(
            err.reason,
            ClassificationReason::InvalidCountry("state".to_string())
        );

        let err = classify(&split("map/user/hover/country/hover/2021/1.json")).unwrap_err();
        assert_eq!(
            err.reason,
            ClassificationReason::InvalidCountry("hover".to_string())
        );
    }

    #[test]
    fn test_empty_state() {
        let err = classify(&["top", "user", "country", "india", "state", "", "2021", "1.json"])
            .unwrap_err();
        assert_eq!(err.reason, ClassificationReason::EmptyState);
    }

    #[test]
    fn test_invalid_year_and_quarter() {
        let err = classify(&split("top/user/country/india/latest/1.json")).unwrap_err();
        assert_eq!(
            err.reason,
            ClassificationReason::InvalidYear("latest".to_string())
        );

        for file in ["5.json", "0.json", "1.csv", "q1.json"] {
            let path = format!("top/user/country/india/2021/{}", file);
            let err = classify(&split(&path)).unwrap_err();
            assert_eq!(
                err.reason,
                ClassificationReason::InvalidQuarter(file.to_string())
            );
        }
    }

    #[test]
    fn test_no_state_leaks_between_files() {
        let state = classify(&split(
            "aggregated/transaction/country/india/state/goa/2020/1.json",
        ))
        .unwrap();
        let national = classify(&split("aggregated/transaction/country/india/2020/1.json")).unwrap();

        assert_eq!(state.state.as_deref(), Some("goa"));
        assert!(national.state.is_none());
        assert_eq!(national.granularity(), Granularity::National);
    }

    #[test]
    fn test_classify_path() {
        let path = Path::new("/srv/pulse/data/map/user/hover/country/india/state/goa/2019/4.json");
        let address = classify_path(path).unwrap();
        assert_eq!(address.category, Category::Map);
        assert_eq!(address.scope, Scope::User);
        assert_eq!(address.state.as_deref(), Some("goa"));
        assert_eq!(address.quarter, 4);
    }
}

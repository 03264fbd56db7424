use crate::error::PartnerDataError;
use crate::geo::{is_valid_pincode, normalize_region, PincodeDirectory};
use crate::models::partner::{CoverageSet, PartnerProfile};
use crate::models::selection::ExclusionReason;

/// Runs every serviceability rule and reports all that fail, so exclusions
/// are explainable without re-running the check.
pub fn check_serviceability(
    partner: &PartnerProfile,
    origin_pincode: &str,
    destination_pincode: &str,
    weight_kg: f64,
    is_cod: bool,
    directory: &PincodeDirectory,
) -> Result<(), Vec<ExclusionReason>> {
    let mut reasons = Vec::new();

    if !partner.active {
        reasons.push(ExclusionReason::Inactive);
    }
    if !covers(&partner.coverage.pickup, origin_pincode, directory) {
        reasons.push(ExclusionReason::OriginNotCovered);
    }
    if !covers(partner.coverage.delivery_set(), destination_pincode, directory) {
        reasons.push(ExclusionReason::DestinationNotCovered);
    }
    if is_cod && !partner.supports_cod {
        reasons.push(ExclusionReason::CodUnsupported);
    }
    if weight_kg > partner.max_weight_kg {
        reasons.push(ExclusionReason::OverweightLimit);
    }

    if reasons.is_empty() {
        Ok(())
    } else {
        Err(reasons)
    }
}

pub fn is_serviceable(
    partner: &PartnerProfile,
    origin_pincode: &str,
    destination_pincode: &str,
    weight_kg: f64,
    is_cod: bool,
    directory: &PincodeDirectory,
) -> bool {
    check_serviceability(
        partner,
        origin_pincode,
        destination_pincode,
        weight_kg,
        is_cod,
        directory,
    )
    .is_ok()
}

/// Pincode-level rules (exact, prefix, range) are tried before the
/// city/state fallback from the directory.
pub fn covers(set: &CoverageSet, pincode: &str, directory: &PincodeDirectory) -> bool {
    if set.pincodes.contains(pincode) {
        return true;
    }

    if set.prefixes.iter().any(|prefix| pincode.starts_with(prefix.as_str())) {
        return true;
    }

    if let Ok(numeric) = pincode.parse::<u32>() {
        if set
            .ranges
            .iter()
            .any(|range| (range.from..=range.to).contains(&numeric))
        {
            return true;
        }
    }

    let Some(entry) = directory.get(pincode) else {
        return false;
    };

    let city = normalize_region(&entry.city);
    if set.cities.iter().any(|c| normalize_region(c) == city) {
        return true;
    }

    let state = normalize_region(&entry.state);
    set.states.iter().any(|s| normalize_region(s) == state)
}

pub fn validate_coverage(partner: &PartnerProfile) -> Result<(), PartnerDataError> {
    let malformed = |detail: String| PartnerDataError::MalformedCoverage {
        partner_id: partner.id.clone(),
        detail,
    };

    let mut sets = vec![("pickup", &partner.coverage.pickup)];
    if let Some(delivery) = &partner.coverage.delivery {
        sets.push(("delivery", delivery));
    }

    for (label, set) in sets {
        if let Some(pincode) = set.pincodes.iter().find(|p| !is_valid_pincode(p)) {
            return Err(malformed(format!("{label} pincode {pincode:?} is not 6 digits")));
        }
        if let Some(prefix) = set.prefixes.iter().find(|p| {
            p.is_empty() || p.len() > 6 || !p.bytes().all(|b| b.is_ascii_digit())
        }) {
            return Err(malformed(format!("{label} prefix {prefix:?} is not 1-6 digits")));
        }
        if let Some(range) = set.ranges.iter().find(|r| r.from > r.to) {
            return Err(malformed(format!(
                "{label} range {}..={} is inverted",
                range.from, range.to
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashMap};

    use chrono::Utc;

    use super::{check_serviceability, covers, is_serviceable, validate_coverage};
    use crate::geo::{PincodeDirectory, PincodeEntry};
    use crate::models::partner::{Coverage, CoverageSet, PartnerProfile, PincodeRange, RateCard};
    use crate::models::selection::ExclusionReason;

    fn directory() -> PincodeDirectory {
        PincodeDirectory::new(vec![
            PincodeEntry {
                pincode: "110001".to_string(),
                city: "New Delhi".to_string(),
                state: "Delhi".to_string(),
                metro: true,
            },
            PincodeEntry {
                pincode: "400001".to_string(),
                city: "Mumbai".to_string(),
                state: "Maharashtra".to_string(),
                metro: true,
            },
            PincodeEntry {
                pincode: "411001".to_string(),
                city: "Pune".to_string(),
                state: "Maharashtra".to_string(),
                metro: false,
            },
        ])
    }

    fn partner(pickup: CoverageSet, delivery: Option<CoverageSet>) -> PartnerProfile {
        PartnerProfile {
            id: "delhivery".to_string(),
            name: "Delhivery".to_string(),
            active: true,
            supports_cod: false,
            rate_card: RateCard::default(),
            coverage: Coverage { pickup, delivery },
            reliability: 0.9,
            avg_transit_hours: 48.0,
            zone_transit_hours: HashMap::new(),
            max_weight_kg: 10.0,
            daily_capacity: None,
            updated_at: Utc::now(),
        }
    }

    fn pincodes(codes: &[&str]) -> CoverageSet {
        CoverageSet {
            pincodes: codes.iter().map(|c| c.to_string()).collect(),
            ..CoverageSet::default()
        }
    }

    #[test]
    fn coverage_matches_exact_prefix_and_range() {
        let dir = PincodeDirectory::default();
        let set = CoverageSet {
            pincodes: BTreeSet::from(["110001".to_string()]),
            prefixes: vec!["56".to_string()],
            ranges: vec![PincodeRange {
                from: 400001,
                to: 400104,
            }],
            ..CoverageSet::default()
        };

        assert!(covers(&set, "110001", &dir));
        assert!(covers(&set, "560034", &dir));
        assert!(covers(&set, "400050", &dir));
        assert!(!covers(&set, "400105", &dir));
        assert!(!covers(&set, "110002", &dir));
    }

    #[test]
    fn region_fallback_needs_a_directory_entry() {
        let set = CoverageSet {
            states: BTreeSet::from(["maharashtra".to_string()]),
            ..CoverageSet::default()
        };

        assert!(covers(&set, "411001", &directory()));
        assert!(!covers(&set, "411001", &PincodeDirectory::default()));
        assert!(!covers(&set, "110001", &directory()));
    }

    #[test]
    fn city_fallback_is_case_insensitive() {
        let set = CoverageSet {
            cities: BTreeSet::from(["  MUMBAI ".to_string()]),
            ..CoverageSet::default()
        };
        assert!(covers(&set, "400001", &directory()));
    }

    #[test]
    fn every_failing_condition_is_reported() {
        let mut p = partner(pincodes(&["110001"]), None);
        p.active = false;

        let reasons =
            check_serviceability(&p, "110001", "400001", 12.0, true, &directory()).unwrap_err();

        assert_eq!(
            reasons,
            vec![
                ExclusionReason::Inactive,
                ExclusionReason::DestinationNotCovered,
                ExclusionReason::CodUnsupported,
                ExclusionReason::OverweightLimit,
            ]
        );
    }

    #[test]
    fn delivery_set_is_used_for_destination() {
        let p = partner(pincodes(&["110001"]), Some(pincodes(&["400001"])));
        let dir = directory();

        assert!(is_serviceable(&p, "110001", "400001", 2.0, false, &dir));
        assert!(!is_serviceable(&p, "400001", "110001", 2.0, false, &dir));
    }

    #[test]
    fn weight_at_limit_is_serviceable() {
        let p = partner(pincodes(&["110001", "400001"]), None);
        assert!(is_serviceable(&p, "110001", "400001", 10.0, false, &directory()));
        assert!(!is_serviceable(&p, "110001", "400001", 10.5, false, &directory()));
    }

    #[test]
    fn inverted_range_is_malformed() {
        let set = CoverageSet {
            ranges: vec![PincodeRange {
                from: 400104,
                to: 400001,
            }],
            ..CoverageSet::default()
        };
        assert!(validate_coverage(&partner(set, None)).is_err());
        assert!(validate_coverage(&partner(pincodes(&["11000"]), None)).is_err());
        assert!(validate_coverage(&partner(pincodes(&["110001"]), None)).is_ok());
    }
}

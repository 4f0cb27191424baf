use crate::types::{OperationalStatus, ServiceStatus};

/// Reduce a set of probe results to one operational label.
///
/// Pure function of the online and total counts:
/// all online (including zero of zero) is Operational, none online is
/// Critical, anything in between is Limited.
pub fn classify(statuses: &[ServiceStatus]) -> OperationalStatus {
    let online = statuses.iter().filter(|s| s.online).count();
    OperationalStatus::from_counts(online, statuses.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statuses(flags: &[bool]) -> Vec<ServiceStatus> {
        flags
            .iter()
            .enumerate()
            .map(|(i, online)| ServiceStatus::new(format!("svc-{}", i), "http://localhost", *online))
            .collect()
    }

    #[test]
    fn test_all_online_is_operational() {
        assert_eq!(classify(&statuses(&[true, true, true])), OperationalStatus::Operational);
    }

    #[test]
    fn test_none_online_is_critical() {
        assert_eq!(classify(&statuses(&[false, false])), OperationalStatus::Critical);
    }

    #[test]
    fn test_partial_is_limited() {
        assert_eq!(classify(&statuses(&[true, false, true])), OperationalStatus::Limited);
        assert_eq!(classify(&statuses(&[false, true])), OperationalStatus::Limited);
    }

    #[test]
    fn test_empty_is_operational() {
        assert_eq!(classify(&[]), OperationalStatus::Operational);
    }

    #[test]
    fn test_classify_is_repeatable() {
        let input = statuses(&[true, false]);
        assert_eq!(classify(&input), classify(&input));
    }
}

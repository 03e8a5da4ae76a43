use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where an application sits in the hiring pipeline.
///
/// The variants are listed in pipeline order, but nothing enforces that an
/// application moves forward: any status may be set from any other, so a
/// mistaken update can always be corrected by hand.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Interested,
    Applied,
    #[value(name = "phone_screen")]
    PhoneScreen,
    Interview,
    #[value(name = "technical_assessment")]
    TechnicalAssessment,
    Offer,
    Negotiation,
    Accepted,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 10] = [
        ApplicationStatus::Interested,
        ApplicationStatus::Applied,
        ApplicationStatus::PhoneScreen,
        ApplicationStatus::Interview,
        ApplicationStatus::TechnicalAssessment,
        ApplicationStatus::Offer,
        ApplicationStatus::Negotiation,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
        ApplicationStatus::Withdrawn,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Interested => "interested",
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::PhoneScreen => "phone_screen",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::TechnicalAssessment => "technical_assessment",
            ApplicationStatus::Offer => "offer",
            ApplicationStatus::Negotiation => "negotiation",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }

    /// Still in play: identified or somewhere before an offer.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Interested
                | ApplicationStatus::Applied
                | ApplicationStatus::PhoneScreen
                | ApplicationStatus::Interview
                | ApplicationStatus::TechnicalAssessment
        )
    }

    pub fn is_interviewing(self) -> bool {
        matches!(
            self,
            ApplicationStatus::PhoneScreen
                | ApplicationStatus::Interview
                | ApplicationStatus::TechnicalAssessment
        )
    }

    pub fn is_offer_stage(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Offer | ApplicationStatus::Negotiation | ApplicationStatus::Accepted
        )
    }

    /// Finished one way or another; used for the "open applications" count.
    pub fn is_closed(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Rejected | ApplicationStatus::Withdrawn | ApplicationStatus::Accepted
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase().replace(['-', ' '], "_");
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == needle)
            .ok_or_else(|| format!("unknown status '{}'", s))
    }
}

/// The tabs of the applications view: each groups several statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    #[value(alias = "interviews")]
    Interviewing,
    #[value(alias = "offer-stage")]
    Offers,
    Rejected,
}

impl StatusFilter {
    pub const TABS: [StatusFilter; 5] = [
        StatusFilter::All,
        StatusFilter::Active,
        StatusFilter::Interviewing,
        StatusFilter::Offers,
        StatusFilter::Rejected,
    ];

    pub fn matches(self, status: ApplicationStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => status.is_active(),
            StatusFilter::Interviewing => status.is_interviewing(),
            StatusFilter::Offers => status.is_offer_stage(),
            StatusFilter::Rejected => status == ApplicationStatus::Rejected,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Active => "Active",
            StatusFilter::Interviewing => "Interviews",
            StatusFilter::Offers => "Offers",
            StatusFilter::Rejected => "Rejected",
        }
    }

    /// Next tab, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::TABS.iter().position(|t| *t == self).unwrap_or(0);
        Self::TABS[(idx + 1) % Self::TABS.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_groups() {
        let active: Vec<_> = ApplicationStatus::ALL.into_iter().filter(|s| s.is_active()).collect();
        assert_eq!(
            active,
            vec![
                ApplicationStatus::Interested,
                ApplicationStatus::Applied,
                ApplicationStatus::PhoneScreen,
                ApplicationStatus::Interview,
                ApplicationStatus::TechnicalAssessment,
            ]
        );

        let interviewing: Vec<_> =
            ApplicationStatus::ALL.into_iter().filter(|s| s.is_interviewing()).collect();
        assert_eq!(interviewing.len(), 3);
        assert!(interviewing.iter().all(|s| s.is_active()));

        let offers: Vec<_> = ApplicationStatus::ALL.into_iter().filter(|s| s.is_offer_stage()).collect();
        assert_eq!(
            offers,
            vec![ApplicationStatus::Offer, ApplicationStatus::Negotiation, ApplicationStatus::Accepted]
        );
    }

    #[test]
    fn test_rejected_and_withdrawn_are_in_no_group() {
        for status in [ApplicationStatus::Rejected, ApplicationStatus::Withdrawn] {
            assert!(!status.is_active());
            assert!(!status.is_interviewing());
            assert!(!status.is_offer_stage());
            assert!(status.is_closed());
        }
    }

    #[test]
    fn test_status_serde_uses_snake_case() {
        let json = serde_json::to_string(&ApplicationStatus::TechnicalAssessment).unwrap();
        assert_eq!(json, "\"technical_assessment\"");
        let parsed: ApplicationStatus = serde_json::from_str("\"phone_screen\"").unwrap();
        assert_eq!(parsed, ApplicationStatus::PhoneScreen);
    }

    #[test]
    fn test_status_from_str_is_forgiving() {
        assert_eq!("Phone Screen".parse::<ApplicationStatus>(), Ok(ApplicationStatus::PhoneScreen));
        assert_eq!("technical-assessment".parse::<ApplicationStatus>(), Ok(ApplicationStatus::TechnicalAssessment));
        assert!("hired".parse::<ApplicationStatus>().is_err());
    }

    #[test]
    fn test_filter_tabs() {
        assert!(StatusFilter::All.matches(ApplicationStatus::Withdrawn));
        assert!(StatusFilter::Active.matches(ApplicationStatus::Applied));
        assert!(!StatusFilter::Active.matches(ApplicationStatus::Rejected));
        assert!(StatusFilter::Rejected.matches(ApplicationStatus::Rejected));
        assert!(!StatusFilter::Rejected.matches(ApplicationStatus::Withdrawn));
        assert!(StatusFilter::Offers.matches(ApplicationStatus::Negotiation));
        assert_eq!(StatusFilter::Rejected.next(), StatusFilter::All);
    }
}

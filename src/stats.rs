use chrono::{Duration, NaiveDate};

use crate::models::{JobApplication, RoleType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub total: usize,
    pub interviewing: usize,
    /// Interviewing applications as a rounded percentage of all applications.
    pub response_rate: u32,
    pub identified_this_week: usize,
    pub interviews_this_week: usize,
    /// Anything not rejected, withdrawn or accepted.
    pub open: usize,
}

impl DashboardStats {
    pub fn compute(applications: &[JobApplication], today: NaiveDate) -> Self {
        let week_ago = today - Duration::days(7);

        let total = applications.len();
        let interviewing = applications.iter().filter(|a| a.status.is_interviewing()).count();
        let response_rate = if total > 0 {
            ((interviewing as f64 / total as f64) * 100.0).round() as u32
        } else {
            0
        };

        let identified_this_week = applications
            .iter()
            .filter(|a| a.date_identified >= week_ago)
            .count();
        let interviews_this_week = applications
            .iter()
            .filter(|a| a.status.is_interviewing())
            .filter(|a| a.date_applied.is_some_and(|d| d >= week_ago))
            .count();
        let open = applications.iter().filter(|a| !a.status.is_closed()).count();

        Self {
            total,
            interviewing,
            response_rate,
            identified_this_week,
            interviews_this_week,
            open,
        }
    }
}

/// Application counts per role type, in role creation order. Applications
/// pointing at a role that no longer exists are counted under `None`.
pub fn per_role_type<'a>(
    roles: &'a [RoleType],
    applications: &[JobApplication],
) -> Vec<(Option<&'a RoleType>, usize)> {
    let mut counts: Vec<(Option<&RoleType>, usize)> = roles
        .iter()
        .map(|role| {
            let n = applications.iter().filter(|a| a.role_type == role.id).count();
            (Some(role), n)
        })
        .collect();

    let unknown = applications
        .iter()
        .filter(|a| !roles.iter().any(|r| r.id == a.role_type))
        .count();
    if unknown > 0 {
        counts.push((None, unknown));
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApplicationDraft, RoleTypeDraft};
    use crate::status::ApplicationStatus;
    use crate::store::Record;
    use chrono::{TimeZone, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn app(status: ApplicationStatus, identified: u32, applied: Option<u32>, role: &str) -> JobApplication {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        JobApplication::from_draft(
            format!("{}-{}", status, identified),
            ApplicationDraft {
                company: "Acme".to_string(),
                position: "Dev".to_string(),
                location: "Remote".to_string(),
                status,
                role_type: role.to_string(),
                date_identified: NaiveDate::from_ymd_opt(2024, 3, identified),
                date_applied: applied.and_then(|d| NaiveDate::from_ymd_opt(2024, 3, d)),
                ..Default::default()
            },
            now,
        )
    }

    #[test]
    fn test_empty_dashboard() {
        let stats = DashboardStats::compute(&[], today());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.response_rate, 0);
        assert_eq!(stats.open, 0);
    }

    #[test]
    fn test_dashboard_counts() {
        let apps = vec![
            app(ApplicationStatus::Applied, 1, Some(2), "r1"),
            app(ApplicationStatus::Interview, 2, Some(3), "r1"),
            app(ApplicationStatus::PhoneScreen, 10, Some(12), "r2"),
            app(ApplicationStatus::Rejected, 11, None, "r2"),
            app(ApplicationStatus::Offer, 14, Some(14), "gone"),
            app(ApplicationStatus::Accepted, 3, Some(4), "r1"),
        ];
        let stats = DashboardStats::compute(&apps, today());
        assert_eq!(stats.total, 6);
        assert_eq!(stats.interviewing, 2);
        assert_eq!(stats.response_rate, 33);
        // Week window starts 2024-03-08.
        assert_eq!(stats.identified_this_week, 3);
        assert_eq!(stats.interviews_this_week, 1);
        assert_eq!(stats.open, 4);
    }

    #[test]
    fn test_per_role_type_counts_dangling_separately() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let role = |id: &str| {
            RoleType::from_draft(
                id.to_string(),
                RoleTypeDraft {
                    title: id.to_string(),
                    industry: "Software".to_string(),
                    ..Default::default()
                },
                now,
            )
        };
        let roles = vec![role("r1"), role("r2"), role("r3")];
        let apps = vec![
            app(ApplicationStatus::Applied, 1, None, "r1"),
            app(ApplicationStatus::Applied, 2, None, "r1"),
            app(ApplicationStatus::Applied, 3, None, "r2"),
            app(ApplicationStatus::Applied, 4, None, "deleted"),
        ];
        let counts: Vec<(Option<&str>, usize)> = per_role_type(&roles, &apps)
            .into_iter()
            .map(|(r, n)| (r.map(|r| r.id.as_str()), n))
            .collect();
        assert_eq!(
            counts,
            vec![(Some("r1"), 2), (Some("r2"), 1), (Some("r3"), 0), (None, 1)]
        );
    }
}

use chrono::{DateTime, Duration, Utc};
use hireboard_console::applications::{
    ApplicationId, ApplicationRecord, ApplicationStatus, InMemoryApplicationsBackend, JobId,
    ResumeRef,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) const DEFAULT_SEED_COUNT: usize = 60;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

struct Opening {
    job_id: &'static str,
    title: &'static str,
    skills: &'static [&'static str],
}

const OPENINGS: [Opening; 4] = [
    Opening {
        job_id: "job-backend",
        title: "Backend Engineer",
        skills: &["Rust", "PostgreSQL", "Kafka"],
    },
    Opening {
        job_id: "job-design",
        title: "Product Designer",
        skills: &["Figma", "User Research"],
    },
    Opening {
        job_id: "job-support",
        title: "Support Specialist",
        skills: &["Zendesk", "Spanish"],
    },
    Opening {
        job_id: "job-data",
        title: "Data Analyst",
        skills: &["SQL", "Python", "Looker"],
    },
];

const FIRST_NAMES: [&str; 8] = [
    "Ana", "Bilal", "Chen", "Dara", "Emeka", "Freya", "Goran", "Hana",
];
const LAST_NAMES: [&str; 6] = ["Okafor", "Lindqvist", "Moreau", "Tanaka", "Reyes", "Novak"];

/// Most applicants are still early in the funnel.
const STATUS_MIX: [ApplicationStatus; 10] = [
    ApplicationStatus::Pending,
    ApplicationStatus::Pending,
    ApplicationStatus::Pending,
    ApplicationStatus::Reviewing,
    ApplicationStatus::Reviewing,
    ApplicationStatus::Shortlisted,
    ApplicationStatus::Interview,
    ApplicationStatus::Offer,
    ApplicationStatus::Hired,
    ApplicationStatus::Rejected,
];

/// Deterministic sample applications spread over roughly the last four months.
pub(crate) fn sample_applications(count: usize, now: DateTime<Utc>) -> Vec<ApplicationRecord> {
    (0..count)
        .map(|n| {
            let opening = &OPENINGS[n % OPENINGS.len()];
            let first = FIRST_NAMES[n % FIRST_NAMES.len()];
            let last = LAST_NAMES[(n / FIRST_NAMES.len()) % LAST_NAMES.len()];
            ApplicationRecord {
                id: ApplicationId(format!("app-{:04}", n + 1)),
                applicant_name: format!("{first} {last}"),
                applicant_email: format!(
                    "{}.{}{}@example.test",
                    first.to_lowercase(),
                    last.to_lowercase(),
                    n + 1
                ),
                job_id: Some(JobId::new(opening.job_id)),
                job_title: opening.title.to_string(),
                status: STATUS_MIX[(n * 7) % STATUS_MIX.len()],
                applied_at: now - Duration::hours((n as i64) * 47),
                skills: opening.skills.iter().map(|skill| skill.to_string()).collect(),
                resume_ref: (n % 5 != 0)
                    .then(|| ResumeRef(format!("resumes/app-{:04}.pdf", n + 1))),
            }
        })
        .collect()
}

pub(crate) fn seeded_backend(count: usize) -> InMemoryApplicationsBackend {
    InMemoryApplicationsBackend::new(sample_applications(count, Utc::now()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn sample_ids_are_unique_and_every_status_appears() {
        let now = Utc::now();
        let records = sample_applications(DEFAULT_SEED_COUNT, now);

        let ids: BTreeSet<_> = records.iter().map(|record| record.id.clone()).collect();
        assert_eq!(ids.len(), DEFAULT_SEED_COUNT);

        let statuses: BTreeSet<_> = records.iter().map(|record| record.status).collect();
        assert_eq!(statuses.len(), ApplicationStatus::ALL.len());
        assert!(records.iter().all(|record| record.applied_at <= now));
    }
}

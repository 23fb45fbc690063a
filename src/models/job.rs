use serde::Serialize;

/// Job display metadata. Read-only to the core, which only needs the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobInfo {
    pub id: String,
    pub reg: String,
    pub in_date: String,
    pub customer: String,
    pub desc: String,
}

impl JobInfo {
    pub fn new(id: &str, reg: &str, in_date: &str, customer: &str, desc: &str) -> Self {
        Self {
            id: id.to_string(),
            reg: reg.to_string(),
            in_date: in_date.to_string(),
            customer: customer.to_string(),
            desc: desc.to_string(),
        }
    }

    /// Case-insensitive search over id, registration and customer
    pub fn matches(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return true;
        }
        self.id.to_lowercase().contains(&q)
            || self.reg.to_lowercase().contains(&q)
            || self.customer.to_lowercase().contains(&q)
    }
}

const LOREM: &str = "Lorem Ipsum is simply dummy text of the printing and typesetting industry.";

/// Jobs on the lot
pub fn default_roster() -> Vec<JobInfo> {
    vec![
        JobInfo::new("GY545476788", "SB66HLF", "16 Jan", "Mr Tom Jones", LOREM),
        JobInfo::new("GY545476789", "SB66HLG", "16 Jan", "Mr Tom Jones", LOREM),
        JobInfo::new("GY545476790", "SB66HLH", "16 Jan", "Mr Tom Jones", LOREM),
        JobInfo::new("GY545476791", "SB66HLJ", "16 Jan", "Mr Tom Jones", LOREM),
    ]
}

/// Ids of the default roster, in order
pub fn default_job_ids() -> Vec<String> {
    default_roster().into_iter().map(|j| j.id).collect()
}

/// Overall job status derived from its stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JobStatus {
    NotStarted,
    InProgress,
    Paused,
    Completed,
}

impl JobStatus {
    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::NotStarted => "NOT STARTED",
            JobStatus::InProgress => "IN PROGRESS",
            JobStatus::Paused => "PAUSED",
            JobStatus::Completed => "COMPLETED",
        }
    }
}

//! Summary statistics over the schedule collection.
//!
//! Everything here is a pure function of its inputs.

use serde::{Deserialize, Serialize};

use crate::model::{Role, Schedule, ScheduleDetails, ScheduleStatus, User};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicianSummary {
    pub technician_id: String,
    pub technician_name: String,
    pub total: usize,
    pub completed: usize,
}

impl TechnicianSummary {
    /// Share of this technician's schedules that are completed
    pub fn efficiency(&self) -> f64 {
        percentage(self.completed, self.total)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepresentativeSummary {
    pub representative_id: String,
    pub representative_name: String,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: ScheduleStatus,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    pub total_schedules: usize,
    pub completed_schedules: usize,
    pub pending_schedules: usize,
    pub cancelled_schedules: usize,
    /// Mean hours between creation and completion of completed schedules
    pub average_completion_time: f64,
    pub schedules_by_technician: Vec<TechnicianSummary>,
    pub schedules_by_representative: Vec<RepresentativeSummary>,
    /// One entry per status, in `ScheduleStatus::ALL` order
    pub schedules_by_status: Vec<StatusCount>,
}

impl ReportData {
    pub fn completion_rate(&self) -> f64 {
        percentage(self.completed_schedules, self.total_schedules)
    }

    pub fn pending_rate(&self) -> f64 {
        percentage(self.pending_schedules, self.total_schedules)
    }

    pub fn status_count(&self, status: ScheduleStatus) -> usize {
        self.schedules_by_status
            .iter()
            .find(|entry| entry.status == status)
            .map(|entry| entry.count)
            .unwrap_or(0)
    }

    pub fn status_percentage(&self, status: ScheduleStatus) -> f64 {
        percentage(self.status_count(status), self.total_schedules)
    }
}

/// `part / total * 100`, or 0 when `total` is 0
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

fn count_status<'a>(schedules: impl IntoIterator<Item = &'a Schedule>, status: ScheduleStatus) -> usize {
    schedules.into_iter().filter(|s| s.status == status).count()
}

/// Aggregate schedules into the report shown on the dashboard and reports views
pub fn aggregate(schedules: &[Schedule], users: &[User]) -> ReportData {
    let schedules_by_technician = users
        .iter()
        .filter(|user| user.role == Role::Technician)
        .map(|technician| {
            let assigned: Vec<&Schedule> = schedules
                .iter()
                .filter(|s| s.technician_id == technician.id)
                .collect();
            TechnicianSummary {
                technician_id: technician.id.clone(),
                technician_name: technician.name.clone(),
                total: assigned.len(),
                completed: count_status(assigned, ScheduleStatus::Completed),
            }
        })
        .collect();

    let schedules_by_representative = users
        .iter()
        .filter(|user| user.role == Role::Representative)
        .map(|rep| RepresentativeSummary {
            representative_id: rep.id.clone(),
            representative_name: rep.name.clone(),
            total: schedules.iter().filter(|s| s.representative_id == rep.id).count(),
        })
        .collect();

    let schedules_by_status = ScheduleStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            status,
            count: count_status(schedules, status),
        })
        .collect();

    ReportData {
        total_schedules: schedules.len(),
        completed_schedules: count_status(schedules, ScheduleStatus::Completed),
        pending_schedules: count_status(schedules, ScheduleStatus::Pending),
        cancelled_schedules: count_status(schedules, ScheduleStatus::Cancelled),
        average_completion_time: average_completion_hours(schedules),
        schedules_by_technician,
        schedules_by_representative,
        schedules_by_status,
    }
}

fn average_completion_hours(schedules: &[Schedule]) -> f64 {
    let durations: Vec<f64> = schedules
        .iter()
        .filter(|s| s.status == ScheduleStatus::Completed)
        .filter_map(|s| s.completed_at.map(|done| done - s.created_at))
        .map(|elapsed| elapsed.num_minutes() as f64 / 60.0)
        .collect();

    if durations.is_empty() {
        return 0.0;
    }
    durations.iter().sum::<f64>() / durations.len() as f64
}

/// Number of schedules listed on the dashboard
pub const RECENT_SCHEDULES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub report: ReportData,
    /// Most recently created first
    pub recent_schedules: Vec<ScheduleDetails>,
}

/// Build the dashboard from the report and the resolved schedules
pub fn dashboard(report: ReportData, mut schedules: Vec<ScheduleDetails>) -> DashboardSummary {
    schedules.sort_by(|a, b| b.schedule.created_at.cmp(&a.schedule.created_at));
    schedules.truncate(RECENT_SCHEDULES);
    DashboardSummary {
        report,
        recent_schedules: schedules,
    }
}

/// Head counts shown on the user management view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub total: usize,
    pub admins: usize,
    pub representatives: usize,
    pub technicians: usize,
    pub active: usize,
    pub inactive: usize,
}

impl UserStats {
    pub fn from_users(users: &[User]) -> Self {
        let by_role = |role: Role| users.iter().filter(|u| u.role == role).count();
        let active = users.iter().filter(|u| u.is_active).count();
        Self {
            total: users.len(),
            admins: by_role(Role::Admin),
            representatives: by_role(Role::Representative),
            technicians: by_role(Role::Technician),
            active,
            inactive: users.len() - active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};

    fn user(id: &str, name: &str, role: Role) -> User {
        User {
            id: id.to_string(),
            name: name.to_string(),
            email: format!("{}@rastreador.com", id),
            role,
            phone: None,
            created_at: Utc::now(),
            is_active: true,
        }
    }

    fn schedule(id: &str, technician: &str, status: ScheduleStatus) -> Schedule {
        let created_at = Utc.with_ymd_and_hms(2024, 6, 20, 10, 0, 0).unwrap();
        Schedule {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, 25).unwrap(),
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            customer_id: "1".to_string(),
            technician_id: technician.to_string(),
            representative_id: "2".to_string(),
            equipment_id: "1".to_string(),
            status,
            observations: None,
            completed_at: (status == ScheduleStatus::Completed).then(|| created_at + Duration::hours(3)),
            created_at,
            updated_at: created_at,
        }
    }

    fn users() -> Vec<User> {
        vec![
            user("1", "João Silva", Role::Admin),
            user("2", "Maria Santos", Role::Representative),
            user("3", "Carlos Oliveira", Role::Technician),
            user("4", "Ana Costa", Role::Technician),
        ]
    }

    #[test]
    fn test_aggregate_one_of_each() {
        let schedules = vec![
            schedule("1", "3", ScheduleStatus::Scheduled),
            schedule("2", "4", ScheduleStatus::InProgress),
            schedule("3", "3", ScheduleStatus::Completed),
            schedule("4", "3", ScheduleStatus::Pending),
        ];
        let report = aggregate(&schedules, &users());

        assert_eq!(report.total_schedules, 4);
        assert_eq!(report.completed_schedules, 1);
        assert_eq!(report.pending_schedules, 1);
        assert_eq!(report.cancelled_schedules, 0);

        let counts: Vec<(ScheduleStatus, usize)> = report
            .schedules_by_status
            .iter()
            .map(|entry| (entry.status, entry.count))
            .collect();
        assert_eq!(
            counts,
            vec![
                (ScheduleStatus::Pending, 1),
                (ScheduleStatus::Scheduled, 1),
                (ScheduleStatus::InProgress, 1),
                (ScheduleStatus::Completed, 1),
                (ScheduleStatus::Cancelled, 0),
            ]
        );

        assert_eq!(report.schedules_by_technician.len(), 2);
        let carlos = &report.schedules_by_technician[0];
        assert_eq!((carlos.total, carlos.completed), (3, 1));
        assert!((carlos.efficiency() - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(report.schedules_by_representative[0].total, 4);
        assert!((report.average_completion_time - 3.0).abs() < 1e-9);
        assert!((report.completion_rate() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_status_counts_sum_to_total() {
        let statuses = [
            ScheduleStatus::Cancelled,
            ScheduleStatus::Cancelled,
            ScheduleStatus::Completed,
            ScheduleStatus::Pending,
            ScheduleStatus::Scheduled,
            ScheduleStatus::Completed,
            ScheduleStatus::InProgress,
        ];
        for n in 0..=statuses.len() {
            let schedules: Vec<Schedule> = statuses[..n]
                .iter()
                .enumerate()
                .map(|(i, status)| schedule(&i.to_string(), "3", *status))
                .collect();
            let report = aggregate(&schedules, &users());
            let sum: usize = report.schedules_by_status.iter().map(|e| e.count).sum();
            assert_eq!(sum, report.total_schedules);
            assert_eq!(report.schedules_by_status.len(), ScheduleStatus::ALL.len());
        }
    }

    #[test]
    fn test_empty_collection_has_zero_percentages() {
        let report = aggregate(&[], &users());
        assert_eq!(report.total_schedules, 0);
        assert_eq!(report.completion_rate(), 0.0);
        assert_eq!(report.pending_rate(), 0.0);
        assert_eq!(report.status_percentage(ScheduleStatus::Pending), 0.0);
        assert_eq!(report.average_completion_time, 0.0);
        assert!(report.schedules_by_technician.iter().all(|t| t.efficiency() == 0.0));
    }

    #[test]
    fn test_user_stats() {
        let mut all = users();
        all[3].is_active = false;
        let stats = UserStats::from_users(&all);
        assert_eq!(
            stats,
            UserStats {
                total: 4,
                admins: 1,
                representatives: 1,
                technicians: 2,
                active: 3,
                inactive: 1,
            }
        );
    }
}

//! In-memory record store.
//!
//! Records are append-only: users and schedules can be inserted, nothing is
//! updated or deleted. Schedules reference other records by id and are
//! resolved to `ScheduleDetails` when read.

use std::sync::Arc;

use chrono::Utc;
use shared::report::{self, ReportData};
use shared::validate::non_blank;
use shared::{
    new_record_id, Customer, Equipment, EquipmentStatus, NewSchedule, NewUser, Role, Schedule,
    ScheduleDetails, ScheduleQuery, ScheduleStatus, User, UserQuery, ValidationError,
};
use tokio::sync::RwLock;

pub mod seed;

#[derive(Debug, Default)]
pub struct Records {
    pub users: Vec<User>,
    pub credentials: Vec<Credential>,
    pub customers: Vec<Customer>,
    pub equipment: Vec<Equipment>,
    pub schedules: Vec<Schedule>,
}

impl Records {
    fn resolve(&self, schedule: &Schedule) -> Option<ScheduleDetails> {
        let customer = self.customers.iter().find(|c| c.id == schedule.customer_id)?;
        let technician = self.users.iter().find(|u| u.id == schedule.technician_id)?;
        let representative = self.users.iter().find(|u| u.id == schedule.representative_id)?;
        let equipment = self.equipment.iter().find(|e| e.id == schedule.equipment_id)?;
        Some(ScheduleDetails {
            schedule: schedule.clone(),
            customer: customer.clone(),
            technician: technician.clone(),
            representative: representative.clone(),
            equipment: equipment.clone(),
        })
    }

    fn resolve_all<'a>(&self, schedules: impl Iterator<Item = &'a Schedule>) -> Vec<ScheduleDetails> {
        schedules
            .filter_map(|schedule| {
                let details = self.resolve(schedule);
                if details.is_none() {
                    tracing::warn!("Schedule {} has dangling references, skipping", schedule.id);
                }
                details
            })
            .collect()
    }

    /// Taken by a user record or by a login of the roster
    fn email_taken(&self, email: &str) -> bool {
        self.users.iter().any(|u| u.email.eq_ignore_ascii_case(email))
            || self.credentials.iter().any(|c| c.login.eq_ignore_ascii_case(email))
    }
}

/// A login identity and the argon2 PHC hash of its password
#[derive(Debug, Clone)]
pub struct Credential {
    pub login: String,
    pub user_id: String,
    pub password_hash: String,
}

/// A login identity resolved to the principal it authenticates as
#[derive(Debug, Clone)]
pub struct RosterEntry {
    pub login: String,
    pub user: User,
    pub password_hash: String,
}

#[derive(Clone)]
pub struct Repository {
    records: Arc<RwLock<Records>>,
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn search_term(search: &Option<String>) -> Option<String> {
    non_blank(search.clone()).map(|s| s.to_lowercase())
}

impl Repository {
    pub fn new(records: Records) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    /// Repository holding the demonstration dataset. `hash` turns each seed
    /// password into its stored form.
    pub fn seeded<E>(hash: impl Fn(&str) -> Result<String, E>) -> Result<Self, E> {
        let mut credentials = Vec::new();
        for (login, user_id, password) in seed::SEED_LOGINS {
            credentials.push(Credential {
                login: login.to_string(),
                user_id: user_id.to_string(),
                password_hash: hash(password)?,
            });
        }

        let records = Records {
            users: seed::users(),
            credentials,
            customers: seed::customers(),
            equipment: seed::equipment_units(),
            schedules: seed::schedules(),
        };
        tracing::info!(
            "Seeded {} users, {} customers, {} equipment units, {} schedules",
            records.users.len(),
            records.customers.len(),
            records.equipment.len(),
            records.schedules.len()
        );
        Ok(Self::new(records))
    }

    // User operations
    pub async fn get_user(&self, id: &str) -> Option<User> {
        let records = self.records.read().await;
        records.users.iter().find(|u| u.id == id).cloned()
    }

    pub async fn all_users(&self) -> Vec<User> {
        self.records.read().await.users.clone()
    }

    pub async fn list_users(&self, query: &UserQuery) -> Vec<User> {
        let search = search_term(&query.search);
        let records = self.records.read().await;
        records
            .users
            .iter()
            .filter(|user| {
                search.as_deref().map_or(true, |term| {
                    contains_ci(&user.name, term) || contains_ci(&user.email, term)
                })
            })
            .filter(|user| query.role.map_or(true, |role| user.role == role))
            .cloned()
            .collect()
    }

    pub async fn email_taken(&self, email: &str) -> bool {
        self.records.read().await.email_taken(email.trim())
    }

    /// Every login whose user exists, in roster order
    pub async fn roster(&self) -> Vec<RosterEntry> {
        let records = self.records.read().await;
        records
            .credentials
            .iter()
            .filter_map(|credential| {
                let user = records.users.iter().find(|u| u.id == credential.user_id)?;
                Some(RosterEntry {
                    login: credential.login.clone(),
                    user: user.clone(),
                    password_hash: credential.password_hash.clone(),
                })
            })
            .collect()
    }

    /// Insert a validated user. New users are active and listed first.
    pub async fn insert_user(&self, new: NewUser, password_hash: String) -> Result<User, ValidationError> {
        new.validate()?;
        let role = new.role.ok_or(ValidationError::MissingField("role"))?;

        let mut records = self.records.write().await;
        let email = new.email.trim().to_string();
        if records.email_taken(&email) {
            return Err(ValidationError::DuplicateEmail);
        }

        let user = User {
            id: new_record_id(),
            name: new.name.trim().to_string(),
            email,
            role,
            phone: non_blank(new.phone),
            created_at: Utc::now(),
            is_active: true,
        };
        records.credentials.push(Credential {
            login: user.email.clone(),
            user_id: user.id.clone(),
            password_hash,
        });
        records.users.insert(0, user.clone());
        tracing::info!("User created: {} ({})", user.email, user.role);
        Ok(user)
    }

    // Catalog operations
    pub async fn customers(&self) -> Vec<Customer> {
        self.records.read().await.customers.clone()
    }

    pub async fn equipment(&self, status: Option<EquipmentStatus>) -> Vec<Equipment> {
        let records = self.records.read().await;
        records
            .equipment
            .iter()
            .filter(|e| status.map_or(true, |status| e.status == status))
            .cloned()
            .collect()
    }

    pub async fn technicians(&self) -> Vec<User> {
        self.list_users(&UserQuery {
            search: None,
            role: Some(Role::Technician),
        })
        .await
    }

    // Schedule operations
    pub async fn schedule_records(&self) -> Vec<Schedule> {
        self.records.read().await.schedules.clone()
    }

    pub async fn all_schedules(&self) -> Vec<ScheduleDetails> {
        let records = self.records.read().await;
        records.resolve_all(records.schedules.iter())
    }

    /// Schedules matching the free-text search (customer, technician or
    /// equipment serial) and status filter
    pub async fn list_schedules(&self, query: &ScheduleQuery) -> Vec<ScheduleDetails> {
        let search = search_term(&query.search);
        self.all_schedules()
            .await
            .into_iter()
            .filter(|details| {
                search.as_deref().map_or(true, |term| {
                    contains_ci(&details.customer.name, term)
                        || contains_ci(&details.technician.name, term)
                        || contains_ci(&details.equipment.serial_number, term)
                })
            })
            .filter(|details| query.status.map_or(true, |s| details.schedule.status == s))
            .collect()
    }

    /// Insert a schedule created by `representative_id`. Every reference must
    /// resolve and the technician must have the technician role.
    pub async fn insert_schedule(
        &self,
        new: NewSchedule,
        representative_id: &str,
    ) -> Result<ScheduleDetails, ValidationError> {
        new.validate()?;
        let (Some(date), Some(time)) = (new.date, new.time) else {
            return Err(ValidationError::MissingField("date"));
        };

        let mut records = self.records.write().await;

        let unknown = |kind: &'static str, id: &str| ValidationError::UnknownReference {
            kind,
            id: id.to_string(),
        };
        if !records.customers.iter().any(|c| c.id == new.customer_id) {
            return Err(unknown("customer", &new.customer_id));
        }
        let technician = records
            .users
            .iter()
            .find(|u| u.id == new.technician_id)
            .ok_or_else(|| unknown("technician", &new.technician_id))?;
        if technician.role != Role::Technician {
            return Err(ValidationError::NotATechnician(technician.id.clone()));
        }
        if !records.equipment.iter().any(|e| e.id == new.equipment_id) {
            return Err(unknown("equipment", &new.equipment_id));
        }
        if !records.users.iter().any(|u| u.id == representative_id) {
            return Err(unknown("representative", representative_id));
        }

        let now = Utc::now();
        let schedule = Schedule {
            id: new_record_id(),
            date,
            time,
            customer_id: new.customer_id,
            technician_id: new.technician_id,
            representative_id: representative_id.to_string(),
            equipment_id: new.equipment_id,
            status: ScheduleStatus::Pending,
            observations: non_blank(new.observations),
            completed_at: None,
            created_at: now,
            updated_at: now,
        };
        let details = records
            .resolve(&schedule)
            .ok_or_else(|| unknown("schedule", &schedule.id))?;
        records.schedules.push(schedule);
        tracing::info!("Schedule created: {}", details.schedule.id);
        Ok(details)
    }

    pub async fn report(&self) -> ReportData {
        let records = self.records.read().await;
        report::aggregate(&records.schedules, &records.users)
    }
}

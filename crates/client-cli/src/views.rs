//! Commands for the authorized views, printed to the terminal.

use anyhow::Result;
use reqwest::StatusCode;
use shared::{
    export, report::percentage, EquipmentStatus, ExportFormat, NewSchedule, NewUser, Role,
    ScheduleDetails, ScheduleQuery, ScheduleStatus, UserQuery,
};
use std::path::PathBuf;

use crate::api::{ApiClient, ApiError};

const DATE_FORMAT: &str = "%d/%m/%Y";

fn status_color(status: ScheduleStatus) -> &'static str {
    match status {
        ScheduleStatus::Pending => "\x1b[33m",
        ScheduleStatus::Scheduled => "\x1b[34m",
        ScheduleStatus::InProgress => "\x1b[35m",
        ScheduleStatus::Completed => "\x1b[32m",
        ScheduleStatus::Cancelled => "\x1b[31m",
    }
}

fn format_percentage(value: f64) -> String {
    format!("{:.1}%", value)
}

fn schedule_line(details: &ScheduleDetails) -> String {
    let schedule = &details.schedule;
    format!(
        "#{:<4} {} {}  {:<24} {:<20} {:<10} {}{}\x1b[0m",
        schedule.id,
        schedule.date.format(DATE_FORMAT),
        schedule.time.format(shared::model::time_of_day::FORMAT),
        details.customer.name,
        details.technician.name,
        details.equipment.serial_number,
        status_color(schedule.status),
        schedule.status.label(),
    )
}

fn header(title: &str) {
    println!();
    println!("\x1b[1;36m{}\x1b[0m", title);
}

pub async fn dashboard(api: &ApiClient) -> Result<()> {
    let summary = api.dashboard().await?;
    let report = &summary.report;

    header("Dashboard");
    println!("Total de agendamentos: {}", report.total_schedules);
    println!(
        "Concluídos: {} ({})",
        report.completed_schedules,
        format_percentage(report.completion_rate())
    );
    println!(
        "Pendentes: {} ({})",
        report.pending_schedules,
        format_percentage(report.pending_rate())
    );
    println!("Tempo médio de conclusão: {:.1}h", report.average_completion_time);

    header("Agendamentos recentes");
    if summary.recent_schedules.is_empty() {
        println!("\x1b[90mNenhum agendamento\x1b[0m");
    }
    for details in &summary.recent_schedules {
        println!("{}", schedule_line(details));
    }
    Ok(())
}

pub async fn list_schedules(api: &ApiClient, query: &ScheduleQuery) -> Result<()> {
    let list = api.schedules(query).await?;

    header("Agendamentos");
    for details in &list.schedules {
        println!("{}", schedule_line(details));
    }
    println!(
        "\x1b[90m{} de {} agendamentos\x1b[0m",
        list.schedules.len(),
        list.total
    );
    Ok(())
}

pub async fn create_schedule(api: &ApiClient, schedule: NewSchedule) -> Result<()> {
    schedule.validate()?;
    let created = api.create_schedule(&schedule).await?;
    println!("\x1b[32m✅ Agendamento criado\x1b[0m");
    println!("{}", schedule_line(&created));
    Ok(())
}

pub async fn list_users(api: &ApiClient, query: &UserQuery) -> Result<()> {
    let list = api.users(query).await?;
    let stats = &list.stats;

    header("Usuários");
    for user in &list.users {
        let active = if user.is_active { "\x1b[32mAtivo\x1b[0m" } else { "\x1b[31mInativo\x1b[0m" };
        println!(
            "[{:<3}] {:<20} {:<32} {:<14} {:<16} {}",
            user.initials(),
            user.name,
            user.email,
            user.role.label(),
            user.phone.as_deref().unwrap_or("-"),
            active
        );
    }
    println!(
        "\x1b[90mTotal {} · {} {} · {} {} · {} {} · {} ativos\x1b[0m",
        stats.total,
        stats.admins,
        Role::Admin.label(),
        stats.representatives,
        Role::Representative.label(),
        stats.technicians,
        Role::Technician.label(),
        stats.active
    );
    Ok(())
}

pub async fn create_user(api: &ApiClient, user: NewUser) -> Result<()> {
    user.validate()?;
    let created = api.create_user(&user).await?;
    println!("\x1b[32m✅ Usuário criado\x1b[0m");
    println!("{} <{}> ({})", created.name, created.email, created.role.label());
    Ok(())
}

pub async fn customers(api: &ApiClient) -> Result<()> {
    header("Clientes");
    for customer in api.customers().await? {
        println!("#{:<4} {:<24} {:<16} {}", customer.id, customer.name, customer.phone, customer.address);
        if let Some(vehicle) = &customer.vehicle {
            let year = vehicle.year.map(|y| format!(" {}", y)).unwrap_or_default();
            println!(
                "      \x1b[90m{} {} {}{}\x1b[0m",
                vehicle.plate, vehicle.brand, vehicle.model, year
            );
        }
    }
    Ok(())
}

pub async fn equipment(api: &ApiClient, status: Option<EquipmentStatus>) -> Result<()> {
    header("Equipamentos");
    for unit in api.equipment(status).await? {
        println!(
            "#{:<4} {:<12} {:<16} {}",
            unit.id,
            unit.serial_number,
            unit.model,
            unit.status.label()
        );
    }
    Ok(())
}

pub async fn technicians(api: &ApiClient) -> Result<()> {
    header("Técnicos");
    for technician in api.technicians().await? {
        println!(
            "#{:<4} {:<20} {}",
            technician.id,
            technician.name,
            technician.phone.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub async fn report(api: &ApiClient) -> Result<()> {
    let report = api.report().await?;

    header("Relatório");
    println!("Total: {}", report.total_schedules);
    println!("Taxa de conclusão: {}", format_percentage(report.completion_rate()));
    println!("Cancelados: {}", report.cancelled_schedules);
    println!("Tempo médio de conclusão: {:.1}h", report.average_completion_time);

    header("Por status");
    for entry in &report.schedules_by_status {
        println!(
            "{}{:<14}\x1b[0m {:>3}  {}",
            status_color(entry.status),
            entry.status.label(),
            entry.count,
            format_percentage(percentage(entry.count, report.total_schedules))
        );
    }

    header("Por técnico");
    for technician in &report.schedules_by_technician {
        println!(
            "{:<20} {:>3} total  {:>3} concluídos  {} eficiência",
            technician.technician_name,
            technician.total,
            technician.completed,
            format_percentage(technician.efficiency())
        );
    }

    header("Por representante");
    for rep in &report.schedules_by_representative {
        println!("{:<20} {:>3} agendamentos", rep.representative_name, rep.total);
    }
    Ok(())
}

pub async fn export(api: &ApiClient, format: ExportFormat, output: Option<PathBuf>) -> Result<()> {
    let file = match api.export(format).await {
        Ok(file) => file,
        Err(ApiError::Status {
            status: StatusCode::NOT_IMPLEMENTED,
            message,
        }) => {
            println!("\x1b[33m⚠ {}\x1b[0m", message);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let path = output.unwrap_or_else(|| {
        PathBuf::from(
            file.file_name
                .unwrap_or_else(|| export::file_name(format, chrono::Local::now().date_naive())),
        )
    });
    std::fs::write(&path, &file.content)?;

    let rows = file.content.lines().count().saturating_sub(1);
    tracing::info!("Wrote {} rows to {}", rows, path.display());
    println!("\x1b[32m✅ Exported {} schedules to {}\x1b[0m", rows, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
    use shared::{Customer, Equipment, Schedule, User};

    fn person(id: &str, name: &str, role: Role) -> User {
        User {
            id: id.to_string(),
            name: name.to_string(),
            email: format!("{}@rastreador.com", id),
            role,
            phone: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            is_active: true,
        }
    }

    #[test]
    fn test_schedule_line() {
        let created_at = Utc.with_ymd_and_hms(2024, 6, 20, 10, 0, 0).unwrap();
        let details = ScheduleDetails {
            schedule: Schedule {
                id: "1".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 6, 25).unwrap(),
                time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                customer_id: "1".to_string(),
                technician_id: "3".to_string(),
                representative_id: "2".to_string(),
                equipment_id: "1".to_string(),
                status: ScheduleStatus::InProgress,
                observations: None,
                completed_at: None,
                created_at,
                updated_at: created_at,
            },
            customer: Customer {
                id: "1".to_string(),
                name: "Empresa ABC Ltda".to_string(),
                phone: "(11) 3333-4444".to_string(),
                address: "Rua das Flores, 123".to_string(),
                vehicle: None,
            },
            technician: person("3", "Carlos Oliveira", Role::Technician),
            representative: person("2", "Maria Santos", Role::Representative),
            equipment: Equipment {
                id: "1".to_string(),
                serial_number: "TRK001234".to_string(),
                model: "GPS Pro 4G".to_string(),
                status: EquipmentStatus::Assigned,
                assigned_to: Some("3".to_string()),
            },
        };

        let line = schedule_line(&details);
        assert!(line.contains("25/06/2024 09:00"));
        assert!(line.contains("Empresa ABC Ltda"));
        assert!(line.contains("TRK001234"));
        assert!(line.contains(ScheduleStatus::InProgress.label()));
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(percentage(1, 4)), "25.0%");
        assert_eq!(format_percentage(percentage(0, 0)), "0.0%");
    }
}

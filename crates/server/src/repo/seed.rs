//! Demonstration dataset loaded at startup.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use shared::{
    Customer, Equipment, EquipmentStatus, Role, Schedule, ScheduleStatus, User, Vehicle,
};

/// Demo logins as (login email, user id, password). The technician logs in
/// with a shared demo address and acts as Carlos Oliveira; Ana Costa has no login.
pub const SEED_LOGINS: [(&str, &str, &str); 3] = [
    ("admin@rastreador.com", "1", "admin123"),
    ("representante@rastreador.com", "2", "rep123"),
    ("tecnico@rastreador.com", "3", "tec123"),
];

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0)
        .single()
        .unwrap_or_default()
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn at(h: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, min, 0).unwrap_or_default()
}

fn user(id: &str, name: &str, email: &str, role: Role, phone: &str, created_at: DateTime<Utc>) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        role,
        phone: Some(phone.to_string()),
        created_at,
        is_active: true,
    }
}

pub fn users() -> Vec<User> {
    vec![
        user("1", "João Silva", "admin@rastreador.com", Role::Admin, "(11) 99999-9999", utc(2024, 1, 1, 0, 0)),
        user("2", "Maria Santos", "representante@rastreador.com", Role::Representative, "(11) 88888-8888", utc(2024, 1, 15, 0, 0)),
        user("3", "Carlos Oliveira", "tecnico1@rastreador.com", Role::Technician, "(11) 77777-7777", utc(2024, 2, 1, 0, 0)),
        user("4", "Ana Costa", "tecnico2@rastreador.com", Role::Technician, "(11) 66666-6666", utc(2024, 2, 15, 0, 0)),
    ]
}

fn vehicle(plate: &str, model: &str, brand: &str, year: u16) -> Option<Vehicle> {
    Some(Vehicle {
        plate: plate.to_string(),
        model: model.to_string(),
        brand: brand.to_string(),
        year: Some(year),
    })
}

pub fn customers() -> Vec<Customer> {
    vec![
        Customer {
            id: "1".to_string(),
            name: "Empresa ABC Ltda".to_string(),
            phone: "(11) 3333-4444".to_string(),
            address: "Rua das Flores, 123 - São Paulo/SP".to_string(),
            vehicle: vehicle("ABC-1234", "Corolla", "Toyota", 2022),
        },
        Customer {
            id: "2".to_string(),
            name: "José Pereira".to_string(),
            phone: "(11) 9999-8888".to_string(),
            address: "Av. Paulista, 456 - São Paulo/SP".to_string(),
            vehicle: vehicle("XYZ-9876", "Civic", "Honda", 2023),
        },
        Customer {
            id: "3".to_string(),
            name: "Transportadora XYZ".to_string(),
            phone: "(11) 7777-6666".to_string(),
            address: "Rua Industrial, 789 - Guarulhos/SP".to_string(),
            vehicle: vehicle("TRK-5555", "Accelo", "Mercedes-Benz", 2021),
        },
    ]
}

fn equipment(id: &str, serial: &str, model: &str, status: EquipmentStatus, assigned_to: Option<&str>) -> Equipment {
    Equipment {
        id: id.to_string(),
        serial_number: serial.to_string(),
        model: model.to_string(),
        status,
        assigned_to: assigned_to.map(str::to_string),
    }
}

pub fn equipment_units() -> Vec<Equipment> {
    vec![
        equipment("1", "TRK001234", "GPS Pro 4G", EquipmentStatus::Assigned, Some("3")),
        equipment("2", "TRK005678", "GPS Basic 3G", EquipmentStatus::Installed, None),
        equipment("3", "TRK009876", "GPS Pro 4G", EquipmentStatus::Available, None),
        equipment("4", "TRK004321", "GPS Advanced 5G", EquipmentStatus::Assigned, Some("4")),
    ]
}

pub fn schedules() -> Vec<Schedule> {
    let schedule = |id: &str,
                    date: NaiveDate,
                    time: NaiveTime,
                    customer: &str,
                    technician: &str,
                    equipment: &str,
                    status: ScheduleStatus| Schedule {
        id: id.to_string(),
        date,
        time,
        customer_id: customer.to_string(),
        technician_id: technician.to_string(),
        representative_id: "2".to_string(),
        equipment_id: equipment.to_string(),
        status,
        observations: None,
        completed_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    vec![
        Schedule {
            observations: Some("Cliente solicitou instalação no período da manhã. Veículo estará disponível no pátio.".to_string()),
            created_at: utc(2024, 6, 20, 10, 0),
            updated_at: utc(2024, 6, 20, 10, 0),
            ..schedule("1", day(2024, 6, 25), at(9, 0), "1", "3", "1", ScheduleStatus::Scheduled)
        },
        Schedule {
            observations: Some("Instalação em veículo particular. Cliente aguardará no local.".to_string()),
            created_at: utc(2024, 6, 21, 14, 0),
            updated_at: utc(2024, 6, 21, 15, 30),
            ..schedule("2", day(2024, 6, 25), at(14, 30), "2", "4", "4", ScheduleStatus::InProgress)
        },
        Schedule {
            observations: Some("Instalação em caminhão da frota. Concluída com sucesso.".to_string()),
            completed_at: Some(utc(2024, 6, 24, 10, 30)),
            created_at: utc(2024, 6, 20, 16, 0),
            updated_at: utc(2024, 6, 24, 10, 30),
            ..schedule("3", day(2024, 6, 24), at(8, 0), "3", "3", "2", ScheduleStatus::Completed)
        },
        Schedule {
            observations: Some("Aguardando confirmação do cliente para o horário.".to_string()),
            created_at: utc(2024, 6, 22, 9, 0),
            updated_at: utc(2024, 6, 22, 9, 0),
            ..schedule("4", day(2024, 6, 26), at(16, 0), "1", "3", "3", ScheduleStatus::Pending)
        },
    ]
}

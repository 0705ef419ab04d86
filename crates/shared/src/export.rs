use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{time_of_day, ScheduleDetails};

/// Date format used in exported files
const DATE_FORMAT: &str = "%d/%m/%Y";

pub const CSV_HEADER: [&str; 14] = [
    "ID",
    "Date",
    "Time",
    "Customer",
    "Customer Phone",
    "Address",
    "Technician",
    "Technician Phone",
    "Representative",
    "Equipment",
    "Serial Number",
    "Status",
    "Observations",
    "Completion Date",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Csv,
    Excel,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "excel",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xlsx",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv;charset=utf-8",
            ExportFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            other => Err(format!("unknown export format: {}", other)),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("{} export is not implemented yet", .0.as_str())]
    Unsupported(ExportFormat),
}

/// Name offered for a report downloaded on `date`
pub fn file_name(format: ExportFormat, date: NaiveDate) -> String {
    format!("schedules-report-{}.{}", date.format("%Y-%m-%d"), format.extension())
}

/// Serialize schedules in the requested format
pub fn export(format: ExportFormat, schedules: &[ScheduleDetails]) -> Result<String, ExportError> {
    match format {
        ExportFormat::Csv => Ok(to_csv(schedules)),
        ExportFormat::Excel => Err(ExportError::Unsupported(format)),
    }
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn csv_row(fields: &[String]) -> String {
    fields.iter().map(|f| quote(f)).collect::<Vec<_>>().join(",")
}

/// One header line plus one line per schedule, every field quoted
pub fn to_csv(schedules: &[ScheduleDetails]) -> String {
    let header: Vec<String> = CSV_HEADER.iter().map(|h| h.to_string()).collect();

    std::iter::once(csv_row(&header))
        .chain(schedules.iter().map(|details| csv_row(&csv_fields(details))))
        .collect::<Vec<_>>()
        .join("\n")
}

fn csv_fields(details: &ScheduleDetails) -> Vec<String> {
    let schedule = &details.schedule;
    vec![
        schedule.id.clone(),
        schedule.date.format(DATE_FORMAT).to_string(),
        schedule.time.format(time_of_day::FORMAT).to_string(),
        details.customer.name.clone(),
        details.customer.phone.clone(),
        details.customer.address.clone(),
        details.technician.name.clone(),
        details.technician.phone.clone().unwrap_or_default(),
        details.representative.name.clone(),
        details.equipment.model.clone(),
        details.equipment.serial_number.clone(),
        schedule.status.as_str().to_string(),
        schedule.observations.clone().unwrap_or_default(),
        schedule
            .completed_at
            .map(|at| at.format(DATE_FORMAT).to_string())
            .unwrap_or_default(),
    ]
}

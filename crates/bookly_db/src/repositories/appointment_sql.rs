//! SQL implementation of the appointment store
//!
//! Dates and times are stored as ISO text (`YYYY-MM-DD`, `HH:MM`), which
//! sorts correctly and goes through the `Any` driver without chrono support.
//! A staff member's `service_ids` column holds a JSON array; `NULL` means the
//! member performs every service.
//!
//! The `Any` driver cannot decode SQL `NULL` into `Option<T>`, so nullable
//! columns are read through `COALESCE(col, '')` and an empty string maps back
//! to `None`.

use crate::error::DbError;
use crate::client::DbTransaction;
use crate::DbClient;
use bookly_common::models::{
    hhmm, Appointment, AppointmentStatus, DateRange, NewAppointment, Service, StaffMember,
};
use bookly_common::services::{AppointmentStore, BoxFuture, StoreError};
use bookly_schedule::availability::validate_booking;
use chrono::NaiveDate;
use sqlx::any::AnyRow;
use sqlx::Row;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";

const APPOINTMENT_COLUMNS: &str = "id, client_id, client_name, client_phone, client_email, \
     employee_id, service_id, date, start_time, end_time, status, price, comment";

const APPOINTMENT_SELECT: &str = "id, client_id, client_name, client_phone, \
     COALESCE(client_email, '') AS client_email, employee_id, service_id, date, \
     start_time, end_time, status, price, COALESCE(comment, '') AS comment";

/// SQL-backed [`AppointmentStore`].
#[derive(Debug, Clone)]
pub struct SqlAppointmentStore {
    db_client: DbClient,
    /// Serializes check-then-write sequences issued through this process.
    write_lock: Arc<Mutex<()>>,
}

fn decode(table: &'static str, message: impl ToString) -> DbError {
    DbError::DecodeError {
        table,
        message: message.to_string(),
    }
}

fn query_error(context: &str, e: sqlx::Error) -> DbError {
    error!("{}: {}", context, e);
    DbError::QueryError(e.to_string())
}

/// Reads a column selected as `COALESCE(col, '')`.
fn nullable_text(row: &AnyRow, column: &str) -> Result<Option<String>, DbError> {
    let raw: String = row.try_get(column)?;
    Ok(Some(raw).filter(|value| !value.is_empty()))
}

fn staff_from_row(row: &AnyRow) -> Result<StaffMember, DbError> {
    let service_ids = nullable_text(row, "service_ids")?
        .map(|raw| serde_json::from_str::<Vec<String>>(&raw))
        .transpose()
        .map_err(|e| decode("staff", e))?;
    Ok(StaffMember {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        service_ids,
    })
}

fn service_from_row(row: &AnyRow) -> Result<Service, DbError> {
    let duration: i64 = row.try_get("duration_minutes")?;
    Ok(Service {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        duration_minutes: u32::try_from(duration).map_err(|e| decode("services", e))?,
        price: row.try_get("price")?,
        category: nullable_text(row, "category")?,
    })
}

fn appointment_from_row(row: &AnyRow) -> Result<Appointment, DbError> {
    let date: String = row.try_get("date")?;
    let start: String = row.try_get("start_time")?;
    let end: String = row.try_get("end_time")?;
    let status: String = row.try_get("status")?;

    Ok(Appointment {
        id: row.try_get("id")?,
        client_id: row.try_get("client_id")?,
        client_name: row.try_get("client_name")?,
        client_phone: row.try_get("client_phone")?,
        client_email: nullable_text(row, "client_email")?,
        employee_id: row.try_get("employee_id")?,
        service_id: row.try_get("service_id")?,
        date: NaiveDate::parse_from_str(&date, DATE_FORMAT)
            .map_err(|e| decode("appointments", e))?,
        start_time: hhmm::parse(&start).map_err(|e| decode("appointments", e))?,
        end_time: hhmm::parse(&end).map_err(|e| decode("appointments", e))?,
        status: status
            .parse::<AppointmentStatus>()
            .map_err(|e| decode("appointments", e))?,
        price: row.try_get("price")?,
        comment: nullable_text(row, "comment")?,
    })
}

impl SqlAppointmentStore {
    pub fn new(db_client: DbClient) -> Self {
        Self {
            db_client,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Creates the staff, services and appointments tables if missing.
    pub async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing appointment schema");

        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS staff (
                id TEXT PRIMARY KEY,
                business_id TEXT NOT NULL,
                name TEXT NOT NULL,
                service_ids TEXT
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS services (
                id TEXT PRIMARY KEY,
                business_id TEXT NOT NULL,
                name TEXT NOT NULL,
                duration_minutes INTEGER NOT NULL CHECK (duration_minutes > 0),
                price INTEGER NOT NULL CHECK (price >= 0),
                category TEXT
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS appointments (
                id TEXT PRIMARY KEY,
                business_id TEXT NOT NULL,
                client_id TEXT NOT NULL,
                client_name TEXT NOT NULL,
                client_phone TEXT NOT NULL,
                client_email TEXT,
                employee_id TEXT NOT NULL,
                service_id TEXT NOT NULL,
                date TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                status TEXT NOT NULL,
                price INTEGER NOT NULL,
                comment TEXT
            )
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS idx_appointments_staff_date
                ON appointments (business_id, employee_id, date)
            "#,
        ];
        for statement in statements {
            self.db_client.execute(statement).await?;
        }

        info!("Appointment schema initialized successfully");
        Ok(())
    }

    pub async fn insert_staff(&self, business_id: &str, staff: &StaffMember) -> Result<(), DbError> {
        let service_ids = staff
            .service_ids
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        sqlx::query("INSERT INTO staff (id, business_id, name, service_ids) VALUES ($1, $2, $3, $4)")
            .bind(&staff.id)
            .bind(business_id)
            .bind(&staff.name)
            .bind(service_ids)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| query_error("Failed to insert staff member", e))?;
        Ok(())
    }

    pub async fn insert_service(&self, business_id: &str, service: &Service) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO services (id, business_id, name, duration_minutes, price, category)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&service.id)
        .bind(business_id)
        .bind(&service.name)
        .bind(i64::from(service.duration_minutes))
        .bind(service.price)
        .bind(service.category.clone())
        .execute(self.db_client.pool())
        .await
        .map_err(|e| query_error("Failed to insert service", e))?;
        Ok(())
    }

    async fn fetch_staff(&self, business_id: &str) -> Result<Vec<StaffMember>, DbError> {
        let rows = sqlx::query("SELECT id, name, COALESCE(service_ids, '') AS service_ids FROM staff \
             WHERE business_id = $1 ORDER BY name, id")
            .bind(business_id)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| query_error("Failed to list staff", e))?;
        rows.iter().map(staff_from_row).collect()
    }

    async fn fetch_services(&self, business_id: &str) -> Result<Vec<Service>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, duration_minutes, price, COALESCE(category, '') AS category
            FROM services
            WHERE business_id = $1
            ORDER BY name, id
            "#,
        )
        .bind(business_id)
        .fetch_all(self.db_client.pool())
        .await
        .map_err(|e| query_error("Failed to list services", e))?;
        rows.iter().map(service_from_row).collect()
    }

    async fn fetch_appointments(
        &self,
        business_id: &str,
        employee_id: Option<&str>,
        range: DateRange,
    ) -> Result<Vec<Appointment>, DbError> {
        let staff_clause = if employee_id.is_some() {
            " AND employee_id = $4"
        } else {
            ""
        };
        let query = format!(
            "SELECT {} FROM appointments \
             WHERE business_id = $1 AND date >= $2 AND date <= $3{} \
             ORDER BY date, start_time, employee_id",
            APPOINTMENT_SELECT, staff_clause
        );

        let mut statement = sqlx::query(&query)
            .bind(business_id)
            .bind(range.start.format(DATE_FORMAT).to_string())
            .bind(range.end.format(DATE_FORMAT).to_string());
        if let Some(employee_id) = employee_id {
            statement = statement.bind(employee_id);
        }
        let rows = statement
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| query_error("Failed to list appointments", e))?;
        rows.iter().map(appointment_from_row).collect()
    }

    async fn fetch_appointment(
        tx: &mut DbTransaction<'static>,
        appointment_id: &str,
    ) -> Result<Appointment, StoreError> {
        let query = format!("SELECT {} FROM appointments WHERE id = $1", APPOINTMENT_SELECT);
        let row = sqlx::query(&query)
            .bind(appointment_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| query_error("Failed to find appointment", e))?
            .ok_or_else(|| StoreError::NotFound(format!("appointment {}", appointment_id)))?;
        Ok(appointment_from_row(&row)?)
    }

    /// Re-reads the employee's appointments for the date inside one
    /// transaction, checks the interval and inserts.
    async fn insert_appointment(
        &self,
        business_id: &str,
        appointment: NewAppointment,
    ) -> Result<Appointment, StoreError> {
        if appointment.end_time <= appointment.start_time {
            return Err(StoreError::Validation(
                "end time must be after start time".to_string(),
            ));
        }
        let duration = u32::try_from(appointment.duration_minutes())
            .map_err(|_| StoreError::Validation("invalid duration".to_string()))?;
        let date = appointment.date.format(DATE_FORMAT).to_string();

        let _guard = self.write_lock.lock().await;
        let mut tx = self.db_client.begin().await?;

        let query = format!(
            "SELECT {} FROM appointments WHERE business_id = $1 AND employee_id = $2 AND date = $3",
            APPOINTMENT_SELECT
        );
        let rows = sqlx::query(&query)
            .bind(business_id)
            .bind(&appointment.employee_id)
            .bind(&date)
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| query_error("Failed to read same-day appointments", e))?;
        let same_day = rows
            .iter()
            .map(appointment_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        validate_booking(appointment.start_time, duration, &same_day)
            .map_err(|conflict| StoreError::Conflict(conflict.to_string()))?;

        let id = Uuid::new_v4().to_string();
        let client_id = appointment
            .client_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let created = appointment.into_appointment(id, client_id);

        sqlx::query(&format!(
            "INSERT INTO appointments ({}, business_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
            APPOINTMENT_COLUMNS
        ))
        .bind(&created.id)
        .bind(&created.client_id)
        .bind(&created.client_name)
        .bind(&created.client_phone)
        .bind(created.client_email.clone())
        .bind(&created.employee_id)
        .bind(&created.service_id)
        .bind(&date)
        .bind(hhmm::format(&created.start_time))
        .bind(hhmm::format(&created.end_time))
        .bind(created.status.as_str())
        .bind(created.price)
        .bind(created.comment.clone())
        .bind(business_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| query_error("Failed to insert appointment", e))?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))?;

        info!(
            "Created appointment {} for {} on {} at {}",
            created.id, created.employee_id, created.date, created.start_time
        );
        Ok(created)
    }

    /// Reads the current status and writes the new one in one transaction.
    /// The `UPDATE` is guarded by the status that was checked, so a writer in
    /// another process that got there first surfaces as a conflict.
    async fn write_status(
        &self,
        appointment_id: &str,
        status: AppointmentStatus,
    ) -> Result<Appointment, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.db_client.begin().await?;

        let current = Self::fetch_appointment(&mut tx, appointment_id).await?;
        let updated = current
            .with_status(status)
            .map_err(|e| StoreError::Validation(e.to_string()))?;

        let affected = sqlx::query("UPDATE appointments SET status = $1 WHERE id = $2 AND status = $3")
            .bind(updated.status.as_str())
            .bind(appointment_id)
            .bind(current.status.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| query_error("Failed to update appointment status", e))?
            .rows_affected();
        if affected == 0 {
            return Err(StoreError::Conflict(format!(
                "appointment {} changed while updating its status",
                appointment_id
            )));
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))?;
        info!("Appointment {} is now {}", appointment_id, updated.status);
        Ok(updated)
    }

    async fn write_comment(
        &self,
        appointment_id: &str,
        comment: Option<String>,
    ) -> Result<Appointment, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.db_client.begin().await?;

        let current = Self::fetch_appointment(&mut tx, appointment_id).await?;
        let updated = current.with_comment(comment);

        sqlx::query("UPDATE appointments SET comment = $1 WHERE id = $2")
            .bind(updated.comment.clone())
            .bind(appointment_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| query_error("Failed to update appointment comment", e))?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))?;
        Ok(updated)
    }
}

impl AppointmentStore for SqlAppointmentStore {
    fn list_staff(&self, business_id: &str) -> BoxFuture<'_, Vec<StaffMember>, StoreError> {
        let business_id = business_id.to_string();
        Box::pin(async move { Ok(self.fetch_staff(&business_id).await?) })
    }

    fn list_services(&self, business_id: &str) -> BoxFuture<'_, Vec<Service>, StoreError> {
        let business_id = business_id.to_string();
        Box::pin(async move { Ok(self.fetch_services(&business_id).await?) })
    }

    fn list_appointments(
        &self,
        business_id: &str,
        employee_id: Option<&str>,
        range: DateRange,
    ) -> BoxFuture<'_, Vec<Appointment>, StoreError> {
        let business_id = business_id.to_string();
        let employee_id = employee_id.map(str::to_string);
        Box::pin(async move {
            Ok(self
                .fetch_appointments(&business_id, employee_id.as_deref(), range)
                .await?)
        })
    }

    fn create_appointment(
        &self,
        business_id: &str,
        appointment: NewAppointment,
    ) -> BoxFuture<'_, Appointment, StoreError> {
        let business_id = business_id.to_string();
        Box::pin(async move { self.insert_appointment(&business_id, appointment).await })
    }

    fn update_appointment_status(
        &self,
        appointment_id: &str,
        status: AppointmentStatus,
    ) -> BoxFuture<'_, Appointment, StoreError> {
        let appointment_id = appointment_id.to_string();
        Box::pin(async move { self.write_status(&appointment_id, status).await })
    }

    fn update_appointment_comment(
        &self,
        appointment_id: &str,
        comment: Option<String>,
    ) -> BoxFuture<'_, Appointment, StoreError> {
        let appointment_id = appointment_id.to_string();
        Box::pin(async move { self.write_comment(&appointment_id, comment).await })
    }
}

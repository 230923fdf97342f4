use chrono::NaiveDateTime;
use pingboard_common::HostStatus;
use sqlx::FromRow;

/// A row of the `container_status` table.
///
/// `last_success` is a `TIMESTAMP` column without zone; values are always
/// written as UTC.
#[derive(Debug, Clone, FromRow)]
pub struct ContainerStatusRow {
    pub ip: String,
    pub ping_time: Option<i32>,
    pub last_success: Option<NaiveDateTime>,
}

impl TryFrom<ContainerStatusRow> for HostStatus {
    type Error = String;

    fn try_from(row: ContainerStatusRow) -> Result<Self, Self::Error> {
        let ping_time = row
            .ping_time
            .ok_or_else(|| format!("ping_time is NULL for {}", row.ip))?;
        let last_success = row
            .last_success
            .ok_or_else(|| format!("last_success is NULL for {}", row.ip))?;
        Ok(HostStatus::new(row.ip, ping_time, last_success.and_utc()))
    }
}

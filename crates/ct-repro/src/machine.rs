//! The `machines` row the demo writes and reads back.

use chrono::{DateTime, TimeZone, Utc};
use spanner_emulator::database::{FromRow, Row, ToRow, Value};
use std::fmt;

/// Columns holding commit-timestamp-enabled TIMESTAMPs
pub const TIMESTAMP_COLUMNS: [&str; 4] = [
    "created_on",
    "last_heartbeat",
    "ended_on",
    "first_heartbeat",
];

/// 1970-01-01T01:01:01.000000001Z, the value every timestamp starts at
pub fn fixed_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1970, 1, 1, 1, 1, 1)
        .single()
        .unwrap_or_default()
        + chrono::Duration::nanoseconds(1)
}

/// One row of `machines`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine {
    /// Primary key
    pub id: String,
    /// Compute instance name
    pub instance_name: String,
    /// Address of the instance
    pub instance_ip: String,
    /// Lifecycle state, e.g. `available`
    pub status: String,
    /// Agent version running on the machine
    pub version: String,
    /// Commit-timestamp column
    pub created_on: Option<DateTime<Utc>>,
    /// Commit-timestamp column
    pub last_heartbeat: Option<DateTime<Utc>>,
    /// Commit-timestamp column, stamped by the demo update
    pub ended_on: Option<DateTime<Utc>>,
    /// Who created the machine
    pub provisioner: String,
    /// Commit-timestamp column
    pub first_heartbeat: Option<DateTime<Utc>>,
    /// Managed instance group the machine belongs to
    pub instance_group: String,
    /// Cloud zone
    pub zone: String,
}

impl Machine {
    /// A machine with placeholder fields and every timestamp set to `at`
    pub fn sample(id: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            instance_name: "instance-name".to_string(),
            instance_ip: "instance-ip".to_string(),
            status: "available".to_string(),
            version: "version".to_string(),
            created_on: Some(at),
            last_heartbeat: Some(at),
            ended_on: Some(at),
            provisioner: "provisioner".to_string(),
            first_heartbeat: Some(at),
            instance_group: "instance-group".to_string(),
            zone: "zone".to_string(),
        }
    }
}

impl ToRow for Machine {
    fn to_row(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", (&self.id).into()),
            ("instance_name", (&self.instance_name).into()),
            ("instance_ip", (&self.instance_ip).into()),
            ("status", (&self.status).into()),
            ("version", (&self.version).into()),
            ("created_on", self.created_on.into()),
            ("last_heartbeat", self.last_heartbeat.into()),
            ("ended_on", self.ended_on.into()),
            ("provisioner", (&self.provisioner).into()),
            ("first_heartbeat", self.first_heartbeat.into()),
            ("instance_group", (&self.instance_group).into()),
            ("zone", (&self.zone).into()),
        ]
    }
}

impl FromRow for Machine {
    fn from_row(row: &Row) -> spanner_emulator::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            instance_name: row.get("instance_name")?,
            instance_ip: row.get("instance_ip")?,
            status: row.get("status")?,
            version: row.get("version")?,
            created_on: row.get("created_on")?,
            last_heartbeat: row.get("last_heartbeat")?,
            ended_on: row.get("ended_on")?,
            provisioner: row.get("provisioner")?,
            first_heartbeat: row.get("first_heartbeat")?,
            instance_group: row.get("instance_group")?,
            zone: row.get("zone")?,
        })
    }
}

fn timestamp(t: &Option<DateTime<Utc>>) -> String {
    match t {
        Some(t) => t.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true),
        None => "NULL".to_string(),
    }
}

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "id:              {}", self.id)?;
        writeln!(f, "instance_name:   {}", self.instance_name)?;
        writeln!(f, "instance_ip:     {}", self.instance_ip)?;
        writeln!(f, "status:          {}", self.status)?;
        writeln!(f, "version:         {}", self.version)?;
        writeln!(f, "created_on:      {}", timestamp(&self.created_on))?;
        writeln!(f, "last_heartbeat:  {}", timestamp(&self.last_heartbeat))?;
        writeln!(f, "ended_on:        {}", timestamp(&self.ended_on))?;
        writeln!(f, "provisioner:     {}", self.provisioner)?;
        writeln!(f, "first_heartbeat: {}", timestamp(&self.first_heartbeat))?;
        writeln!(f, "instance_group:  {}", self.instance_group)?;
        write!(f, "zone:            {}", self.zone)
    }
}

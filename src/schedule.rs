use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use log::{info, warn};
use thiserror::Error;

use crate::ingestion::IngestionService;

#[derive(Debug, Error)]
pub enum CronError {
    #[error("expected 6 fields (sec min hour dom mon dow), got {0}")]
    FieldCount(usize),
    #[error("field '{0}': {1}")]
    Field(String, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CronField {
    Any,
    Step(u32),
    Value(u32),
}

impl CronField {
    fn matches(&self, value: u32) -> bool {
        match self {
            CronField::Any => true,
            CronField::Step(n) => value % n == 0,
            CronField::Value(v) => value == *v,
        }
    }
}

/// Six-field cron expression (`sec min hour dom mon dow`), the subset the
/// service uses: literals, `*`, and `*/n`. Day-of-week is 0-6 with Sunday
/// as 0. The default ingestion schedule is `0 21 */6 * * *`, i.e. 21
/// minutes past every sixth hour.
#[derive(Debug, Clone)]
pub struct CronExpr {
    sec: CronField,
    min: CronField,
    hour: CronField,
    dom: CronField,
    mon: CronField,
    dow: CronField,
}

impl CronExpr {
    pub fn parse(expr: &str) -> Result<Self, CronError> {
        let fields: Vec<&str> = expr.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(CronError::FieldCount(fields.len()));
        }

        Ok(CronExpr {
            sec: parse_field(fields[0], 0, 59)?,
            min: parse_field(fields[1], 0, 59)?,
            hour: parse_field(fields[2], 0, 23)?,
            dom: parse_field(fields[3], 1, 31)?,
            mon: parse_field(fields[4], 1, 12)?,
            dow: parse_field(fields[5], 0, 6)?,
        })
    }

    /// First fire time strictly after `t`, found by a forward minute scan.
    /// The second field selects the offset within the matching minute.
    pub fn next_after(&self, t: DateTime<Utc>) -> DateTime<Utc> {
        let fire_second = match self.sec {
            CronField::Value(s) => s,
            CronField::Any | CronField::Step(_) => 0,
        };

        let mut minute_start = t
            .with_second(0)
            .and_then(|m| m.with_nanosecond(0))
            .unwrap_or(t);

        // One year of minutes bounds the scan; every supported expression
        // matches far sooner.
        for _ in 0..(366 * 24 * 60) {
            if self.min.matches(minute_start.minute())
                && self.hour.matches(minute_start.hour())
                && self.dom.matches(minute_start.day())
                && self.mon.matches(minute_start.month())
                && self.dow.matches(minute_start.weekday().num_days_from_sunday())
            {
                let fire = minute_start + Duration::seconds(fire_second as i64);
                if fire > t {
                    return fire;
                }
            }
            minute_start += Duration::minutes(1);
        }

        minute_start
    }
}

fn parse_field(raw: &str, min: u32, max: u32) -> Result<CronField, CronError> {
    let err = |msg: &str| CronError::Field(raw.to_string(), msg.to_string());

    if raw == "*" {
        return Ok(CronField::Any);
    }
    if let Some(step) = raw.strip_prefix("*/") {
        let n: u32 = step.parse().map_err(|_| err("invalid step"))?;
        if n == 0 || n > max {
            return Err(err("step out of range"));
        }
        return Ok(CronField::Step(n));
    }
    let value: u32 = raw.parse().map_err(|_| err("expected number, '*' or '*/n'"))?;
    if value < min || value > max {
        return Err(err("value out of range"));
    }
    Ok(CronField::Value(value))
}

/// Run catalog syncs on the configured cron schedule until the process
/// exits. Failures are logged; the next tick retries.
pub async fn run_ingestion_schedule(ingestion: Arc<IngestionService>, expr: CronExpr) {
    loop {
        let now = Utc::now();
        let next = expr.next_after(now);
        info!("Next catalog sync scheduled for {}", next);

        let wait = (next - now).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;

        let report = ingestion.sync().await;
        if !report.successful {
            warn!("Scheduled catalog sync failed; will retry on next tick");
        }
    }
}

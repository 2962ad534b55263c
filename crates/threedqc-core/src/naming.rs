//! File names for exported artifacts

use chrono::{Local, NaiveDateTime};

/// Token inserted between the source name and the timestamp.
pub const EXPORT_MARKER: &str = "3DQC";

/// File name used when exporting the schema form.
pub const SCHEMA_EXPORT_NAME: &str = "3dc-validator-schema.json";

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// `widget.glb` + `json` at 2024-01-02 03:04:05 -> `widget-3DQC-2024-01-02-03-04-05.json`.
///
/// Only the last extension is stripped; a name without one is kept whole.
pub fn name_for(original: &str, extension: &str, at: NaiveDateTime) -> String {
    let stem = match original.rfind('.') {
        Some(dot) => &original[..dot],
        None => original,
    };
    format!(
        "{}-{}-{}.{}",
        stem,
        EXPORT_MARKER,
        at.format("%Y-%m-%d-%H-%M-%S"),
        extension
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn timestamp_is_zero_padded() {
        assert_eq!(
            name_for("widget.glb", "json", at(2024, 1, 2, 3, 4, 5)),
            "widget-3DQC-2024-01-02-03-04-05.json"
        );
        assert_eq!(
            name_for("chair.gltf", "csv", at(2023, 12, 31, 23, 59, 58)),
            "chair-3DQC-2023-12-31-23-59-58.csv"
        );
    }

    #[test]
    fn only_last_extension_is_stripped() {
        assert_eq!(
            name_for("lamp.v2.glb", "csv", at(2024, 6, 7, 8, 9, 10)),
            "lamp.v2-3DQC-2024-06-07-08-09-10.csv"
        );
    }

    #[test]
    fn name_without_extension_is_kept() {
        assert_eq!(
            name_for("model", "json", at(2024, 1, 2, 3, 4, 5)),
            "model-3DQC-2024-01-02-03-04-05.json"
        );
    }

    #[test]
    fn fixed_clock_is_stable() {
        let clock = FixedClock(at(2024, 1, 2, 3, 4, 5));
        assert_eq!(
            name_for("a.glb", "json", clock.now()),
            name_for("a.glb", "json", clock.now())
        );
    }
}

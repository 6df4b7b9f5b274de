pub mod scheduler;

pub use scheduler::{ReminderScanReport, ReminderSchedule, ReminderScheduler};

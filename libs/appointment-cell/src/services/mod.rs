pub mod ledger;
pub mod recurrence;

pub use ledger::AppointmentService;

//! Schedule output port trait.

use crate::domain::error::WeekrotError;
use crate::domain::schedule::AllocationSchedule;

pub trait SchedulePort {
    fn write_schedule(&self, schedule: &AllocationSchedule) -> Result<(), WeekrotError>;
}

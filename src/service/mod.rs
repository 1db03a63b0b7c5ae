pub mod attendance;
pub mod clock;
pub mod roster;

pub use attendance::{AttendanceService, DashboardFilter, DashboardRow};
pub use clock::{Clock, FixedClock, SystemClock};
pub use roster::EmployeeRoster;

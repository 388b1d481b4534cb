pub mod assignment;
pub mod assignment_input;
pub mod role;
pub mod suggestion;
pub mod timestamp;

pub use assignment::{Assignment, OrderStaffCosts};
pub use assignment_input::{CreateAssignmentInput, UpdateAssignmentInput};
pub use role::{AssignmentStatus, StaffRole};
pub use suggestion::{SuggestStaffQuery, SuggestionCandidate, SuggestionResponse};

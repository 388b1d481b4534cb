pub mod assignment_list;
pub mod notification;
pub mod request;
pub mod suggestion;

pub use assignment_list::{AssignmentListView, DeleteState, DeleteTarget, EditBuffer, EditState};
pub use notification::{Notification, NotificationKind, CONFLICT_MESSAGE};
pub use request::{Completed, PendingRequest};
pub use suggestion::{
    BulkAssignReport, BulkOutcome, BulkPreview, InlinePicker, PickerState, SelectedCandidate, SuggestionView,
};

pub mod format;
pub mod time;

pub use format::{format_currency, format_hours};
pub use time::{
    compose_date_time, estimated_cost, hours_between, hours_between_str, hours_between_timestamps,
    parse_date, parse_time, split_local, today_in, ResolvedWindow, WindowDraft,
};

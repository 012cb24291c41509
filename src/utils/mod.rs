pub mod countdown;
pub mod digits;

pub use countdown::{format_remaining, seconds_remaining};
pub use digits::digits_only;

pub mod compose;
pub mod intent;

pub use compose::{FALLBACK_REPLY, GREETING_REPLY, NO_MATCH_REPLY, NO_SEATS_REPLY, THANKS_REPLIES};
pub use intent::{Action, Detail, Intent};

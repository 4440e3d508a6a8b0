pub mod preview;
pub mod order;
pub(crate) mod log;

pub use self::preview::{preview_compact, preview_width};
pub use self::order::{compare_numeric_first, sorted_unique};

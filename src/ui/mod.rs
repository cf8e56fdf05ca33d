pub mod icons;
pub mod output;
pub mod theme;

pub use icons::Icons;
pub use output::{dim, error, file_written, header, info, phase, success, summary_row, warn};
pub use theme::{theme, Theme};

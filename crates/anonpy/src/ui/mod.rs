mod diff;
mod prompt;
mod tracker;

pub use diff::{print_diff, render_diff};
pub use prompt::{confirm, str2bool};
pub use tracker::{BarReporter, spinner};

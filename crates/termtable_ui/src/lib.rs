pub mod widgets;

pub use widgets::*;

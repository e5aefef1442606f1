pub mod color;
pub mod history;
pub mod pipeline;

pub use color::Rgb;
pub use history::ColumnHistory;

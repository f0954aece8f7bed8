mod check;
mod document;
mod simulate;
mod tabulate;

pub use check::check;
pub use document::ElectionDocument;
pub use simulate::simulate;
pub use tabulate::{tabulate, TabulateOptions};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

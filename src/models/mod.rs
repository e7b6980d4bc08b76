pub mod enums;
pub mod report;
pub mod text;

pub use enums::*;
pub use report::*;
pub use text::*;

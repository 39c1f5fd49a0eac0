//! Data types for workbooks and the maps built from them.

mod cell;
mod map;
mod style;
mod workbook;

pub use cell::*;
pub use map::*;
pub use style::*;
pub use workbook::*;

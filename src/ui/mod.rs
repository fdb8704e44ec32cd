pub mod page;
pub mod plot;
pub mod table;

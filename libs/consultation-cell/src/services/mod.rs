pub mod access;
pub mod detail;
pub mod listing;

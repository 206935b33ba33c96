pub mod auth;
pub mod data;
pub mod deals;
pub mod docs;
pub mod report;
pub mod users;

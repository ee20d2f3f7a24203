pub mod admin;
pub mod care;
pub mod init;
pub mod plants;
pub mod sensors;
pub mod types;
pub mod users;

pub mod db;
pub mod messenger;
pub mod platform;

pub mod auth;
pub mod diary;
pub mod goals;
pub mod health;
pub mod todos;

pub mod effect;
pub mod health;
pub mod schedules;

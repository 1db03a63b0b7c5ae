pub mod pin;
pub mod session;

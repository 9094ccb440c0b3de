pub mod assignment;
pub mod question;
pub mod shared;

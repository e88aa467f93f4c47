pub mod credential;
pub mod grant;
pub mod proof;

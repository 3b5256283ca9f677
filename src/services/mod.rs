pub mod audit;
pub mod channel;
pub mod mail;
pub mod submission_service;
pub mod validator;

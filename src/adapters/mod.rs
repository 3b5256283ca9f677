pub mod email;
pub mod mail;
pub mod relay;
pub mod whatsapp;

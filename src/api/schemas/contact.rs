use crate::domain::delivery::DeliveryResult;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
    pub data: ContactData,
    pub channels: Vec<DeliveryResult>,
}

#[derive(Debug, Serialize)]
pub struct ContactData {
    pub name: String,
    pub email: String,
    pub timestamp: String,
}

pub mod alert_service;
pub mod conversion;
pub mod currency_service;
pub mod rate_service;

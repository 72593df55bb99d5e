pub mod alert;
pub mod currency;
pub mod rate;
pub mod recent;
pub mod settings;

pub mod export_service;
pub mod notify_service;
pub mod vacancy_service;

pub mod scrape_dto;
pub mod stats_dto;
pub mod vacancy_dto;

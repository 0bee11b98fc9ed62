pub mod price_group;
pub mod requirement;
pub mod scrape_run;
pub mod shift;
pub mod vacancy;

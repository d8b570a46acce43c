pub mod jwt;
pub mod password;
pub mod growth_stages;
pub mod widgets;
pub mod geometry;
pub mod media;

pub mod osm;
pub mod poi;
pub mod route;
pub mod rules;

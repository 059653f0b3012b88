// Question catalog: packages of Likert and open questions grouped by enabler.

pub mod models;
pub mod repository;
pub mod seed;

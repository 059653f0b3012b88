// sqlx row types. Domain types live next to the code that uses them.

pub mod assessment;
pub mod catalog;

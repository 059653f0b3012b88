// Result delivery: HTML rendering, email and the optional S3 archive.

pub mod archive;
pub mod email;
pub mod render;

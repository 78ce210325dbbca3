pub mod handler;
pub mod upstream;
pub mod url;

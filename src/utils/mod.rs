pub mod error;
pub mod jwt;
pub mod money;
pub mod swagger_doc;

pub mod options;
pub mod request;
pub mod response;

pub mod datalogger;
pub mod summary;

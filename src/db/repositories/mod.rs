pub mod authorizations;
pub mod samples;

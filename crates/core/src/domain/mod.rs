pub mod agent;
pub mod dimension;
pub mod review;

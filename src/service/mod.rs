pub mod planner;
pub mod suggestion_service;

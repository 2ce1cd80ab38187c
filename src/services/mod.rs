pub mod access_service;
pub mod answer_service;
pub mod attempt_service;
pub mod navigation_service;
pub mod pause_service;
pub mod session_service;
pub mod test_service;
pub mod timing_service;

#[cfg(test)]
pub mod fixtures;

pub mod gateway;
pub mod http_gateway;
pub mod quiz_flow_service;
pub mod session_service;

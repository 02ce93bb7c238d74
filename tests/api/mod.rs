mod auth_tests;
mod health_tests;
mod session_tests;
mod user_tests;

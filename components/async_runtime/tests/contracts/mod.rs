//! Contract test runner for async_runtime

mod contract_test;

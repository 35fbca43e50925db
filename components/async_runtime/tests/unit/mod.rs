//! Unit test runner for async_runtime
//! Each submodule exercises one part of the public API through an EventLoop.

mod event_loop_test;
mod support;

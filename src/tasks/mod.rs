pub mod check_loop;
pub mod task_runner;

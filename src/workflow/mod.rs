pub mod code_generation;
pub mod hello;
pub mod initial_task;
pub mod job_poller;

pub use code_generation::run_ganga_llm;
pub use hello::execute_hello;
pub use initial_task::{execute_initial_task, TaskKind, TaskReport};
pub use job_poller::{store_word_count, wait_for_completion, PollOutcome};

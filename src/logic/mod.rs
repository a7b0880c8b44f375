pub mod evaluator;
pub mod poller;

pub use poller::PollService;

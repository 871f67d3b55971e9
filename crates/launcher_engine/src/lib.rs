//! Launcher engine: single-flight job execution and the channels bridging the
//! worker thread to the interactive thread.
mod channel;
mod client;
mod job;
mod persist;
mod poller;
mod progress;
mod script;

pub use channel::MessageChannel;
pub use client::{RestClient, RestClientFactory, RestSettings};
pub use job::{Job, JobRunner, JobState, StartError};
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use poller::{DisplaySink, PollReport, Poller, PollerConfig, Ticker};
pub use progress::{ProgressSnapshot, ProgressState};
pub use script::{JobContext, Script};

/// Background workers for blocking I/O kept off the UI thread
pub mod resume_worker;

pub use resume_worker::ResumeWorker;

pub mod gate;
pub mod geo;
pub mod policy;
pub mod sampling_loop;
pub mod session;
pub mod shutdown;

pub use policy::SamplingPolicy;
pub use session::Tracker;

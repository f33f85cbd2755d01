pub mod classifier;
pub mod window;

pub use classifier::is_whale;
pub use window::WindowStatistics;

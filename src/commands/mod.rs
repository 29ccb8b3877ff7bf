// Command handlers module
pub mod config;
pub mod merge;
pub mod probe;
pub mod scan;
pub mod version;

// Re-exports for cleaner imports
pub use merge::execute as merge;
pub use probe::execute as probe;
pub use scan::execute as scan;
pub use version::execute as version;

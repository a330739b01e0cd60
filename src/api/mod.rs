// Export submodules
pub mod report;

pub mod extraction;
pub mod gst_registry;
pub mod scoring;
pub mod analyzer; // Expense analysis orchestrator

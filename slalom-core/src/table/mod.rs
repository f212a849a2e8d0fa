pub mod builder;
pub mod naming;
pub mod serialization;

// Re-export for easy access
pub use builder::{assemble, TableBuilder};
pub use naming::output_file_name;
pub use serialization::{extension_for, CSV_HEADER};

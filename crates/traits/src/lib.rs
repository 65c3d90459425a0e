pub mod parser;
pub mod resource;

pub use parser::{FontMetadataParser, FontParseError};
pub use resource::{InMemoryResourceProvider, ResourceError, ResourceProvider, SharedResourceData};

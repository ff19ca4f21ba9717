pub mod entity;
pub mod repository;
pub mod value_objects;

pub use entity::Record;
pub use repository::{
    RecordReadRepository, RecordWriteRepository, SlugLookup, SuffixIndex, parse_suffix,
};
pub use value_objects::{RecordId, RecordType, validate_identifier};

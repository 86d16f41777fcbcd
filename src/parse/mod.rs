pub mod filename;
pub mod frontmatter;
pub mod frontmatter_editor;
pub mod metadata_parser;

pub use filename::{FilenameError, parse_filename, slugify, to_filename};
pub use frontmatter::{BlockScan, find_block, split_frontmatter};
pub use frontmatter_editor::{EditOutcome, set_field, set_tags};
pub use metadata_parser::{
    Document, Frontmatter, MetadataError, MetadataKind, decode, parse_document,
    parse_project_metadata, parse_task_metadata,
};

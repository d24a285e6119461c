pub mod source_catalog;

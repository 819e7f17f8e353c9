pub mod crop;
pub mod find;
pub mod fs_ops;
pub mod io_group;
pub mod parts;
pub mod png_writer;
pub mod sanitize;
pub mod splitter;

#[cfg(test)]
mod pipeline_test;

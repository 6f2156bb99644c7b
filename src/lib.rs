pub mod artifact;
pub mod coach;
pub mod completion;
pub mod config;
pub mod context;
pub mod extract;
pub mod harvest;
pub mod prompt;
pub mod results;
pub mod text;
pub mod toolchain;

pub mod cli;
pub mod configuration;
pub mod git;
pub mod http;
pub mod lister;
pub mod rows;
pub mod runner;
pub mod source;
pub mod writer;

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

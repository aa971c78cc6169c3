#[path = "engine/dashes.rs"]
mod dashes;
#[path = "engine/generators.rs"]
mod generators;
#[path = "engine/growth.rs"]
mod growth;
#[path = "engine/trace.rs"]
mod trace;

// Test modules for the verdict crate
//
// Each source file with nontrivial logic has a corresponding test file here;
// HTTP-level behavior is covered by the wiremock integration tests under
// tests/.

pub mod config;
pub mod util;

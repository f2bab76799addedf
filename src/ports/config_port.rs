//! Configuration access port.
//!
//! Getters take a default so every parameter struct can fall back to its
//! built-in value when a key is absent. `keys` lists a section's entries
//! for map-shaped sections such as `[consensus.weights]`.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;
    fn keys(&self, section: &str) -> Vec<String>;
}

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

pub mod diagnostics;
pub mod increment;
pub mod schema;
pub mod source;

pub use source::Configuration;

/// Read-only view of configuration properties.
pub trait ConfigSource {
    fn lookup(&self, key: &str) -> Option<&str>;
}

impl<S: BuildHasher> ConfigSource for HashMap<String, String, S> {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl ConfigSource for BTreeMap<String, String> {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl<T: ConfigSource + ?Sized> ConfigSource for &T {
    fn lookup(&self, key: &str) -> Option<&str> {
        (**self).lookup(key)
    }
}

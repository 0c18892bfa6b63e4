//! Configuration access port trait.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;

    /// Keys present in `section`, lowercased and sorted. Empty if the section is missing.
    fn section_keys(&self, section: &str) -> Vec<String>;
}

// Builds an Option<BTreeMap<String, String>>, which is the shape Kubernetes object metadata uses
// for labels and annotations.
#[macro_export]
macro_rules! klabel {
    ($($key:expr => $val:expr),* $(,)?) => {
        Some(std::collections::BTreeMap::from([$(($key.to_string(), $val.to_string())),*]))
    };
}

pub use klabel;

mod pod_ext;
mod quantity;
mod util;

use std::collections::BTreeMap;

pub use quantity::*;
pub use util::*;

use crate::clock::{
    DateTime,
    Utc,
};
use crate::errors::*;
use crate::prelude::*;

err_impl! {KubernetesError,
    #[error("field not found in struct: {0}")]
    FieldNotFound(String),

    #[error("malformed label selector: {0:?}")]
    MalformedLabelSelector(metav1::LabelSelectorRequirement),

    #[error("malformed quantity: {0}")]
    MalformedQuantity(String),
}

pub trait KubeResourceExt {
    fn matches(&self, sel: &metav1::LabelSelector) -> anyhow::Result<bool>;
    fn created_at(&self) -> DateTime<Utc>;
    fn is_terminating(&self) -> bool;
}

pub trait PodExt {
    fn status(&self) -> anyhow::Result<&corev1::PodStatus>;
    fn phase(&self) -> Option<&str>;
    fn is_ready(&self) -> bool;
    fn restart_count(&self) -> i32;
    fn labels_or_empty(&self) -> BTreeMap<String, String>;
}

#[cfg(test)]
pub mod tests;

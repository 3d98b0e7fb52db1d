use std::collections::BTreeMap;

use kube::api::Resource;

use super::*;

// An empty selector matches everything, the same as the apiserver treats it; the callers that
// care about "selects nothing" semantics are expected to check for that themselves.
pub fn label_selector_matches(
    labels: &BTreeMap<String, String>,
    sel: &metav1::LabelSelector,
) -> anyhow::Result<bool> {
    if let Some(exprs) = &sel.match_expressions {
        for expr in exprs {
            if !label_expr_match(labels, expr)? {
                return Ok(false);
            }
        }
    }

    if let Some(match_labels) = &sel.match_labels {
        for (k, v) in match_labels {
            if labels.get(k) != Some(v) {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

pub fn is_empty_selector(sel: &metav1::LabelSelector) -> bool {
    sel.match_expressions.as_ref().is_none_or(|e| e.is_empty())
        && sel.match_labels.as_ref().is_none_or(|l| l.is_empty())
}

impl<T: Resource> KubeResourceExt for T {
    fn matches(&self, sel: &metav1::LabelSelector) -> anyhow::Result<bool> {
        label_selector_matches(self.labels(), sel)
    }

    // Objects that come back from the apiserver always have a creation timestamp; the epoch
    // fallback only shows up for hand-built objects
    fn created_at(&self) -> DateTime<Utc> {
        self.meta().creation_timestamp.as_ref().map(|t| t.0).unwrap_or_default()
    }

    fn is_terminating(&self) -> bool {
        self.meta().deletion_timestamp.is_some()
    }
}

// The meanings of these operators is explained here:
// https://kubernetes.io/docs/concepts/overview/working-with-objects/labels/#set-based-requirement
pub(super) const OPERATOR_IN: &str = "In";
pub(super) const OPERATOR_NOT_IN: &str = "NotIn";
pub(super) const OPERATOR_EXISTS: &str = "Exists";
pub(super) const OPERATOR_DOES_NOT_EXIST: &str = "DoesNotExist";

fn label_expr_match(
    obj_labels: &BTreeMap<String, String>,
    expr: &metav1::LabelSelectorRequirement,
) -> anyhow::Result<bool> {
    // LabelSelectorRequirement is considered invalid if the Operator is "In" or NotIn"
    // and there are no values; conversely for "Exists" and "DoesNotExist".
    match expr.operator.as_str() {
        OPERATOR_IN => match obj_labels.get(&expr.key) {
            Some(v) => match &expr.values {
                Some(values) if !values.is_empty() => Ok(values.contains(v)),
                _ => bail!(KubernetesError::malformed_label_selector(expr)),
            },
            None => Ok(false),
        },
        OPERATOR_NOT_IN => match obj_labels.get(&expr.key) {
            Some(v) => match &expr.values {
                Some(values) if !values.is_empty() => Ok(!values.contains(v)),
                _ => bail!(KubernetesError::malformed_label_selector(expr)),
            },
            None => Ok(true),
        },
        OPERATOR_EXISTS => match &expr.values {
            Some(values) if !values.is_empty() => bail!(KubernetesError::malformed_label_selector(expr)),
            _ => Ok(obj_labels.contains_key(&expr.key)),
        },
        OPERATOR_DOES_NOT_EXIST => match &expr.values {
            Some(values) if !values.is_empty() => {
                bail!(KubernetesError::malformed_label_selector(expr));
            },
            _ => Ok(!obj_labels.contains_key(&expr.key)),
        },
        _ => bail!("malformed label selector expression: {:?}", expr),
    }
}

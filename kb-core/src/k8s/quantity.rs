use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

use super::*;

const BINARY_SUFFIXES: [(&str, f64); 6] = [
    ("Ki", 1024.0),
    ("Mi", 1024.0 * 1024.0),
    ("Gi", 1024.0 * 1024.0 * 1024.0),
    ("Ti", 1024.0 * 1024.0 * 1024.0 * 1024.0),
    ("Pi", 1024.0 * 1024.0 * 1024.0 * 1024.0 * 1024.0),
    ("Ei", 1024.0 * 1024.0 * 1024.0 * 1024.0 * 1024.0 * 1024.0),
];

const DECIMAL_SUFFIXES: [(&str, f64); 10] = [
    ("n", 1e-9),
    ("u", 1e-6),
    ("m", 1e-3),
    ("", 1.0),
    ("k", 1e3),
    ("M", 1e6),
    ("G", 1e9),
    ("T", 1e12),
    ("P", 1e15),
    ("E", 1e18),
];

// Converts a Kubernetes quantity string into its value in base units (cores, bytes, etc).  The
// metrics API reports cpu in nanocores ("123456n") and memory in kibibytes ("2048Ki") but we
// accept any of the serialization formats the apiserver does.
pub fn parse_quantity(q: &str) -> anyhow::Result<f64> {
    let q = q.trim();
    let split = q
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '+' || c == '-'))
        .unwrap_or(q.len());
    let (number, suffix) = q.split_at(split);

    let value: f64 = number
        .parse()
        .map_err(|_| KubernetesError::malformed_quantity(q))?;
    if value < 0.0 || !value.is_finite() {
        bail!(KubernetesError::malformed_quantity(q));
    }

    if let Some((_, mult)) = BINARY_SUFFIXES.iter().find(|(s, _)| *s == suffix) {
        return Ok(value * mult);
    }

    if let Some((_, mult)) = DECIMAL_SUFFIXES.iter().find(|(s, _)| *s == suffix) {
        return Ok(value * mult);
    }

    // Exponent notation, e.g. "12e6" or "1E3"; a bare "E" is the exa suffix and is handled above
    if let Some(exp) = suffix.strip_prefix(['e', 'E'])
        && let Ok(exp) = exp.parse::<i32>()
    {
        return Ok(value * 10f64.powi(exp));
    }

    bail!(KubernetesError::malformed_quantity(q))
}

pub fn cpu_nanocores(q: &Quantity) -> anyhow::Result<u64> {
    Ok((parse_quantity(&q.0)? * 1e9).round() as u64)
}

pub fn memory_bytes(q: &Quantity) -> anyhow::Result<u64> {
    Ok(parse_quantity(&q.0)?.round() as u64)
}

use kb_core::errors::*;

err_impl! {BattleError,
    #[error("target vanished before it could be eliminated: {0}")]
    TargetVanished(String),

    #[error("control plane unavailable: {0}")]
    ControlPlaneUnavailable(String),

    #[error("write conflict: {0}")]
    WriteConflict(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("resource metrics unavailable: {0}")]
    MetricsUnavailable(String),

    #[error("cannot select from an empty population in {0}")]
    EmptyPopulation(String),
}

// Anything other than "it's gone" or "somebody else changed it" is treated as the control plane
// being unreachable; the battle loop only distinguishes these cases for logging, since all of them
// count as a failed round.
pub(crate) fn classify_kube_error(err: kube::Error, target: &str) -> anyhow::Error {
    match err {
        kube::Error::Api(kube::core::ErrorResponse { code: 404, .. }) => BattleError::target_vanished(target),
        kube::Error::Api(kube::core::ErrorResponse { code: 409, .. }) => BattleError::write_conflict(target),
        e => BattleError::control_plane_unavailable(&format!("{target}: {e}")),
    }
}

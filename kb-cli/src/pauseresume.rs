use kb_core::clock::UtcClock;
use kb_core::errors::*;
use kb_core::prelude::*;
use kube::api::{
    Patch,
    PatchParams,
};
use serde_json::json;

#[derive(clap::Args)]
pub struct Args {
    #[arg(short, long, default_value = DEFAULT_NAMESPACE, long_help = "namespace the battle is running in")]
    pub namespace: String,
}

fn patch_params() -> PatchParams {
    PatchParams { field_manager: Some(FIELD_MANAGER.into()), ..Default::default() }
}

pub async fn pause_cmd(args: &Args, client: kube::Client) -> EmptyResult {
    let ns_api = kube::Api::<corev1::Namespace>::all(client.clone());

    let Some(ns) = ns_api.get_opt(&args.namespace).await? else {
        bail!("namespace not found: {}", args.namespace);
    };
    if let Some(ts) = ns.annotations().get(PAUSED_ANNOTATION_KEY) {
        bail!("battle in {} is already paused (since {ts})", args.namespace);
    }

    println!("pausing battle in {}...", args.namespace);
    let now = UtcClock.now();
    let pause_patch = json!({
        "metadata": {
            "annotations": {
                PAUSED_ANNOTATION_KEY: now.to_rfc3339(),
            }
    }});

    ns_api
        .patch(&args.namespace, &patch_params(), &Patch::Merge(pause_patch))
        .await?;

    Ok(())
}

pub async fn resume_cmd(args: &Args, client: kube::Client) -> EmptyResult {
    let ns_api = kube::Api::<corev1::Namespace>::all(client.clone());

    let Some(ns) = ns_api.get_opt(&args.namespace).await? else {
        bail!("namespace not found: {}", args.namespace);
    };
    if !ns.annotations().contains_key(PAUSED_ANNOTATION_KEY) {
        bail!("battle in {} is not paused", args.namespace);
    }

    println!("resuming battle in {}...", args.namespace);
    let resume_patch = json!({
        "metadata": {
            "annotations": {
                PAUSED_ANNOTATION_KEY: null,
            }
    }});

    ns_api
        .patch(&args.namespace, &patch_params(), &Patch::Merge(resume_patch))
        .await?;

    Ok(())
}

//! Build argument derivation from resolved manifests.

mod fixtures;

use std::path::{Path, PathBuf};

use wkld::apply_env;
use wkld::build::{derive, BuildMode, DeriveError, ImageRef};
use wkld::manifest::{BuildSpec, Field, LoadBalancedConfig, ResolvedManifest, ServiceConfig};

const REPO: &str = "123456789012.dkr.ecr.us-west-2.amazonaws.com/shop";

fn image(name: &str) -> ImageRef {
    ImageRef::new(format!("{}/{}", REPO, name), "f00dcafe")
}

fn with_build(build: BuildSpec) -> ResolvedManifest {
    let mut config = LoadBalancedConfig::default();
    config.image.image.build = build;
    config.image.port = Field::new(80);
    ResolvedManifest::new("frontend", Some("prod".to_string()), ServiceConfig::LoadBalanced(config))
}

#[test]
fn test_builder_without_dockerfile_uses_workspace_root() {
    let resolved = apply_env(&fixtures::api(), "prod").unwrap();
    let args = derive(&resolved, Path::new("/work/shop"), &image("api")).unwrap();

    assert_eq!(args.mode(), BuildMode::Buildpack);
    assert_eq!(args.builder_name.as_deref(), Some("paketobuildpacks/builder:full"));
    assert_eq!(args.dockerfile_path, None);
    assert_eq!(args.context_dir, PathBuf::from("/work/shop"));
    assert_eq!(
        args.sorted_env(),
        vec![
            ("BP_GO_VERSION".to_string(), "1.21".to_string()),
            ("BP_KEEP_FILES".to_string(), "static/*".to_string()),
        ]
    );
}

#[test]
fn test_cleared_builder_falls_back_to_dockerfile() {
    let resolved = apply_env(&fixtures::api(), "dev").unwrap();
    let args = derive(&resolved, Path::new("/work/shop"), &image("api")).unwrap();

    assert_eq!(args.mode(), BuildMode::Dockerfile);
    assert_eq!(args.builder_name, None);
    assert_eq!(
        args.dockerfile_path,
        Some(PathBuf::from("/work/shop/api/Dockerfile"))
    );
    assert_eq!(args.context_dir, PathBuf::from("/work/shop/api"));
}

#[test]
fn test_resolved_build_args_reach_docker() {
    let resolved = apply_env(&fixtures::frontend(), "prod").unwrap();
    let args = derive(
        &resolved,
        Path::new("/work/shop"),
        &image("frontend").with_additional_tags(["latest"]),
    )
    .unwrap();

    let cmds = args.build_commands();
    assert_eq!(cmds.len(), 1);
    assert_eq!(
        cmds[0].to_string(),
        format!(
            "docker build -t {repo}/frontend:latest -t {repo}/frontend:f00dcafe \
             --build-arg API_URL=http://localhost:8080 --build-arg NODE_ENV=production \
             /work/shop/frontend -f /work/shop/frontend/Dockerfile",
            repo = REPO
        )
    );
}

#[test]
fn test_build_arg_order_ignores_insertion_order() {
    let keys = ["ZONE", "ALPHA", "MIDDLE", "BETA"];

    let mut forward = BuildSpec::dockerfile("Dockerfile");
    for key in keys {
        forward.args.insert(key.to_string(), key.to_lowercase());
    }
    let mut reverse = BuildSpec::dockerfile("Dockerfile");
    for key in keys.iter().rev() {
        reverse.args.insert(key.to_string(), key.to_lowercase());
    }

    let a = derive(&with_build(forward), Path::new("/ws"), &image("frontend")).unwrap();
    let b = derive(&with_build(reverse), Path::new("/ws"), &image("frontend")).unwrap();

    assert_eq!(a.sorted_build_args(), b.sorted_build_args());
    assert_eq!(
        serde_json::to_vec(&a).unwrap(),
        serde_json::to_vec(&b).unwrap()
    );
    assert_eq!(a.build_commands(), b.build_commands());

    let order: Vec<_> = a.sorted_build_args().into_iter().map(|(k, _)| k).collect();
    assert_eq!(order, vec!["ALPHA", "BETA", "MIDDLE", "ZONE"]);
}

#[test]
fn test_unresolved_dockerfile_fails_fast() {
    let mut build = BuildSpec::default();
    build.dockerfile.clear();
    let err = derive(&with_build(build), Path::new("/ws"), &image("frontend")).unwrap_err();

    assert_eq!(
        err,
        DeriveError::Unresolved {
            field: "image.build.dockerfile"
        }
    );
    assert!(err.to_string().contains("image.build.dockerfile"));
}

#[test]
fn test_missing_tag_fails_fast() {
    let resolved = apply_env(&fixtures::frontend(), "prod").unwrap();
    let err = derive(&resolved, Path::new("/ws"), &ImageRef::new(REPO, "")).unwrap_err();
    assert_eq!(err, DeriveError::Unresolved { field: "image_tag" });
}

#[test]
fn test_buildpack_push_every_tag() {
    let resolved = apply_env(&fixtures::api(), "prod").unwrap();
    let args = derive(
        &resolved,
        Path::new("/ws"),
        &image("api").with_additional_tags(["latest"]),
    )
    .unwrap();

    let build: Vec<String> = args.build_commands().iter().map(|c| c.to_string()).collect();
    assert_eq!(build.len(), 2);
    assert!(build[0].starts_with(&format!("pack build {}/api:latest --builder", REPO)));
    assert_eq!(
        build[1],
        format!("docker tag {repo}/api:latest {repo}/api:f00dcafe", repo = REPO)
    );

    let pushes = args.push_commands();
    assert_eq!(pushes.len(), 2);
    assert_eq!(pushes[1].args[1], format!("{}/api:f00dcafe", REPO));
}

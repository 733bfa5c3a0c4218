//! Manifest documents on disk: decoding, validation, rendering, and the
//! workspace that holds them.

mod fixtures;

use tempfile::TempDir;

use wkld::config::EffectiveSettings;
use wkld::manifest::{
    default_http_path, ExistingService, Field, LoadBalancedWebServiceProps, Manifest,
    ManifestError, ResolvedManifest, ServiceProps, WorkloadKind, WorkloadProps,
};
use wkld::{apply_env, fingerprint, Renderer, TemplateRenderer, Workspace, WriteOutcome};

#[test]
fn test_fixtures_decode() {
    let frontend = fixtures::frontend();
    assert_eq!(frontend.kind(), WorkloadKind::LoadBalancedWebService);
    assert_eq!(
        frontend.environment_names().collect::<Vec<_>>(),
        vec!["prod", "staging", "test"]
    );

    let api = fixtures::api();
    assert_eq!(api.kind(), WorkloadKind::BackendService);
    assert_eq!(api.config.port(), &Field::new(8080));
}

#[test]
fn test_overlay_validation_names_environment() {
    let doc = fixtures::read_fixture("frontend.yml")
        .replace("    count: 2\n", "    count: 2\n    image:\n      port: 0\n");
    let err = Manifest::from_yaml(&doc).unwrap_err();

    assert!(matches!(err, ManifestError::Validation { .. }));
    assert_eq!(err.field(), Some("environments.staging.image.port"));
}

#[test]
fn test_overlay_type_error_names_environment() {
    let doc = fixtures::read_fixture("api.yml").replace("memory: 2048", "memory: plenty");
    let err = Manifest::from_yaml(&doc).unwrap_err();
    assert_eq!(err.field(), Some("environments.prod"));
}

#[test]
fn test_render_resolved_then_decode() {
    let renderer = TemplateRenderer::new().unwrap();

    for manifest in [fixtures::frontend(), fixtures::api()] {
        let resolved = apply_env(&manifest, "prod").unwrap();
        let bytes = renderer.render_manifest(&resolved).unwrap();
        let decoded = Manifest::from_yaml(std::str::from_utf8(&bytes).unwrap()).unwrap();

        assert_eq!(decoded.name, resolved.name);
        assert_eq!(decoded.kind(), resolved.kind());
        assert_eq!(decoded.config, resolved.config);
        assert!(decoded.environments.is_empty());
    }
}

#[test]
fn test_rendered_optional_sections_survive() {
    let renderer = TemplateRenderer::new().unwrap();
    let resolved = apply_env(&fixtures::api(), "prod").unwrap();
    let doc = String::from_utf8(renderer.render_manifest(&resolved).unwrap()).unwrap();

    assert!(doc.contains("enableMetadata: false"));
    let decoded = Manifest::from_yaml(&doc).unwrap();
    let logging = decoded.config.logging().unwrap();
    assert_eq!(logging.destination["region"], "eu-west-1");
    assert_eq!(logging.enable_metadata, Field::new(false));
    assert_eq!(decoded.config.logging(), resolved.config.logging());

    let frontend = apply_env(&fixtures::frontend(), "prod").unwrap();
    let doc = String::from_utf8(renderer.render_manifest(&frontend).unwrap()).unwrap();
    let decoded = Manifest::from_yaml(&doc).unwrap();
    assert_eq!(decoded.config.sidecars(), frontend.config.sidecars());
}

#[test]
fn test_rendered_prod_keeps_cleared_path() {
    let renderer = TemplateRenderer::new().unwrap();
    let resolved = apply_env(&fixtures::frontend(), "prod").unwrap();
    let doc = String::from_utf8(renderer.render_manifest(&resolved).unwrap()).unwrap();

    assert!(doc.contains("path: \"\""));
    let decoded = Manifest::from_yaml(&doc).unwrap();
    assert_eq!(
        decoded.config.http().unwrap().path,
        Field::new(String::new())
    );
}

#[test]
fn test_fingerprint_tracks_environment() {
    let frontend = fixtures::frontend();
    let test = fingerprint(&apply_env(&frontend, "test").unwrap()).unwrap();
    let prod = fingerprint(&apply_env(&frontend, "prod").unwrap()).unwrap();
    assert_ne!(test, prod);

    // same document, decoded twice
    let again = fingerprint(&apply_env(&fixtures::frontend(), "prod").unwrap()).unwrap();
    assert_eq!(prod, again);
}

#[test]
fn test_init_flow_in_workspace() {
    let dir = TempDir::new().unwrap();
    let settings = EffectiveSettings::for_workspace(dir.path(), None).unwrap();
    let workspace = Workspace::new(dir.path()).with_manifest_file(settings.manifest_file());
    let renderer = TemplateRenderer::new().unwrap();

    let mut existing: Vec<ExistingService> = Vec::new();
    for name in ["storefront", "admin"] {
        let manifest = Manifest::new(ServiceProps::LoadBalanced(LoadBalancedWebServiceProps {
            workload: WorkloadProps {
                name: name.to_string(),
                dockerfile: Some(format!("{}/{}", name, settings.dockerfile_name())),
                builder: None,
            },
            path: default_http_path(name, &existing),
            port: 8080,
        }))
        .unwrap();

        let resolved = ResolvedManifest::from_base(&manifest);
        let bytes = renderer
            .render(wkld::template_for(manifest.kind()), &resolved)
            .unwrap();
        assert_eq!(
            workspace.write_manifest(name, &bytes).unwrap(),
            WriteOutcome::Created
        );

        existing.push(ExistingService {
            name: name.to_string(),
            kind: manifest.kind(),
        });
    }

    let entries = workspace.discover().unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["admin", "storefront"]);

    let storefront = workspace.load("storefront").unwrap();
    assert_eq!(storefront.config.http().unwrap().path.non_empty(), Some("/"));
    let admin = workspace.load("admin").unwrap();
    assert_eq!(admin.config.http().unwrap().path.non_empty(), Some("admin"));

    // a second init leaves the file alone
    assert_eq!(
        workspace.write_manifest("admin", b"name: other\n").unwrap(),
        WriteOutcome::Exists
    );
    assert_eq!(workspace.load("admin").unwrap(), admin);
}

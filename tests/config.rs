// ABOUTME: Integration tests for configuration parsing and validation.
// ABOUTME: Tests the named schema, legacy migration, defaults, targets and file discovery.

use skiff::config::*;
use skiff::types::RuntimeType;
use std::path::PathBuf;
use std::time::Duration;

mod parsing {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let yaml = r#"
name: shop
deploy:
  type: ssh
  ssh: example.com
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.name, "shop");
        assert_eq!(config.runtime, RuntimeType::Docker);
        assert_eq!(config.images.len(), 1);

        let image = config.image("shop").unwrap();
        assert_eq!(image.base_image, "node:24-alpine");
        assert_eq!(image.target_arch, "linux/amd64");
        assert_eq!(image.install_cmd, "npm ci");
        assert_eq!(image.build_cmd, "npm run build");
        assert_eq!(image.start_cmd, "npm start");
        assert_eq!(image.dockerfile, PathBuf::from("Dockerfile"));

        assert_eq!(config.containers.len(), 1);
        assert_eq!(config.containers.head.name.as_str(), "shop");
        assert!(!config.lock);
    }

    #[test]
    fn parse_full_config() {
        let yaml = r#"
name: shop
runtime: podman

images:
  web:
    base_image: node:22-alpine
    target_arch: linux/arm64
    install_cmd: pnpm install --frozen-lockfile
    build_cmd: pnpm build
    start_cmd: node dist/server.js
    port: 80
    app_port: 3000
    dockerfile: docker/web.Dockerfile
  api:
    start_cmd: node api.js

deploy:
  type: ssh
  env_file: /srv/shop/.env
  networks: [edge]
  lock: true
  ssh:
    host: shop.example.com
    user: deploy
    port: 2222
    identity_file: /keys/deploy
    trust_first_connection: false
  containers:
    - name: shop-web
      image: web
    - name: shop-web-canary
      image: web
      port: 8080
      app_port: 3000
      networks: [edge, canary]
    - name: shop-api
      image: api
      env_file: /srv/shop/api.env
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.runtime, RuntimeType::Podman);
        assert!(config.lock);

        let names: Vec<&str> = config.images.keys().map(|k| k.as_str()).collect();
        assert_eq!(names, ["api", "web"]);

        let web = config.image("web").unwrap();
        assert_eq!(web.target_arch, "linux/arm64");
        assert_eq!(web.dockerfile, PathBuf::from("docker/web.Dockerfile"));
        assert_eq!(config.image("api").unwrap().base_image, "node:24-alpine");

        let containers: Vec<_> = config.containers.iter().collect();
        assert_eq!(containers[0].port_mapping().as_deref(), Some("80:3000"));
        assert_eq!(containers[0].env_file.as_deref(), Some("/srv/shop/.env"));
        assert_eq!(containers[0].networks, ["edge"]);
        assert_eq!(containers[1].port_mapping().as_deref(), Some("8080:3000"));
        assert_eq!(containers[1].networks, ["edge", "canary"]);
        assert_eq!(containers[2].port_mapping(), None);
        assert_eq!(containers[2].env_file.as_deref(), Some("/srv/shop/api.env"));

        let ssh = config.ssh_target("deploy").unwrap();
        assert_eq!(ssh.host, "shop.example.com");
        assert_eq!(ssh.user.as_deref(), Some("deploy"));
        assert_eq!(ssh.port, 2222);
        assert_eq!(ssh.identity_file, Some(PathBuf::from("/keys/deploy")));
        assert!(!ssh.trust_first_connection);
    }

    #[test]
    fn invalid_yaml_returns_parse_error() {
        let err = Config::from_yaml("name: [shop").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn unknown_runtime_returns_parse_error() {
        let yaml = r#"
runtime: containerd
deploy:
  type: ssh
  ssh: example.com
"#;
        assert!(matches!(
            Config::from_yaml(yaml),
            Err(ConfigError::Parse { .. })
        ));
    }
}

mod legacy {
    use super::*;

    #[test]
    fn single_image_block_becomes_named_image_and_container() {
        let yaml = r#"
name: blog
container:
  base_image: node:20-alpine
  start_cmd: node index.js
deploy:
  type: ssh
  ssh: deploy@blog.example.com
  port: 80
  app_port: 3000
  env_file: .env
"#;
        let config = Config::from_yaml(yaml).unwrap();

        let image = config.image("blog").unwrap();
        assert_eq!(image.base_image, "node:20-alpine");
        assert_eq!(image.start_cmd, "node index.js");

        let container = &config.containers.head;
        assert_eq!(container.name.as_str(), "blog");
        assert_eq!(container.image.as_str(), "blog");
        assert_eq!(container.port_mapping().as_deref(), Some("80:3000"));
        assert_eq!(container.env_file.as_deref(), Some(".env"));
    }

    #[test]
    fn zero_ports_are_unset() {
        let yaml = r#"
name: blog
container:
  port: 0
  app_port: 0
deploy:
  type: ssh
  ssh: blog.example.com
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.containers.head.port_mapping(), None);
    }

    #[test]
    fn legacy_block_next_to_images_is_rejected() {
        let yaml = r#"
name: shop
container:
  start_cmd: node legacy.js
  port: 80
  app_port: 3000
images:
  api: {}
deploy:
  type: ssh
  ssh: shop.example.com
"#;
        let err = Config::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::MixedSchema));
        assert_eq!(
            err.to_string(),
            "container: and images: are mutually exclusive"
        );
    }

    #[test]
    fn missing_name_uses_default_project_name() {
        let yaml = r#"
deploy:
  type: ssh
  ssh: example.com
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.name, "app");
        assert!(config.image("app").is_some());
    }
}

mod validation {
    use super::*;

    #[test]
    fn missing_deploy_type_returns_error() {
        let err = Config::from_yaml("name: shop\n").unwrap_err();
        assert_eq!(err.to_string(), "deploy.type is required");
    }

    #[test]
    fn ssh_without_host_returns_error() {
        let yaml = r#"
deploy:
  type: ssh
  ssh:
    user: deploy
"#;
        let err = Config::from_yaml(yaml).unwrap_err();
        assert_eq!(err.to_string(), "deploy.ssh.host is required");
    }

    #[test]
    fn registry_without_repository_returns_error() {
        let yaml = r#"
deploy:
  type: registry
  registry:
    registry_url: reg.example.com
"#;
        let err = Config::from_yaml(yaml).unwrap_err();
        assert_eq!(err.to_string(), "deploy.registry.repository is required");
    }

    #[test]
    fn image_port_without_app_port_returns_error() {
        let yaml = r#"
images:
  api:
    port: 8080
deploy:
  type: ssh
  ssh: example.com
"#;
        let err = Config::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::PortWithoutAppPort(_)));
        assert!(err.to_string().contains("images.api.app_port"));
    }

    #[test]
    fn container_port_without_app_port_returns_error() {
        let yaml = r#"
images:
  api: {}
deploy:
  type: ssh
  ssh: example.com
  containers:
    - name: api
      port: 8080
"#;
        let err = Config::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("deploy.containers.api.app_port"));
    }

    #[test]
    fn unknown_image_returns_error() {
        let yaml = r#"
images:
  api: {}
  web: {}
deploy:
  type: ssh
  ssh: example.com
  containers:
    - name: cache
      image: redis
"#;
        let err = Config::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownImage { .. }));
        assert!(err.to_string().contains("redis"));
    }

    #[test]
    fn ambiguous_container_image_returns_error() {
        let yaml = r#"
images:
  api: {}
  web: {}
deploy:
  type: ssh
  ssh: example.com
  containers:
    - name: something
"#;
        let err = Config::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn duplicate_containers_return_error() {
        let yaml = r#"
images:
  api: {}
deploy:
  type: ssh
  ssh: example.com
  containers:
    - name: api
    - name: api
"#;
        let err = Config::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateContainer(_)));
    }

    #[test]
    fn invalid_image_name_returns_error() {
        let yaml = r#"
images:
  Api: {}
deploy:
  type: ssh
  ssh: example.com
"#;
        let err = Config::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidImageName { .. }));
    }

    #[test]
    fn invalid_ssh_port_returns_error() {
        let yaml = r#"
deploy:
  type: ssh
  ssh: example.com:ssh
"#;
        assert!(matches!(
            Config::from_yaml(yaml),
            Err(ConfigError::InvalidAddress(_))
        ));
    }
}

mod targets {
    use super::*;

    #[test]
    fn registry_target_defaults_timeout() {
        let yaml = r#"
deploy:
  type: registry
  registry:
    registry_url: https://reg.example.com/
    repository: acme/app
"#;
        let config = Config::from_yaml(yaml).unwrap();
        match &config.target {
            DeployTarget::Registry(registry) => {
                assert_eq!(registry.repository, "acme/app");
                assert_eq!(registry.timeout, Duration::from_secs(10));
                assert_eq!(registry.host(), Some("reg.example.com"));
            }
            other => panic!("unexpected target: {other:?}"),
        }
    }

    #[test]
    fn registry_timeout_accepts_humantime() {
        let yaml = r#"
deploy:
  type: registry
  registry:
    repository: acme/app
    timeout: 1m 30s
"#;
        let config = Config::from_yaml(yaml).unwrap();
        let DeployTarget::Registry(registry) = &config.target else {
            panic!("expected registry target");
        };
        assert_eq!(registry.timeout, Duration::from_secs(90));
        assert_eq!(registry.registry_url, None);
    }

    #[test]
    fn ssh_commands_reject_registry_target() {
        let yaml = r#"
deploy:
  type: registry
  registry:
    repository: acme/app
"#;
        let config = Config::from_yaml(yaml).unwrap();
        let err = config.ssh_target("deploy").unwrap_err();
        assert_eq!(err.to_string(), "deploy.type must be ssh for deploy");
    }

    #[test]
    fn simple_ssh_address_uses_default_port() {
        let yaml = r#"
deploy:
  type: ssh
  ssh: deploy@example.com
"#;
        let config = Config::from_yaml(yaml).unwrap();
        let ssh = config.ssh_target("status").unwrap();
        assert_eq!(ssh.port, 22);
        assert!(ssh.trust_first_connection);
        assert_eq!(ssh.identity_file, None);
    }

    #[test]
    fn identity_file_expands_home() {
        let yaml = r#"
deploy:
  type: ssh
  ssh:
    host: example.com
    identity_file: ~/.ssh/deploy_ed25519
"#;
        temp_env::with_var("HOME", Some("/home/ops"), || {
            let config = Config::from_yaml(yaml).unwrap();
            let ssh = config.ssh_target("deploy").unwrap();
            assert_eq!(
                ssh.identity_file,
                Some(PathBuf::from("/home/ops/.ssh/deploy_ed25519"))
            );
            assert_eq!(ssh.port, 22);
        });
    }
}

mod discovery {
    use super::*;

    const MINIMAL: &str = "name: found\ndeploy:\n  type: ssh\n  ssh: example.com\n";

    #[test]
    fn finds_primary_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), MINIMAL).unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.name, "found");
    }

    #[test]
    fn finds_alternate_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME_ALT), MINIMAL).unwrap();

        assert!(Config::discover(dir.path()).is_ok());
    }

    #[test]
    fn finds_config_in_dot_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".skiff")).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME_DIR), MINIMAL).unwrap();

        assert!(Config::discover(dir.path()).is_ok());
    }

    #[test]
    fn primary_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), MINIMAL).unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILENAME_ALT),
            MINIMAL.replace("found", "other"),
        )
        .unwrap();

        assert_eq!(Config::discover(dir.path()).unwrap().name, "found");
    }

    #[test]
    fn empty_directory_returns_not_found() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::discover(dir.path()),
            Err(ConfigError::NotFound(_))
        ));
    }

    #[test]
    fn parse_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "deploy: [").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("skiff.yml"));
    }

    #[test]
    fn init_writes_a_loadable_config() {
        let dir = tempfile::tempdir().unwrap();

        let path = init_config(dir.path(), Some("shop"), false).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.name, "shop");

        assert!(matches!(
            init_config(dir.path(), None, false),
            Err(ConfigError::AlreadyExists(_))
        ));
        assert!(init_config(dir.path(), None, true).is_ok());
    }
}

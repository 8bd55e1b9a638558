//! Tests for CLI argument parsing.

use clap::Parser;

use super::cli::{BaseDirArg, Cli, Command};

mod parsing {
    use super::*;

    #[test]
    fn parse_no_args() {
        let cli = Cli::parse_from_iter(["maintenance-gate"]);

        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
        assert!(!cli.enabled);
        assert!(cli.retry_interval.is_none());
        assert!(cli.bypass_paths.is_empty());
    }

    #[test]
    fn parse_response_options() {
        let cli = Cli::parse_from_iter([
            "maintenance-gate",
            "--response-file",
            "offline.html",
            "--base-dir",
            "web-root",
            "--retry-interval",
            "120",
        ]);

        assert_eq!(
            cli.response_file.as_deref(),
            Some(std::path::Path::new("offline.html"))
        );
        assert_eq!(cli.base_dir, Some(BaseDirArg::WebRoot));
        assert_eq!(cli.retry_interval, Some(120));
    }

    #[test]
    fn parse_repeated_bypass_rules() {
        let cli = Cli::parse_from_iter([
            "maintenance-gate",
            "--bypass-path",
            "/health",
            "--bypass-path",
            "/admin",
            "--bypass-extension",
            "css",
            "--bypass-user",
            "admin",
            "--bypass-role",
            "Ops",
            "--bypass-authenticated",
        ]);

        assert_eq!(cli.bypass_paths, ["/health", "/admin"]);
        assert_eq!(cli.bypass_extensions, ["css"]);
        assert_eq!(cli.bypass_users, ["admin"]);
        assert_eq!(cli.bypass_roles, ["Ops"]);
        assert!(cli.bypass_authenticated);
    }

    #[test]
    fn parse_all_base_dirs() {
        let web = Cli::parse_from_iter(["maintenance-gate", "--base-dir", "web-root"]);
        assert_eq!(web.base_dir, Some(BaseDirArg::WebRoot));

        let content = Cli::parse_from_iter(["maintenance-gate", "--base-dir", "content-root"]);
        assert_eq!(content.base_dir, Some(BaseDirArg::ContentRoot));

        let none = Cli::parse_from_iter(["maintenance-gate", "--base-dir", "none"]);
        assert_eq!(none.base_dir, Some(BaseDirArg::None));
    }

    #[test]
    fn invalid_base_dir_is_rejected() {
        let result = Cli::try_parse_from(["maintenance-gate", "--base-dir", "home"]);
        assert!(result.is_err());
    }

    #[test]
    fn short_flags() {
        let cli = Cli::parse_from_iter(["maintenance-gate", "-c", "gate.toml", "-v"]);

        assert_eq!(
            cli.config.as_deref(),
            Some(std::path::Path::new("gate.toml"))
        );
        assert!(cli.verbose);
    }
}

mod subcommands {
    use super::*;

    #[test]
    fn init_uses_default_output() {
        let cli = Cli::parse_from_iter(["maintenance-gate", "init"]);

        let Some(Command::Init { output }) = cli.command else {
            panic!("expected init");
        };
        assert_eq!(output, std::path::Path::new("maintenance-gate.toml"));
    }

    #[test]
    fn init_with_custom_output() {
        let cli = Cli::parse_from_iter(["maintenance-gate", "init", "-o", "custom.toml"]);

        assert!(matches!(
            cli.command,
            Some(Command::Init { ref output }) if output == std::path::Path::new("custom.toml")
        ));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "maintenance-gate",
            "check",
            "--retry-interval",
            "60",
            "--enabled",
        ])
        .unwrap();

        assert!(matches!(cli.command, Some(Command::Check)));
        assert_eq!(cli.retry_interval, Some(60));
        assert!(cli.enabled);
    }

    #[test]
    fn serve_subcommand() {
        let cli = Cli::parse_from_iter(["maintenance-gate", "serve", "--listen", "0.0.0.0:9000"]);

        assert!(matches!(cli.command, Some(Command::Serve)));
        assert_eq!(cli.listen.as_deref(), Some("0.0.0.0:9000"));
    }
}

mod conversions {
    use super::*;
    use crate::options::BaseDir;

    #[test]
    fn base_dir_arg_into_base_dir() {
        assert_eq!(BaseDir::from(BaseDirArg::WebRoot), BaseDir::WebRoot);
        assert_eq!(BaseDir::from(BaseDirArg::ContentRoot), BaseDir::ContentRoot);
        assert_eq!(BaseDir::from(BaseDirArg::None), BaseDir::None);
    }
}

//! Catalog Discovery CLI
//!
//! Command-line interface for discovering the API versions and extensions
//! published by a cloud service catalog.

use anyhow::{Context, Result};
use catalog_discovery_common::{DiscoveryResult, IdentityApiVersion};
use catalog_discovery_core::{
    discover, get_v3_extensions, AuthProvider, DiscoveryOptions, FileAuthProvider, HttpTransport,
    Transport,
};
use catalog_discovery_writer::ConfigWriter;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "catalog-discovery")]
#[command(version, about = "Discover API versions and extensions from a cloud service catalog", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe every service in the catalog for versions and extensions
    #[command(after_help = "EXAMPLES:\n  \
        # Discover using a stored token snapshot\n  \
        catalog-discovery discover --auth-file auth.json --region RegionOne\n\n  \
        # Identity v3 catalog, self-signed certificates, tempest output\n  \
        catalog-discovery discover \\\n    \
        --auth-file auth.json \\\n    \
        --api-version 3 \\\n    \
        --insecure \\\n    \
        --format ini \\\n    \
        --output tempest.conf")]
    Discover {
        /// Token snapshot with auth URL, token, and token document
        #[arg(short, long)]
        auth_file: PathBuf,

        /// Region whose endpoints are preferred
        #[arg(short, long, env = "OS_REGION_NAME", default_value = "RegionOne")]
        region: String,

        /// Identity API version the token was issued by
        #[arg(long, env = "OS_IDENTITY_API_VERSION", default_value_t = 2,
              value_parser = clap::value_parser!(u8).range(2..=3))]
        api_version: u8,

        /// Token overriding the one stored in the snapshot
        #[arg(long, env = "OS_AUTH_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Skip TLS certificate verification
        #[arg(long)]
        insecure: bool,

        /// Do not probe object storage for its middleware list
        #[arg(long)]
        no_object_store_extensions: bool,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,

        /// Write output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List extensions of an identity v3 endpoint from its JSON-Home document
    #[command(after_help = "EXAMPLES:\n  \
        catalog-discovery identity-extensions --url http://172.16.52.151:5000/v3")]
    IdentityExtensions {
        /// Identity v3 endpoint URL
        #[arg(short, long)]
        url: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Discovery result as JSON
    Json,
    /// Tempest configuration sections
    Ini,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "JSON"),
            OutputFormat::Ini => write!(f, "INI"),
        }
    }
}

/// Settings of the `discover` subcommand
struct DiscoverConfig<'a> {
    auth_file: &'a Path,
    region: &'a str,
    api_version: IdentityApiVersion,
    token: Option<&'a str>,
    insecure: bool,
    object_store_extensions: bool,
    format: OutputFormat,
    output: Option<&'a Path>,
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Discover {
            auth_file,
            region,
            api_version,
            token,
            insecure,
            no_object_store_extensions,
            format,
            output,
        } => {
            let api_version = IdentityApiVersion::from_major(api_version)
                .context("Unsupported identity API version")?;
            discover_command(DiscoverConfig {
                auth_file: &auth_file,
                region: &region,
                api_version,
                token: token.as_deref(),
                insecure,
                object_store_extensions: !no_object_store_extensions,
                format,
                output: output.as_deref(),
                verbose: cli.verbose,
            })?;
        }

        Commands::IdentityExtensions { url } => {
            identity_extensions_command(&url)?;
        }
    }

    Ok(())
}

/// Log to stderr so stdout only carries the discovery output
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn discover_command(config: DiscoverConfig) -> Result<()> {
    eprintln!(
        "{} Loading auth snapshot: {}",
        "→".cyan(),
        config.auth_file.display()
    );
    let mut auth = FileAuthProvider::from_file(config.auth_file)
        .context("Failed to load auth snapshot")?;
    if let Some(token) = config.token {
        auth = auth.with_token(token);
    }

    if config.verbose {
        eprintln!("  Auth URL: {}", auth.auth_url());
        eprintln!("  Region: {}", config.region);
        eprintln!("  Identity API: {}", config.api_version);
        eprintln!("  Verify TLS: {}", !config.insecure);
        eprintln!("  Format: {}", config.format);
    }

    let transport = HttpTransport::new().context("Failed to create HTTP client")?;
    let options = DiscoveryOptions {
        region: config.region.to_string(),
        object_store_extensions: config.object_store_extensions,
        api_version: config.api_version,
        insecure: config.insecure,
    };

    eprintln!("{} Discovering services...", "→".cyan());
    let mut services =
        discover(&auth, &transport, &options).context("Failed to discover services")?;

    if config.api_version == IdentityApiVersion::V3 {
        merge_identity_v3_extensions(&mut services, &transport, &auth.auth_url())?;
    }

    eprintln!(
        "{} Discovered {} services",
        "✓".green(),
        services.len()
    );
    if config.verbose {
        for (name, record) in &services {
            eprintln!(
                "  • {} ({} versions, {} extensions)",
                name.cyan(),
                record.versions.len(),
                record.extension_list().len()
            );
        }
    }

    let rendered = match config.format {
        OutputFormat::Json => serde_json::to_string_pretty(&services)
            .context("Failed to serialize discovery result")?,
        OutputFormat::Ini => ConfigWriter::new()
            .and_then(|writer| writer.render(&services))
            .context("Failed to render tempest configuration")?,
    };

    match config.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("{} Wrote {}", "✓".green(), path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

/// Append the JSON-Home extensions of identity v3 to the identity record
fn merge_identity_v3_extensions(
    services: &mut DiscoveryResult,
    transport: &dyn Transport,
    auth_url: &str,
) -> Result<()> {
    let Some(identity) = services.get_mut("identity") else {
        return Ok(());
    };

    eprintln!("{} Reading identity v3 extensions", "→".cyan());
    let v3_extensions = get_v3_extensions(transport, auth_url)
        .context("Failed to discover identity v3 extensions")?;

    identity
        .extensions
        .get_or_insert_with(Vec::new)
        .extend(v3_extensions);

    Ok(())
}

fn identity_extensions_command(url: &str) -> Result<()> {
    let transport = HttpTransport::new().context("Failed to create HTTP client")?;
    let extensions = get_v3_extensions(&transport, url)
        .context("Failed to discover identity v3 extensions")?;

    eprintln!(
        "{} {} extensions enabled on {}",
        "✓".green(),
        extensions.len(),
        url.yellow()
    );
    for extension in extensions {
        println!("{}", extension);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_discovery_common::ServiceRecord;
    use catalog_discovery_core::{GetRequest, ACCEPT_JSON_HOME};
    use clap::CommandFactory;
    use mockall::mock;

    mock! {
        Http {}

        impl Transport for Http {
            fn get(&self, request: &GetRequest) -> catalog_discovery_core::Result<Vec<u8>>;
        }
    }

    const AUTH_URL: &str = "http://172.16.52.151:5000/v3";

    const JSON_HOME: &str = r#"{
        "resources": {
            "http://docs.openstack.org/api/openstack-identity/3/ext/OS-INHERIT/1.0/rel/domain_user_role_inherited_to_projects": {},
            "http://docs.openstack.org/api/openstack-identity/3/ext/OS-OAUTH1/1.0/rel/consumers": {},
            "http://docs.openstack.org/api/openstack-identity/3/rel/projects": {}
        }
    }"#;

    fn json_home_transport() -> MockHttp {
        let mut transport = MockHttp::new();
        transport
            .expect_get()
            .withf(|req: &GetRequest| req.url == AUTH_URL && req.accept == ACCEPT_JSON_HOME)
            .times(1)
            .returning(|_| Ok(JSON_HOME.as_bytes().to_vec()));
        transport
    }

    fn identity_record(extensions: Option<Vec<String>>) -> DiscoveryResult {
        let mut services = DiscoveryResult::new();
        services.insert(
            "identity".to_string(),
            ServiceRecord {
                url: AUTH_URL.to_string(),
                versions: vec!["v3.8".to_string()],
                extensions,
            },
        );
        services
    }

    #[test]
    fn test_merge_v3_extensions_creates_list() {
        let mut services = identity_record(None);
        merge_identity_v3_extensions(&mut services, &json_home_transport(), AUTH_URL).unwrap();

        assert_eq!(
            services["identity"].extensions,
            Some(vec!["OS-INHERIT".to_string(), "OS-OAUTH1".to_string()])
        );
    }

    #[test]
    fn test_merge_v3_extensions_appends_to_existing_list() {
        let mut services = identity_record(Some(vec!["OS-KSADM".to_string()]));
        merge_identity_v3_extensions(&mut services, &json_home_transport(), AUTH_URL).unwrap();

        assert_eq!(
            services["identity"].extensions,
            Some(vec![
                "OS-KSADM".to_string(),
                "OS-INHERIT".to_string(),
                "OS-OAUTH1".to_string()
            ])
        );
    }

    #[test]
    fn test_merge_v3_extensions_without_identity() {
        let mut services = DiscoveryResult::new();
        merge_identity_v3_extensions(&mut services, &MockHttp::new(), AUTH_URL).unwrap();
        assert!(services.is_empty());
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_discover() {
        let cli = Cli::try_parse_from([
            "catalog-discovery",
            "discover",
            "--auth-file",
            "auth.json",
            "--region",
            "RegionTwo",
            "--api-version",
            "3",
            "--insecure",
            "--format",
            "ini",
        ])
        .unwrap();

        match cli.command {
            Commands::Discover {
                region,
                api_version,
                insecure,
                format,
                no_object_store_extensions,
                ..
            } => {
                assert_eq!(region, "RegionTwo");
                assert_eq!(api_version, 3);
                assert!(insecure);
                assert!(matches!(format, OutputFormat::Ini));
                assert!(!no_object_store_extensions);
            }
            _ => panic!("expected discover"),
        }
    }

    #[test]
    fn test_rejects_unknown_api_version() {
        let result = Cli::try_parse_from([
            "catalog-discovery",
            "discover",
            "--auth-file",
            "auth.json",
            "--api-version",
            "4",
        ]);
        assert!(result.is_err());
    }
}

//! Keyvault CLI - store, inspect, and validate provider credentials

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use keyvault_core::config::Config;
use keyvault_core::domain::credential::{
    CredentialType, CredentialValidator, KeyStorage, PlatformCapabilities, ProviderMetadata,
    RetrieveOptions, SecureString, StoreOptions, ValidationResult, mask_secret,
};
use keyvault_core::infrastructure::biometric::UnsupportedBiometricApi;
use keyvault_core::infrastructure::{NativePlatform, WebPlatform};
use std::io::{self, BufRead, IsTerminal};
use std::sync::Arc;
use tracing::debug;

#[derive(Parser)]
#[command(name = "keyvault")]
#[command(author, version, about = "Secure credential storage and validation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Storage platform (native keyring or encrypted session store)
    #[arg(long, global = true, default_value = "native")]
    platform: PlatformArg,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum PlatformArg {
    #[default]
    Native,
    /// Session-scoped; credentials last for this process only
    Web,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and store a credential (secret read from the terminal or stdin)
    Store {
        /// Credential type (github, anthropic, openai, gitlab, bitbucket, mcp_server, mcp_signing_secret)
        credential_type: CredentialType,
        /// Store without contacting the provider
        #[arg(long)]
        skip_validation: bool,
        /// Require biometric authentication first
        #[arg(long)]
        require_biometric: bool,
    },

    /// Show a stored credential (masked unless --reveal)
    Get {
        credential_type: CredentialType,
        /// Print the full secret
        #[arg(long)]
        reveal: bool,
        /// Require biometric authentication first
        #[arg(long)]
        require_biometric: bool,
    },

    /// Delete a stored credential
    Delete { credential_type: CredentialType },

    /// List stored credentials
    List,

    /// Re-validate one stored credential, or all of them
    Validate { credential_type: Option<CredentialType> },

    /// Mask a secret for display (secret read from the terminal or stdin)
    Mask { credential_type: CredentialType },

    /// Show platform and biometric status
    Status,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Reset configuration to defaults
    Reset,
    /// Show the configuration file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let default_level = if cli.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("keyvault={}", default_level).parse()?)
                .add_directive(format!("keyvault_core={}", default_level).parse()?),
        )
        .init();

    let output = Output {
        format: cli.format,
        quiet: cli.quiet,
    };

    // Key storage is only opened for commands that touch credentials
    let platform = cli.platform;
    let open = || -> anyhow::Result<KeyStorage> {
        let config = Config::load()?;
        let storage = build_storage(platform, &config)?;
        debug!(platform = %storage.platform(), "Key storage ready");
        Ok(storage)
    };

    match cli.command {
        Commands::Store {
            credential_type,
            skip_validation,
            require_biometric,
        } => {
            let options = StoreOptions::new()
                .skip_validation(skip_validation)
                .require_biometric(require_biometric);
            cmd_store(&open()?, credential_type, options, output).await
        }

        Commands::Get {
            credential_type,
            reveal,
            require_biometric,
        } => {
            let options = RetrieveOptions::new().require_biometric(require_biometric);
            cmd_get(&open()?, credential_type, reveal, options, output).await
        }

        Commands::Delete { credential_type } => cmd_delete(&open()?, credential_type, output).await,

        Commands::List => cmd_list(&open()?, output).await,

        Commands::Validate { credential_type } => {
            cmd_validate(&open()?, credential_type, output).await
        }

        Commands::Mask { credential_type } => cmd_mask(credential_type, output),

        Commands::Status => cmd_status(&open()?, output).await,

        Commands::Config { action } => cmd_config(action, output),
    }
}

fn build_storage(platform: PlatformArg, config: &Config) -> anyhow::Result<KeyStorage> {
    let platform: Arc<dyn PlatformCapabilities> = match platform {
        // No OS biometric facility is wired into the terminal build
        PlatformArg::Native => Arc::new(NativePlatform::with_os_keyring(
            Arc::new(UnsupportedBiometricApi),
            &config.storage,
        )),
        PlatformArg::Web => Arc::new(WebPlatform::ephemeral(&config.storage)),
    };
    let validator = CredentialValidator::from_config(&config.validation)
        .context("Failed to build validation client")?;
    Ok(KeyStorage::new(platform, validator))
}

/// Read a secret without echoing it when attached to a terminal
fn read_secret(credential_type: CredentialType) -> anyhow::Result<SecureString> {
    let stdin = io::stdin();
    let raw = if stdin.is_terminal() {
        rpassword::prompt_password(format!("Enter {} secret: ", credential_type.display_name()))
            .context("Failed to read secret")?
    } else {
        let mut line = String::new();
        stdin
            .lock()
            .read_line(&mut line)
            .context("Failed to read secret from stdin")?;
        line
    };

    let secret = SecureString::new(raw.trim());
    if secret.is_empty() {
        bail!("No secret provided");
    }
    Ok(secret)
}

#[derive(Clone, Copy)]
struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    fn json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    fn print_json(&self, value: &impl serde::Serialize) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

async fn cmd_store(
    storage: &KeyStorage,
    credential_type: CredentialType,
    options: StoreOptions,
    output: Output,
) -> anyhow::Result<()> {
    let secret = read_secret(credential_type)?;
    let result = storage
        .store(credential_type, secret.as_str(), options)
        .await;

    if output.json() {
        output.print_json(&result)?;
    } else if result.is_valid && !output.quiet {
        println!("{}", result.message);
        println!("  Type: {}", credential_type.display_name());
        println!("  Secret: {}", storage.mask(credential_type, secret.as_str()));
        print_details(&result);
    }

    if !result.is_valid {
        bail!("{}", result.message);
    }
    Ok(())
}

async fn cmd_get(
    storage: &KeyStorage,
    credential_type: CredentialType,
    reveal: bool,
    options: RetrieveOptions,
    output: Output,
) -> anyhow::Result<()> {
    let retrieved = storage.retrieve(credential_type, options).await;
    let (Some(secret), Some(metadata)) = (retrieved.secret, retrieved.metadata) else {
        bail!("No {} credential available", credential_type.display_name());
    };

    let shown = if reveal {
        secret.as_str().to_string()
    } else {
        storage.mask(credential_type, secret.as_str())
    };

    if output.json() {
        output.print_json(&serde_json::json!({
            "type": credential_type,
            "secret": shown,
            "storedAt": metadata.stored_at,
        }))?;
    } else if output.quiet {
        println!("{}", shown);
    } else {
        println!("{}: {}", credential_type.display_name(), shown);
        println!("  Stored: {}", metadata.stored_at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    Ok(())
}

async fn cmd_delete(
    storage: &KeyStorage,
    credential_type: CredentialType,
    output: Output,
) -> anyhow::Result<()> {
    if !storage.delete(credential_type).await {
        bail!("Failed to delete {} credential", credential_type.display_name());
    }

    if output.json() {
        output.print_json(&serde_json::json!({ "type": credential_type, "deleted": true }))?;
    } else if !output.quiet {
        println!("Deleted {} credential.", credential_type.display_name());
    }
    Ok(())
}

async fn cmd_list(storage: &KeyStorage, output: Output) -> anyhow::Result<()> {
    let mut entries = Vec::new();
    for credential_type in storage.stored_credential_types().await {
        let retrieved = storage
            .retrieve(credential_type, RetrieveOptions::default())
            .await;
        if let (Some(secret), Some(metadata)) = (retrieved.secret, retrieved.metadata) {
            entries.push((
                credential_type,
                storage.mask(credential_type, secret.as_str()),
                metadata.stored_at,
            ));
        }
    }

    if output.json() {
        let items: Vec<_> = entries
            .iter()
            .map(|(ty, masked, stored_at)| {
                serde_json::json!({ "type": ty, "secret": masked, "storedAt": stored_at })
            })
            .collect();
        return output.print_json(&items);
    }

    if entries.is_empty() {
        if !output.quiet {
            println!("No credentials stored.");
            println!("\nStore one with: keyvault store <type>");
        }
        return Ok(());
    }

    if !output.quiet {
        println!("Stored credentials:");
    }
    for (credential_type, masked, stored_at) in entries {
        println!(
            "  {:<20} {}  (stored {})",
            credential_type.as_str(),
            masked,
            stored_at.format("%Y-%m-%d")
        );
    }
    Ok(())
}

async fn cmd_validate(
    storage: &KeyStorage,
    credential_type: Option<CredentialType>,
    output: Output,
) -> anyhow::Result<()> {
    let results: Vec<(CredentialType, ValidationResult)> = match credential_type {
        Some(wanted) => match storage.validate_stored(wanted).await {
            Some(result) => vec![(wanted, result)],
            None => bail!("No {} credential available", wanted.display_name()),
        },
        None => {
            let mut all: Vec<_> = storage.validate_all_stored().await.into_iter().collect();
            all.sort_by_key(|(ty, _)| *ty);
            all
        }
    };

    if output.json() {
        let items: Vec<_> = results
            .iter()
            .map(|(ty, result)| serde_json::json!({ "type": ty, "result": result }))
            .collect();
        output.print_json(&items)?;
    } else if results.is_empty() {
        if !output.quiet {
            println!("No credentials stored.");
        }
    } else {
        for (ty, result) in &results {
            let marker = if result.is_valid { "[OK]" } else { "[FAIL]" };
            println!("{} {}: {}", marker, ty.display_name(), result.message);
            if !output.quiet {
                print_details(result);
            }
        }
    }

    let failed = results.iter().filter(|(_, r)| !r.is_valid).count();
    if failed > 0 {
        bail!("{} credential(s) failed validation", failed);
    }
    Ok(())
}

fn cmd_mask(credential_type: CredentialType, output: Output) -> anyhow::Result<()> {
    let secret = read_secret(credential_type)?;
    let masked = mask_secret(secret.as_str(), credential_type);

    if output.json() {
        output.print_json(&serde_json::json!({ "type": credential_type, "masked": masked }))?;
    } else {
        println!("{}", masked);
    }
    Ok(())
}

async fn cmd_status(storage: &KeyStorage, output: Output) -> anyhow::Result<()> {
    let biometric = storage.biometric_available().await;
    let methods = storage.supported_biometric_methods().await;
    let config_path = Config::config_path()?;

    if output.json() {
        return output.print_json(&serde_json::json!({
            "platform": storage.platform().to_string(),
            "biometricAvailable": biometric,
            "biometricMethods": methods,
            "configPath": config_path,
        }));
    }

    println!("Platform: {}", storage.platform());
    if biometric {
        let names: Vec<String> = methods.iter().map(|m| format!("{:?}", m)).collect();
        println!("Biometrics: available ({})", names.join(", "));
    } else {
        println!("Biometrics: unavailable");
    }
    if !output.quiet {
        println!("Config: {}", config_path.display());
    }
    Ok(())
}

fn cmd_config(action: ConfigAction, output: Output) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !output.quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let items = config.list()?;
            if output.json() {
                let map: serde_json::Map<String, serde_json::Value> = items
                    .into_iter()
                    .map(|(key, value)| (key, serde_json::Value::String(value)))
                    .collect();
                output.print_json(&map)?;
            } else {
                for (key, value) in items {
                    println!("{} = {}", key, value);
                }
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !output.quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn print_details(result: &ValidationResult) {
    match &result.metadata {
        Some(ProviderMetadata::Github {
            username, scopes, ..
        }) => {
            if !username.is_empty() {
                println!("  User: {}", username);
            }
            if !scopes.is_empty() {
                println!("  Scopes: {}", scopes.join(", "));
            }
        }
        Some(ProviderMetadata::Anthropic {
            requests_remaining,
            tokens_remaining,
        })
        | Some(ProviderMetadata::Openai {
            requests_remaining,
            tokens_remaining,
        }) => {
            if let Some(requests) = requests_remaining {
                println!("  Requests remaining: {}", requests);
            }
            if let Some(tokens) = tokens_remaining {
                println!("  Tokens remaining: {}", tokens);
            }
        }
        None => {}
    }
    if let Some(expires_at) = result.expires_at {
        println!("  Expires: {}", expires_at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_store_flags() {
        let cli = Cli::try_parse_from([
            "keyvault",
            "--platform",
            "web",
            "store",
            "mcp-server",
            "--skip-validation",
        ])
        .unwrap();

        assert!(matches!(cli.platform, PlatformArg::Web));
        match cli.command {
            Commands::Store {
                credential_type,
                skip_validation,
                require_biometric,
            } => {
                assert_eq!(credential_type, CredentialType::McpServer);
                assert!(skip_validation);
                assert!(!require_biometric);
            }
            _ => panic!("expected store"),
        }
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(Cli::try_parse_from(["keyvault", "get", "dropbox"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["keyvault", "list", "--format", "json", "-q"]).unwrap();
        assert!(cli.format == OutputFormat::Json);
        assert!(cli.quiet);
    }
}

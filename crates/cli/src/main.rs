mod platform;

use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use crossterm::style::Stylize;
use scs_api::{AuthenticatedClient, ScsHttpClient, TransportOptions};
use scs_engine::{EurekaView, InstanceOperation, LifecycleCommand, Operation, OperationRunner, Platform};
use scs_types::TargetIdentity;
use scs_util::{PluginConfig, hint_for};
use tracing_subscriber::EnvFilter;

use crate::platform::CfCliPlatform;

const SERVICE_INSTANCE: &str = "service-instance";
const CF_APP_NAME: &str = "cf-app-name";
const CF_INSTANCE_INDEX: &str = "cf-instance-index";
const SKIP_SSL_VALIDATION: &str = "skip-ssl-validation";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();
    let matches = match build_cli().try_get_matches() {
        Ok(matches) => matches,
        Err(error) if is_informational(error.kind()) => {
            let _ = error.print();
            return ExitCode::SUCCESS;
        }
        Err(error) => {
            report_failure(&parse_error_message(&error));
            return ExitCode::FAILURE;
        }
    };

    match run(&matches).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            report_failure(&error.to_string());
            ExitCode::FAILURE
        }
    }
}

fn report_failure(message: &str) {
    eprintln!("{}", "FAILED".red().bold());
    eprintln!("{message}");
    if let Some(hint) = hint_for(message) {
        eprintln!("{hint}");
    }
}

/// Help and version output are requested, not failures.
fn is_informational(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::DisplayHelp | ErrorKind::DisplayVersion)
}

fn parse_error_message(error: &clap::Error) -> String {
    let rendered = error.render().to_string();
    let trimmed = rendered.trim();
    trimmed.strip_prefix("error: ").unwrap_or(trimmed).to_string()
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).try_init();
}

fn service_instance_arg() -> Arg {
    Arg::new(SERVICE_INSTANCE)
        .required(true)
        .help("Name of the service instance")
}

fn instance_command(name: &'static str, about: &'static str) -> Command {
    Command::new(name).about(about).arg(service_instance_arg())
}

fn registry_instance_command(name: &'static str, about: &'static str) -> Command {
    instance_command(name, about)
        .arg(Arg::new(CF_APP_NAME).required(true).help("Name of the bound application"))
        .arg(
            Arg::new(CF_INSTANCE_INDEX)
                .short('i')
                .long(CF_INSTANCE_INDEX)
                .value_parser(value_parser!(u32))
                .help("Only act on the application instance with this index"),
        )
}

fn build_cli() -> Command {
    Command::new("scs")
        .about("Manage Spring Cloud Services instances")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new(SKIP_SSL_VALIDATION)
                .long(SKIP_SSL_VALIDATION)
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Skip verification of TLS certificates"),
        )
        .subcommand(instance_command("service-registry-info", "Display service registry information"))
        .subcommand(instance_command("service-registry-list", "Display all applications registered with a service registry"))
        .subcommand(registry_instance_command(
            "service-registry-deregister",
            "Deregister an application instance from a service registry",
        ))
        .subcommand(registry_instance_command(
            "service-registry-enable",
            "Enable an application instance registered with a service registry",
        ))
        .subcommand(registry_instance_command(
            "service-registry-disable",
            "Disable an application instance registered with a service registry",
        ))
        .subcommand(
            instance_command("config-server-encrypt-value", "Encrypt a value using a config server")
                .arg(Arg::new("value").help("Value to encrypt").conflicts_with("file-to-encrypt"))
                .arg(
                    Arg::new("file-to-encrypt")
                        .short('f')
                        .long("file-to-encrypt")
                        .help("Encrypt the contents of this file"),
                ),
        )
        .subcommand(instance_command("config-server-refresh-mirror", "Refresh the mirrored git repositories of a config server"))
        .subcommand(
            instance_command("config-server-credhub-add-secret", "Add a secret to the CredHub store of a config server")
                .arg(Arg::new("path").required(true).help("{appName}/{profile}/{label}/{propertyName}"))
                .arg(Arg::new("secret").required(true).help("Secret as a JSON value")),
        )
        .subcommand(
            instance_command("config-server-credhub-remove-secret", "Remove a secret from the CredHub store of a config server")
                .arg(Arg::new("path").required(true).help("{appName}/{profile}/{label}/{propertyName}")),
        )
        .subcommand(
            instance_command("config-server-delete-git-repo", "Delete a mirrored git repository from a config server")
                .arg(Arg::new("repo").required(true).help("URI of the git repository")),
        )
        .subcommand(instance_command("service-instance-start", "Start a service instance"))
        .subcommand(instance_command("service-instance-stop", "Stop a service instance"))
        .subcommand(instance_command("service-instance-restart", "Restart a service instance"))
        .subcommand(instance_command("service-instance-restage", "Restage a service instance"))
        .subcommand(instance_command("service-instance-view", "Display the backing applications of a service instance"))
        .subcommand(instance_command("service-instance-parameters", "Display the parameters of a service instance"))
}

async fn run(matches: &ArgMatches) -> Result<()> {
    let (command, sub) = matches.subcommand().context("expected a subcommand")?;
    let service_instance = required(sub, SERVICE_INSTANCE)?;

    let config = PluginConfig::load()?;
    let platform: Arc<dyn Platform> = Arc::new(CfCliPlatform::default());
    let client: Arc<dyn AuthenticatedClient> = Arc::new(ScsHttpClient::new(TransportOptions {
        skip_ssl_validation: matches.get_flag(SKIP_SSL_VALIDATION),
        connect_timeout: Duration::from_secs(config.connect_timeout_secs),
    })?);

    if let Some(operation) = registry_operation(command) {
        let cf_app_name = required(sub, CF_APP_NAME)?;
        let instance_index = sub.get_one::<u32>(CF_INSTANCE_INDEX).copied();
        let view = EurekaView::new(platform, client, &config);
        let mut stdout = io::stdout();
        view.operate_on_application(service_instance, cf_app_name, instance_index, operation, &mut stdout)
            .await?;
        return Ok(());
    }

    let output = match command {
        "service-registry-info" => {
            print_preamble(platform.as_ref(), "Getting service registry info from", service_instance).await?;
            EurekaView::new(platform, client, &config).info(service_instance).await?
        }
        "service-registry-list" => {
            print_preamble(platform.as_ref(), "Listing service registry applications of", service_instance).await?;
            EurekaView::new(platform, client, &config).list(service_instance).await?
        }
        other => {
            let operation = instance_operation(other, sub)?;
            if operation == Operation::View {
                print_preamble(platform.as_ref(), "Getting backing applications of", service_instance).await?;
            }
            OperationRunner::new(platform, client, &config).run(service_instance, &operation).await?
        }
    };

    if !output.is_empty() {
        let mut stdout = io::stdout().lock();
        stdout.write_all(output.as_bytes())?;
        if !output.ends_with('\n') {
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

fn registry_operation(command: &str) -> Option<InstanceOperation> {
    match command {
        "service-registry-deregister" => Some(InstanceOperation::Deregister),
        "service-registry-enable" => Some(InstanceOperation::Enable),
        "service-registry-disable" => Some(InstanceOperation::Disable),
        _ => None,
    }
}

fn instance_operation(command: &str, sub: &ArgMatches) -> Result<Operation> {
    let operation = match command {
        "service-instance-start" => Operation::Lifecycle(LifecycleCommand::Start),
        "service-instance-stop" => Operation::Lifecycle(LifecycleCommand::Stop),
        "service-instance-restart" => Operation::Lifecycle(LifecycleCommand::Restart),
        "service-instance-restage" => Operation::Lifecycle(LifecycleCommand::Restage),
        "service-instance-view" => Operation::View,
        "service-instance-parameters" => Operation::Parameters,
        "config-server-encrypt-value" => Operation::Encrypt {
            plaintext: plaintext(sub)?,
        },
        "config-server-refresh-mirror" => Operation::RefreshMirrors,
        "config-server-credhub-add-secret" => Operation::AddCredHubSecret {
            path: required(sub, "path")?.to_string(),
            secret: required(sub, "secret")?.to_string(),
        },
        "config-server-credhub-remove-secret" => Operation::RemoveCredHubSecret {
            path: required(sub, "path")?.to_string(),
        },
        "config-server-delete-git-repo" => Operation::DeleteGitRepo {
            repo: required(sub, "repo")?.to_string(),
        },
        other => bail!("unknown command: {other}"),
    };
    Ok(operation)
}

/// The positional value, or the verbatim contents of `--file-to-encrypt`.
fn plaintext(sub: &ArgMatches) -> Result<String> {
    if let Some(path) = sub.get_one::<String>("file-to-encrypt") {
        return fs::read_to_string(path).map_err(|error| anyhow!("Error reading file {path}: {error}"));
    }
    match sub.get_one::<String>("value") {
        Some(value) => Ok(value.clone()),
        None => bail!("Either a value or --file-to-encrypt must be given"),
    }
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("missing required argument <{name}>"))
}

async fn print_preamble(platform: &dyn Platform, action: &str, service_instance: &str) -> Result<()> {
    let identity = TargetIdentity {
        username: platform.username().await?,
        org: platform.current_org().await?,
        space: platform.current_space().await?,
    };
    println!(
        "{action} service instance {} in org {} / space {} as {}...\n",
        service_instance.bold(),
        identity.org.bold(),
        identity.space.bold(),
        identity.username.bold()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ArgMatches {
        build_cli().try_get_matches_from(args).expect("arguments parse")
    }

    #[test]
    fn instance_index_zero_is_a_real_index() {
        let matches = parse(&["scs", "service-registry-deregister", "registry", "orders", "-i", "0"]);
        let (_, sub) = matches.subcommand().expect("subcommand");
        assert_eq!(sub.get_one::<u32>(CF_INSTANCE_INDEX).copied(), Some(0));
    }

    #[test]
    fn unknown_flags_are_rejected() {
        assert!(build_cli().try_get_matches_from(["scs", "service-instance-view", "svc", "--bogus"]).is_err());
    }

    #[test]
    fn parse_errors_are_failures_with_a_readable_message() {
        let error = build_cli()
            .try_get_matches_from(["scs", "service-instance-view", "svc", "--bogus"])
            .unwrap_err();
        assert!(!is_informational(error.kind()));
        let message = parse_error_message(&error);
        assert!(message.starts_with("unexpected argument '--bogus'"), "{message}");

        let error = build_cli()
            .try_get_matches_from(["scs", "service-registry-deregister", "reg", "app", "-i", "x"])
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ValueValidation);
        assert!(!is_informational(error.kind()));
        assert!(parse_error_message(&error).contains("'x'"));
    }

    #[test]
    fn help_is_not_a_failure() {
        let error = build_cli().try_get_matches_from(["scs", "--help"]).unwrap_err();
        assert!(is_informational(error.kind()));

        let error = build_cli()
            .try_get_matches_from(["scs", "service-instance-view", "--help"])
            .unwrap_err();
        assert!(is_informational(error.kind()));
    }

    #[test]
    fn skip_ssl_validation_is_accepted_after_the_subcommand() {
        let matches = parse(&["scs", "service-instance-view", "svc", "--skip-ssl-validation"]);
        assert!(matches.get_flag(SKIP_SSL_VALIDATION));
    }

    #[test]
    fn every_instance_command_maps_to_an_operation() {
        let matches = parse(&["scs", "config-server-credhub-add-secret", "svc", "a/b/c/d", "{}"]);
        let (command, sub) = matches.subcommand().expect("subcommand");
        assert_eq!(
            instance_operation(command, sub).expect("operation"),
            Operation::AddCredHubSecret {
                path: "a/b/c/d".into(),
                secret: "{}".into(),
            }
        );

        let matches = parse(&["scs", "service-instance-restage", "svc"]);
        let (command, sub) = matches.subcommand().expect("subcommand");
        assert!(instance_operation(command, sub).expect("operation").is_lifecycle_operation());
    }

    #[test]
    fn encrypt_needs_exactly_one_source() {
        let matches = parse(&["scs", "config-server-encrypt-value", "svc"]);
        let (_, sub) = matches.subcommand().expect("subcommand");
        assert!(plaintext(sub).is_err());

        assert!(
            build_cli()
                .try_get_matches_from(["scs", "config-server-encrypt-value", "svc", "plain", "-f", "secret.txt"])
                .is_err()
        );
    }

    #[test]
    fn encrypt_reads_the_file_verbatim() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("value.txt");
        fs::write(&path, "line one\n").expect("write value");
        let path = path.to_string_lossy().to_string();

        let matches = parse(&["scs", "config-server-encrypt-value", "svc", "-f", &path]);
        let (_, sub) = matches.subcommand().expect("subcommand");
        assert_eq!(plaintext(sub).expect("plaintext"), "line one\n");
    }
}

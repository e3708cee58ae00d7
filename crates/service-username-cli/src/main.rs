//! service-username CLI — `suid` command.
//!
//! Generates salts and persistent ids, administers registered service
//! configurations stored as JSON, and resolves the username a relying
//! service would receive.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use service_username::crypto::{SaltSource, ThreadRngSaltSource};
use service_username::time::micros_to_rfc3339;
use service_username::{
    CaseCanonicalization, MissingAttributePolicy, PersistentIdGenerator, Principal,
    RegisteredService, RegistryStore, Salt, UsernameStrategy, WebService,
};

// ── Directory helpers ─────────────────────────────────────────────────────────

fn default_registry_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME not set; pass --registry")?;
    Ok(PathBuf::from(home).join(".service-username"))
}

fn open_store(registry: Option<PathBuf>) -> Result<RegistryStore> {
    let dir = match registry {
        Some(dir) => dir,
        None => default_registry_dir()?,
    };
    log::debug!("Using registry at {}", dir.display());
    RegistryStore::new(&dir)
        .with_context(|| format!("failed to open registry at {}", dir.display()))
}

// ── Argument parsing helpers ──────────────────────────────────────────────────

/// Parse `name=value` into a pair.
fn parse_attribute(s: &str) -> Result<(String, String)> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("attribute '{s}' must be written as name=value"))?;
    if name.is_empty() {
        return Err(anyhow!("attribute '{s}' has an empty name"));
    }
    Ok((name.to_string(), value.to_string()))
}

/// Build a strategy from `service add` flags.
fn build_strategy(
    kind: &str,
    attribute: Option<String>,
    fallback: bool,
    salt: Option<String>,
    case: &str,
) -> Result<UsernameStrategy> {
    let canonicalization = CaseCanonicalization::from_str_value(case)
        .ok_or_else(|| anyhow!("unknown case mode '{case}' (none, upper, lower)"))?;

    let strategy = match kind.to_lowercase().as_str() {
        "default" => {
            if attribute.is_some() || fallback || salt.is_some() {
                return Err(anyhow!(
                    "--attribute, --fallback and --salt do not apply to the default strategy"
                ));
            }
            UsernameStrategy::default().with_canonicalization(canonicalization)
        }
        "attribute" | "attribute_based" => {
            if salt.is_some() {
                return Err(anyhow!("--salt only applies to the anonymous strategy"));
            }
            let attribute =
                attribute.ok_or_else(|| anyhow!("--attribute is required for the attribute strategy"))?;
            let policy = if fallback {
                MissingAttributePolicy::UsePrincipalId
            } else {
                MissingAttributePolicy::Fail
            };
            UsernameStrategy::attribute(attribute)
                .on_missing(policy)
                .with_canonicalization(canonicalization)
        }
        "anonymous" => {
            if fallback {
                return Err(anyhow!("--fallback does not apply to the anonymous strategy"));
            }
            if canonicalization != CaseCanonicalization::None {
                return Err(anyhow!(
                    "--case does not apply to the anonymous strategy; case-folding would merge pseudonyms"
                ));
            }
            let generator = match salt {
                Some(salt) => PersistentIdGenerator::new(Salt::new(salt)?),
                None => PersistentIdGenerator::with_random_salt(&mut ThreadRngSaltSource)?,
            };
            match attribute {
                Some(attr) => UsernameStrategy::anonymous_with(generator.with_attribute(attr)),
                None => UsernameStrategy::anonymous_with(generator),
            }
        }
        other => {
            return Err(anyhow!(
                "unknown strategy '{other}' (default, attribute, anonymous)"
            ))
        }
    };
    Ok(strategy)
}

fn describe_strategy(strategy: &UsernameStrategy, reveal_salt: bool) -> String {
    match strategy {
        UsernameStrategy::Default { canonicalization } => {
            format!("default (case: {canonicalization:?})")
        }
        UsernameStrategy::AttributeBased {
            attribute,
            on_missing,
            canonicalization,
        } => format!(
            "attribute '{attribute}' (on missing: {on_missing:?}, case: {canonicalization:?})"
        ),
        UsernameStrategy::Anonymous { generator: None } => {
            "anonymous (NO GENERATOR CONFIGURED)".to_string()
        }
        UsernameStrategy::Anonymous {
            generator: Some(generator),
        } => {
            let salt = if reveal_salt {
                generator.salt().expose().to_string()
            } else {
                format!("fingerprint {}", generator.salt().fingerprint())
            };
            match generator.attribute() {
                Some(attr) => format!("anonymous (salt: {salt}, subject attribute: {attr})"),
                None => format!("anonymous (salt: {salt})"),
            }
        }
    }
}

// ── CLI structure ─────────────────────────────────────────────────────────────

/// service-username CLI — decide which username each relying service sees.
#[derive(Parser, Debug)]
#[command(
    name = "suid",
    about = "service-username CLI",
    version,
    long_about = "suid — service-username CLI\n\nGenerate salts and persistent ids, manage registered services,\nand resolve the username disclosed to a relying service."
)]
struct Cli {
    /// Registry directory (default: ~/.service-username)
    #[arg(long, global = true)]
    registry: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a fresh random alphanumeric salt
    Salt {
        /// Number of characters
        #[arg(long, default_value_t = 16)]
        length: usize,
    },

    /// Generate a persistent id for a principal
    Generate {
        /// Salt to hash with
        #[arg(long)]
        salt: String,

        /// Principal identifier
        #[arg(long)]
        principal: String,

        /// Optional scope (service id) mixed into the digest
        #[arg(long)]
        scope: Option<String>,
    },

    /// Manage registered services
    Service {
        #[command(subcommand)]
        subcommand: ServiceCommands,
    },

    /// Resolve the username a service would receive
    Resolve {
        /// Service URL or entity id
        #[arg(long)]
        service: String,

        /// Principal identifier
        #[arg(long)]
        principal: String,

        /// Released attribute, as name=value (repeatable)
        #[arg(long = "attr")]
        attributes: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ServiceCommands {
    /// Register a service
    Add {
        /// Numeric id
        #[arg(long)]
        id: u64,

        /// Human-readable name
        #[arg(long)]
        name: String,

        /// Regular expression matched against whole service ids
        #[arg(long)]
        pattern: String,

        /// Username strategy (default, attribute, anonymous)
        #[arg(long, default_value = "default")]
        strategy: String,

        /// Attribute name (attribute strategy), or subject attribute (anonymous)
        #[arg(long)]
        attribute: Option<String>,

        /// Fall back to the principal id when the attribute is missing
        #[arg(long)]
        fallback: bool,

        /// Explicit salt for the anonymous strategy (default: random)
        #[arg(long)]
        salt: Option<String>,

        /// Case canonicalization (none, upper, lower)
        #[arg(long, default_value = "none")]
        case: String,

        /// Evaluation order; lower is consulted first
        #[arg(long, default_value_t = 0)]
        order: i32,

        /// Optional description
        #[arg(long)]
        description: Option<String>,

        /// Overwrite an existing service with the same id
        #[arg(long)]
        force: bool,
    },

    /// List registered services
    List {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a registered service
    Show {
        /// Service id
        id: u64,

        /// Print the salt itself instead of its fingerprint
        #[arg(long)]
        reveal_salt: bool,

        /// Print the stored JSON record
        #[arg(long)]
        json: bool,
    },

    /// Remove a registered service
    Remove {
        /// Service id
        id: u64,
    },

    /// Replace the salt of an anonymous service (re-keys every issued id)
    RotateSalt {
        /// Service id
        id: u64,
    },
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if verbose { "debug" } else { "warn" }),
    )
    .init();

    let registry = cli.registry;
    let result = match cli.command {
        Commands::Salt { length } => cmd_salt(length),
        Commands::Generate {
            salt,
            principal,
            scope,
        } => cmd_generate(&salt, &principal, scope.as_deref()),
        Commands::Service { subcommand } => match subcommand {
            ServiceCommands::Add {
                id,
                name,
                pattern,
                strategy,
                attribute,
                fallback,
                salt,
                case,
                order,
                description,
                force,
            } => build_strategy(&strategy, attribute, fallback, salt, &case).and_then(|strategy| {
                cmd_service_add(
                    registry,
                    id,
                    &name,
                    &pattern,
                    strategy,
                    order,
                    description,
                    force,
                    verbose,
                )
            }),
            ServiceCommands::List { json } => cmd_service_list(registry, json),
            ServiceCommands::Show {
                id,
                reveal_salt,
                json,
            } => cmd_service_show(registry, id, reveal_salt, json),
            ServiceCommands::Remove { id } => cmd_service_remove(registry, id),
            ServiceCommands::RotateSalt { id } => cmd_service_rotate_salt(registry, id, verbose),
        },
        Commands::Resolve {
            service,
            principal,
            attributes,
        } => cmd_resolve(registry, &service, &principal, &attributes, verbose),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

// ── Command implementations ───────────────────────────────────────────────────

/// `suid salt [--length N]`
fn cmd_salt(length: usize) -> Result<()> {
    let salt = ThreadRngSaltSource.next_salt(length)?;
    println!("{}", salt.expose());
    Ok(())
}

/// `suid generate --salt S --principal P [--scope ID]`
fn cmd_generate(salt: &str, principal: &str, scope: Option<&str>) -> Result<()> {
    let generator = PersistentIdGenerator::new(Salt::new(salt)?);
    println!("{}", generator.generate_for(principal, scope));
    Ok(())
}

/// `suid service add ...`
#[allow(clippy::too_many_arguments)]
fn cmd_service_add(
    registry: Option<PathBuf>,
    id: u64,
    name: &str,
    pattern: &str,
    strategy: UsernameStrategy,
    order: i32,
    description: Option<String>,
    force: bool,
    verbose: bool,
) -> Result<()> {
    let store = open_store(registry)?;
    if !force && store.list()?.contains(&id) {
        return Err(anyhow!(
            "registered service {id} already exists (use --force to overwrite)"
        ));
    }

    let mut service = RegisteredService::new(id, name, pattern, strategy)?.with_evaluation_order(order);
    if let Some(description) = description {
        service = service.with_description(description);
    }
    store
        .save(&service)
        .with_context(|| format!("failed to save registered service {id}"))?;

    println!("Registered service {id} '{name}'");
    println!("  Pattern:  {pattern}");
    println!(
        "  Strategy: {}",
        describe_strategy(&service.username_strategy, false)
    );
    if verbose {
        println!("  Order:    {order}");
    }
    Ok(())
}

/// `suid service list [--json]`
fn cmd_service_list(registry: Option<PathBuf>, json: bool) -> Result<()> {
    let store = open_store(registry)?;
    let mut services = store.load_all()?;
    services.sort_by_key(|s| (s.evaluation_order, s.id));

    if json {
        println!("{}", serde_json::to_string_pretty(&services)?);
        return Ok(());
    }

    if services.is_empty() {
        println!("No registered services.");
        return Ok(());
    }
    for service in &services {
        println!(
            "{:>6}  {:<20} {:<12} {}",
            service.id,
            service.name,
            service.username_strategy.kind(),
            service.service_pattern.as_str()
        );
    }
    Ok(())
}

/// `suid service show ID [--reveal-salt] [--json]`
fn cmd_service_show(registry: Option<PathBuf>, id: u64, reveal_salt: bool, json: bool) -> Result<()> {
    let store = open_store(registry)?;
    let record = store.load_record(id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    let service = &record.service;
    println!("Registered service {}", service.id);
    println!("  Name:     {}", service.name);
    println!("  Pattern:  {}", service.service_pattern.as_str());
    if let Some(description) = &service.description {
        println!("  About:    {description}");
    }
    println!("  Order:    {}", service.evaluation_order);
    println!(
        "  Strategy: {}",
        describe_strategy(&service.username_strategy, reveal_salt)
    );
    if record.saved_at > 0 {
        println!("  Saved:    {}", micros_to_rfc3339(record.saved_at));
    }
    Ok(())
}

/// `suid service remove ID`
fn cmd_service_remove(registry: Option<PathBuf>, id: u64) -> Result<()> {
    let store = open_store(registry)?;
    if !store.delete(id)? {
        return Err(anyhow!("registered service {id} not found"));
    }
    println!("Removed registered service {id}");
    Ok(())
}

/// `suid service rotate-salt ID`
fn cmd_service_rotate_salt(registry: Option<PathBuf>, id: u64, verbose: bool) -> Result<()> {
    let store = open_store(registry)?;
    let services = store.load_registry()?;
    let rotated = services.rotate_salt(id, &mut ThreadRngSaltSource)?;
    store.save(&rotated)?;

    println!("Rotated salt of registered service {id}");
    println!("  Previously issued persistent ids for this service are no longer valid.");
    if verbose {
        println!(
            "  Strategy: {}",
            describe_strategy(&rotated.username_strategy, false)
        );
    }
    Ok(())
}

/// `suid resolve --service URL --principal P [--attr name=value ...]`
fn cmd_resolve(
    registry: Option<PathBuf>,
    service: &str,
    principal: &str,
    attributes: &[String],
    verbose: bool,
) -> Result<()> {
    let store = open_store(registry)?;
    let services = store.load_registry()?;

    let mut subject = Principal::new(principal);
    for raw in attributes {
        let (name, value) = parse_attribute(raw)?;
        subject = subject.with_attribute(name, value);
    }

    let target = WebService::new(service);
    let registered = services
        .find_matching(&target)
        .ok_or_else(|| anyhow!("no registered service matches {service}"))?;
    let username = registered
        .resolve_username(&subject, &target)
        .with_context(|| format!("cannot resolve username for registered service {}", registered.id))?;

    if verbose {
        println!(
            "Registered service {} '{}' ({} strategy)",
            registered.id,
            registered.name,
            registered.username_strategy.kind()
        );
    }
    println!("{username}");
    Ok(())
}
